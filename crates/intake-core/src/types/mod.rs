//! Validated wrappers used by the extraction adapters.

pub mod dest_root;

pub use dest_root::DestRoot;
