//! Security validation modules.

pub mod path;
pub mod permissions;

// Re-export public functions
pub use path::clean_path;
pub use path::safe_join;
pub use path::validate_containment;
pub use permissions::sanitize_mode;
