//! Archive creation.

pub mod zip;

pub use self::zip::compress_directory_to_zip;
pub use self::zip::compress_directory_to_zip_with;
