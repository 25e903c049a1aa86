pub mod fs;

pub use fs::{create_dirs, open_readable, open_writable};
