//! Save file locations and raw file access.

mod file_store;
mod paths;

pub use file_store::{FileStore, FsFileStore};
pub use paths::SavePaths;
