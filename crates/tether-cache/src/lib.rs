//! Cache store backends for Tether.

pub mod filesystem;
pub mod keys;
pub mod memory;
pub mod types;

pub use filesystem::FilesystemCacheStorage;
pub use keys::{entry_file_name, generation_dir_name, generation_from_dir_name};
pub use memory::MemoryCacheStorage;
pub use types::StoredEntry;
