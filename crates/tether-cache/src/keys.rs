//! Cache key utilities.

use sha2::{Digest, Sha256};
use tether_core::{CacheGeneration, RequestKey};

/// File name for an entry: hex SHA-256 of `METHOD URL`.
pub fn entry_file_name(key: &RequestKey) -> String {
    let mut hasher = Sha256::new();
    hasher.update(key.method.as_str().as_bytes());
    hasher.update(b" ");
    hasher.update(key.url.as_str().as_bytes());
    format!("{}.json", hex::encode(hasher.finalize()))
}

/// Directory name for a generation: hex of the UTF-8 name, so any valid
/// generation name maps to a portable directory and back.
pub fn generation_dir_name(name: &CacheGeneration) -> String {
    hex::encode(name.as_str())
}

/// Inverse of [`generation_dir_name`]. `None` for directories this store did not create.
pub fn generation_from_dir_name(dir_name: &str) -> Option<CacheGeneration> {
    let bytes = hex::decode(dir_name).ok()?;
    let name = String::from_utf8(bytes).ok()?;
    CacheGeneration::new(name).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tether_core::Method;
    use url::Url;

    #[test]
    fn test_entry_file_name_is_stable() {
        let key = RequestKey::get(Url::parse("http://localhost/").unwrap());
        let a = entry_file_name(&key);
        let b = entry_file_name(&key.clone());
        assert_eq!(a, b);
        assert!(a.ends_with(".json"));
        assert_eq!(a.len(), 64 + ".json".len());
    }

    #[test]
    fn test_entry_file_name_depends_on_method() {
        let url = Url::parse("http://localhost/api/data").unwrap();
        let get = entry_file_name(&RequestKey::new(Method::Get, url.clone()));
        let head = entry_file_name(&RequestKey::new(Method::Head, url));
        assert_ne!(get, head);
    }

    #[test]
    fn test_generation_dir_name_roundtrips() {
        for name in ["offline-demo-v1", "shell:v2", "a*b?c", "caché"] {
            let generation = CacheGeneration::new(name).unwrap();
            let dir = generation_dir_name(&generation);
            assert!(dir.chars().all(|c| c.is_ascii_hexdigit()));
            assert_eq!(generation_from_dir_name(&dir), Some(generation));
        }
    }

    #[test]
    fn test_foreign_dir_names_are_ignored() {
        assert_eq!(generation_from_dir_name("lost+found"), None);
        assert_eq!(generation_from_dir_name(""), None);
    }
}
