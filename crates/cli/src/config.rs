//! Runtime configuration
//!
//! Resolved from command-line flags first, then environment variables,
//! then built-in defaults.

use std::path::PathBuf;

use pt_core::storage::KvStore;

/// Environment variable naming the data directory
pub const DATA_DIR_ENV: &str = "PT_DATA_DIR";
/// Environment flag selecting the volatile in-memory store
pub const MEMORY_STORE_ENV: &str = "PT_MEMORY_STORE";

const DEFAULT_DATA_DIR: &str = ".pocket-tasks";

/// Where the task store keeps its data
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
    Directory(PathBuf),
    Memory,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub store: StoreLocation,
}

impl Config {
    /// Resolve the configuration against the process environment
    pub fn resolve(data_dir: Option<PathBuf>) -> Self {
        Self::from_lookup(data_dir, |name| std::env::var(name).ok())
    }

    fn from_lookup(data_dir: Option<PathBuf>, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if env_flag(lookup(MEMORY_STORE_ENV), false) {
            return Self {
                store: StoreLocation::Memory,
            };
        }

        let dir = data_dir
            .or_else(|| {
                lookup(DATA_DIR_ENV)
                    .map(|value| value.trim().to_string())
                    .filter(|value| !value.is_empty())
                    .map(PathBuf::from)
            })
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));

        Self {
            store: StoreLocation::Directory(dir),
        }
    }

    pub fn open_store(&self) -> KvStore {
        match &self.store {
            StoreLocation::Directory(dir) => KvStore::open(dir.clone()),
            StoreLocation::Memory => KvStore::in_memory(),
        }
    }
}

fn env_flag(raw: Option<String>, default: bool) -> bool {
    match raw {
        Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            _ => default,
        },
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn test_default_directory() {
        let config = Config::from_lookup(None, lookup(&[]));
        assert_eq!(
            config.store,
            StoreLocation::Directory(PathBuf::from(".pocket-tasks"))
        );
    }

    #[test]
    fn test_env_directory() {
        let config = Config::from_lookup(None, lookup(&[(DATA_DIR_ENV, "/var/tasks")]));
        assert_eq!(config.store, StoreLocation::Directory(PathBuf::from("/var/tasks")));
    }

    #[test]
    fn test_flag_beats_env() {
        let config = Config::from_lookup(
            Some(PathBuf::from("./here")),
            lookup(&[(DATA_DIR_ENV, "/var/tasks")]),
        );
        assert_eq!(config.store, StoreLocation::Directory(PathBuf::from("./here")));
    }

    #[test]
    fn test_blank_env_directory_ignored() {
        let config = Config::from_lookup(None, lookup(&[(DATA_DIR_ENV, "  ")]));
        assert_eq!(
            config.store,
            StoreLocation::Directory(PathBuf::from(".pocket-tasks"))
        );
    }

    #[test]
    fn test_memory_flag() {
        for value in ["1", "true", "YES", " on "] {
            let config = Config::from_lookup(
                Some(PathBuf::from("./ignored")),
                lookup(&[(MEMORY_STORE_ENV, value)]),
            );
            assert_eq!(config.store, StoreLocation::Memory);
        }

        let config = Config::from_lookup(None, lookup(&[(MEMORY_STORE_ENV, "maybe")]));
        assert!(matches!(config.store, StoreLocation::Directory(_)));
    }
}
