//! Engine configuration
//!
//! Read from environment variables with defaults, so the same binaries run
//! unchanged on a laptop (`data/`) and on a server (`DATA_DIR` set by the
//! service environment).
//!
//! | Variable           | Default                            |
//! |--------------------|------------------------------------|
//! | `DATA_DIR`         | `data`                             |
//! | `SNAPSHOT_PATH`    | `$DATA_DIR/doopies_metadata.json`  |
//! | `RARITY_OUTPUT`    | `$DATA_DIR/rarity_data.json`       |
//! | `ORGANIZED_OUTPUT` | `$DATA_DIR/doopies_organized.json` |
//! | `TOP_SPECIES`      | `10`                               |
//! | `PORT`             | `3000`                             |

use std::path::PathBuf;

pub const DEFAULT_DATA_DIR: &str = "data";
pub const SNAPSHOT_FILE: &str = "doopies_metadata.json";
pub const RARITY_FILE: &str = "rarity_data.json";
pub const ORGANIZED_FILE: &str = "doopies_organized.json";
pub const DEFAULT_TOP_SPECIES: usize = 10;
pub const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub data_dir: PathBuf,
    /// Input snapshot (`.json` nested, `.csv` / `.parquet` flat)
    pub snapshot_path: PathBuf,
    pub rarity_output: PathBuf,
    pub organized_output: PathBuf,
    /// Size of the top-species list in the stats report
    pub top_species: usize,
    pub port: u16,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl EngineConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key -> value source
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let data_dir = PathBuf::from(var("DATA_DIR").unwrap_or_else(|| DEFAULT_DATA_DIR.to_string()));
        let path_or = |key: &str, file: &str| var(key).map(PathBuf::from).unwrap_or_else(|| data_dir.join(file));

        Self {
            snapshot_path: path_or("SNAPSHOT_PATH", SNAPSHOT_FILE),
            rarity_output: path_or("RARITY_OUTPUT", RARITY_FILE),
            organized_output: path_or("ORGANIZED_OUTPUT", ORGANIZED_FILE),
            top_species: var("TOP_SPECIES")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(DEFAULT_TOP_SPECIES),
            port: var("PORT")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(DEFAULT_PORT),
            data_dir,
        }
    }

    /// Positional overrides: snapshot, rarity output, organized output
    pub fn with_args<I>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut args = args.into_iter();
        if let Some(snapshot) = args.next() {
            self.snapshot_path = PathBuf::from(snapshot);
        }
        if let Some(rarity) = args.next() {
            self.rarity_output = PathBuf::from(rarity);
        }
        if let Some(organized) = args.next() {
            self.organized_output = PathBuf::from(organized);
        }
        self
    }

    pub fn log_summary(&self) {
        tracing::info!("Configuration:");
        tracing::info!("  DATA_DIR: {:?}", self.data_dir);
        tracing::info!("  SNAPSHOT_PATH: {:?}", self.snapshot_path);
        tracing::info!("  RARITY_OUTPUT: {:?}", self.rarity_output);
        tracing::info!("  ORGANIZED_OUTPUT: {:?}", self.organized_output);
        tracing::info!("  TOP_SPECIES: {}", self.top_species);
        tracing::info!("  PORT: {}", self.port);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> EngineConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        EngineConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert_eq!(config.snapshot_path, PathBuf::from("data/doopies_metadata.json"));
        assert_eq!(config.rarity_output, PathBuf::from("data/rarity_data.json"));
        assert_eq!(config.organized_output, PathBuf::from("data/doopies_organized.json"));
        assert_eq!(config.top_species, 10);
        assert_eq!(config.port, 3000);
    }

    #[test]
    fn test_data_dir_moves_derived_paths() {
        let config = config(&[("DATA_DIR", "/srv/doopies"), ("RARITY_OUTPUT", "/tmp/r.json")]);
        assert_eq!(config.snapshot_path, PathBuf::from("/srv/doopies/doopies_metadata.json"));
        assert_eq!(config.rarity_output, PathBuf::from("/tmp/r.json"));
        assert_eq!(config.organized_output, PathBuf::from("/srv/doopies/doopies_organized.json"));
    }

    #[test]
    fn test_invalid_numbers_fall_back() {
        let config = config(&[("PORT", "not-a-port"), ("TOP_SPECIES", " 5 "), ("DATA_DIR", "  ")]);
        assert_eq!(config.port, 3000);
        assert_eq!(config.top_species, 5);
        assert_eq!(config.data_dir, PathBuf::from("data"));
    }

    #[test]
    fn test_positional_overrides() {
        let config = EngineConfig::default().with_args(vec!["in.csv".to_string(), "out.json".to_string()]);
        assert_eq!(config.snapshot_path, PathBuf::from("in.csv"));
        assert_eq!(config.rarity_output, PathBuf::from("out.json"));
        assert_eq!(config.organized_output, PathBuf::from("data/doopies_organized.json"));
    }
}
