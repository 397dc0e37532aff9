//! Node configuration.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Complete node configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Node name.
    #[serde(default = "default_node_name")]
    pub node_name: String,
    /// Chain identifier; embedded in transaction sign-bytes.
    #[serde(default = "default_chain_id")]
    pub chain_id: String,
    /// Data directory.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Category filter configuration.
    #[serde(default)]
    pub filter: FilterSettings,
}

fn default_node_name() -> String {
    "ledger-node".to_string()
}

fn default_chain_id() -> String {
    "civic-main".to_string()
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            node_name: default_node_name(),
            chain_id: default_chain_id(),
            data_dir: default_data_dir(),
            filter: FilterSettings::default(),
        }
    }
}

/// Sizing for the per-category document filters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterSettings {
    /// Expected documents per category.
    pub capacity: usize,
    /// Target false-positive rate at capacity.
    pub fp_rate: f64,
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            capacity: 10_000,
            fp_rate: 0.01,
        }
    }
}

impl NodeConfig {
    /// Load configuration from a TOML file; defaults apply if the file
    /// does not exist.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {path:?}"))?;
        toml::from_str(&raw).with_context(|| format!("parsing config file {path:?}"))
    }

    /// Write the configuration to a TOML file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let raw = toml::to_string_pretty(self).context("serializing config")?;
        std::fs::write(path, raw).with_context(|| format!("writing config file {path:?}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_yields_defaults() {
        let config = NodeConfig::load("/nonexistent/ledger.toml").unwrap();
        assert_eq!(config.chain_id, "civic-main");
        assert_eq!(config.filter.capacity, 10_000);
    }

    #[test]
    fn test_round_trip() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("ledger.toml");

        let mut config = NodeConfig::default();
        config.chain_id = "civic-test".to_string();
        config.filter.capacity = 500;
        config.save(&path).unwrap();

        let loaded = NodeConfig::load(&path).unwrap();
        assert_eq!(loaded.chain_id, "civic-test");
        assert_eq!(loaded.filter.capacity, 500);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("ledger.toml");
        std::fs::write(&path, "chain_id = \"civic-west\"\n").unwrap();

        let loaded = NodeConfig::load(&path).unwrap();
        assert_eq!(loaded.chain_id, "civic-west");
        assert_eq!(loaded.node_name, "ledger-node");
    }
}
