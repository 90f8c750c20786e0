use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Environment variable naming an optional JSON settings file.
pub const CONFIG_ENV: &str = "DT_EXPLORER_CONFIG";

/// Startup settings. Every field has a default, so a partial JSON file
/// such as `{ "top_k": 20 }` is valid.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Table loaded at startup.
    pub data_path: PathBuf,
    /// Company selected when the search box matches nothing.
    pub default_stock: String,
    pub default_year: i64,
    /// Rows in the per-year ranking table.
    pub top_k: usize,
    /// Companies in the overall mean ranking.
    pub top_entities: usize,
    pub histogram_bins: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("两版合并后的年报数据_完整版.xlsx"),
            default_stock: "600000".to_string(),
            default_year: 1999,
            top_k: 10,
            top_entities: 20,
            histogram_bins: 20,
        }
    }
}

impl AppConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("parsing config file {}", path.display()))
    }

    /// Settings from `$DT_EXPLORER_CONFIG` (if set), with the first
    /// positional argument overriding the data path. A broken config file
    /// falls back to the defaults.
    pub fn load(args: impl IntoIterator<Item = String>) -> Self {
        let mut config = match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::from_file(Path::new(&path)).unwrap_or_else(|e| {
                log::warn!("Ignoring config: {e:#}");
                Self::default()
            }),
            None => Self::default(),
        };
        if let Some(path) = args.into_iter().next() {
            config.data_path = PathBuf::from(path);
        }
        config
    }
}
