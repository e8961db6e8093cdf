use inkpad_workspace::WorkspaceConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub use inkpad_workspace::DEFAULT_CONFIG_NAME;

/// Inkpad configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Notebook store file, relative to the project directory
    #[serde(default = "default_store_file")]
    pub store_file: String,

    #[serde(flatten)]
    pub workspace: WorkspaceConfig,
}

fn default_store_file() -> String {
    "notebooks.json".to_string()
}

impl Config {
    /// Load config from a directory
    pub fn load(cwd: &Path) -> anyhow::Result<Self> {
        let config_path = cwd.join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            // Return default config if none exists
            Ok(Config::default())
        }
    }

    /// Absolute path to the notebook store
    pub fn store_path(&self, cwd: &Path) -> PathBuf {
        cwd.join(&self.store_file)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_file: default_store_file(),
            workspace: WorkspaceConfig::default(),
        }
    }
}
