use crate::autosave::AutosaveConfig;
use crate::error::WorkspaceResult;
use inkpad_common::FileSystem;
use inkpad_editor::DEFAULT_UNDO_LEVELS;
use inkpad_parser::MAX_IMPORT_BYTES;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

pub const DEFAULT_CONFIG_NAME: &str = "inkpad.config.json";

/// Workspace settings, read from `inkpad.config.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorkspaceConfig {
    pub autosave: AutosaveConfig,

    /// Largest file accepted by import
    pub max_import_bytes: usize,

    /// Undo history depth per open note (0 = unlimited)
    pub undo_levels: usize,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            autosave: AutosaveConfig::default(),
            max_import_bytes: MAX_IMPORT_BYTES,
            undo_levels: DEFAULT_UNDO_LEVELS,
        }
    }
}

impl WorkspaceConfig {
    /// Load config from a directory, falling back to defaults when the file
    /// does not exist
    pub fn load(fs: &dyn FileSystem, dir: &Path) -> WorkspaceResult<Self> {
        let path = dir.join(DEFAULT_CONFIG_NAME);
        if !fs.exists(&path) {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }
        let bytes = fs.read(&path)?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WorkspaceError;
    use inkpad_common::MockFileSystem;

    #[test]
    fn test_parse_config() {
        let json = r#"{
            "autosave": { "delayMs": 3000 },
            "maxImportBytes": 1024
        }"#;
        let config: WorkspaceConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.autosave.delay_ms, 3000);
        assert_eq!(config.autosave.min_spacing_ms, 1000);
        assert_eq!(config.max_import_bytes, 1024);
        assert_eq!(config.undo_levels, 100);
    }

    #[test]
    fn test_load_defaults_without_file() {
        let fs = MockFileSystem::new();
        let config = WorkspaceConfig::load(&fs, Path::new("/project")).unwrap();
        assert_eq!(config, WorkspaceConfig::default());
        assert_eq!(config.max_import_bytes, 5 * 1024 * 1024);
    }

    #[test]
    fn test_load_reports_bad_json() {
        let mut fs = MockFileSystem::new();
        fs.add_file("/project/inkpad.config.json", "{ nope");
        assert!(matches!(
            WorkspaceConfig::load(&fs, Path::new("/project")),
            Err(WorkspaceError::Config(_))
        ));
    }
}
