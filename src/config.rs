use serde::{Deserialize, Serialize};
use std::path::PathBuf;

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("~/.local/share"))
        .join("daylock")
}

fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("~/.config"))
        .join("daylock")
        .join("config.json")
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct DaylockConfig {
    pub data_directory: PathBuf,
    #[serde(default)]
    pub debug_logging: bool,
}

impl Default for DaylockConfig {
    fn default() -> Self {
        Self {
            data_directory: default_data_dir(),
            debug_logging: false,
        }
    }
}

impl DaylockConfig {
    /// Read the config file, falling back to defaults when it is missing or
    /// unreadable.
    pub fn load() -> Self {
        let path = config_path();
        std::fs::read_to_string(&path)
            .ok()
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default()
    }

    pub fn state_path(&self) -> PathBuf {
        self.data_directory.join("state.json")
    }

    pub fn endpoints_path(&self) -> PathBuf {
        self.data_directory.join("endpoints.json")
    }

    /// Ensure the data directory and a loadable state file exist.
    pub fn ensure_files(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.data_directory)?;

        let state = self.state_path();
        if !state.exists() {
            // An empty object deserializes to the default State.
            std::fs::write(&state, "{}\n")?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_points_under_local_share() {
        let cfg = DaylockConfig::default();
        assert!(cfg.data_directory.ends_with("daylock"));
        assert!(!cfg.debug_logging);
    }

    #[test]
    fn ensure_files_seeds_a_loadable_state() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = DaylockConfig {
            data_directory: dir.path().join("daylock"),
            debug_logging: false,
        };
        cfg.ensure_files().unwrap();
        let state = crate::storage::load(&cfg.state_path()).unwrap();
        assert_eq!(state, crate::store::State::default());
    }
}
