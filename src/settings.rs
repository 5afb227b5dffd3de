use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{CondorError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub user_name: String,
    /// Positions with this many days or fewer to expiry count as "expiring soon".
    #[serde(default = "default_expiring_soon_days")]
    pub expiring_soon_days: i64,
    /// Start with the built-in sample book; set false for an empty one.
    #[serde(default = "default_load_sample_data")]
    pub load_sample_data: bool,
}

fn default_expiring_soon_days() -> i64 {
    7
}

fn default_load_sample_data() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            user_name: String::new(),
            expiring_soon_days: default_expiring_soon_days(),
            load_sample_data: default_load_sample_data(),
        }
    }
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("condor")
}

fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

pub fn load_settings() -> Settings {
    let path = settings_path();
    if path.exists() {
        let content = std::fs::read_to_string(&path).unwrap_or_default();
        serde_json::from_str(&content).unwrap_or_default()
    } else {
        Settings::default()
    }
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    let dir = config_dir();
    std::fs::create_dir_all(&dir)?;
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| CondorError::Settings(e.to_string()))?;
    std::fs::write(settings_path(), format!("{json}\n"))?;
    Ok(())
}

/// Write defaults on first run so there is a file to edit.
pub fn ensure_settings_file() -> Result<()> {
    if !settings_path().exists() {
        save_settings(&Settings::default())?;
    }
    Ok(())
}

/// Expand a leading `~` to the home directory.
pub fn shellexpand(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest).to_string_lossy().to_string();
        }
    }
    path.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let settings = Settings {
            user_name: "Alice".to_string(),
            expiring_soon_days: 10,
            load_sample_data: false,
        };
        let json = serde_json::to_string_pretty(&settings).unwrap();
        std::fs::write(&path, &json).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        let loaded: Settings = serde_json::from_str(&content).unwrap();
        assert_eq!(loaded.user_name, "Alice");
        assert_eq!(loaded.expiring_soon_days, 10);
        assert!(!loaded.load_sample_data);
    }

    #[test]
    fn test_defaults() {
        let s = Settings::default();
        assert!(s.user_name.is_empty());
        assert_eq!(s.expiring_soon_days, 7);
        assert!(s.load_sample_data);
    }

    #[test]
    fn test_partial_file_merges_with_defaults() {
        let json = r#"{"user_name": "Bob"}"#;
        let s: Settings = serde_json::from_str(json).unwrap();
        assert_eq!(s.user_name, "Bob");
        assert_eq!(s.expiring_soon_days, 7);
        assert!(s.load_sample_data);
    }
}
