//! Settings I/O: load and save the JSON settings file.

use std::path::PathBuf;

use crate::config::types::Settings;

/// Get the settings file path, creating the config directory on the way.
pub fn settings_path() -> PathBuf {
    let config_dir = dirs::config_dir().unwrap_or_default().join("subflow");
    let _ = std::fs::create_dir_all(&config_dir);
    config_dir.join("config.json")
}

/// Load settings from disk, falling back to defaults on any problem.
pub fn load_settings() -> Settings {
    let path = settings_path();

    if !path.exists() {
        return Settings::default();
    }

    let data = match std::fs::read_to_string(&path) {
        Ok(d) => d,
        Err(_) => return Settings::default(),
    };

    serde_json::from_str(&data).unwrap_or_default()
}

/// Save settings to disk, best effort.
pub fn save_settings(settings: &Settings) {
    if let Ok(data) = serde_json::to_string_pretty(settings) {
        let _ = std::fs::write(settings_path(), data);
    }
}
