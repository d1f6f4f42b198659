use std::path::{Path, PathBuf};

use crate::models::ResetSettings;
use crate::utils::json_file::write_json_file;
use crate::utils::{AppError, AppResult};

const CONFIG_DIR_NAME: &str = "qoder-reset";
const SETTINGS_FILE: &str = "settings.json";

/// `<config_dir>/qoder-reset/settings.json`, if the platform has a config dir.
pub fn default_settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(CONFIG_DIR_NAME).join(SETTINGS_FILE))
}

/// Load settings from `path`. A missing file yields defaults.
pub fn load_settings(path: &Path) -> AppResult<ResetSettings> {
    match std::fs::read_to_string(path) {
        Ok(json) => serde_json::from_str(&json).map_err(|e| {
            AppError::Custom(format!("Failed to parse settings {}: {}", path.display(), e))
        }),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ResetSettings::default()),
        Err(e) => Err(AppError::Io(e)),
    }
}

/// Write default settings to `path` unless a file is already there.
/// Returns whether a file was written.
pub fn init_settings(path: &Path) -> AppResult<bool> {
    if path.exists() {
        return Ok(false);
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    write_json_file(path, &ResetSettings::default())?;
    log::info!("Wrote default settings to {}", path.display());
    Ok(true)
}
