use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ResetSettings {
    /// Name of the application's data directory.
    pub app_name: String,
    /// Name matched against running processes.
    pub process_name: String,
    /// Overrides the per-OS data directory.
    pub data_dir: Option<PathBuf>,
    pub preserve_chat: bool,
    pub probe_timeout_secs: u64,
}

impl Default for ResetSettings {
    fn default() -> Self {
        Self {
            app_name: "Qoder".into(),
            process_name: "Qoder".into(),
            data_dir: None,
            preserve_chat: true,
            probe_timeout_secs: 5,
        }
    }
}
