use std::path::{Path, PathBuf};

use crate::models::ResetSettings;

pub const MACHINE_ID_FILE: &str = "machineid";
pub const STORAGE_JSON: &str = "User/globalStorage/storage.json";
pub const NETWORK_DIR: &str = "Network";
pub const SHARED_CLIENT_CACHE_DIR: &str = "SharedClientCache";
pub const WORKSPACE_STORAGE_DIR: &str = "User/workspaceStorage";
pub const HISTORY_DIR: &str = "User/History";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostOs {
    MacOs,
    Windows,
    Linux,
    Other,
}

impl HostOs {
    pub fn current() -> Self {
        if cfg!(target_os = "macos") {
            HostOs::MacOs
        } else if cfg!(target_os = "windows") {
            HostOs::Windows
        } else if cfg!(target_os = "linux") {
            HostOs::Linux
        } else {
            HostOs::Other
        }
    }
}

/// Data directory for `app_name` given an OS, a home directory and the
/// Windows roaming app-data root (`%APPDATA%`), if set.
pub fn data_dir_for(os: HostOs, home: &Path, appdata: Option<&Path>, app_name: &str) -> PathBuf {
    match os {
        HostOs::MacOs => home.join("Library").join("Application Support").join(app_name),
        HostOs::Windows => match appdata {
            Some(roaming) => roaming.join(app_name),
            None => home.join("AppData").join("Roaming").join(app_name),
        },
        HostOs::Linux => home.join(".config").join(app_name),
        HostOs::Other => home.join(app_name),
    }
}

/// Data directory for `app_name` on this machine. The path may not exist.
pub fn resolve_data_dir(app_name: &str) -> PathBuf {
    let home = dirs::home_dir().unwrap_or_default();
    let appdata = std::env::var_os("APPDATA")
        .filter(|v| !v.is_empty())
        .map(PathBuf::from);
    data_dir_for(HostOs::current(), &home, appdata.as_deref(), app_name)
}

/// Well-known locations under the data directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetPaths {
    pub root: PathBuf,
    pub machine_id: PathBuf,
    pub storage_json: PathBuf,
    pub network: PathBuf,
    pub shared_client_cache: PathBuf,
}

impl TargetPaths {
    pub fn new(root: PathBuf) -> Self {
        Self {
            machine_id: root.join(MACHINE_ID_FILE),
            storage_json: join_relative(&root, STORAGE_JSON),
            network: root.join(NETWORK_DIR),
            shared_client_cache: root.join(SHARED_CLIENT_CACHE_DIR),
            root,
        }
    }

    /// Honours the `dataDir` override, otherwise resolves per OS.
    pub fn from_settings(settings: &ResetSettings) -> Self {
        let root = settings
            .data_dir
            .clone()
            .unwrap_or_else(|| resolve_data_dir(&settings.app_name));
        Self::new(root)
    }

    pub fn root_exists(&self) -> bool {
        self.root.is_dir()
    }
}

/// Join a `/`-separated relative path component by component.
pub fn join_relative(root: &Path, relative: &str) -> PathBuf {
    relative
        .split('/')
        .filter(|part| !part.is_empty())
        .fold(root.to_path_buf(), |acc, part| acc.join(part))
}
