use serde::Serialize;

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProcessStatus {
    pub running: bool,
    pub pids: Vec<String>,
}

impl ProcessStatus {
    pub fn not_running() -> Self {
        Self::default()
    }

    pub fn running(pids: Vec<String>) -> Self {
        Self {
            running: true,
            pids,
        }
    }
}

/// Result of reading a single value during inspection.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum Probe<T> {
    Found(T),
    Missing,
    Unreadable(String),
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PresenceCount {
    pub present: usize,
    pub total: usize,
}

impl std::fmt::Display for PresenceCount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.present, self.total)
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TelemetrySnapshot {
    pub machine_id: Option<String>,
    pub device_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusReport {
    pub process: ProcessStatus,
    pub data_dir: String,
    pub data_dir_exists: bool,
    pub machine_id: Probe<String>,
    pub telemetry: Probe<TelemetrySnapshot>,
    pub cache_dirs: PresenceCount,
    pub chat_dirs: PresenceCount,
    pub identity_files: PresenceCount,
    pub network_identity_files: PresenceCount,
    /// `None` when SharedClientCache itself is missing.
    pub shared_client_cache: Option<PresenceCount>,
}
