use std::path::Path;

use crate::cleanup::profiles::{
    CACHE_DIRS, CHAT_DIRS, NETWORK_IDENTITY_FILES, ROOT_IDENTITY_FILES, SHARED_CLIENT_CACHE_ITEMS,
};
use crate::identity::store::{read_machine_id, read_telemetry};
use crate::models::{PresenceCount, Probe, ProcessStatus, StatusReport};
use crate::platform::paths::join_relative;
use crate::platform::{ProcessProbe, TargetPaths};
use crate::utils::{path_present, AppError};

/// Read-only snapshot of the target's identity state. Never fails: each
/// unreadable item is reported in place.
pub fn inspect(paths: &TargetPaths, probe: &dyn ProcessProbe, process_name: &str) -> StatusReport {
    let process = probe.is_running(process_name);
    let data_dir_exists = paths.root_exists();

    if !data_dir_exists {
        log::info!("Data directory {} does not exist", paths.root.display());
        return empty_report(paths, process);
    }

    let machine_id = match read_machine_id(&paths.machine_id) {
        Ok(id) => Probe::Found(id),
        Err(AppError::NotFound(_)) => Probe::Missing,
        Err(e) => Probe::Unreadable(e.to_string()),
    };

    let telemetry = match read_telemetry(&paths.storage_json) {
        Ok(snap) => Probe::Found(snap),
        Err(AppError::NotFound(_)) => Probe::Missing,
        Err(e) => Probe::Unreadable(e.to_string()),
    };

    let shared_client_cache = if paths.shared_client_cache.is_dir() {
        Some(count_present(&paths.shared_client_cache, SHARED_CLIENT_CACHE_ITEMS))
    } else {
        None
    };

    StatusReport {
        process,
        data_dir: paths.root.display().to_string(),
        data_dir_exists,
        machine_id,
        telemetry,
        cache_dirs: count_present(&paths.root, CACHE_DIRS),
        chat_dirs: count_present(&paths.root, CHAT_DIRS),
        identity_files: count_present(&paths.root, ROOT_IDENTITY_FILES),
        network_identity_files: count_present(&paths.network, NETWORK_IDENTITY_FILES),
        shared_client_cache,
    }
}

fn empty_report(paths: &TargetPaths, process: ProcessStatus) -> StatusReport {
    StatusReport {
        process,
        data_dir: paths.root.display().to_string(),
        data_dir_exists: false,
        machine_id: Probe::Missing,
        telemetry: Probe::Missing,
        cache_dirs: count_present(&paths.root, CACHE_DIRS),
        chat_dirs: count_present(&paths.root, CHAT_DIRS),
        identity_files: count_present(&paths.root, ROOT_IDENTITY_FILES),
        network_identity_files: count_present(&paths.network, NETWORK_IDENTITY_FILES),
        shared_client_cache: None,
    }
}

fn count_present(base: &Path, names: &[&str]) -> PresenceCount {
    PresenceCount {
        present: names
            .iter()
            .filter(|name| path_present(&join_relative(base, name)))
            .count(),
        total: names.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TelemetrySnapshot;
    use tempfile::TempDir;

    struct Idle;
    impl ProcessProbe for Idle {
        fn is_running(&self, _name: &str) -> ProcessStatus {
            ProcessStatus::not_running()
        }
    }

    #[test]
    fn reports_missing_data_dir() {
        let dir = TempDir::new().unwrap();
        let paths = TargetPaths::new(dir.path().join("Qoder"));
        let report = inspect(&paths, &Idle, "Qoder");
        assert!(!report.data_dir_exists);
        assert_eq!(report.machine_id, Probe::Missing);
        assert_eq!(report.cache_dirs.present, 0);
        assert_eq!(report.cache_dirs.total, 7);
    }

    #[test]
    fn counts_present_items() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        std::fs::write(root.join("machineid"), "abc\n").unwrap();
        std::fs::create_dir_all(root.join("User/globalStorage")).unwrap();
        std::fs::write(
            root.join("User/globalStorage/storage.json"),
            r#"{"telemetry.machineId": "m"}"#,
        )
        .unwrap();
        std::fs::create_dir_all(root.join("Cache")).unwrap();
        std::fs::create_dir_all(root.join("GPUCache")).unwrap();
        std::fs::create_dir_all(root.join("SharedClientCache/index")).unwrap();
        std::fs::write(root.join("SharedClientCache/mcp.json"), "{}").unwrap();
        std::fs::create_dir_all(root.join("Network")).unwrap();
        std::fs::write(root.join("Network/Cookies"), "").unwrap();
        std::fs::write(root.join("Local State"), "{}").unwrap();

        let report = inspect(&TargetPaths::new(root.to_path_buf()), &Idle, "Qoder");
        assert!(report.data_dir_exists);
        assert_eq!(report.machine_id, Probe::Found("abc".into()));
        assert_eq!(
            report.telemetry,
            Probe::Found(TelemetrySnapshot {
                machine_id: Some("m".into()),
                device_id: None,
            })
        );
        // Cache, GPUCache, SharedClientCache
        assert_eq!(report.cache_dirs.to_string(), "3/7");
        assert_eq!(report.identity_files.to_string(), "1/4");
        assert_eq!(report.network_identity_files.to_string(), "1/5");
        assert_eq!(report.shared_client_cache.unwrap().to_string(), "2/4");
        assert_eq!(report.chat_dirs.present, 0);
    }

    #[test]
    fn malformed_telemetry_is_unreadable() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        std::fs::create_dir_all(root.join("User/globalStorage")).unwrap();
        std::fs::write(root.join("User/globalStorage/storage.json"), "{oops").unwrap();

        let report = inspect(&TargetPaths::new(root.to_path_buf()), &Idle, "Qoder");
        assert!(matches!(report.telemetry, Probe::Unreadable(_)));
        assert_eq!(report.shared_client_cache, None);
    }
}
