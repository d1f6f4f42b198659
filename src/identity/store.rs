use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};

use crate::models::TelemetrySnapshot;
use crate::utils::json_file::{atomic_write, read_json_object, write_json_file};
use crate::utils::{AppError, AppResult};

pub const MACHINE_ID_KEY: &str = "telemetry.machineId";
pub const DEVICE_ID_KEY: &str = "telemetry.devDeviceId";

static RE_CHAT_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)chat|conversation|history|session").unwrap());

pub fn read_telemetry(path: &Path) -> AppResult<TelemetrySnapshot> {
    let data = read_json_object(path)?;
    Ok(TelemetrySnapshot {
        machine_id: data.get(MACHINE_ID_KEY).map(value_text),
        device_id: data.get(DEVICE_ID_KEY).map(value_text),
    })
}

/// Set both telemetry keys, keeping every other key (and key order) as-is.
pub fn write_telemetry(path: &Path, machine_id: &str, device_id: &str) -> AppResult<()> {
    let mut data = read_json_object(path)?;
    data.insert(MACHINE_ID_KEY.to_string(), Value::String(machine_id.to_string()));
    data.insert(DEVICE_ID_KEY.to_string(), Value::String(device_id.to_string()));
    write_json_file(path, &data)
}

pub fn is_chat_key(key: &str) -> bool {
    RE_CHAT_KEY.is_match(key)
}

/// Remove chat/conversation/history/session keys. The file is rewritten only
/// when something was removed. Returns the removed keys in file order.
pub fn strip_chat_keys(path: &Path) -> AppResult<Vec<String>> {
    let data = read_json_object(path)?;
    let (removed, kept): (Vec<_>, Vec<_>) = data.into_iter().partition(|(k, _)| is_chat_key(k));

    if removed.is_empty() {
        return Ok(Vec::new());
    }

    let kept: Map<String, Value> = kept.into_iter().collect();
    write_json_file(path, &kept)?;
    Ok(removed.into_iter().map(|(k, _)| k).collect())
}

pub fn read_machine_id(path: &Path) -> AppResult<String> {
    match std::fs::read_to_string(path) {
        Ok(s) => Ok(s.trim().to_string()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(AppError::NotFound(path.display().to_string()))
        }
        Err(e) => Err(AppError::Io(e)),
    }
}

/// Overwrite an existing machine-ID file with `new_id` as plain text.
pub fn write_machine_id(path: &Path, new_id: &str) -> AppResult<()> {
    if !path.is_file() {
        return Err(AppError::NotFound(path.display().to_string()));
    }
    atomic_write(path, new_id.as_bytes())
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::{generate_device_id, generate_machine_id_hash, is_valid_uuid};
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn reads_both_identifiers() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "storage.json",
            r#"{"telemetry.machineId": "m", "telemetry.devDeviceId": "d"}"#,
        );
        let snap = read_telemetry(&path).unwrap();
        assert_eq!(snap.machine_id.as_deref(), Some("m"));
        assert_eq!(snap.device_id.as_deref(), Some("d"));
    }

    #[test]
    fn read_missing_file_is_not_found() {
        let dir = TempDir::new().unwrap();
        let err = read_telemetry(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn read_malformed_file_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "storage.json", "{not json");
        assert!(matches!(read_telemetry(&path), Err(AppError::Parse(_))));
    }

    #[test]
    fn write_preserves_other_keys_and_order() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "storage.json",
            r#"{"zeta": {"nested": [1, 2]}, "telemetry.machineId": "x", "alpha": "ü", "telemetry.devDeviceId": "y"}"#,
        );

        let machine_id = generate_machine_id_hash();
        let device_id = generate_device_id();
        write_telemetry(&path, &machine_id, &device_id).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let keys: Vec<String> = serde_json::from_str::<Map<String, Value>>(&text)
            .unwrap()
            .keys()
            .cloned()
            .collect();
        assert_eq!(keys, vec!["zeta", "telemetry.machineId", "alpha", "telemetry.devDeviceId"]);
        assert!(text.contains("    \"alpha\": \"ü\""));

        let snap = read_telemetry(&path).unwrap();
        assert_eq!(snap.machine_id.as_deref(), Some(machine_id.as_str()));
        assert!(is_valid_uuid(snap.device_id.as_deref().unwrap()));
    }

    #[test]
    fn write_keeps_wide_integers_exact() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "storage.json",
            r#"{"big": 123456789012345678901234567890, "telemetry.machineId": "x"}"#,
        );
        write_telemetry(&path, "h", "d").unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"big\": 123456789012345678901234567890"));
    }

    #[cfg(unix)]
    #[test]
    fn machine_id_rewrite_follows_symlink_and_keeps_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let real = write(&dir, "machineid.real", "abc");
        std::fs::set_permissions(&real, std::fs::Permissions::from_mode(0o644)).unwrap();
        let link = dir.path().join("machineid");
        std::os::unix::fs::symlink(&real, &link).unwrap();

        write_machine_id(&link, "new-id").unwrap();

        assert!(std::fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
        assert_eq!(std::fs::read_to_string(&real).unwrap(), "new-id");
        let mode = std::fs::metadata(&real).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o644);
    }

    #[test]
    fn write_creates_missing_keys() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "storage.json", r#"{"other": 1}"#);
        write_telemetry(&path, "h", "d").unwrap();

        let data = read_json_object(&path).unwrap();
        assert_eq!(data["other"], 1);
        assert_eq!(data[MACHINE_ID_KEY], "h");
        assert_eq!(data[DEVICE_ID_KEY], "d");
    }

    #[test]
    fn write_missing_file_is_not_found() {
        let dir = TempDir::new().unwrap();
        let err = write_telemetry(&dir.path().join("absent.json"), "h", "d").unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert!(!dir.path().join("absent.json").exists());
    }

    #[test]
    fn malformed_file_is_left_untouched() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "storage.json", "{broken");
        assert!(write_telemetry(&path, "h", "d").is_err());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{broken");
    }

    #[test]
    fn chat_keys_match_case_insensitively() {
        assert!(is_chat_key("workbench.Chat.state"));
        assert!(is_chat_key("CONVERSATION_list"));
        assert!(is_chat_key("history.recent"));
        assert!(is_chat_key("lastSessionId"));
        assert!(!is_chat_key("telemetry.machineId"));
    }

    #[test]
    fn strip_removes_only_chat_keys() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "storage.json",
            r#"{"chat.panel": 1, "theme": "dark", "History": [], "userSession": "s", "aiConversation": {}, "other": 1}"#,
        );

        let removed = strip_chat_keys(&path).unwrap();
        assert_eq!(removed, vec!["chat.panel", "History", "userSession", "aiConversation"]);

        let data = read_json_object(&path).unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data["theme"], "dark");
        assert_eq!(data["other"], 1);
    }

    #[test]
    fn strip_without_matches_leaves_file_bytes_alone() {
        let dir = TempDir::new().unwrap();
        let original = r#"{"theme":"dark"}"#;
        let path = write(&dir, "storage.json", original);
        assert!(strip_chat_keys(&path).unwrap().is_empty());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), original);
    }

    #[test]
    fn machine_id_rewrite_requires_existing_file() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("machineid");
        assert!(matches!(write_machine_id(&missing, "x"), Err(AppError::NotFound(_))));

        let path = write(&dir, "machineid", "abc\n");
        assert_eq!(read_machine_id(&path).unwrap(), "abc");
        write_machine_id(&path, "new-id").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new-id");
    }
}
