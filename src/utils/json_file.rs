use std::fs;
use std::io::Write;
use std::path::Path;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::utils::{AppError, AppResult};

/// Read a JSON file whose top level must be an object.
pub fn read_json_object(path: &Path) -> AppResult<Map<String, Value>> {
    let contents = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(AppError::NotFound(path.display().to_string()));
        }
        Err(e) => return Err(AppError::Io(e)),
    };

    match serde_json::from_str::<Value>(&contents)? {
        Value::Object(map) => Ok(map),
        other => Err(AppError::Custom(format!(
            "{} is not a JSON object (found {})",
            path.display(),
            json_type_name(&other)
        ))),
    }
}

/// Serialize with 4-space indentation. Non-ASCII characters are written as-is.
pub fn to_pretty_bytes<T: Serialize>(value: &T) -> AppResult<Vec<u8>> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser)?;
    Ok(buf)
}

/// Replace `path` with `bytes`.
///
/// The content is written to a temp file next to the target and persisted over
/// it, so the original stays intact if anything fails before the rename.
/// Symlinks are followed so the link itself survives, and an existing file's
/// permissions carry over to the new content.
pub fn atomic_write(path: &Path, bytes: &[u8]) -> AppResult<()> {
    let (target, permissions) = match fs::canonicalize(path) {
        Ok(resolved) => {
            let permissions = fs::metadata(&resolved)?.permissions();
            (resolved, Some(permissions))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => (path.to_path_buf(), None),
        Err(e) => return Err(AppError::Io(e)),
    };

    let dir = target
        .parent()
        .ok_or_else(|| AppError::Custom(format!("{} has no parent directory", target.display())))?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    if let Some(permissions) = permissions {
        tmp.as_file().set_permissions(permissions)?;
    }
    tmp.as_file().sync_all()?;
    tmp.persist(&target).map_err(|e| AppError::Io(e.error))?;
    Ok(())
}

/// Serialize `value` fully, then atomically replace `path`.
pub fn write_json_file<T: Serialize>(path: &Path, value: &T) -> AppResult<()> {
    let bytes = to_pretty_bytes(value)?;
    atomic_write(path, &bytes)
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn pretty_bytes_use_four_spaces_and_keep_unicode() {
        let bytes = to_pretty_bytes(&json!({ "名前": "値" })).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(text, "{\n    \"名前\": \"値\"\n}");
    }

    #[test]
    fn rejects_non_object_top_level() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("list.json");
        std::fs::write(&path, "[1, 2]").unwrap();
        let err = read_json_object(&path).unwrap_err();
        assert!(err.to_string().contains("not a JSON object"));
    }

    #[test]
    fn atomic_write_replaces_content() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.json");
        std::fs::write(&path, "old").unwrap();
        atomic_write(&path, b"new").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new");
        // no stray temp files left behind
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn atomic_write_keeps_existing_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("machineid");
        std::fs::write(&path, "old").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();

        atomic_write(&path, b"new").unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o644);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new");
    }

    #[cfg(unix)]
    #[test]
    fn atomic_write_updates_symlink_target() {
        let dir = TempDir::new().unwrap();
        let real = dir.path().join("real-machineid");
        let link = dir.path().join("machineid");
        std::fs::write(&real, "abc").unwrap();
        std::os::unix::fs::symlink(&real, &link).unwrap();

        atomic_write(&link, b"fresh").unwrap();

        assert!(std::fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
        assert_eq!(std::fs::read_to_string(&real).unwrap(), "fresh");
        assert_eq!(std::fs::read_to_string(&link).unwrap(), "fresh");
    }

    #[test]
    fn large_integers_survive_a_rewrite() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.json");
        std::fs::write(&path, r#"{"big": 123456789012345678901234567890, "ratio": 0.1}"#).unwrap();

        let data = read_json_object(&path).unwrap();
        write_json_file(&path, &data).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"big\": 123456789012345678901234567890"));
        assert!(text.contains("\"ratio\": 0.1"));
    }
}
