use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::Path;

use crate::models::{BatchReport, CleanupProfile, PathOutcome, PathResult, ProfileEntry};
use crate::platform::paths::join_relative;

/// Remove every entry of `profile` under `root`, best-effort.
///
/// Absent paths are skipped; a failed removal is recorded against its path and
/// the remaining entries are still processed.
pub fn apply_profile(root: &Path, profile: &CleanupProfile) -> BatchReport {
    let mut report = BatchReport::new(profile.name);

    for entry in profile.entries {
        match *entry {
            ProfileEntry::Path { relative, recursive } => {
                let path = join_relative(root, relative);
                remove_path(&path, relative.to_string(), recursive, &mut report);
            }
            ProfileEntry::Suffix(suffix) => match files_with_suffix(root, suffix) {
                Ok(names) => {
                    for name in names {
                        let label = name.to_string_lossy().into_owned();
                        remove_path(&root.join(&name), label, false, &mut report);
                    }
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => record_listing_failure(root, format!("*{}", suffix), e, &mut report),
            },
            ProfileEntry::EachChild {
                parent,
                relative,
                recursive,
            } => {
                let parent_path = join_relative(root, parent);
                match subdirectory_names(&parent_path) {
                    Ok(children) => {
                        for child in children {
                            let path = join_relative(&parent_path.join(&child), relative);
                            let label =
                                format!("{}/{}/{}", parent, child.to_string_lossy(), relative);
                            remove_path(&path, label, recursive, &mut report);
                        }
                    }
                    Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                    Err(e) => {
                        record_listing_failure(&parent_path, parent.to_string(), e, &mut report)
                    }
                }
            }
        }
    }

    log::info!(
        "Profile {}: removed {}, failed {}",
        profile.name,
        report.removed_count(),
        report.errors().len()
    );
    report
}

fn remove_path(path: &Path, label: String, recursive: bool, report: &mut BatchReport) {
    let outcome = match fs::symlink_metadata(path) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => PathOutcome::SkippedAbsent,
        Err(e) => PathOutcome::Failed {
            reason: e.to_string(),
        },
        Ok(meta) => {
            let result = if recursive && meta.is_dir() {
                fs::remove_dir_all(path)
            } else {
                fs::remove_file(path)
            };
            match result {
                Ok(()) => PathOutcome::Removed,
                Err(e) => {
                    log::warn!("Failed to remove {}: {}", path.display(), e);
                    PathOutcome::Failed {
                        reason: e.to_string(),
                    }
                }
            }
        }
    };

    report.results.push(PathResult {
        path: label,
        outcome,
    });
}

fn record_listing_failure(dir: &Path, label: String, err: io::Error, report: &mut BatchReport) {
    log::warn!("Failed to list {}: {}", dir.display(), err);
    report.results.push(PathResult {
        path: label,
        outcome: PathOutcome::Failed {
            reason: err.to_string(),
        },
    });
}

/// Non-directory entries directly under `dir` whose name ends with `suffix`.
/// Names are compared as raw bytes, so non-UTF-8 names still match.
fn files_with_suffix(dir: &Path, suffix: &str) -> io::Result<Vec<OsString>> {
    let mut names: Vec<OsString> = fs::read_dir(dir)?
        .flatten()
        .filter(|entry| entry.file_type().map(|ft| !ft.is_dir()).unwrap_or(false))
        .map(|entry| entry.file_name())
        .filter(|name| name.as_encoded_bytes().ends_with(suffix.as_bytes()))
        .collect();
    names.sort();
    Ok(names)
}

fn subdirectory_names(dir: &Path) -> io::Result<Vec<OsString>> {
    let mut names: Vec<OsString> = fs::read_dir(dir)?
        .flatten()
        .filter(|entry| entry.file_type().map(|ft| ft.is_dir()).unwrap_or(false))
        .map(|entry| entry.file_name())
        .collect();
    names.sort();
    Ok(names)
}
