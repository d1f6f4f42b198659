use serde::Serialize;

/// One entry of a cleanup profile, relative to the data directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileEntry {
    Path {
        relative: &'static str,
        recursive: bool,
    },
    /// Every file directly under the data directory whose name ends with the suffix.
    Suffix(&'static str),
    /// `relative` inside each immediate subdirectory of `parent`.
    EachChild {
        parent: &'static str,
        relative: &'static str,
        recursive: bool,
    },
}

impl ProfileEntry {
    pub const fn file(relative: &'static str) -> Self {
        ProfileEntry::Path {
            relative,
            recursive: false,
        }
    }

    pub const fn dir(relative: &'static str) -> Self {
        ProfileEntry::Path {
            relative,
            recursive: true,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CleanupProfile {
    pub name: &'static str,
    pub entries: &'static [ProfileEntry],
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PathOutcome {
    Removed,
    SkippedAbsent,
    Failed { reason: String },
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PathResult {
    /// Path relative to the data directory, `/`-separated.
    pub path: String,
    pub outcome: PathOutcome,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    pub profile: String,
    pub results: Vec<PathResult>,
}

impl BatchReport {
    pub fn new(profile: &str) -> Self {
        Self {
            profile: profile.to_string(),
            results: Vec::new(),
        }
    }

    pub fn removed_count(&self) -> usize {
        self.results
            .iter()
            .filter(|r| r.outcome == PathOutcome::Removed)
            .count()
    }

    /// `(path, reason)` for every failed removal.
    pub fn errors(&self) -> Vec<(&str, &str)> {
        self.results
            .iter()
            .filter_map(|r| match &r.outcome {
                PathOutcome::Failed { reason } => Some((r.path.as_str(), reason.as_str())),
                _ => None,
            })
            .collect()
    }

    pub fn removed_paths(&self) -> impl Iterator<Item = &str> {
        self.results
            .iter()
            .filter(|r| r.outcome == PathOutcome::Removed)
            .map(|r| r.path.as_str())
    }
}
