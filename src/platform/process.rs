use sysinfo::System;

use crate::models::ProcessStatus;
use crate::utils::command::run_command_with_timeout;

/// Liveness check for the target application.
pub trait ProcessProbe {
    /// Never fails: anything that cannot be determined counts as not running.
    fn is_running(&self, name: &str) -> ProcessStatus;
}

/// Probe backed by the OS process tools, with a process-table scan fallback.
pub struct SystemProcessProbe {
    timeout_secs: u64,
}

impl SystemProcessProbe {
    pub fn new(timeout_secs: u64) -> Self {
        Self { timeout_secs }
    }
}

impl Default for SystemProcessProbe {
    fn default() -> Self {
        Self::new(5)
    }
}

impl ProcessProbe for SystemProcessProbe {
    fn is_running(&self, name: &str) -> ProcessStatus {
        if name.trim().is_empty() {
            return ProcessStatus::not_running();
        }

        match native_probe(name, self.timeout_secs) {
            Some(status) => status,
            None => {
                log::info!("Native process listing unavailable, scanning process table for {}", name);
                scan_process_table(name)
            }
        }
    }
}

/// `None` means the native mechanism could not be used.
#[cfg(unix)]
fn native_probe(name: &str, timeout_secs: u64) -> Option<ProcessStatus> {
    let output = match run_command_with_timeout("pgrep", &["-f", name], timeout_secs) {
        Ok(o) => o,
        Err(e) => {
            log::warn!("pgrep failed: {}", e);
            return None;
        }
    };

    // pgrep: 0 = matched, 1 = nothing matched, anything else = error
    match output.status.code() {
        Some(0) => {
            let stdout = String::from_utf8_lossy(&output.stdout);
            let pids = parse_pgrep_output(&stdout, std::process::id());
            if pids.is_empty() {
                Some(ProcessStatus::not_running())
            } else {
                Some(ProcessStatus::running(pids))
            }
        }
        Some(1) => Some(ProcessStatus::not_running()),
        other => {
            log::warn!("pgrep exited with {:?}", other);
            None
        }
    }
}

#[cfg(windows)]
fn native_probe(name: &str, timeout_secs: u64) -> Option<ProcessStatus> {
    let filter = format!("IMAGENAME eq {}*", name);
    let output = match run_command_with_timeout("tasklist", &["/FI", &filter], timeout_secs) {
        Ok(o) => o,
        Err(e) => {
            log::warn!("tasklist failed: {}", e);
            return None;
        }
    };

    if !output.status.success() {
        log::warn!("tasklist exited with {:?}", output.status.code());
        return None;
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let pids = parse_tasklist_output(&stdout, name);
    if pids.is_empty() {
        Some(ProcessStatus::not_running())
    } else {
        Some(ProcessStatus::running(pids))
    }
}

#[cfg(not(any(unix, windows)))]
fn native_probe(_name: &str, _timeout_secs: u64) -> Option<ProcessStatus> {
    None
}

/// One PID per line; our own PID is dropped since `-f` also matches our argv.
pub fn parse_pgrep_output(stdout: &str, own_pid: u32) -> Vec<String> {
    let own = own_pid.to_string();
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && *line != own)
        .map(str::to_string)
        .collect()
}

/// Extract PIDs from `tasklist` table rows whose text contains `name`
/// (case-insensitive). The PID is the first all-digit column after the image
/// name, which keeps image names containing spaces intact.
pub fn parse_tasklist_output(stdout: &str, name: &str) -> Vec<String> {
    let needle = name.to_lowercase();
    stdout
        .lines()
        .filter(|line| line.to_lowercase().contains(&needle))
        .filter_map(|line| {
            line.split_whitespace()
                .skip(1)
                .find(|col| !col.is_empty() && col.chars().all(|c| c.is_ascii_digit()))
                .map(str::to_string)
        })
        .collect()
}

/// Generic fallback: case-insensitive substring match on process names.
fn scan_process_table(name: &str) -> ProcessStatus {
    let needle = name.to_lowercase();
    let own_pid = std::process::id();
    let system = System::new_all();

    let mut pids: Vec<u32> = system
        .processes()
        .iter()
        .filter(|(pid, process)| {
            pid.as_u32() != own_pid
                && process
                    .name()
                    .to_string_lossy()
                    .to_lowercase()
                    .contains(&needle)
        })
        .map(|(pid, _)| pid.as_u32())
        .collect();
    pids.sort_unstable();

    if pids.is_empty() {
        ProcessStatus::not_running()
    } else {
        ProcessStatus::running(pids.into_iter().map(|p| p.to_string()).collect())
    }
}
