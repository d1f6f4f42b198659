use crate::cleanup::apply_profile;
use crate::cleanup::profiles::{
    ADVANCED_PROFILE, CACHE_PROFILE, CHAT_HISTORY_PROFILE, IDENTITY_PROFILE, STORAGE_PROFILE,
};
use crate::commands::progress::ProgressLog;
use crate::commands::{lookup, Prompter};
use crate::identity::store::{strip_chat_keys, write_machine_id, write_telemetry};
use crate::identity::{generate_device_id, generate_machine_id_hash};
use crate::models::{
    CleanupProfile, Operation, OperationReport, ProcessStatus, ProgressEvent, ResetSettings,
};
use crate::platform::{ProcessProbe, TargetPaths};
use crate::utils::{AppError, AppResult};

const FULL_RESET_STEPS: usize = 7;

/// Sequences probe, path resolution, cleanup and identifier rewrites into the
/// named operations. Holds no state between runs.
pub struct ResetOrchestrator<'a> {
    settings: &'a ResetSettings,
    probe: &'a dyn ProcessProbe,
    prompter: &'a dyn Prompter,
    on_progress: &'a dyn Fn(&ProgressEvent),
}

impl<'a> ResetOrchestrator<'a> {
    pub fn new(
        settings: &'a ResetSettings,
        probe: &'a dyn ProcessProbe,
        prompter: &'a dyn Prompter,
        on_progress: &'a dyn Fn(&ProgressEvent),
    ) -> Self {
        Self {
            settings,
            probe,
            prompter,
            on_progress,
        }
    }

    /// Current liveness of the target. Used for the close request, which only
    /// asks the operator to quit the application.
    pub fn check_target(&self) -> ProcessStatus {
        self.probe.is_running(&self.settings.process_name)
    }

    /// Resolve `name` through the command table and run it. Errors only for an
    /// unknown name; the operation's own outcome is in the report.
    pub fn run_named(&self, name: &str, preserve_chat: bool) -> AppResult<OperationReport> {
        let operation =
            lookup(name).ok_or_else(|| AppError::Custom(format!("Unknown command: {}", name)))?;
        Ok(self.run_report(operation, preserve_chat))
    }

    /// Run one operation to completion. `preserve_chat` only affects FullReset.
    pub fn run(&self, operation: Operation, preserve_chat: bool) -> AppResult<OperationReport> {
        self.run_report(operation, preserve_chat).into_result()
    }

    /// Like [`run`](Self::run), but a failure is recorded in the returned report
    /// together with every event and batch produced before it.
    pub fn run_report(&self, operation: Operation, preserve_chat: bool) -> OperationReport {
        let mut log = ProgressLog::new(self.on_progress);
        let mut report = OperationReport::new(operation);

        log.emit(format!("Starting: {}", operation.label()));
        let result = self.run_inner(operation, preserve_chat, &mut log, &mut report);
        match &result {
            Ok(()) => log.emit(format!("Finished: {}", operation.label())),
            Err(e) => log.emit(format!("{} failed: {}", operation.label(), e)),
        }

        report.events = log.into_events();
        report.succeeded = result.is_ok();
        report.error = result.err();
        report
    }

    fn run_inner(
        &self,
        operation: Operation,
        preserve_chat: bool,
        log: &mut ProgressLog,
        report: &mut OperationReport,
    ) -> AppResult<()> {
        self.ensure_target_closed(operation, log)?;
        self.confirm_operation(operation, preserve_chat, log)?;

        let paths = TargetPaths::from_settings(self.settings);
        if !paths.root_exists() {
            return Err(AppError::NotFound(format!(
                "{} data directory {}",
                self.settings.app_name,
                paths.root.display()
            )));
        }

        match operation {
            Operation::ResetMachineId => reset_machine_id_step(&paths, log).map(|_| ()),
            Operation::ResetTelemetry => reset_telemetry_step(&paths, log),
            Operation::DeepIdentityCleanup => {
                profile_step(&paths, &ADVANCED_PROFILE, "advanced identity files", log, report);
                Ok(())
            }
            Operation::FullReset => self.full_reset(&paths, preserve_chat, log, report),
        }
    }

    fn full_reset(
        &self,
        paths: &TargetPaths,
        preserve_chat: bool,
        log: &mut ProgressLog,
        report: &mut OperationReport,
    ) -> AppResult<()> {
        log.emit(step_title(1, "Reset machine ID"));
        tolerate_missing(reset_machine_id_step(paths, log).map(|_| ()), "machineid", log)?;

        log.emit(step_title(2, "Reset telemetry"));
        tolerate_missing(reset_telemetry_step(paths, log), "storage.json", log)?;

        log.emit(step_title(3, "Clean caches"));
        profile_step(paths, &CACHE_PROFILE, "cache directories", log, report);

        log.emit(step_title(4, "Clean identity files"));
        profile_step(paths, &IDENTITY_PROFILE, "identity files", log, report);

        log.emit(step_title(5, "Clean storage"));
        profile_step(paths, &STORAGE_PROFILE, "storage directories", log, report);

        log.emit(step_title(6, "Deep identity cleanup"));
        profile_step(paths, &ADVANCED_PROFILE, "advanced identity files", log, report);

        if preserve_chat {
            log.emit(step_title(7, "Preserve chat history"));
            log.emit("Chat history preserved");
        } else {
            log.emit(step_title(7, "Purge chat history"));
            purge_chat_history(paths, log, report);
        }

        Ok(())
    }

    /// Refuse to touch the data directory while the target is running, unless
    /// the operator confirms it was closed and a re-check agrees.
    fn ensure_target_closed(&self, operation: Operation, log: &mut ProgressLog) -> AppResult<()> {
        let name = &self.settings.process_name;
        log.emit(format!("Checking whether {} is running...", name));

        let status = self.probe.is_running(name);
        if !status.running {
            log.emit(format!("{} is not running", name));
            return Ok(());
        }

        let pids = status.pids.join(", ");
        log.emit(format!("{} is running (PID: {})", name, pids));

        let message = format!(
            "{} is running (PID: {}).\n\n{} requires it to be closed.\nQuit it manually, then confirm to continue.",
            name,
            pids,
            operation.label()
        );
        if !self.prompter.confirm(&format!("{} is running", name), &message) {
            return Err(AppError::Cancelled(format!("{} is still open", name)));
        }

        let recheck = self.probe.is_running(name);
        if recheck.running {
            return Err(AppError::StillRunning { pids: recheck.pids });
        }

        log.emit(format!("{} has been closed", name));
        Ok(())
    }

    fn confirm_operation(
        &self,
        operation: Operation,
        preserve_chat: bool,
        log: &mut ProgressLog,
    ) -> AppResult<()> {
        let message = match operation {
            Operation::DeepIdentityCleanup => "Deep identity cleanup will remove:\n\n\
                 - SharedClientCache internals (.info, .lock, mcp.json, index, cache)\n\
                 - system identity files (code.lock, languagepacks.json)\n\
                 - crash reports and cached data\n\
                 - socket files\n\n\
                 Continue?"
                .to_string(),
            Operation::FullReset => format!(
                "Full reset will:\n\n\
                 - reset the machine ID\n\
                 - reset telemetry identifiers\n\
                 - remove caches\n\
                 - remove identity files (cookies, network state)\n\
                 - remove local storage, logs and backups\n\
                 - run the deep identity cleanup\n\
                 - {}\n\n\
                 Continue?",
                if preserve_chat {
                    "keep chat history"
                } else {
                    "delete chat history"
                }
            ),
            Operation::ResetMachineId | Operation::ResetTelemetry => return Ok(()),
        };

        if !self.prompter.confirm(operation.label(), &message) {
            log.emit("Cancelled by operator");
            return Err(AppError::Cancelled(operation.label().to_string()));
        }
        Ok(())
    }
}

fn step_title(n: usize, title: &str) -> String {
    format!("Step {}/{}: {}", n, FULL_RESET_STEPS, title)
}

/// Inside FullReset an absent identifier file is skipped; any other failure
/// stops the reset.
fn tolerate_missing(result: AppResult<()>, what: &str, log: &mut ProgressLog) -> AppResult<()> {
    match result {
        Err(AppError::NotFound(_)) => {
            log.emit(format!("{} not found, skipped", what));
            Ok(())
        }
        other => other,
    }
}

fn reset_machine_id_step(paths: &TargetPaths, log: &mut ProgressLog) -> AppResult<String> {
    log.emit("Resetting machine ID...");
    let new_id = generate_device_id();
    match write_machine_id(&paths.machine_id, &new_id) {
        Ok(()) => {
            log.emit(format!("Machine ID reset to {}", new_id));
            Ok(new_id)
        }
        // the caller decides whether an absent file is a skip or a failure
        Err(AppError::NotFound(what)) => Err(AppError::NotFound(what)),
        Err(e) => {
            log.emit(format!("Failed to reset machine ID: {}", e));
            Err(e)
        }
    }
}

fn reset_telemetry_step(paths: &TargetPaths, log: &mut ProgressLog) -> AppResult<()> {
    log.emit("Resetting telemetry identifiers...");
    let machine_id = generate_machine_id_hash();
    let device_id = generate_device_id();
    match write_telemetry(&paths.storage_json, &machine_id, &device_id) {
        Ok(()) => {
            log.emit(format!(
                "Telemetry reset: machine ID {}..., device ID {}",
                &machine_id[..16],
                device_id
            ));
            Ok(())
        }
        Err(AppError::NotFound(what)) => Err(AppError::NotFound(what)),
        Err(e) => {
            log.emit(format!("Failed to reset telemetry: {}", e));
            Err(e)
        }
    }
}

fn profile_step(
    paths: &TargetPaths,
    profile: &CleanupProfile,
    label: &str,
    log: &mut ProgressLog,
    report: &mut OperationReport,
) {
    log.emit(format!("Cleaning {}...", label));
    let batch = apply_profile(&paths.root, profile);

    let failures = batch.errors();
    if failures.is_empty() {
        log.emit(format!("Removed {} {}", batch.removed_count(), label));
    } else {
        log.emit(format!(
            "Removed {} {}, {} failed",
            batch.removed_count(),
            label,
            failures.len()
        ));
        for (path, reason) in failures {
            report.warnings.push(format!("{}: {}", path, reason));
        }
    }
    report.batches.push(batch);
}

fn purge_chat_history(paths: &TargetPaths, log: &mut ProgressLog, report: &mut OperationReport) {
    profile_step(paths, &CHAT_HISTORY_PROFILE, "chat history", log, report);

    log.emit("Removing chat keys from storage.json...");
    match strip_chat_keys(&paths.storage_json) {
        Ok(keys) => {
            log.emit(format!("Removed {} chat key(s)", keys.len()));
            report.stripped_keys = keys;
        }
        Err(AppError::NotFound(_)) => log.emit("storage.json not found, skipped"),
        Err(e) => {
            log.emit(format!("Failed to remove chat keys: {}", e));
            report.warnings.push(format!("storage.json: {}", e));
        }
    }
}
