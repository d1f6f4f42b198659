use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::cleanup::profiles::ALL_PROFILES;
use crate::commands::{AssumeYes, Prompter, ResetOrchestrator, COMMANDS};
use crate::config::{default_settings_path, init_settings, load_settings};
use crate::detection::inspect;
use crate::models::{OperationReport, Probe, ProgressEvent, ResetSettings, StatusReport};
use crate::platform::{SystemProcessProbe, TargetPaths};
use crate::utils::{AppError, AppResult};

#[derive(Debug, Parser)]
#[command(
    name = "qoder-reset",
    version,
    about = "Reset the machine and telemetry identity of a local Qoder install"
)]
pub struct Cli {
    /// Settings file (default: <config dir>/qoder-reset/settings.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Use this data directory instead of the per-OS default
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Process name used for the running check
    #[arg(long, global = true)]
    process_name: Option<String>,

    /// Log progress and probe details
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Debug, Subcommand)]
enum CliCommand {
    /// Show process, identifier and cache status
    Status,
    /// Check whether the application is running
    Check,
    /// List reset commands and cleanup profiles
    List,
    /// Run a reset command (see `list`)
    Run {
        name: String,

        /// Delete chat history during a full reset
        #[arg(long, conflicts_with = "keep_chat")]
        clear_chat: bool,

        /// Keep chat history during a full reset
        #[arg(long)]
        keep_chat: bool,

        /// Answer yes to every confirmation
        #[arg(long, short)]
        yes: bool,
    },
    /// Show the effective settings, or write a default settings file
    Config {
        #[arg(long)]
        init: bool,
    },
}

/// Reads y/N answers from stdin.
struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn confirm(&self, title: &str, message: &str) -> bool {
        eprintln!("\n== {} ==\n{}", title, message);
        eprint!("[y/N] ");
        let _ = io::stderr().flush();

        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) | Err(_) => false,
            Ok(_) => matches!(line.trim().to_lowercase().as_str(), "y" | "yes"),
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    let env = env_logger::Env::default().default_filter_or(default_level);
    let _ = env_logger::Builder::from_env(env).try_init();
}

/// Parse arguments, run the command and return the process exit code.
pub fn run() -> i32 {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let json = cli.json;

    match execute(cli) {
        Ok(code) => code,
        Err(e) => {
            log::error!("{}", e);
            if json {
                println!("{}", serde_json::json!({ "error": e, "kind": e.kind() }));
            } else {
                eprintln!("Error: {}", e);
            }
            exit_code(&e)
        }
    }
}

fn exit_code(err: &AppError) -> i32 {
    match err {
        AppError::Cancelled(_) => 2,
        AppError::StillRunning { .. } => 3,
        _ => 1,
    }
}

fn report_exit_code(report: &OperationReport) -> i32 {
    match &report.error {
        Some(e) => exit_code(e),
        None if report.warnings.is_empty() => 0,
        None => 1,
    }
}

fn resolve_settings(cli: &Cli) -> AppResult<(ResetSettings, Option<PathBuf>)> {
    let path = cli.config.clone().or_else(default_settings_path);
    let mut settings = match &path {
        Some(p) => load_settings(p)?,
        None => ResetSettings::default(),
    };

    if let Some(dir) = &cli.data_dir {
        settings.data_dir = Some(dir.clone());
    }
    if let Some(name) = &cli.process_name {
        settings.process_name = name.clone();
    }
    if let CliCommand::Run {
        clear_chat,
        keep_chat,
        ..
    } = &cli.command
    {
        if *clear_chat {
            settings.preserve_chat = false;
        } else if *keep_chat {
            settings.preserve_chat = true;
        }
    }
    Ok((settings, path))
}

fn execute(cli: Cli) -> AppResult<i32> {
    let (settings, settings_path) = resolve_settings(&cli)?;
    let probe = SystemProcessProbe::new(settings.probe_timeout_secs);

    match &cli.command {
        CliCommand::Status => {
            let paths = TargetPaths::from_settings(&settings);
            let report = inspect(&paths, &probe, &settings.process_name);
            if cli.json {
                print_json(&report)?;
            } else {
                print_status(&report, &settings.process_name);
            }
            Ok(0)
        }
        CliCommand::Check => {
            let quiet = |_: &ProgressEvent| {};
            let status =
                ResetOrchestrator::new(&settings, &probe, &TerminalPrompter, &quiet).check_target();
            if cli.json {
                print_json(&status)?;
            } else if status.running {
                println!(
                    "{} is running (PID: {})",
                    settings.process_name,
                    status.pids.join(", ")
                );
                println!("Quit {} manually before running a reset.", settings.process_name);
            } else {
                println!("{} is not running", settings.process_name);
            }
            Ok(0)
        }
        CliCommand::List => {
            for cmd in COMMANDS {
                println!("{:<18} {}", cmd.name, cmd.description);
            }
            println!();
            println!("Cleanup profiles:");
            for profile in ALL_PROFILES {
                println!("  {:<14} {} entries", profile.name, profile.entries.len());
            }
            Ok(0)
        }
        CliCommand::Config { init } => {
            if *init {
                let path = settings_path.ok_or_else(|| {
                    AppError::Custom("No config directory on this platform; pass --config".into())
                })?;
                if init_settings(&path)? {
                    println!("Wrote {}", path.display());
                } else {
                    println!("{} already exists", path.display());
                }
                return Ok(0);
            }
            if let Some(p) = &settings_path {
                eprintln!("# {}", p.display());
            }
            print_json(&settings)?;
            Ok(0)
        }
        CliCommand::Run { name, yes, .. } => {
            let prompter: &dyn Prompter = if *yes { &AssumeYes } else { &TerminalPrompter };
            let json = cli.json;
            let print_event = move |event: &ProgressEvent| {
                if !json {
                    println!("{}", event.display_line());
                }
            };
            let orchestrator = ResetOrchestrator::new(&settings, &probe, prompter, &print_event);
            let report = orchestrator.run_named(name, settings.preserve_chat)?;

            if cli.json {
                print_json(&report)?;
            } else {
                print_summary(&report);
            }
            Ok(report_exit_code(&report))
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> AppResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_status(report: &StatusReport, process_name: &str) {
    if report.process.running {
        println!(
            "1. {} is running (PID: {})",
            process_name,
            report.process.pids.join(", ")
        );
    } else {
        println!("1. {} is not running", process_name);
    }

    if !report.data_dir_exists {
        println!("2. Data directory {} does not exist", report.data_dir);
        println!("   Make sure {} is installed", process_name);
        return;
    }
    println!("2. Data directory: {}", report.data_dir);

    match &report.machine_id {
        Probe::Found(id) => println!("3. Machine ID: {}", id),
        Probe::Missing => println!("3. Machine ID file not found"),
        Probe::Unreadable(e) => println!("3. Failed to read machine ID: {}", e),
    }

    match &report.telemetry {
        Probe::Found(t) => {
            println!(
                "4. Telemetry machine ID: {}",
                t.machine_id.as_deref().unwrap_or("(not set)")
            );
            println!(
                "   Telemetry device ID: {}",
                t.device_id.as_deref().unwrap_or("(not set)")
            );
        }
        Probe::Missing => println!("4. Telemetry file not found"),
        Probe::Unreadable(e) => println!("4. Failed to read telemetry: {}", e),
    }

    println!("5. Cache directories: {}", report.cache_dirs);
    println!("6. Chat-related directories: {}", report.chat_dirs);
    println!(
        "7. Identity files: {} root, {} network",
        report.identity_files, report.network_identity_files
    );
    match &report.shared_client_cache {
        Some(count) => println!("8. SharedClientCache internals: {}", count),
        None => println!("8. SharedClientCache not found"),
    }
}

fn print_summary(report: &OperationReport) {
    println!();
    if let Some(e) = &report.error {
        eprintln!("Error: {}", e);
    }
    println!(
        "{}: removed {} item(s), {} failure(s)",
        report.operation.label(),
        report.total_removed(),
        report.warnings.len()
    );
    for warning in &report.warnings {
        println!("  failed: {}", warning);
    }
    if !report.stripped_keys.is_empty() {
        println!("  removed keys: {}", report.stripped_keys.join(", "));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Operation;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn run_flags_override_chat_policy() {
        let cli = Cli::parse_from([
            "qoder-reset",
            "--config",
            "/nonexistent/settings.json",
            "--data-dir",
            "/tmp/q",
            "run",
            "full-reset",
            "--clear-chat",
            "--yes",
        ]);
        let (settings, _) = resolve_settings(&cli).unwrap();
        assert!(!settings.preserve_chat);
        assert_eq!(settings.data_dir, Some(PathBuf::from("/tmp/q")));
    }

    #[test]
    fn clear_and_keep_chat_conflict() {
        let result = Cli::try_parse_from(["qoder-reset", "run", "full-reset", "--clear-chat", "--keep-chat"]);
        assert!(result.is_err());
    }

    #[test]
    fn exit_codes_distinguish_cancel_and_running() {
        assert_eq!(exit_code(&AppError::Cancelled("x".into())), 2);
        assert_eq!(exit_code(&AppError::StillRunning { pids: vec![] }), 3);
        assert_eq!(exit_code(&AppError::NotFound("x".into())), 1);
    }

    #[test]
    fn failed_report_exits_with_its_error_code() {
        let mut report = OperationReport::new(Operation::FullReset);
        report.succeeded = true;
        assert_eq!(report_exit_code(&report), 0);

        report.warnings.push("Cache: busy".into());
        assert_eq!(report_exit_code(&report), 1);

        report.succeeded = false;
        report.error = Some(AppError::Cancelled("Full reset".into()));
        assert_eq!(report_exit_code(&report), 2);
    }
}
