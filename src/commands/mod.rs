pub mod progress;
pub mod reset;


pub use reset::ResetOrchestrator;

use crate::models::Operation;

/// Presentation-layer confirmation. Returning `false` cancels the operation.
pub trait Prompter {
    fn confirm(&self, title: &str, message: &str) -> bool;
}

/// Answers every confirmation with yes (non-interactive runs).
pub struct AssumeYes;

impl Prompter for AssumeYes {
    fn confirm(&self, title: &str, _message: &str) -> bool {
        log::info!("Auto-confirmed: {}", title);
        true
    }
}

pub struct CommandSpec {
    pub name: &'static str,
    pub operation: Operation,
    pub description: &'static str,
}

/// Named commands available to the presentation layer.
pub const COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        name: "reset-machine-id",
        operation: Operation::ResetMachineId,
        description: "Replace the machineid file with a fresh UUID",
    },
    CommandSpec {
        name: "reset-telemetry",
        operation: Operation::ResetTelemetry,
        description: "Regenerate telemetry.machineId and telemetry.devDeviceId",
    },
    CommandSpec {
        name: "deep-clean",
        operation: Operation::DeepIdentityCleanup,
        description: "Remove SharedClientCache internals, crash reports, cached data and sockets",
    },
    CommandSpec {
        name: "full-reset",
        operation: Operation::FullReset,
        description: "Reset identifiers and remove caches, identity files and storage",
    },
];

pub fn lookup(name: &str) -> Option<Operation> {
    COMMANDS
        .iter()
        .find(|c| c.name.eq_ignore_ascii_case(name.trim()))
        .map(|c| c.operation)
}
