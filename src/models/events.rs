use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use super::BatchReport;
use crate::utils::{AppError, AppResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressEvent {
    pub seq: usize,
    pub timestamp: DateTime<Local>,
    pub message: String,
}

impl ProgressEvent {
    /// `[HH:MM:SS] message`, the way the operator sees it.
    pub fn display_line(&self) -> String {
        format!("[{}] {}", self.timestamp.format("%H:%M:%S"), self.message)
    }
}

/// Named operations exposed to the presentation layer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    ResetMachineId,
    ResetTelemetry,
    DeepIdentityCleanup,
    FullReset,
}

impl Operation {
    pub fn label(&self) -> &'static str {
        match self {
            Operation::ResetMachineId => "Reset machine ID",
            Operation::ResetTelemetry => "Reset telemetry",
            Operation::DeepIdentityCleanup => "Deep identity cleanup",
            Operation::FullReset => "Full reset",
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationReport {
    pub operation: Operation,
    pub succeeded: bool,
    /// The error that stopped the operation, if any.
    pub error: Option<AppError>,
    pub events: Vec<ProgressEvent>,
    pub batches: Vec<BatchReport>,
    pub stripped_keys: Vec<String>,
    /// Best-effort steps that failed without stopping the operation.
    pub warnings: Vec<String>,
}

impl OperationReport {
    pub fn new(operation: Operation) -> Self {
        Self {
            operation,
            succeeded: false,
            error: None,
            events: Vec::new(),
            batches: Vec::new(),
            stripped_keys: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Split off the terminal error, dropping the rest of the report with it.
    pub fn into_result(mut self) -> AppResult<Self> {
        match self.error.take() {
            Some(e) => Err(e),
            None => Ok(self),
        }
    }

    pub fn total_removed(&self) -> usize {
        self.batches.iter().map(|b| b.removed_count()).sum()
    }

    pub fn total_failures(&self) -> usize {
        self.batches.iter().map(|b| b.errors().len()).sum()
    }
}
