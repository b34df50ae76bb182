use std::fmt;

use serde::{Deserialize, Serialize};

use super::{AnalysisResult, VisionError};

/// Identifier of one long-running remote job.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OperationHandle(String);

impl OperationHandle {
    /// Takes the trailing `id_length` characters of an operation location.
    pub fn extract_from_location(location: &str, id_length: usize) -> Result<Self, VisionError> {
        let location = location.trim();
        if location.is_empty() {
            return Err(VisionError::SubmissionError(
                "no operation location returned".to_string(),
            ));
        }
        if id_length == 0 {
            return Err(VisionError::SubmissionError(
                "operation id length must be positive".to_string(),
            ));
        }

        let char_count = location.chars().count();
        if char_count < id_length {
            return Err(VisionError::SubmissionError(format!(
                "operation location '{}' is shorter than {} characters",
                location, id_length
            )));
        }

        let handle: String = location.chars().skip(char_count - id_length).collect();
        log::debug!("[OPERATION] extracted handle {} from {}", handle, location);

        Ok(Self(handle))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OperationHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationStatus {
    NotStarted,
    Running,
    Succeeded,
    Failed,
}

impl OperationStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, OperationStatus::Succeeded | OperationStatus::Failed)
    }
}

impl fmt::Display for OperationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationStatus::NotStarted => write!(f, "Not Started"),
            OperationStatus::Running => write!(f, "Running"),
            OperationStatus::Succeeded => write!(f, "Succeeded"),
            OperationStatus::Failed => write!(f, "Failed"),
        }
    }
}

/// One answer to a status query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationSnapshot {
    pub status: OperationStatus,
    #[serde(default)]
    pub result: Option<AnalysisResult>,
    #[serde(default)]
    pub failure_reason: Option<String>,
}

#[cfg(test)]
impl OperationSnapshot {
    pub fn with_status(status: OperationStatus) -> Self {
        Self {
            status,
            result: None,
            failure_reason: None,
        }
    }

    pub fn succeeded(result: AnalysisResult) -> Self {
        Self {
            status: OperationStatus::Succeeded,
            result: Some(result),
            failure_reason: None,
        }
    }

    pub fn failed(reason: Option<String>) -> Self {
        Self {
            status: OperationStatus::Failed,
            result: None,
            failure_reason: reason,
        }
    }
}

/// Answer to a text recognition submission.
#[derive(Debug, Clone, PartialEq)]
pub struct TextSubmission {
    pub operation_location: Option<String>,
}
