use crate::{BridgeError, Result};
use serde::{Deserialize, Serialize};

/// Replies starting with this literal are failures. The plugin has no other error signal.
pub const ERROR_PREFIX: &str = "error";

/// A raw reply plus its success/error classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandResult {
    pub raw: String,
    pub is_error: bool,
}

impl CommandResult {
    pub fn from_raw(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let is_error = raw.starts_with(ERROR_PREFIX);
        Self { raw, is_error }
    }

    /// A step that never got a reply, recorded as an error result.
    pub fn transport_failure(err: &BridgeError) -> Self {
        Self {
            raw: format!("{ERROR_PREFIX}: {err}"),
            is_error: true,
        }
    }

    /// Converts an error reply into [`BridgeError::Protocol`].
    pub fn into_reply(self, command: &str) -> Result<String> {
        if self.is_error {
            Err(BridgeError::protocol(command, self.raw))
        } else {
            Ok(self.raw)
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpawnOutcome {
    pub object_id: String,
    pub candidate: String,
    pub command: String,
    /// Number of candidates sent, including the one that succeeded.
    pub attempts: usize,
    pub rotation: Option<CommandResult>,
    pub scale: Option<CommandResult>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateProbe {
    pub label: String,
    pub command: String,
    pub result: CommandResult,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeReport {
    pub version: CommandResult,
    pub status: CommandResult,
    pub help: CommandResult,
    pub candidates: Vec<CandidateProbe>,
    pub objects: CommandResult,
    pub camera_location: CommandResult,
}

impl ProbeReport {
    pub fn working_candidates(&self) -> impl Iterator<Item = &CandidateProbe> {
        self.candidates.iter().filter(|c| !c.result.is_error)
    }
}
