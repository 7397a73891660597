//! Job phase state machine.

use serde::{Deserialize, Serialize};

/// Phase of a merge job.
///
/// A job moves through `Created → Validating → Planning → Normalizing →
/// Merging → Finalizing → Completed`. `Failed` is reachable from every
/// non-terminal phase; `Cancelled` only from `Merging`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobPhase {
    #[default]
    Created,
    Validating,
    Planning,
    Normalizing,
    Merging,
    Finalizing,
    Completed,
    Failed,
    Cancelled,
}

impl JobPhase {
    /// Whether the job can make no further progress from this phase.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobPhase::Completed | JobPhase::Failed | JobPhase::Cancelled
        )
    }
}

impl std::fmt::Display for JobPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            JobPhase::Created => "created",
            JobPhase::Validating => "validating",
            JobPhase::Planning => "planning",
            JobPhase::Normalizing => "normalizing",
            JobPhase::Merging => "merging",
            JobPhase::Finalizing => "finalizing",
            JobPhase::Completed => "completed",
            JobPhase::Failed => "failed",
            JobPhase::Cancelled => "cancelled",
        };
        write!(f, "{}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_phases() {
        assert!(JobPhase::Completed.is_terminal());
        assert!(JobPhase::Failed.is_terminal());
        assert!(JobPhase::Cancelled.is_terminal());
        assert!(!JobPhase::Created.is_terminal());
        assert!(!JobPhase::Merging.is_terminal());
    }

    #[test]
    fn serializes_lowercase() {
        let json = serde_json::to_string(&JobPhase::Merging).unwrap();
        assert_eq!(json, "\"merging\"");
    }
}
