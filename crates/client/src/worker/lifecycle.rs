//! Worker lifecycle states and hook outcomes.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Where the proxy is in the host's install/activate sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum WorkerState {
    /// Registered, install hook not yet run.
    Parsed,
    /// Installed; would normally wait for old versions to go idle.
    Installed,
    /// Controls the page and intercepts its requests.
    Activated,
}

impl WorkerState {
    pub fn is_controlling(self) -> bool {
        matches!(self, WorkerState::Activated)
    }

    /// State after the install hook. Re-installing an active worker leaves it active.
    pub(crate) fn after_install(self) -> Self {
        match self {
            WorkerState::Parsed => WorkerState::Installed,
            other => other,
        }
    }
}

/// Result of the install hook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct InstallOutcome {
    pub generation: String,
    /// Ask the host to activate immediately instead of waiting for old versions to go idle.
    pub skip_waiting: bool,
    pub state: WorkerState,
    pub installed_at: String,
}

/// Result of the activate hook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ActivateOutcome {
    pub generation: String,
    /// Stale buckets removed during rollover.
    pub deleted: Vec<String>,
    /// Buckets that could not be removed; activation still succeeds.
    pub failed: Vec<String>,
    /// Already-open pages are controlled without a reload.
    pub clients_claimed: bool,
    pub state: WorkerState,
    pub activated_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_after_install() {
        assert_eq!(WorkerState::Parsed.after_install(), WorkerState::Installed);
        assert_eq!(WorkerState::Installed.after_install(), WorkerState::Installed);
        assert_eq!(WorkerState::Activated.after_install(), WorkerState::Activated);
    }

    #[test]
    fn test_only_activated_controls() {
        assert!(!WorkerState::Parsed.is_controlling());
        assert!(!WorkerState::Installed.is_controlling());
        assert!(WorkerState::Activated.is_controlling());
    }
}
