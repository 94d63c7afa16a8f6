//! Lifecycle hooks recorded on a release
//!
//! Helm stores every hook it rendered for a revision along with the outcome of
//! its last execution. Status reporting only cares about hooks that gate a
//! deployment, i.e. those triggered on pre-install or pre-upgrade.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::helm_serde::{null_as_default, timestamp};

/// Events that gate a deployment; hooks bound to them are reported
pub const PRE_DEPLOY_EVENTS: [HookEvent; 2] = [HookEvent::PreInstall, HookEvent::PreUpgrade];

/// Hook definition as recorded in the release
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Hook {
    pub name: String,

    /// Kubernetes kind of the resource the hook creates
    #[serde(default)]
    pub kind: String,

    /// Template path inside the chart
    #[serde(default)]
    pub path: String,

    /// Events that trigger this hook
    #[serde(default, deserialize_with = "null_as_default")]
    pub events: Vec<HookEvent>,

    /// Outcome of the most recent execution
    #[serde(default, deserialize_with = "null_as_default")]
    pub last_run: HookExecution,

    /// Ordering weight (lower runs first)
    #[serde(default)]
    pub weight: i32,
}

impl Hook {
    /// Check if this hook fires for a given event
    pub fn runs_on(&self, event: &HookEvent) -> bool {
        self.events.contains(event)
    }

    /// Does this hook run before an install or an upgrade?
    pub fn runs_before_deploy(&self) -> bool {
        PRE_DEPLOY_EVENTS.iter().any(|e| self.runs_on(e))
    }
}

/// Record of a hook's last execution
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct HookExecution {
    #[serde(default, with = "timestamp")]
    pub started_at: Option<DateTime<Utc>>,

    #[serde(default, with = "timestamp")]
    pub completed_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub phase: HookPhase,
}

/// Hook trigger event
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum HookEvent {
    PreInstall,
    PostInstall,
    PreDelete,
    PostDelete,
    PreUpgrade,
    PostUpgrade,
    PreRollback,
    PostRollback,
    Test,
    /// Any event name this version does not know about
    Other(String),
}

impl std::fmt::Display for HookEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            HookEvent::PreInstall => "pre-install",
            HookEvent::PostInstall => "post-install",
            HookEvent::PreDelete => "pre-delete",
            HookEvent::PostDelete => "post-delete",
            HookEvent::PreUpgrade => "pre-upgrade",
            HookEvent::PostUpgrade => "post-upgrade",
            HookEvent::PreRollback => "pre-rollback",
            HookEvent::PostRollback => "post-rollback",
            HookEvent::Test => "test",
            HookEvent::Other(s) => s,
        };
        write!(f, "{}", s)
    }
}

impl From<String> for HookEvent {
    fn from(s: String) -> Self {
        match s.as_str() {
            "pre-install" => HookEvent::PreInstall,
            "post-install" => HookEvent::PostInstall,
            "pre-delete" => HookEvent::PreDelete,
            "post-delete" => HookEvent::PostDelete,
            "pre-upgrade" => HookEvent::PreUpgrade,
            "post-upgrade" => HookEvent::PostUpgrade,
            "pre-rollback" => HookEvent::PreRollback,
            "post-rollback" => HookEvent::PostRollback,
            // Helm 2 spelling, still accepted by Helm 3
            "test" | "test-success" => HookEvent::Test,
            _ => HookEvent::Other(s),
        }
    }
}

impl From<HookEvent> for String {
    fn from(event: HookEvent) -> Self {
        event.to_string()
    }
}

/// Phase of a hook's last execution
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum HookPhase {
    /// Never run, or the outcome was not recorded
    #[default]
    Unknown,
    Running,
    Succeeded,
    Failed,
}

impl std::fmt::Display for HookPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            HookPhase::Unknown => "Unknown",
            HookPhase::Running => "Running",
            HookPhase::Succeeded => "Succeeded",
            HookPhase::Failed => "Failed",
        };
        write!(f, "{}", s)
    }
}

impl From<String> for HookPhase {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Running" => HookPhase::Running,
            "Succeeded" => HookPhase::Succeeded,
            "Failed" => HookPhase::Failed,
            _ => HookPhase::Unknown,
        }
    }
}

impl From<HookPhase> for String {
    fn from(phase: HookPhase) -> Self {
        phase.to_string()
    }
}
