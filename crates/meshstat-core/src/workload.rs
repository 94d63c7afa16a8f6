//! Workload snapshots for health checking
//!
//! The mesh runs two kinds of workloads: servers (a StatefulSet) and clients
//! (a DaemonSet). The two model "desired" differently, so a snapshot carries
//! already-normalised desired/ready counts.

use serde::{Deserialize, Serialize};

use crate::selector::LabelSelector;
use crate::{MESH_APP_LABEL, MESH_CHART_LABEL};

/// Kind of mesh workload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WorkloadKind {
    /// Server agents, run as a StatefulSet
    Server,
    /// Client agents, run as a DaemonSet
    Client,
}

impl WorkloadKind {
    /// Kubernetes resource kind backing this workload
    pub fn resource_kind(&self) -> &'static str {
        match self {
            WorkloadKind::Server => "StatefulSet",
            WorkloadKind::Client => "DaemonSet",
        }
    }

    /// Human-readable noun for error messages
    pub fn noun(&self) -> &'static str {
        match self {
            WorkloadKind::Server => "server stateful set",
            WorkloadKind::Client => "client daemon set",
        }
    }
}

impl std::fmt::Display for WorkloadKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WorkloadKind::Server => write!(f, "server"),
            WorkloadKind::Client => write!(f, "client"),
        }
    }
}

/// Point-in-time replica counts of one workload object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkloadSnapshot {
    pub kind: WorkloadKind,

    /// Object name
    pub name: String,

    /// Replicas the controller is asked to run
    pub desired: u32,

    /// Replicas reporting ready
    pub ready: u32,
}

impl WorkloadSnapshot {
    pub fn new(kind: WorkloadKind, name: impl Into<String>, desired: u32, ready: u32) -> Self {
        Self {
            kind,
            name: name.into(),
            desired,
            ready,
        }
    }

    /// Number of replicas missing readiness
    pub fn deficit(&self) -> u32 {
        self.desired.saturating_sub(self.ready)
    }

    pub fn is_ready(&self) -> bool {
        self.ready >= self.desired
    }
}

/// What to look for when checking one kind of workload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkloadTarget {
    pub kind: WorkloadKind,

    /// Plural name used in health messages, e.g. "Consul servers"
    pub display_name: String,

    /// Selector the workload object must match
    pub selector: LabelSelector,
}

impl WorkloadTarget {
    /// Server StatefulSet: `app=consul,chart=consul-helm,component=server`
    pub fn mesh_servers() -> Self {
        Self {
            kind: WorkloadKind::Server,
            display_name: "Consul servers".to_string(),
            selector: LabelSelector::new()
                .with("app", MESH_APP_LABEL)
                .with("chart", MESH_CHART_LABEL)
                .with("component", "server"),
        }
    }

    /// Client DaemonSet: `app=consul,chart=consul-helm` (no component restriction)
    pub fn mesh_clients() -> Self {
        Self {
            kind: WorkloadKind::Client,
            display_name: "Consul clients".to_string(),
            selector: LabelSelector::new()
                .with("app", MESH_APP_LABEL)
                .with("chart", MESH_CHART_LABEL),
        }
    }
}
