//! Workload health checks
//!
//! A point-in-time comparison of desired and ready replicas. Exactly one
//! workload object must match the target selector; zero or several is a
//! topology error rather than degraded health.

use meshstat_core::{WorkloadKind, WorkloadSnapshot, WorkloadTarget};
use thiserror::Error;

use super::StatusError;
use crate::workloads::WorkloadSource;

/// Why a workload check failed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HealthError {
    /// Nothing matched the selector
    #[error("no {} found", .kind.noun())]
    NotFound { kind: WorkloadKind },

    /// More than one object matched the selector
    #[error("found multiple {}s ({count})", .kind.noun())]
    Ambiguous { kind: WorkloadKind, count: usize },

    /// Fewer replicas ready than desired
    #[error("{display_name}: {deficit}/{desired} unhealthy")]
    Unhealthy {
        display_name: String,
        deficit: u32,
        desired: u32,
    },
}

/// A passing workload check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkloadHealth {
    pub kind: WorkloadKind,

    /// e.g. "Consul servers"
    pub display_name: String,

    /// Name of the matched object
    pub object: String,

    pub ready: u32,
    pub desired: u32,
}

impl WorkloadHealth {
    /// Success line, e.g. `Consul servers healthy (3/3)`
    pub fn message(&self) -> String {
        format!(
            "{} healthy ({}/{})",
            self.display_name, self.ready, self.desired
        )
    }
}

/// Judge the objects matching one target
pub fn evaluate(
    target: &WorkloadTarget,
    snapshots: &[WorkloadSnapshot],
) -> Result<WorkloadHealth, HealthError> {
    let snapshot = match snapshots {
        [] => return Err(HealthError::NotFound { kind: target.kind }),
        [single] => single,
        many => {
            return Err(HealthError::Ambiguous {
                kind: target.kind,
                count: many.len(),
            });
        }
    };

    if !snapshot.is_ready() {
        return Err(HealthError::Unhealthy {
            display_name: target.display_name.clone(),
            deficit: snapshot.deficit(),
            desired: snapshot.desired,
        });
    }

    Ok(WorkloadHealth {
        kind: target.kind,
        display_name: target.display_name.clone(),
        object: snapshot.name.clone(),
        ready: snapshot.ready,
        desired: snapshot.desired,
    })
}

/// Query the workloads for one target in a namespace and judge them
pub async fn check_workloads(
    source: &dyn WorkloadSource,
    namespace: &str,
    target: &WorkloadTarget,
) -> Result<WorkloadHealth, StatusError> {
    let snapshots = source
        .list_workloads(namespace, target.kind, &target.selector)
        .await
        .map_err(|e| {
            StatusError::retrieval(format!("couldn't list {}s", target.kind.noun()), e)
        })?;

    tracing::debug!(
        namespace,
        kind = target.kind.resource_kind(),
        matched = snapshots.len(),
        "checking workload health"
    );

    Ok(evaluate(target, &snapshots)?)
}
