//! Mesh status check
//!
//! The check runs in four steps:
//! 1. **Locate** the release installed from the mesh chart, across all namespaces
//! 2. **Report** that release's state, configuration and pre-deploy hooks
//! 3. **Check servers** (StatefulSet) in the release namespace
//! 4. **Check clients** (DaemonSet) in the release namespace
//!
//! Locate and report must succeed before anything else runs. Both workload
//! checks always run once the report is out, and the first failure becomes the
//! outcome. Every step is streamed to a `StatusReporter` as it completes.

mod health;
mod locate;
mod report;

pub use health::{HealthError, WorkloadHealth, check_workloads, evaluate};
pub use locate::{Installation, locate};
pub use report::{ConfigRendering, HookStatus, ReleaseDetail, describe, render_config, report};

use meshstat_core::{MESH_CHART_NAME, WorkloadTarget};
use thiserror::Error;

use crate::registry::ReleaseRegistry;
use crate::workloads::WorkloadSource;

/// What the status check looks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusConfig {
    /// Chart name identifying the installation
    pub chart_name: String,

    /// Server workload to check
    pub servers: WorkloadTarget,

    /// Client workload to check
    pub clients: WorkloadTarget,
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            chart_name: MESH_CHART_NAME.to_string(),
            servers: WorkloadTarget::mesh_servers(),
            clients: WorkloadTarget::mesh_clients(),
        }
    }
}

/// Why a status check failed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StatusError {
    /// No release was installed from the chart
    #[error("no installation found for chart '{chart}'")]
    NotFound { chart: String },

    /// The registry or cluster could not be queried
    #[error("{context}: {message}")]
    Retrieval { context: String, message: String },

    /// A workload is missing, ambiguous or not ready
    #[error(transparent)]
    Health(#[from] HealthError),
}

impl StatusError {
    pub(crate) fn retrieval(context: impl Into<String>, err: impl std::fmt::Display) -> Self {
        StatusError::Retrieval {
            context: context.into(),
            message: err.to_string(),
        }
    }
}

/// One step of progress, streamed as it happens
#[derive(Debug, Clone, PartialEq)]
pub enum StatusEvent {
    /// The check is starting
    Started { chart: String },

    /// Locate succeeded
    InstallationFound(Installation),

    /// Report succeeded
    ReleaseDetail(ReleaseDetail),

    /// A workload check passed
    WorkloadHealthy(WorkloadHealth),

    /// A step failed
    Failed(StatusError),
}

/// Receives status events as the check progresses
pub trait StatusReporter {
    fn emit(&mut self, event: StatusEvent);
}

/// Reporter that keeps every event, for tests and non-terminal callers
#[derive(Debug, Default)]
pub struct RecordingReporter {
    pub events: Vec<StatusEvent>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Errors reported so far, in order
    pub fn failures(&self) -> Vec<&StatusError> {
        self.events
            .iter()
            .filter_map(|e| match e {
                StatusEvent::Failed(err) => Some(err),
                _ => None,
            })
            .collect()
    }
}

impl StatusReporter for RecordingReporter {
    fn emit(&mut self, event: StatusEvent) {
        self.events.push(event);
    }
}

/// Run the full status check
///
/// Returns the first error encountered. Failures are also emitted to the
/// reporter, so callers need not print the returned error again.
pub async fn run(
    config: &StatusConfig,
    registry: &ReleaseRegistry,
    workloads: &dyn WorkloadSource,
    reporter: &mut dyn StatusReporter,
) -> Result<(), StatusError> {
    reporter.emit(StatusEvent::Started {
        chart: config.chart_name.clone(),
    });

    let installation = match locate(registry, &config.chart_name).await {
        Ok(installation) => installation,
        Err(e) => return Err(fail(reporter, e)),
    };
    reporter.emit(StatusEvent::InstallationFound(installation.clone()));

    let detail = match report(registry, &installation).await {
        Ok(detail) => detail,
        Err(e) => return Err(fail(reporter, e)),
    };
    reporter.emit(StatusEvent::ReleaseDetail(detail));

    let mut first_error = None;
    for target in [&config.servers, &config.clients] {
        match check_workloads(workloads, &installation.namespace, target).await {
            Ok(health) => reporter.emit(StatusEvent::WorkloadHealthy(health)),
            Err(e) => {
                let e = fail(reporter, e);
                first_error.get_or_insert(e);
            }
        }
    }

    match first_error {
        Some(e) => Err(e),
        None => {
            tracing::debug!(release = %installation.name, namespace = %installation.namespace, "status check passed");
            Ok(())
        }
    }
}

fn fail(reporter: &mut dyn StatusReporter, err: StatusError) -> StatusError {
    tracing::debug!(error = %err, "status step failed");
    reporter.emit(StatusEvent::Failed(err.clone()));
    err
}
