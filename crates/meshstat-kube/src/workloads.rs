//! Workload queries
//!
//! Lists the StatefulSets (servers) and DaemonSets (clients) of a namespace by
//! label selector and reduces each object to a `WorkloadSnapshot`.

use async_trait::async_trait;
use k8s_openapi::api::apps::v1::{DaemonSet, StatefulSet};
use kube::api::{Api, ListParams};
use meshstat_core::{LabelSelector, WorkloadKind, WorkloadSnapshot};
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use crate::error::{KubeError, Result};

/// Source of workload snapshots
#[async_trait]
pub trait WorkloadSource: Send + Sync {
    /// List workloads of one kind in a namespace matching a selector
    async fn list_workloads(
        &self,
        namespace: &str,
        kind: WorkloadKind,
        selector: &LabelSelector,
    ) -> Result<Vec<WorkloadSnapshot>>;
}

/// Workload source backed by the Kubernetes API
pub struct KubeWorkloads {
    client: kube::Client,
}

impl KubeWorkloads {
    pub fn new(client: kube::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl WorkloadSource for KubeWorkloads {
    async fn list_workloads(
        &self,
        namespace: &str,
        kind: WorkloadKind,
        selector: &LabelSelector,
    ) -> Result<Vec<WorkloadSnapshot>> {
        let lp = ListParams::default().labels(&selector.to_string());
        tracing::debug!(namespace, kind = kind.resource_kind(), selector = %selector, "listing workloads");

        let snapshots = match kind {
            WorkloadKind::Server => {
                let api: Api<StatefulSet> = Api::namespaced(self.client.clone(), namespace);
                api.list(&lp)
                    .await?
                    .items
                    .iter()
                    .map(snapshot_from_stateful_set)
                    .collect()
            }
            WorkloadKind::Client => {
                let api: Api<DaemonSet> = Api::namespaced(self.client.clone(), namespace);
                api.list(&lp)
                    .await?
                    .items
                    .iter()
                    .map(snapshot_from_daemon_set)
                    .collect()
            }
        };

        Ok(snapshots)
    }
}

/// Snapshot of a server StatefulSet
///
/// Desired comes from `spec.replicas` (Kubernetes defaults it to 1), ready from
/// `status.readyReplicas`.
pub fn snapshot_from_stateful_set(sts: &StatefulSet) -> WorkloadSnapshot {
    let desired = sts.spec.as_ref().and_then(|s| s.replicas).unwrap_or(1);
    let ready = sts
        .status
        .as_ref()
        .and_then(|s| s.ready_replicas)
        .unwrap_or(0);

    WorkloadSnapshot::new(
        WorkloadKind::Server,
        sts.metadata.name.clone().unwrap_or_default(),
        count(desired),
        count(ready),
    )
}

/// Snapshot of a client DaemonSet
///
/// A DaemonSet has no replica spec; desired is the number of nodes it should
/// be scheduled on.
pub fn snapshot_from_daemon_set(ds: &DaemonSet) -> WorkloadSnapshot {
    let status = ds.status.as_ref();
    let desired = status.map(|s| s.desired_number_scheduled).unwrap_or(0);
    let ready = status.map(|s| s.number_ready).unwrap_or(0);

    WorkloadSnapshot::new(
        WorkloadKind::Client,
        ds.metadata.name.clone().unwrap_or_default(),
        count(desired),
        count(ready),
    )
}

/// API counts are i32; negative values are clamped to zero
fn count(value: i32) -> u32 {
    u32::try_from(value).unwrap_or(0)
}

/// A recorded `list_workloads` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkloadQuery {
    pub namespace: String,
    pub kind: WorkloadKind,
    pub selector: String,
}

struct MockObject {
    namespace: String,
    labels: BTreeMap<String, String>,
    snapshot: WorkloadSnapshot,
}

/// In-memory workload source for testing
#[derive(Clone, Default)]
pub struct MockWorkloads {
    objects: Arc<RwLock<Vec<MockObject>>>,
    queries: Arc<RwLock<Vec<WorkloadQuery>>>,
    error: Option<String>,
}

impl MockWorkloads {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a workload object with the given labels
    pub fn with_workload(
        self,
        namespace: &str,
        labels: &[(&str, &str)],
        snapshot: WorkloadSnapshot,
    ) -> Self {
        self.objects
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(MockObject {
                namespace: namespace.to_string(),
                labels: labels
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
                snapshot,
            });
        self
    }

    /// Make every query fail with this message
    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.error = Some(message.into());
        self
    }

    /// Queries received so far, in order
    pub fn queries(&self) -> Vec<WorkloadQuery> {
        self.queries
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl WorkloadSource for MockWorkloads {
    async fn list_workloads(
        &self,
        namespace: &str,
        kind: WorkloadKind,
        selector: &LabelSelector,
    ) -> Result<Vec<WorkloadSnapshot>> {
        self.queries
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(WorkloadQuery {
                namespace: namespace.to_string(),
                kind,
                selector: selector.to_string(),
            });

        if let Some(message) = &self.error {
            return Err(KubeError::Storage(message.clone()));
        }

        let objects = self.objects.read().unwrap_or_else(|e| e.into_inner());
        Ok(objects
            .iter()
            .filter(|o| o.namespace == namespace)
            .filter(|o| o.snapshot.kind == kind)
            .filter(|o| selector.matches(&o.labels))
            .map(|o| o.snapshot.clone())
            .collect())
    }
}
