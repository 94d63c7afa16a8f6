//! meshstat Kube - Kubernetes integration for meshstat
//!
//! This crate provides:
//! - **Storage Drivers**: Read Helm release records from Secrets, ConfigMaps or memory
//! - **Release Registry**: Helm `list` and `status` semantics on top of a driver
//! - **Workload Queries**: StatefulSet/DaemonSet replica counts by label selector
//! - **Status Checks**: Locate the mesh installation, describe it, and check its workloads
//! - **Cluster Access**: Resolve kubeconfig file and context into a client

pub mod client;
pub mod error;
pub mod registry;
pub mod status;
pub mod storage;
pub mod workloads;

pub use client::ClusterAccess;
pub use error::{KubeError, Result};
pub use registry::ReleaseRegistry;
pub use status::{
    HealthError, Installation, RecordingReporter, ReleaseDetail, StatusConfig, StatusError,
    StatusEvent, StatusReporter, WorkloadHealth,
};
pub use storage::{ConfigMapDriver, DriverKind, MemoryDriver, SecretsDriver, StorageDriver};
pub use workloads::{KubeWorkloads, MockWorkloads, WorkloadSource};
