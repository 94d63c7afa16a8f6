//! meshstat Core - Core types for the service mesh status checker
//!
//! This crate provides the data model shared by the registry, workload and CLI layers:
//! - `Release`: A Helm release record as stored in the cluster
//! - `Hook`: Lifecycle hooks recorded on a release, with their last run
//! - `LabelSelector`: Typed equality-based label selectors
//! - `WorkloadSnapshot`: Desired/ready counts of a server or client workload

pub mod error;
pub mod hooks;
pub mod release;
pub mod selector;
pub mod workload;

mod helm_serde;

pub use error::{CoreError, Result};
pub use hooks::{Hook, HookEvent, HookExecution, HookPhase};
pub use release::{Chart, ChartMetadata, Release, ReleaseInfo, ReleaseStatus};
pub use selector::LabelSelector;
pub use workload::{WorkloadKind, WorkloadSnapshot, WorkloadTarget};

/// Chart name identifying an installation of the mesh control plane
pub const MESH_CHART_NAME: &str = "consul";

/// Value of the `app` label on mesh workloads
pub const MESH_APP_LABEL: &str = "consul";

/// Value of the `chart` label on mesh workloads
pub const MESH_CHART_LABEL: &str = "consul-helm";
