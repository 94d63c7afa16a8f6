//! Release registry with Helm `list` and `status` semantics
//!
//! A storage driver returns raw revisions. The registry turns them into what a
//! user of `helm list --all-namespaces` or `helm status` would see.

use meshstat_core::{Release, ReleaseStatus};
use std::collections::HashMap;

use crate::error::Result;
use crate::storage::{ConfigMapDriver, DriverKind, MemoryDriver, SecretsDriver, StorageDriver};

/// States shown by a default `helm list`
const LISTED_STATES: [ReleaseStatus; 2] = [ReleaseStatus::Deployed, ReleaseStatus::Failed];

/// Read-only view of the Helm releases in a cluster
pub struct ReleaseRegistry {
    driver: Box<dyn StorageDriver>,
}

impl ReleaseRegistry {
    /// Create a registry over a storage driver
    pub fn new(driver: impl StorageDriver + 'static) -> Self {
        Self {
            driver: Box::new(driver),
        }
    }

    /// Create a registry for the configured driver kind
    pub fn for_driver(kind: DriverKind, client: kube::Client) -> Self {
        tracing::info!(driver = %kind, "using release storage driver");
        match kind {
            DriverKind::Secrets => Self::new(SecretsDriver::new(client)),
            DriverKind::ConfigMaps => Self::new(ConfigMapDriver::new(client)),
            DriverKind::Memory => Self::new(MemoryDriver::new()),
        }
    }

    /// Name of the underlying storage driver
    pub fn driver_name(&self) -> &'static str {
        self.driver.name()
    }

    /// Latest revision of every deployed or failed release, across all namespaces
    ///
    /// Sorted by release name, then namespace.
    pub async fn list_all(&self) -> Result<Vec<Release>> {
        let revisions = self.driver.list(None).await?;
        let total = revisions.len();

        let mut releases: Vec<Release> = latest_revisions(revisions)
            .into_iter()
            .filter(|r| LISTED_STATES.contains(r.status()))
            .collect();
        releases.sort_by(|a, b| {
            a.name
                .cmp(&b.name)
                .then_with(|| a.namespace.cmp(&b.namespace))
        });

        tracing::info!(revisions = total, listed = releases.len(), "listed releases");
        Ok(releases)
    }

    /// Latest revision of a named release in one namespace, whatever its state
    pub async fn status(&self, name: &str, namespace: &str) -> Result<Release> {
        tracing::debug!(name, namespace, "fetching release status");
        self.driver.get_latest(namespace, name).await
    }
}

/// Keep only the highest revision of each namespace/name pair
fn latest_revisions(revisions: Vec<Release>) -> Vec<Release> {
    let mut latest: HashMap<(String, String), Release> = HashMap::new();
    for release in revisions {
        let key = (release.namespace.clone(), release.name.clone());
        match latest.get(&key) {
            Some(existing) if existing.version >= release.version => {}
            _ => {
                latest.insert(key, release);
            }
        }
    }
    latest.into_values().collect()
}
