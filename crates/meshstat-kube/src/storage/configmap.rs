//! Kubernetes ConfigMap storage driver
//!
//! Selected with `HELM_DRIVER=configmap`. Same record layout as the Secrets
//! driver, stored as plain ConfigMap data.

use async_trait::async_trait;
use k8s_openapi::api::core::v1::ConfigMap;
use kube::Client;
use kube::api::{Api, ListParams};
use meshstat_core::{LabelSelector, Release};

use super::{
    RELEASE_DATA_KEY, StorageDriver, decode_release, newest_first, owner_selector,
    release_selector, with_namespace,
};
use crate::error::{KubeError, Result};

/// Kubernetes ConfigMap storage driver
pub struct ConfigMapDriver {
    client: Client,
}

impl ConfigMapDriver {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn configmaps_api(&self, namespace: Option<&str>) -> Api<ConfigMap> {
        match namespace {
            Some(ns) => Api::namespaced(self.client.clone(), ns),
            None => Api::all(self.client.clone()),
        }
    }

    async fn query(&self, namespace: Option<&str>, selector: &LabelSelector) -> Result<Vec<Release>> {
        let lp = ListParams::default().labels(&selector.to_string());
        let configmaps = self.configmaps_api(namespace).list(&lp).await?;

        Ok(configmaps
            .items
            .iter()
            .filter_map(|cm| match release_from_configmap(cm) {
                Ok(release) => Some(release),
                Err(e) => {
                    tracing::debug!(
                        configmap = cm.metadata.name.as_deref().unwrap_or_default(),
                        error = %e,
                        "failed to decode release, skipping"
                    );
                    None
                }
            })
            .collect())
    }
}

/// Parse a release from a Helm storage ConfigMap
pub fn release_from_configmap(configmap: &ConfigMap) -> Result<Release> {
    let encoded = configmap
        .data
        .as_ref()
        .and_then(|d| d.get(RELEASE_DATA_KEY))
        .ok_or_else(|| KubeError::Storage("ConfigMap missing 'release' data".to_string()))?;

    let release = decode_release(encoded)?;
    Ok(with_namespace(release, configmap.metadata.namespace.as_ref()))
}

#[async_trait]
impl StorageDriver for ConfigMapDriver {
    fn name(&self) -> &'static str {
        "configmap"
    }

    async fn list(&self, namespace: Option<&str>) -> Result<Vec<Release>> {
        tracing::debug!(namespace = namespace.unwrap_or("*"), "listing release configmaps");
        self.query(namespace, &owner_selector()).await
    }

    async fn history(&self, namespace: &str, name: &str) -> Result<Vec<Release>> {
        tracing::debug!(namespace, name, "querying release configmaps");
        let mut releases = self.query(Some(namespace), &release_selector(name)).await?;

        if releases.is_empty() {
            return Err(KubeError::ReleaseNotFound {
                name: name.to_string(),
                namespace: namespace.to_string(),
            });
        }

        newest_first(&mut releases);
        Ok(releases)
    }
}
