//! Kubernetes Secrets storage driver
//!
//! This is Helm's default storage driver. Records are Secrets of type
//! `helm.sh/release.v1`; the Secret's own base64 layer is removed by the
//! client, leaving Helm's base64 text under the `release` key.

use async_trait::async_trait;
use k8s_openapi::api::core::v1::Secret;
use kube::Client;
use kube::api::{Api, ListParams};
use meshstat_core::{LabelSelector, Release};

use super::{
    RELEASE_DATA_KEY, StorageDriver, decode_release, newest_first, owner_selector,
    release_selector, with_namespace,
};
use crate::error::{KubeError, Result};

/// Kubernetes Secrets storage driver
pub struct SecretsDriver {
    client: Client,
}

impl SecretsDriver {
    /// Create with an existing client
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Secret API for one namespace, or all of them
    fn secrets_api(&self, namespace: Option<&str>) -> Api<Secret> {
        match namespace {
            Some(ns) => Api::namespaced(self.client.clone(), ns),
            None => Api::all(self.client.clone()),
        }
    }

    /// List and decode every record matching a selector
    ///
    /// Records that fail to decode are skipped, matching Helm.
    async fn query(&self, namespace: Option<&str>, selector: &LabelSelector) -> Result<Vec<Release>> {
        let lp = ListParams::default().labels(&selector.to_string());
        let secrets = self.secrets_api(namespace).list(&lp).await?;

        let mut releases = Vec::with_capacity(secrets.items.len());
        for secret in &secrets.items {
            match release_from_secret(secret) {
                Ok(release) => releases.push(release),
                Err(e) => tracing::debug!(
                    secret = secret.metadata.name.as_deref().unwrap_or_default(),
                    error = %e,
                    "failed to decode release, skipping"
                ),
            }
        }
        Ok(releases)
    }
}

/// Parse a release from a Helm storage Secret
pub fn release_from_secret(secret: &Secret) -> Result<Release> {
    let data = secret
        .data
        .as_ref()
        .and_then(|d| d.get(RELEASE_DATA_KEY))
        .ok_or_else(|| KubeError::Storage("Secret missing 'release' data".to_string()))?;

    let encoded = std::str::from_utf8(&data.0)
        .map_err(|e| KubeError::Storage(format!("Invalid UTF-8 in secret: {}", e)))?;

    let release = decode_release(encoded)?;
    Ok(with_namespace(release, secret.metadata.namespace.as_ref()))
}

#[async_trait]
impl StorageDriver for SecretsDriver {
    fn name(&self) -> &'static str {
        "secret"
    }

    async fn list(&self, namespace: Option<&str>) -> Result<Vec<Release>> {
        tracing::debug!(namespace = namespace.unwrap_or("*"), "listing release secrets");
        self.query(namespace, &owner_selector()).await
    }

    async fn history(&self, namespace: &str, name: &str) -> Result<Vec<Release>> {
        tracing::debug!(namespace, name, "querying release secrets");
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
