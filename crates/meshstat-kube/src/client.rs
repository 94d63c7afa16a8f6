//! Cluster access
//!
//! One resolved `kube::Client` feeds both the release registry and the workload
//! queries, so the two always look at the same cluster and context.

use kube::Client;
use kube::config::{Config, KubeConfigOptions, Kubeconfig};
use std::path::PathBuf;

use crate::error::{KubeError, Result};

/// Which kubeconfig file and context to use
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClusterAccess {
    /// Explicit kubeconfig path; `KUBECONFIG` or `~/.kube/config` otherwise
    pub kubeconfig: Option<PathBuf>,

    /// Context override; the kubeconfig's current context otherwise
    pub context: Option<String>,
}

impl ClusterAccess {
    pub fn new(kubeconfig: Option<PathBuf>, context: Option<String>) -> Self {
        Self {
            kubeconfig,
            context,
        }
    }

    fn options(&self) -> KubeConfigOptions {
        KubeConfigOptions {
            context: self.context.clone(),
            ..Default::default()
        }
    }

    /// Resolve into a client configuration
    pub async fn load_config(&self) -> Result<Config> {
        match (&self.kubeconfig, &self.context) {
            (Some(path), _) => {
                tracing::debug!(path = %path.display(), context = ?self.context, "loading kubeconfig file");
                // The read error already names the file
                let kubeconfig = Kubeconfig::read_from(path)
                    .map_err(|e| KubeError::ClusterAccess(e.to_string()))?;
                Config::from_custom_kubeconfig(kubeconfig, &self.options())
                    .await
                    .map_err(|e| {
                        KubeError::ClusterAccess(format!(
                            "loading kubeconfig '{}': {}",
                            path.display(),
                            e
                        ))
                    })
            }
            (None, Some(context)) => {
                tracing::debug!(context = %context, "loading default kubeconfig");
                Config::from_kubeconfig(&self.options())
                    .await
                    .map_err(|e| KubeError::ClusterAccess(format!("loading kubeconfig: {}", e)))
            }
            (None, None) => Config::infer().await.map_err(|e| {
                KubeError::ClusterAccess(format!("inferring cluster configuration: {}", e))
            }),
        }
    }

    /// Resolve and build a client
    pub async fn connect(&self) -> Result<Client> {
        let config = self.load_config().await?;
        tracing::debug!(cluster = %config.cluster_url, namespace = %config.default_namespace, "connecting to cluster");
        Client::try_from(config).map_err(|e| {
            KubeError::ClusterAccess(format!("initializing Kubernetes client: {}", e))
        })
    }
}
