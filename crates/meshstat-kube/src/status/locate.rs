//! Find the installation to inspect

use super::StatusError;
use crate::registry::ReleaseRegistry;

/// Where the mesh is installed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Installation {
    /// Release name
    pub name: String,

    /// Release namespace
    pub namespace: String,
}

/// Find the release installed from `chart`, across all namespaces
///
/// The chart name must match exactly. Registry listings are sorted by release
/// name then namespace, so with several installations the first in that order
/// wins.
pub async fn locate(registry: &ReleaseRegistry, chart: &str) -> Result<Installation, StatusError> {
    let releases = registry
        .list_all()
        .await
        .map_err(|e| StatusError::retrieval("couldn't check for installations", e))?;

    let mut matches = releases.into_iter().filter(|r| r.chart_name() == chart);
    let first = matches.next().ok_or_else(|| StatusError::NotFound {
        chart: chart.to_string(),
    })?;

    let others = matches.count();
    if others > 0 {
        tracing::warn!(
            chart,
            release = %first.name,
            namespace = %first.namespace,
            others,
            "multiple installations found, using the first"
        );
    }

    Ok(Installation {
        name: first.name,
        namespace: first.namespace,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryDriver;
    use meshstat_core::{Release, ReleaseStatus};

    fn release(namespace: &str, name: &str, chart: &str) -> Release {
        let mut release = Release {
            name: name.to_string(),
            namespace: namespace.to_string(),
            version: 1,
            ..Default::default()
        };
        release.chart.metadata.name = chart.to_string();
        release.info.status = ReleaseStatus::Deployed;
        release
    }

    #[tokio::test]
    async fn test_locate_single_match() {
        let registry = ReleaseRegistry::new(MemoryDriver::with_releases([
            release("web", "frontend", "nginx"),
            release("consul-ns", "mesh", "consul"),
        ]));

        let found = locate(&registry, "consul").await.unwrap();
        assert_eq!(
            found,
            Installation {
                name: "mesh".to_string(),
                namespace: "consul-ns".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_locate_chart_match_is_exact() {
        let registry = ReleaseRegistry::new(MemoryDriver::with_releases([
            release("a", "one", "Consul"),
            release("b", "two", "consul-k8s"),
        ]));

        let err = locate(&registry, "consul").await.unwrap_err();
        assert_eq!(
            err,
            StatusError::NotFound {
                chart: "consul".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_locate_multiple_is_deterministic() {
        let registry = ReleaseRegistry::new(MemoryDriver::with_releases([
            release("zeta", "consul", "consul"),
            release("alpha", "consul", "consul"),
            release("beta", "another", "consul"),
        ]));

        let found = locate(&registry, "consul").await.unwrap();
        assert_eq!(found.name, "another");
        assert_eq!(found.namespace, "beta");
    }

    #[tokio::test]
    async fn test_locate_registry_error() {
        let registry = ReleaseRegistry::new(MemoryDriver::new().with_list_error("forbidden"));

        let err = locate(&registry, "consul").await.unwrap_err();
        assert!(err.to_string().starts_with("couldn't check for installations: "));
        assert!(err.to_string().contains("forbidden"));
    }
}
