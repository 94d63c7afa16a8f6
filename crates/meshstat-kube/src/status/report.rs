//! Describe the located release

use chrono::{DateTime, Utc};
use meshstat_core::{Hook, HookPhase, Release, ReleaseStatus};
use std::collections::BTreeMap;

use super::{Installation, StatusError};
use crate::registry::ReleaseRegistry;

/// What is shown about a release
#[derive(Debug, Clone, PartialEq)]
pub struct ReleaseDetail {
    pub name: String,
    pub namespace: String,

    /// Chart name and version, e.g. `consul-1.4.0`
    pub chart: String,

    pub status: ReleaseStatus,
    pub version: u32,
    pub last_deployed: Option<DateTime<Utc>>,

    /// User-supplied overrides
    pub config: ConfigRendering,

    /// Pre-install/pre-upgrade hooks, present only when the release has more
    /// than one hook in total
    pub hooks: Option<Vec<HookStatus>>,
}

/// Configuration overrides as display text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigRendering {
    /// No overrides
    Empty,
    /// YAML document
    Yaml(String),
    /// Overrides could not be serialized; the error is shown instead
    Error(String),
}

/// Last outcome of one hook
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookStatus {
    pub name: String,
    pub kind: String,
    pub phase: HookPhase,
}

impl From<&Hook> for HookStatus {
    fn from(hook: &Hook) -> Self {
        Self {
            name: hook.name.clone(),
            kind: hook.kind.clone(),
            phase: hook.last_run.phase,
        }
    }
}

impl std::fmt::Display for HookStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}: {}", self.name, self.kind, self.phase)
    }
}

/// Fetch the release's latest revision from its own namespace and describe it
pub async fn report(
    registry: &ReleaseRegistry,
    installation: &Installation,
) -> Result<ReleaseDetail, StatusError> {
    let release = registry
        .status(&installation.name, &installation.namespace)
        .await
        .map_err(|e| {
            StatusError::retrieval(
                format!("couldn't get the release '{}'", installation.name),
                e,
            )
        })?;

    Ok(describe(&release))
}

/// Build the detail view of a release
pub fn describe(release: &Release) -> ReleaseDetail {
    let metadata = &release.chart.metadata;
    let chart = if metadata.version.is_empty() {
        metadata.name.clone()
    } else {
        format!("{}-{}", metadata.name, metadata.version)
    };

    let hooks = (release.hooks.len() > 1)
        .then(|| release.pre_deploy_hooks().map(HookStatus::from).collect());

    ReleaseDetail {
        name: release.name.clone(),
        namespace: release.namespace.clone(),
        chart,
        status: release.status().clone(),
        version: release.version,
        last_deployed: release.info.last_deployed,
        config: render_config(&release.config),
        hooks,
    }
}

/// Render overrides as YAML
pub fn render_config(config: &BTreeMap<String, serde_json::Value>) -> ConfigRendering {
    if config.is_empty() {
        return ConfigRendering::Empty;
    }
    match serde_yaml::to_string(config) {
        Ok(yaml) => ConfigRendering::Yaml(yaml),
        Err(e) => ConfigRendering::Error(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryDriver;
    use meshstat_core::{HookEvent, HookExecution};
    use serde_json::json;

    fn hook(name: &str, events: &[HookEvent], phase: HookPhase) -> Hook {
        Hook {
            name: name.to_string(),
            kind: "Job".to_string(),
            path: format!("consul/templates/{}.yaml", name),
            events: events.to_vec(),
            last_run: HookExecution {
                phase,
                ..Default::default()
            },
            weight: 0,
        }
    }

    fn release_with_hooks(hooks: Vec<Hook>) -> Release {
        let mut release = Release {
            name: "consul".to_string(),
            namespace: "consul-ns".to_string(),
            version: 2,
            hooks,
            ..Default::default()
        };
        release.chart.metadata.name = "consul".to_string();
        release.chart.metadata.version = "1.4.0".to_string();
        release.info.status = ReleaseStatus::Deployed;
        release
    }

    #[test]
    fn test_describe_basic_fields() {
        let detail = describe(&release_with_hooks(vec![]));
        assert_eq!(detail.name, "consul");
        assert_eq!(detail.namespace, "consul-ns");
        assert_eq!(detail.chart, "consul-1.4.0");
        assert_eq!(detail.status, ReleaseStatus::Deployed);
        assert_eq!(detail.version, 2);
        assert_eq!(detail.last_deployed, None);
        assert_eq!(detail.config, ConfigRendering::Empty);
    }

    #[test]
    fn test_hooks_filtered_to_pre_deploy() {
        let detail = describe(&release_with_hooks(vec![
            hook("post-only", &[HookEvent::PostInstall], HookPhase::Succeeded),
            hook(
                "tls-init",
                &[HookEvent::PreUpgrade, HookEvent::PostInstall],
                HookPhase::Succeeded,
            ),
            hook("acl-init", &[HookEvent::PreInstall], HookPhase::Failed),
        ]));

        let hooks = detail.hooks.unwrap();
        let lines: Vec<String> = hooks.iter().map(|h| h.to_string()).collect();
        assert_eq!(lines, vec!["tls-init Job: Succeeded", "acl-init Job: Failed"]);
    }

    #[test]
    fn test_single_hook_is_not_reported() {
        let detail = describe(&release_with_hooks(vec![hook(
            "acl-init",
            &[HookEvent::PreInstall],
            HookPhase::Succeeded,
        )]));
        assert_eq!(detail.hooks, None);
    }

    #[test]
    fn test_hook_block_shown_even_when_nothing_survives() {
        let detail = describe(&release_with_hooks(vec![
            hook("a", &[HookEvent::PostInstall], HookPhase::Succeeded),
            hook("b", &[HookEvent::PostDelete], HookPhase::Succeeded),
        ]));
        assert_eq!(detail.hooks, Some(vec![]));
    }

    #[test]
    fn test_render_config_yaml() {
        let config = BTreeMap::from([
            ("server".to_string(), json!({"replicas": 3})),
            ("global".to_string(), json!({"name": "consul"})),
        ]);

        assert_eq!(
            render_config(&config),
            ConfigRendering::Yaml("global:\n  name: consul\nserver:\n  replicas: 3\n".to_string())
        );
    }

    #[test]
    fn test_chart_without_version() {
        let mut release = release_with_hooks(vec![]);
        release.chart.metadata.version.clear();
        assert_eq!(describe(&release).chart, "consul");
    }

    #[tokio::test]
    async fn test_report_is_namespace_scoped() {
        let registry =
            ReleaseRegistry::new(MemoryDriver::with_releases([release_with_hooks(vec![])]));

        let found = Installation {
            name: "consul".to_string(),
            namespace: "consul-ns".to_string(),
        };
        assert_eq!(report(&registry, &found).await.unwrap().version, 2);

        let elsewhere = Installation {
            name: "consul".to_string(),
            namespace: "default".to_string(),
        };
        let err = report(&registry, &elsewhere).await.unwrap_err();
        assert!(err.to_string().starts_with("couldn't get the release 'consul': "));
    }
}
