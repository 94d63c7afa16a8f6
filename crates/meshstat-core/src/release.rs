//! Helm release records
//!
//! These mirror the JSON document Helm keeps in its storage backend (one record
//! per revision). Only the fields needed for status reporting are modelled;
//! unknown fields are ignored on decode.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::helm_serde::{null_as_default, timestamp};
use crate::hooks::Hook;

/// One revision of a deployed chart
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Release {
    /// Release name (unique within a namespace)
    pub name: String,

    /// Kubernetes namespace
    #[serde(default)]
    pub namespace: String,

    /// Revision number (1-indexed, increments with each upgrade)
    #[serde(default)]
    pub version: u32,

    /// Deployment state and timing
    #[serde(default, deserialize_with = "null_as_default")]
    pub info: ReleaseInfo,

    /// Chart the release was installed from
    #[serde(default, deserialize_with = "null_as_default")]
    pub chart: Chart,

    /// User-supplied configuration overrides
    #[serde(default, deserialize_with = "null_as_default")]
    pub config: BTreeMap<String, serde_json::Value>,

    /// Rendered manifest
    #[serde(default)]
    pub manifest: String,

    /// Lifecycle hooks, in the order Helm recorded them
    #[serde(default, deserialize_with = "null_as_default")]
    pub hooks: Vec<Hook>,
}

impl Release {
    /// Name of the chart this release was installed from
    pub fn chart_name(&self) -> &str {
        &self.chart.metadata.name
    }

    /// Current deployment status
    pub fn status(&self) -> &ReleaseStatus {
        &self.info.status
    }

    /// Hooks that ran (or would run) before an install or upgrade
    pub fn pre_deploy_hooks(&self) -> impl Iterator<Item = &Hook> {
        self.hooks.iter().filter(|h| h.runs_before_deploy())
    }
}

/// Deployment state of a release revision
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ReleaseInfo {
    #[serde(default, with = "timestamp")]
    pub first_deployed: Option<DateTime<Utc>>,

    #[serde(default, with = "timestamp")]
    pub last_deployed: Option<DateTime<Utc>>,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub status: ReleaseStatus,

    #[serde(default)]
    pub notes: String,
}

/// Chart envelope; only the metadata is kept
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Chart {
    #[serde(default, deserialize_with = "null_as_default")]
    pub metadata: ChartMetadata,
}

/// Chart.yaml metadata
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChartMetadata {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub version: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Release status
///
/// Note: This enum is non-exhaustive - new variants may be added in future versions.
/// Strings Helm writes that are not recognised decode as `Unknown`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(from = "String", into = "String")]
#[non_exhaustive]
pub enum ReleaseStatus {
    #[default]
    Unknown,
    Deployed,
    Uninstalled,
    Superseded,
    Failed,
    Uninstalling,
    PendingInstall,
    PendingUpgrade,
    PendingRollback,
}

impl ReleaseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Deployed => "deployed",
            Self::Uninstalled => "uninstalled",
            Self::Superseded => "superseded",
            Self::Failed => "failed",
            Self::Uninstalling => "uninstalling",
            Self::PendingInstall => "pending-install",
            Self::PendingUpgrade => "pending-upgrade",
            Self::PendingRollback => "pending-rollback",
        }
    }

    /// Is this a transitional state?
    pub fn is_pending(&self) -> bool {
        matches!(
            self,
            Self::PendingInstall | Self::PendingUpgrade | Self::PendingRollback | Self::Uninstalling
        )
    }
}

impl std::fmt::Display for ReleaseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for ReleaseStatus {
    fn from(s: &str) -> Self {
        match s {
            "deployed" => Self::Deployed,
            "uninstalled" => Self::Uninstalled,
            "superseded" => Self::Superseded,
            "failed" => Self::Failed,
            "uninstalling" => Self::Uninstalling,
            "pending-install" => Self::PendingInstall,
            "pending-upgrade" => Self::PendingUpgrade,
            "pending-rollback" => Self::PendingRollback,
            _ => Self::Unknown,
        }
    }
}

impl From<String> for ReleaseStatus {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl From<ReleaseStatus> for String {
    fn from(status: ReleaseStatus) -> Self {
        status.as_str().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::{HookEvent, HookPhase};
    use chrono::TimeZone;

    const HELM_RECORD: &str = r#"{
        "name": "consul",
        "info": {
            "first_deployed": "2024-03-01T10:00:00.123456789Z",
            "last_deployed": "2024-03-02T11:30:00+02:00",
            "deleted": "",
            "description": "Upgrade complete",
            "status": "deployed"
        },
        "chart": {
            "metadata": {"name": "consul", "version": "1.4.0", "appVersion": "1.18.0", "apiVersion": "v2"},
            "templates": []
        },
        "config": {"global": {"name": "consul"}, "server": {"replicas": 3}},
        "manifest": "---\nkind: StatefulSet",
        "hooks": [
            {
                "name": "consul-gossip-encryption-autogenerate",
                "kind": "Job",
                "path": "consul/templates/gossip-job.yaml",
                "events": ["pre-install", "pre-upgrade"],
                "last_run": {"started_at": "2024-03-02T09:29:00Z", "completed_at": "", "phase": "Succeeded"},
                "weight": 0
            },
            {
                "name": "consul-test",
                "kind": "Pod",
                "events": ["test"],
                "last_run": {"started_at": "", "completed_at": "", "phase": ""}
            }
        ],
        "version": 2,
        "namespace": "consul-ns"
    }"#;

    #[test]
    fn test_decode_helm_record() {
        let release: Release = serde_json::from_str(HELM_RECORD).unwrap();

        assert_eq!(release.name, "consul");
        assert_eq!(release.namespace, "consul-ns");
        assert_eq!(release.version, 2);
        assert_eq!(release.chart_name(), "consul");
        assert_eq!(release.chart.metadata.app_version.as_deref(), Some("1.18.0"));
        assert_eq!(release.status(), &ReleaseStatus::Deployed);
        assert_eq!(
            release.info.last_deployed,
            Some(Utc.with_ymd_and_hms(2024, 3, 2, 9, 30, 0).unwrap())
        );
        assert_eq!(release.config["server"]["replicas"], 3);
        assert_eq!(release.hooks.len(), 2);
        assert_eq!(release.hooks[0].events, vec![HookEvent::PreInstall, HookEvent::PreUpgrade]);
        assert_eq!(release.hooks[0].last_run.phase, HookPhase::Succeeded);
        assert_eq!(release.hooks[1].last_run.phase, HookPhase::Unknown);
        assert!(release.hooks[1].last_run.started_at.is_none());
    }

    #[test]
    fn test_decode_minimal_record() {
        let release: Release =
            serde_json::from_str(r#"{"name": "x", "config": null, "hooks": null}"#).unwrap();

        assert_eq!(release.name, "x");
        assert!(release.config.is_empty());
        assert!(release.hooks.is_empty());
        assert_eq!(release.status(), &ReleaseStatus::Unknown);
        assert!(release.info.last_deployed.is_none());
    }

    #[test]
    fn test_pre_deploy_hooks() {
        let release: Release = serde_json::from_str(HELM_RECORD).unwrap();
        let names: Vec<_> = release.pre_deploy_hooks().map(|h| h.name.as_str()).collect();
        assert_eq!(names, vec!["consul-gossip-encryption-autogenerate"]);
    }

    #[test]
    fn test_status_strings() {
        for status in [
            ReleaseStatus::Unknown,
            ReleaseStatus::Deployed,
            ReleaseStatus::Uninstalled,
            ReleaseStatus::Superseded,
            ReleaseStatus::Failed,
            ReleaseStatus::Uninstalling,
            ReleaseStatus::PendingInstall,
            ReleaseStatus::PendingUpgrade,
            ReleaseStatus::PendingRollback,
        ] {
            assert_eq!(ReleaseStatus::from(status.to_string()), status);
        }
        assert_eq!(ReleaseStatus::from("bogus"), ReleaseStatus::Unknown);
    }

    #[test]
    fn test_status_serializes_as_helm_string() {
        let json = serde_json::to_string(&ReleaseStatus::PendingUpgrade).unwrap();
        assert_eq!(json, r#""pending-upgrade""#);
    }

    #[test]
    fn test_pending_states() {
        assert!(ReleaseStatus::PendingInstall.is_pending());
        assert!(ReleaseStatus::Uninstalling.is_pending());
        assert!(!ReleaseStatus::Deployed.is_pending());
        assert!(!ReleaseStatus::Failed.is_pending());
    }

    #[test]
    fn test_config_yaml_keys_sorted() {
        let release: Release = serde_json::from_str(HELM_RECORD).unwrap();
        let yaml = serde_yaml::to_string(&release.config).unwrap();
        assert_eq!(yaml, "global:\n  name: consul\nserver:\n  replicas: 3\n");
    }
}
