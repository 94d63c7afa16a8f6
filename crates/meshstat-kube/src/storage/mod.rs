//! Storage drivers for reading Helm release records
//!
//! Helm keeps one record per release revision in its storage backend:
//! - **Secrets** (default): `helm.sh/release.v1` Secrets named `sh.helm.release.v1.<name>.v<rev>`
//! - **ConfigMap**: the same record in a ConfigMap
//! - **Memory**: in-process only (testing)
//!
//! Every record carries the release JSON, gzip-compressed and base64-encoded,
//! under the `release` key, and an `owner=helm` label plus `name`, `status`
//! and `version` labels for querying.

mod configmap;
mod memory;
mod secrets;

pub use configmap::{ConfigMapDriver, release_from_configmap};
pub use memory::{MemoryDriver, OperationCounts};
pub use secrets::{SecretsDriver, release_from_secret};

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use meshstat_core::{LabelSelector, Release};
use std::io::{Read, Write};
use std::str::FromStr;

use crate::error::{KubeError, Result};

/// Data key holding the encoded release
pub const RELEASE_DATA_KEY: &str = "release";

/// Value of the `owner` label on every Helm storage record
pub const STORAGE_OWNER: &str = "helm";

/// First bytes of a gzip stream
const GZIP_MAGIC: [u8; 3] = [0x1f, 0x8b, 0x08];

/// Storage driver trait for reading release records
///
/// Implementations must be Send + Sync for use across async tasks.
#[async_trait]
pub trait StorageDriver: Send + Sync {
    /// Driver name, as accepted by `HELM_DRIVER`
    fn name(&self) -> &'static str;

    /// List every stored revision, in one namespace or across all of them
    async fn list(&self, namespace: Option<&str>) -> Result<Vec<Release>>;

    /// All stored revisions of one release, newest first
    async fn history(&self, namespace: &str, name: &str) -> Result<Vec<Release>>;

    /// Latest revision of a release
    async fn get_latest(&self, namespace: &str, name: &str) -> Result<Release> {
        self.history(namespace, name)
            .await?
            .into_iter()
            .max_by_key(|r| r.version)
            .ok_or_else(|| KubeError::ReleaseNotFound {
                name: name.to_string(),
                namespace: namespace.to_string(),
            })
    }
}

/// Which storage backend to read releases from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DriverKind {
    #[default]
    Secrets,
    ConfigMaps,
    Memory,
}

impl DriverKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DriverKind::Secrets => "secret",
            DriverKind::ConfigMaps => "configmap",
            DriverKind::Memory => "memory",
        }
    }
}

impl FromStr for DriverKind {
    type Err = KubeError;

    /// Parse a `HELM_DRIVER` value; empty selects the default
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "secret" | "secrets" => Ok(DriverKind::Secrets),
            "configmap" | "configmaps" => Ok(DriverKind::ConfigMaps),
            "memory" => Ok(DriverKind::Memory),
            other => Err(KubeError::UnsupportedDriver(other.to_string())),
        }
    }
}

impl std::fmt::Display for DriverKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Selector matching every Helm storage record
pub fn owner_selector() -> LabelSelector {
    LabelSelector::new().with("owner", STORAGE_OWNER)
}

/// Selector matching every revision of one release
pub fn release_selector(name: &str) -> LabelSelector {
    owner_selector().with("name", name)
}

/// Decode a stored record (base64, optionally gzip, then JSON)
#[must_use = "decoded release should be used"]
pub fn decode_release(data: &str) -> Result<Release> {
    let bytes = STANDARD
        .decode(data.trim())
        .map_err(|e| KubeError::Serialization(format!("base64 decode error: {}", e)))?;

    let json = if bytes.starts_with(&GZIP_MAGIC) {
        let mut decoder = flate2::read::GzDecoder::new(bytes.as_slice());
        let mut decompressed = Vec::new();
        decoder
            .read_to_end(&mut decompressed)
            .map_err(|e| KubeError::Compression(e.to_string()))?;
        decompressed
    } else {
        bytes
    };

    Ok(serde_json::from_slice(&json)?)
}

/// Encode a release the way Helm stores it (JSON, gzip, base64)
#[must_use = "encoded data should be used for storage"]
pub fn encode_release(release: &Release) -> Result<String> {
    let json = serde_json::to_vec(release)?;
    let mut encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::best());
    encoder
        .write_all(&json)
        .map_err(|e| KubeError::Compression(e.to_string()))?;
    let compressed = encoder
        .finish()
        .map_err(|e| KubeError::Compression(e.to_string()))?;
    Ok(STANDARD.encode(compressed))
}

/// Fill in the namespace from the storage object when the record omits it
pub(crate) fn with_namespace(mut release: Release, namespace: Option<&String>) -> Release {
    if release.namespace.is_empty() {
        if let Some(ns) = namespace {
            release.namespace = ns.clone();
        }
    }
    release
}

/// Sort by version descending (newest first)
pub(crate) fn newest_first(releases: &mut [Release]) {
    releases.sort_by(|a, b| b.version.cmp(&a.version));
}

#[cfg(test)]
mod tests {
    use super::*;
    use meshstat_core::{ChartMetadata, ReleaseStatus};

    fn test_release() -> Release {
        let mut release = Release {
            name: "consul".to_string(),
            namespace: "consul-ns".to_string(),
            version: 4,
            ..Default::default()
        };
        release.chart.metadata = ChartMetadata {
            name: "consul".to_string(),
            version: "1.4.0".to_string(),
            ..Default::default()
        };
        release.info.status = ReleaseStatus::Deployed;
        release
    }

    #[test]
    fn test_decode_gzip_record() {
        let release = test_release();
        let encoded = encode_release(&release).unwrap();

        let decoded = decode_release(&encoded).unwrap();
        assert_eq!(decoded, release);
    }

    #[test]
    fn test_decode_uncompressed_record() {
        let encoded = STANDARD.encode(br#"{"name":"plain","version":1,"info":{"status":"failed"}}"#);

        let decoded = decode_release(&encoded).unwrap();
        assert_eq!(decoded.name, "plain");
        assert_eq!(decoded.status(), &ReleaseStatus::Failed);
    }

    #[test]
    fn test_decode_invalid_base64() {
        let err = decode_release("not valid base64!!!").unwrap_err();
        assert!(matches!(err, KubeError::Serialization(_)));
    }

    #[test]
    fn test_decode_invalid_json() {
        let encoded = STANDARD.encode(b"not json");
        assert!(decode_release(&encoded).is_err());
    }

    #[test]
    fn test_decode_truncated_gzip() {
        let encoded = encode_release(&test_release()).unwrap();
        let mut bytes = STANDARD.decode(encoded).unwrap();
        bytes.truncate(12);
        let err = decode_release(&STANDARD.encode(bytes)).unwrap_err();
        assert!(matches!(err, KubeError::Compression(_)));
    }

    #[test]
    fn test_driver_kind_from_helm_driver() {
        assert_eq!("".parse::<DriverKind>().unwrap(), DriverKind::Secrets);
        assert_eq!("secret".parse::<DriverKind>().unwrap(), DriverKind::Secrets);
        assert_eq!("Secrets".parse::<DriverKind>().unwrap(), DriverKind::Secrets);
        assert_eq!("configmap".parse::<DriverKind>().unwrap(), DriverKind::ConfigMaps);
        assert_eq!("configmaps".parse::<DriverKind>().unwrap(), DriverKind::ConfigMaps);
        assert_eq!("memory".parse::<DriverKind>().unwrap(), DriverKind::Memory);
        assert!(matches!(
            "sql".parse::<DriverKind>(),
            Err(KubeError::UnsupportedDriver(d)) if d == "sql"
        ));
    }

    #[test]
    fn test_selectors() {
        assert_eq!(owner_selector().to_string(), "owner=helm");
        assert_eq!(release_selector("consul").to_string(), "owner=helm,name=consul");
    }

    #[test]
    fn test_with_namespace_only_fills_gaps() {
        let ns = "from-object".to_string();
        let mut release = test_release();
        assert_eq!(with_namespace(release.clone(), Some(&ns)).namespace, "consul-ns");

        release.namespace.clear();
        assert_eq!(with_namespace(release, Some(&ns)).namespace, "from-object");
    }
}
