//! In-memory storage driver
//!
//! Backs `HELM_DRIVER=memory` and is useful for unit tests without requiring
//! a Kubernetes cluster.

use async_trait::async_trait;
use meshstat_core::Release;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use super::{StorageDriver, newest_first};
use crate::error::{KubeError, Result};

/// Storage: namespace -> name -> version -> release
type Store = HashMap<String, HashMap<String, HashMap<u32, Release>>>;

/// In-memory storage driver
#[derive(Clone, Default)]
pub struct MemoryDriver {
    store: Arc<RwLock<Store>>,
    /// Track operation counts for assertions
    operations: Arc<RwLock<OperationCounts>>,
    list_error: Option<String>,
    history_error: Option<String>,
}

/// Counts of operations performed for testing assertions
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct OperationCounts {
    pub lists: usize,
    pub histories: usize,
}

impl MemoryDriver {
    /// Create a new empty driver
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with pre-populated releases
    pub fn with_releases(releases: impl IntoIterator<Item = Release>) -> Self {
        let driver = Self::new();
        for release in releases {
            driver.insert(release);
        }
        driver
    }

    /// Make every `list` call fail with this message
    pub fn with_list_error(mut self, message: impl Into<String>) -> Self {
        self.list_error = Some(message.into());
        self
    }

    /// Make every `history` call fail with this message
    pub fn with_history_error(mut self, message: impl Into<String>) -> Self {
        self.history_error = Some(message.into());
        self
    }

    /// Store a release revision, replacing any with the same version
    pub fn insert(&self, release: Release) {
        let mut store = self.store.write().unwrap_or_else(|e| e.into_inner());
        store
            .entry(release.namespace.clone())
            .or_default()
            .entry(release.name.clone())
            .or_default()
            .insert(release.version, release);
    }

    /// Get operation counts for assertions
    pub fn operation_counts(&self) -> OperationCounts {
        self.operations
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Count total revisions stored
    pub fn release_count(&self) -> usize {
        let store = self.store.read().unwrap_or_else(|e| e.into_inner());
        store
            .values()
            .flat_map(|ns| ns.values())
            .map(|versions| versions.len())
            .sum()
    }

    fn record(&self, f: impl FnOnce(&mut OperationCounts)) {
        f(&mut self.operations.write().unwrap_or_else(|e| e.into_inner()));
    }
}

#[async_trait]
impl StorageDriver for MemoryDriver {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn list(&self, namespace: Option<&str>) -> Result<Vec<Release>> {
        self.record(|ops| ops.lists += 1);
        if let Some(message) = &self.list_error {
            return Err(KubeError::Storage(message.clone()));
        }

        let store = self.store.read().unwrap_or_else(|e| e.into_inner());
        let mut releases: Vec<Release> = store
            .iter()
            .filter(|(ns, _)| namespace.is_none_or(|n| n == ns.as_str()))
            .flat_map(|(_, names)| names.values())
            .flat_map(|versions| versions.values())
            .cloned()
            .collect();

        // HashMap order is arbitrary, like an API server listing
        newest_first(&mut releases);
        Ok(releases)
    }

    async fn history(&self, namespace: &str, name: &str) -> Result<Vec<Release>> {
        self.record(|ops| ops.histories += 1);
        if let Some(message) = &self.history_error {
            return Err(KubeError::Storage(message.clone()));
        }

        let store = self.store.read().unwrap_or_else(|e| e.into_inner());
        let mut releases: Vec<Release> = store
            .get(namespace)
            .and_then(|ns| ns.get(name))
            .map(|versions| versions.values().cloned().collect())
            .unwrap_or_default();

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
