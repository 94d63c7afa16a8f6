//! Typed label selectors
//!
//! An equality-based selector is an ordered set of `key=value` requirements.
//! Keeping it typed (instead of a formatted string) lets callers build and test
//! selectors without going through the Kubernetes client.

use std::collections::BTreeMap;
use std::str::FromStr;

use crate::error::{CoreError, Result};

/// Maximum length of a label value (and of a key's name segment)
const MAX_LABEL_LENGTH: usize = 63;

/// Equality-based label selector
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct LabelSelector {
    requirements: Vec<(String, String)>,
}

impl LabelSelector {
    /// Create an empty selector (matches everything)
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a `key=value` requirement
    ///
    /// Setting a key twice replaces the earlier value in place, so the
    /// requirement keeps its original position.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Add or replace a requirement
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.requirements.iter_mut().find(|(k, _)| *k == key) {
            Some((_, v)) => *v = value,
            None => self.requirements.push((key, value)),
        }
    }

    /// Required value for a key, if any
    pub fn get(&self, key: &str) -> Option<&str> {
        self.requirements
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Iterate requirements in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.requirements.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.requirements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requirements.is_empty()
    }

    /// Check whether a label set satisfies every requirement
    pub fn matches(&self, labels: &BTreeMap<String, String>) -> bool {
        self.requirements
            .iter()
            .all(|(k, v)| labels.get(k).is_some_and(|actual| actual == v))
    }

    /// Check all keys and values are valid Kubernetes labels
    pub fn validate(&self) -> Result<()> {
        for (key, value) in &self.requirements {
            validate_key(key)?;
            validate_value(value)?;
        }
        Ok(())
    }
}

impl std::fmt::Display for LabelSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, (k, v)) in self.requirements.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}={}", k, v)?;
        }
        Ok(())
    }
}

impl FromStr for LabelSelector {
    type Err = CoreError;

    /// Parse `key=value[,key=value...]`; `==` is accepted as a synonym for `=`
    fn from_str(s: &str) -> Result<Self> {
        let invalid = |message: String| CoreError::InvalidSelector {
            selector: s.to_string(),
            message,
        };

        let mut selector = LabelSelector::new();
        if s.trim().is_empty() {
            return Ok(selector);
        }

        for part in s.split(',') {
            let part = part.trim();
            let (key, value) = part
                .split_once("==")
                .or_else(|| part.split_once('='))
                .ok_or_else(|| invalid(format!("'{}' is not a key=value requirement", part)))?;
            let (key, value) = (key.trim(), value.trim());

            if selector.get(key).is_some_and(|existing| existing != value) {
                return Err(invalid(format!("conflicting values for '{}'", key)));
            }
            selector.insert(key, value);
        }

        selector
            .validate()
            .map_err(|e| invalid(e.to_string()))?;
        Ok(selector)
    }
}

fn validate_key(key: &str) -> Result<()> {
    let invalid = |message: &str| CoreError::InvalidLabel {
        label: key.to_string(),
        message: message.to_string(),
    };

    let (prefix, name) = match key.split_once('/') {
        Some((prefix, name)) => (Some(prefix), name),
        None => (None, key),
    };

    if let Some(prefix) = prefix {
        if prefix.is_empty() || prefix.len() > 253 {
            return Err(invalid("prefix must be 1-253 characters"));
        }
        if !prefix
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '.')
        {
            return Err(invalid("prefix must be a DNS subdomain"));
        }
    }

    if name.is_empty() {
        return Err(invalid("key must not be empty"));
    }
    check_segment(name).map_err(invalid)
}

fn validate_value(value: &str) -> Result<()> {
    // Empty values are legal label values
    if value.is_empty() {
        return Ok(());
    }
    check_segment(value).map_err(|message| CoreError::InvalidLabel {
        label: value.to_string(),
        message: message.to_string(),
    })
}

fn check_segment(segment: &str) -> std::result::Result<(), &'static str> {
    if segment.len() > MAX_LABEL_LENGTH {
        return Err("must be at most 63 characters");
    }
    let alnum = |c: char| c.is_ascii_alphanumeric();
    if !segment.starts_with(alnum) || !segment.ends_with(alnum) {
        return Err("must start and end with an alphanumeric character");
    }
    if !segment
        .chars()
        .all(|c| alnum(c) || c == '-' || c == '_' || c == '.')
    {
        return Err("may only contain alphanumerics, '-', '_' or '.'");
    }
    Ok(())
}
