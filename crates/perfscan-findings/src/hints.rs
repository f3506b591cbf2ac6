//! Caller-supplied hints

use std::collections::BTreeSet;

use perfscan_isg::root_name;
use serde::{Deserialize, Serialize};

/// Names the caller knows to be hot or large
///
/// Hints only break ties: they raise the severity of matches that fired on
/// structural evidence and mark scopes as large-input-suspected. They never
/// produce a finding by themselves.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisHints {
    /// Scope names executed frequently
    pub hot_scopes: BTreeSet<String>,
    /// Collection names that may hold many elements
    pub large_collections: BTreeSet<String>,
}

impl AnalysisHints {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_hot_scope(mut self, name: impl Into<String>) -> Self {
        self.hot_scopes.insert(name.into());
        self
    }

    pub fn with_large_collection(mut self, name: impl Into<String>) -> Self {
        self.large_collections.insert(name.into());
        self
    }

    pub fn is_hot(&self, scope: &str) -> bool {
        self.hot_scopes.contains(scope)
    }

    /// Whether `path` or its root names a large collection
    pub fn is_large(&self, path: &str) -> bool {
        self.large_collections.contains(path) || self.large_collections.contains(root_name(path))
    }

    /// Whether any hint names `name`
    pub fn mentions(&self, name: &str) -> bool {
        self.is_hot(name) || self.is_large(name)
    }

    pub fn is_empty(&self) -> bool {
        self.hot_scopes.is_empty() && self.large_collections.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_large_matches_path_root() {
        let hints = AnalysisHints::new().with_large_collection("users");
        assert!(hints.is_large("users"));
        assert!(hints.is_large("users.items"));
        assert!(!hints.is_large("orders"));
    }

    #[test]
    fn test_mentions_either_set() {
        let hints = AnalysisHints::new().with_hot_scope("render");
        assert!(hints.mentions("render"));
        assert!(!hints.mentions("parse"));
        assert!(!hints.is_empty());
        assert!(AnalysisHints::default().is_empty());
    }
}
