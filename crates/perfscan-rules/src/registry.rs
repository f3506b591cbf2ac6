//! The process-wide rule registry

use std::sync::OnceLock;

use perfscan_isg::Language;

use crate::catalog::builtin_rules;
use crate::Rule;

/// An ordered, read-only set of rules
pub struct RuleRegistry {
    rules: Vec<Box<dyn Rule>>,
}

static BUILTIN: OnceLock<RuleRegistry> = OnceLock::new();

impl RuleRegistry {
    /// Registry over the given rules; a later rule reusing an id is dropped
    pub fn new(rules: Vec<Box<dyn Rule>>) -> Self {
        let mut unique: Vec<Box<dyn Rule>> = Vec::with_capacity(rules.len());
        for rule in rules {
            if !unique.iter().any(|r| r.meta().id == rule.meta().id) {
                unique.push(rule);
            }
        }
        Self { rules: unique }
    }

    /// The built-in catalog, created on first use and shared afterwards
    pub fn builtin() -> &'static RuleRegistry {
        BUILTIN.get_or_init(|| RuleRegistry::new(builtin_rules()))
    }

    pub fn get(&self, id: &str) -> Option<&dyn Rule> {
        self.rules
            .iter()
            .find(|r| r.meta().id == id)
            .map(|r| r.as_ref())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Rule> {
        self.rules.iter().map(|r| r.as_ref())
    }

    /// Rules whose language set admits `language`
    pub fn applicable(&self, language: Language) -> impl Iterator<Item = &dyn Rule> {
        self.iter().filter(move |r| r.meta().applies_to(language))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
