//! Source languages the engine understands

use std::fmt;

use serde::{Deserialize, Serialize};

/// A source language with a registered adapter
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Python,
    JavaScript,
    TypeScript,
    Rust,
    Go,
    Java,
}

impl Language {
    pub const ALL: [Language; 6] = [
        Language::Python,
        Language::JavaScript,
        Language::TypeScript,
        Language::Rust,
        Language::Go,
        Language::Java,
    ];

    /// Resolve a caller-supplied language tag (case-insensitive, common aliases)
    pub fn from_tag(tag: &str) -> Option<Language> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "python" | "py" | "python3" => Some(Language::Python),
            "javascript" | "js" | "jsx" | "node" => Some(Language::JavaScript),
            "typescript" | "ts" | "tsx" => Some(Language::TypeScript),
            "rust" | "rs" => Some(Language::Rust),
            "go" | "golang" => Some(Language::Go),
            "java" => Some(Language::Java),
            _ => None,
        }
    }

    /// Canonical tag
    pub fn tag(&self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::JavaScript => "javascript",
            Language::TypeScript => "typescript",
            Language::Rust => "rust",
            Language::Go => "go",
            Language::Java => "java",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aliases_resolve() {
        assert_eq!(Language::from_tag("PY"), Some(Language::Python));
        assert_eq!(Language::from_tag("ts"), Some(Language::TypeScript));
        assert_eq!(Language::from_tag("golang"), Some(Language::Go));
        assert_eq!(Language::from_tag("cobol"), None);
    }

    #[test]
    fn test_tag_round_trips() {
        for lang in Language::ALL {
            assert_eq!(Language::from_tag(lang.tag()), Some(lang));
        }
    }
}
