//! Input syntax trees as emitted by an external language service

use perfscan_isg::Span;
use serde::{Deserialize, Serialize};

/// One node of a concrete syntax tree
///
/// The shape follows tree-sitter: a grammar kind, whether the node is named
/// (operators and punctuation are not), the field name it occupies in its
/// parent, optional leaf text, and ordered children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyntaxNode {
    pub kind: String,
    #[serde(default = "default_named")]
    pub named: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    pub span: Span,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<SyntaxNode>,
}

fn default_named() -> bool {
    true
}

/// A syntax tree together with the language it was parsed from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyntaxDump {
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub source_path: Option<String>,
    pub tree: SyntaxNode,
}

impl SyntaxNode {
    /// First child occupying any of the given fields
    pub fn field_any(&self, names: &[&str]) -> Option<&SyntaxNode> {
        self.children
            .iter()
            .find(|c| c.field.as_deref().is_some_and(|f| names.contains(&f)))
    }

    /// All children occupying any of the given fields
    pub fn fields_any<'a>(&'a self, names: &'a [&'a str]) -> impl Iterator<Item = &'a SyntaxNode> {
        self.children
            .iter()
            .filter(move |c| c.field.as_deref().is_some_and(|f| names.contains(&f)))
    }

    pub fn named_children(&self) -> impl Iterator<Item = &SyntaxNode> {
        self.children.iter().filter(|c| c.named)
    }

    /// Text of the first unnamed child, usually an operator token
    pub fn first_token(&self) -> Option<&str> {
        self.children
            .iter()
            .find(|c| !c.named)
            .map(|c| c.text.as_deref().unwrap_or(c.kind.as_str()))
    }

    /// Leaf text, falling back to the kind for keyword-like leaves (`self`, `this`)
    pub fn leaf_text(&self) -> &str {
        self.text.as_deref().unwrap_or(self.kind.as_str())
    }

    /// Concatenated leaf texts of the subtree, space separated
    pub fn flat_text(&self) -> String {
        if self.children.is_empty() {
            return self.leaf_text().to_string();
        }
        self.children
            .iter()
            .map(SyntaxNode::flat_text)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_defaults() {
        let node: SyntaxNode = serde_json::from_str(
            r#"{"kind":"identifier","text":"x","span":{"start":0,"end":1,"start_line":1,"end_line":1}}"#,
        )
        .expect("valid node");
        assert!(node.named);
        assert!(node.children.is_empty());
        assert_eq!(node.leaf_text(), "x");
    }

    #[test]
    fn test_dump_envelope() {
        let dump: SyntaxDump = serde_json::from_str(
            r#"{"language":"python","tree":{"kind":"module","span":{"start":0,"end":0,"start_line":1,"end_line":1}}}"#,
        )
        .expect("valid dump");
        assert_eq!(dump.language.as_deref(), Some("python"));
        assert_eq!(dump.tree.kind, "module");
    }
}
