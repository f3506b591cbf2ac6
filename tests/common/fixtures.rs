use std::fs;
use std::path::{Path, PathBuf};

use perfscan::adapter::{parse_sexp, SyntaxNode};
use perfscan::engine::{analyze, AnalysisError, AnalysisHints, AnalysisRequest, Report};

/// Path of a dump under tests/fixtures/
pub fn fixture_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Load a dump from tests/fixtures/
pub fn load_fixture(name: &str) -> String {
    let path = fixture_path(name);
    fs::read_to_string(&path).unwrap_or_else(|e| panic!("Failed to load fixture {}: {}", name, e))
}

/// Parse a fixture into a syntax tree
pub fn fixture_tree(name: &str) -> SyntaxNode {
    parse_sexp(&load_fixture(name)).unwrap_or_else(|e| panic!("Fixture {} does not parse: {}", name, e))
}

/// Analyze a fixture with default configuration and no hints
pub fn analyze_fixture(lang: &str, name: &str) -> Result<Report, AnalysisError> {
    analyze_fixture_with(lang, name, AnalysisHints::default())
}

pub fn analyze_fixture_with(lang: &str, name: &str, hints: AnalysisHints) -> Result<Report, AnalysisError> {
    let tree = fixture_tree(name);
    analyze(&AnalysisRequest::new(lang, &tree).with_hints(hints))
}

/// Analyze inline S-expression source
pub fn analyze_source(lang: &str, source: &str) -> Result<Report, AnalysisError> {
    let tree = parse_sexp(source).unwrap_or_else(|e| panic!("Source does not parse: {}", e));
    analyze(&AnalysisRequest::new(lang, &tree))
}
