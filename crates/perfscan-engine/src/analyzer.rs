//! The request pipeline

use perfscan_adapter::{AdapterRegistry, SyntaxNode};
use perfscan_complexity::estimate;
use perfscan_findings::{Aggregator, AnalysisHints};
use perfscan_rules::{evaluate, RuleRegistry};
use perfscan_suggest::attach_suggestions;

use crate::report::summarize;
use crate::{AnalysisError, ConfigError, EngineConfig, Report};

/// One unit of source code submitted for analysis
#[derive(Debug, Clone)]
pub struct AnalysisRequest<'a> {
    /// Language tag; aliases such as `py` or `ts` are accepted
    pub language: &'a str,
    pub tree: &'a SyntaxNode,
    pub hints: AnalysisHints,
    /// Overrides the configured budget for this request
    pub budget_ms: Option<u64>,
}

impl<'a> AnalysisRequest<'a> {
    pub fn new(language: &'a str, tree: &'a SyntaxNode) -> Self {
        Self {
            language,
            tree,
            hints: AnalysisHints::default(),
            budget_ms: None,
        }
    }

    pub fn with_hints(mut self, hints: AnalysisHints) -> Self {
        self.hints = hints;
        self
    }

    pub fn with_budget_ms(mut self, budget_ms: u64) -> Self {
        self.budget_ms = Some(budget_ms);
        self
    }
}

/// Runs requests against a read-only rule registry
///
/// An analyzer holds no per-request state; one instance can serve any
/// number of requests, including concurrently.
pub struct Analyzer {
    registry: &'static RuleRegistry,
    adapters: AdapterRegistry,
    config: EngineConfig,
}

impl Default for Analyzer {
    fn default() -> Self {
        Self {
            registry: RuleRegistry::builtin(),
            adapters: AdapterRegistry::builtin(),
            config: EngineConfig::default(),
        }
    }
}

impl Analyzer {
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        Self::with_registry(RuleRegistry::builtin(), config)
    }

    pub fn with_registry(registry: &'static RuleRegistry, config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate(registry)?;
        Ok(Self {
            registry,
            adapters: AdapterRegistry::builtin(),
            config,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn registry(&self) -> &'static RuleRegistry {
        self.registry
    }

    /// Adapt, evaluate rules and estimate complexity concurrently, then
    /// aggregate, rank and attach suggestions
    ///
    /// Input errors abort with no findings. When the budget expires the
    /// finished part is still aggregated and returned inside
    /// [`AnalysisError::AnalysisTimeout`].
    pub fn analyze(&self, request: &AnalysisRequest<'_>) -> Result<Report, AnalysisError> {
        let budget = self.config.budget(request.budget_ms);
        let isg = self.adapters.adapt(request.language, request.tree)?;
        let index = isg.index();

        let rule_settings = self.config.rule_settings();
        let (evaluation, estimation) = rayon::join(
            || evaluate(self.registry, &index, &rule_settings, budget),
            || estimate(&index, budget),
        );

        let settings = self.config.aggregate_settings();
        let aggregator = Aggregator::new(self.registry, &index, &request.hints, &settings);
        let mut findings = aggregator.aggregate(&evaluation.matches, &estimation);
        attach_suggestions(&mut findings, isg.language);

        let scopes = summarize(&index, &estimation, &findings);
        let partial = !(evaluation.complete && estimation.complete);
        let report = Report {
            language: isg.language,
            findings,
            scopes,
            faults: evaluation.faults,
            partial,
        };

        if partial {
            return Err(AnalysisError::AnalysisTimeout {
                budget_ms: request.budget_ms.or(self.config.budget_ms).unwrap_or_default(),
                partial: Box::new(report),
            });
        }
        Ok(report)
    }
}

/// Analyze with the built-in catalog and default configuration
pub fn analyze(request: &AnalysisRequest<'_>) -> Result<Report, AnalysisError> {
    Analyzer::default().analyze(request)
}
