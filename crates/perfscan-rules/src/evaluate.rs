//! Running the registry over one ISG

use rayon::prelude::*;

use perfscan_isg::{Budget, IsgIndex};

use crate::{FaultRecord, Match, Rule, RuleContext, RuleRegistry, RuleSettings};

/// Matches and faults of one evaluation
#[derive(Debug, Clone, Default)]
pub struct Evaluation {
    /// Canonically ordered: span start, span end (outer first), rule id, node
    pub matches: Vec<Match>,
    pub faults: Vec<FaultRecord>,
    /// False when the budget ran out before every rule finished
    pub complete: bool,
}

struct RuleOutcome {
    matches: Vec<Match>,
    faults: Vec<FaultRecord>,
    finished: bool,
}

/// Evaluate every applicable, enabled rule against the indexed ISG
///
/// Rules run in parallel and never see each other's results. A rule that
/// faults on a node loses only that node; a rule that runs out of budget
/// loses all of its matches.
pub fn evaluate(
    registry: &RuleRegistry,
    index: &IsgIndex<'_>,
    settings: &RuleSettings,
    budget: Budget,
) -> Evaluation {
    let language = index.isg().language;
    let cx = RuleContext::new(index, settings);
    let rules: Vec<&dyn Rule> = registry
        .applicable(language)
        .filter(|r| !settings.disabled.contains(r.meta().id))
        .collect();

    let outcomes: Vec<RuleOutcome> = rules
        .par_iter()
        .map(|rule| run_rule(*rule, &cx, budget))
        .collect();

    let mut evaluation = Evaluation {
        complete: true,
        ..Evaluation::default()
    };
    for outcome in outcomes {
        evaluation.complete &= outcome.finished;
        evaluation.matches.extend(outcome.matches);
        evaluation.faults.extend(outcome.faults);
    }
    evaluation.matches.sort_by(|a, b| {
        a.span
            .start
            .cmp(&b.span.start)
            .then(b.span.end.cmp(&a.span.end))
            .then(a.rule_id.cmp(b.rule_id))
            .then(a.node.cmp(&b.node))
    });
    evaluation
        .faults
        .sort_by(|a, b| a.rule_id.cmp(b.rule_id).then(a.node.cmp(&b.node)));
    evaluation
}

fn run_rule(rule: &dyn Rule, cx: &RuleContext<'_>, budget: Budget) -> RuleOutcome {
    let meta = rule.meta();
    let mut outcome = RuleOutcome {
        matches: Vec::new(),
        faults: Vec::new(),
        finished: true,
    };
    let mut ticker = budget.ticker();

    for node in cx.index.nodes() {
        if ticker.tick() {
            outcome.matches.clear();
            outcome.finished = false;
            return outcome;
        }
        if !meta.targets.contains(&node.tag()) {
            continue;
        }
        match rule.check(node, cx) {
            Ok(Some(captures)) => outcome.matches.push(Match {
                rule_id: meta.id,
                node: node.id,
                span: node.span,
                scope: cx.scope_of(node).id,
                loop_depth: cx.index.loop_depth(node.id),
                captures,
            }),
            Ok(None) => {}
            Err(fault) => outcome.faults.push(FaultRecord {
                rule_id: meta.id,
                node: node.id,
                span: node.span,
                fault,
            }),
        }
    }
    outcome
}
