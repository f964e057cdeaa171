//! Matching candidate versions against a compiled expression

use tracing::debug;

use crate::constraint::compiler::compile;
use crate::constraint::types::{
    Analysis, Compilation, CompiledExpression, Constraint, Dialect, LATEST, Operator,
};
use crate::version::parser::parse;
use crate::version::types::StructuredVersion;

/// AND-group with its operands parsed once up front
enum PreparedGroup {
    /// Holds only for the literal string `latest`
    Latest,
    /// Every bound must hold; `None` marks an operand that can never match
    Bounds(Vec<(Operator, Option<StructuredVersion>)>),
}

impl PreparedGroup {
    fn new(group: &[Constraint]) -> Self {
        if group.iter().any(Constraint::is_latest) {
            return PreparedGroup::Latest;
        }

        let bounds = group
            .iter()
            .map(|constraint| {
                let operand = Some(parse(&constraint.version)).filter(|v| !v.is_unparsed());
                (constraint.op, operand)
            })
            .collect();
        PreparedGroup::Bounds(bounds)
    }

    fn holds(&self, raw: &str, candidate: &StructuredVersion) -> bool {
        match self {
            PreparedGroup::Latest => raw == LATEST,
            PreparedGroup::Bounds(_) if candidate.is_unparsed() => false,
            PreparedGroup::Bounds(bounds) => bounds.iter().all(|(op, operand)| {
                operand
                    .as_ref()
                    .is_some_and(|operand| satisfies(candidate, *op, operand))
            }),
        }
    }
}

fn satisfies(candidate: &StructuredVersion, op: Operator, operand: &StructuredVersion) -> bool {
    match op {
        Operator::Equal => candidate.equal(operand),
        Operator::NotEqual => !candidate.equal(operand),
        Operator::LessThan => candidate.less_than(operand),
        Operator::LessThanOrEqual => candidate.less_or_equal(operand),
        Operator::GreaterThan => candidate.greater_than(operand),
        Operator::GreaterThanOrEqual => candidate.greater_or_equal(operand),
    }
}

/// Candidates satisfying at least one AND-group, in their original order
///
/// A group containing `latest` only matches the literal string `latest`.
/// Candidates without a numeric core never satisfy a numeric bound.
pub fn evaluate<S: AsRef<str>>(expression: &CompiledExpression, candidates: &[S]) -> Vec<String> {
    let groups: Vec<PreparedGroup> = expression
        .groups
        .iter()
        .map(|group| PreparedGroup::new(group))
        .collect();

    candidates
        .iter()
        .map(AsRef::as_ref)
        .filter(|raw| {
            let candidate = parse(raw);
            groups.iter().any(|group| group.holds(raw, &candidate))
        })
        .map(str::to_string)
        .collect()
}

/// Compile `raw` and run it against `candidates`
///
/// Ignored sources produce no expression and no matches. Matches decided
/// by the range itself (`latest`, npm aliases) are returned as they are.
pub fn analyze<S: AsRef<str>>(dialect: Dialect, raw: &str, candidates: &[S]) -> Analysis {
    debug!(
        "Analyzing {} range {:?} against {} candidates",
        dialect.as_str(),
        raw,
        candidates.len()
    );
    let (expression, matches) = match compile(dialect, raw) {
        Compilation::Ignored => (None, Vec::new()),
        Compilation::Compiled {
            expression,
            special_matches: Some(special),
        } => (Some(expression), special),
        Compilation::Compiled {
            expression,
            special_matches: None,
        } => {
            let matches = evaluate(&expression, candidates);
            (Some(expression), matches)
        }
    };

    Analysis {
        raw: raw.to_string(),
        expression,
        matches,
    }
}
