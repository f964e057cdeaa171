//! Python requirement specifier compiler
//!
//! Comma-separated clauses are ANDed together. Each clause is one of:
//! - `==1.2`, `===1.2` - exact match
//! - `==1.*`, `==1.2.*` - prefix match
//! - `!=1.2`, `!=1.2.*` - exclusion
//! - `<`, `<=`, `>`, `>=` - comparison
//! - `~=1.4`, `~=1.4.5` - compatible release
//!
//! `!=` with a wildcard is a disjunction, so the clauses are distributed into
//! one AND-group per combination. Combinations whose bounds cannot overlap
//! are dropped while distributing.

use std::cmp::Ordering;
use std::sync::LazyLock;

use regex::Regex;
use tracing::warn;

use crate::constraint::bounds::{component_count, ensure_three, next_major, next_minor, next_patch};
use crate::constraint::compiler::ConstraintCompiler;
use crate::constraint::types::{Compilation, CompiledExpression, Constraint, Dialect, Operator};
use crate::version::parser::parse;
use crate::version::types::StructuredVersion;

static CLAUSE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(===|==|!=|<=|>=|<|>|~=)\s*(\d+(?:\.\d+)*)(\.\*)?$").unwrap()
});

/// Alternatives produced by one clause; any one of them may hold
type Alternatives = Vec<Vec<Constraint>>;

/// Upper limit on AND-groups produced by distributing a specifier
const MAX_GROUPS: usize = 1024;

pub struct PypiCompiler;

impl ConstraintCompiler for PypiCompiler {
    fn dialect(&self) -> Dialect {
        Dialect::Python
    }

    fn compile(&self, raw: &str) -> Compilation {
        let clauses: Vec<Alternatives> = raw
            .split(',')
            .map(str::trim)
            .filter(|clause| !clause.is_empty())
            .filter_map(|clause| {
                compile_clause(clause).or_else(|| {
                    warn!("Unsupported Python version clause: {}", clause);
                    None
                })
            })
            .collect();

        if clauses.is_empty() {
            return Compilation::empty();
        }
        match distribute(clauses, MAX_GROUPS) {
            Some(groups) => Compilation::compiled(CompiledExpression::new(groups)),
            None => {
                warn!(
                    "Python specifier expands to more than {} groups: {}",
                    MAX_GROUPS, raw
                );
                Compilation::empty()
            }
        }
    }
}

fn compile_clause(clause: &str) -> Option<Alternatives> {
    let caps = CLAUSE_RE.captures(clause)?;
    let op = &caps[1];
    let version = &caps[2];
    let wildcard = caps.get(3).is_some();

    let alternatives = match (op, wildcard) {
        ("==", true) => {
            let (floor, ceiling) = prefix_bounds(version);
            vec![vec![
                Constraint::new(Operator::GreaterThanOrEqual, floor),
                Constraint::new(Operator::LessThan, ceiling),
            ]]
        }
        ("!=", true) => {
            let (floor, ceiling) = prefix_bounds(version);
            vec![
                vec![Constraint::new(Operator::LessThan, floor)],
                vec![Constraint::new(Operator::GreaterThanOrEqual, ceiling)],
            ]
        }
        ("==" | "===", false) => {
            vec![vec![Constraint::new(Operator::Equal, ensure_three(version))]]
        }
        ("~=", false) => {
            let ceiling = match component_count(version) {
                0 | 1 => return None,
                2 => next_major(version),
                3 => next_minor(version),
                _ => next_patch(version),
            };
            vec![vec![
                Constraint::new(Operator::GreaterThanOrEqual, ensure_three(version)),
                Constraint::new(Operator::LessThan, ceiling),
            ]]
        }
        (_, true) => return None,
        (op, false) => {
            let op = op.parse::<Operator>().ok()?;
            vec![vec![Constraint::new(op, ensure_three(version))]]
        }
    };

    Some(alternatives)
}

/// Bounds of the versions starting with the given components
fn prefix_bounds(prefix: &str) -> (String, String) {
    let floor = ensure_three(prefix);
    let ceiling = match component_count(prefix) {
        1 => next_major(&floor),
        2 => next_minor(&floor),
        _ => next_patch(&floor),
    };
    (floor, ceiling)
}

/// AND together clauses that may each be a disjunction
///
/// Returns `None` once more than `limit` satisfiable groups remain.
fn distribute(clauses: Vec<Alternatives>, limit: usize) -> Option<Vec<Vec<Constraint>>> {
    let mut groups = vec![Vec::new()];
    for alternatives in clauses {
        groups = groups
            .iter()
            .flat_map(|group| {
                alternatives.iter().map(move |alternative| {
                    let mut combined: Vec<Constraint> = group.clone();
                    combined.extend(alternative.iter().cloned());
                    combined
                })
            })
            .filter(|group| !is_unsatisfiable(group))
            .collect();
        if groups.len() > limit {
            return None;
        }
    }
    Some(groups)
}

/// A bound operand and whether the bound includes it
type Bound = (StructuredVersion, bool);

/// Whether no version can lie between the tightest lower and upper bound
fn is_unsatisfiable(group: &[Constraint]) -> bool {
    let mut lower: Option<Bound> = None;
    let mut upper: Option<Bound> = None;

    for constraint in group {
        let version = parse(&constraint.version);
        if version.is_unparsed() {
            continue;
        }
        let (is_lower, is_upper, inclusive) = match constraint.op {
            Operator::Equal => (true, true, true),
            Operator::GreaterThan => (true, false, false),
            Operator::GreaterThanOrEqual => (true, false, true),
            Operator::LessThan => (false, true, false),
            Operator::LessThanOrEqual => (false, true, true),
            Operator::NotEqual => continue,
        };
        if is_lower {
            tighten(&mut lower, (version.clone(), inclusive), Ordering::Greater);
        }
        if is_upper {
            tighten(&mut upper, (version, inclusive), Ordering::Less);
        }
    }

    match (lower, upper) {
        (Some((low, low_inclusive)), Some((high, high_inclusive))) => match low.cmp(&high) {
            Ordering::Greater => true,
            Ordering::Equal => !(low_inclusive && high_inclusive),
            Ordering::Less => false,
        },
        _ => false,
    }
}

/// Replace `current` when `candidate` is stricter in the `stricter` direction
fn tighten(current: &mut Option<Bound>, candidate: Bound, stricter: Ordering) {
    let replace = match current {
        None => true,
        Some((version, inclusive)) => match candidate.0.cmp(version) {
            Ordering::Equal => *inclusive && !candidate.1,
            ordering => ordering == stricter,
        },
    };
    if replace {
        *current = Some(candidate);
    }
}
