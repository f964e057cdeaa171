//! NuGet version range compiler
//!
//! Supports NuGet range notation:
//! - `1.0` - minimum version (>=1.0.0)
//! - `[1.0]` - exact version
//! - `[1.0,2.0)`, `(1.0,]`, `(,2.0]` - intervals with open/closed sides
//! - `1.*`, `1.2.*`, `*` - floating versions
//! - `>1.0, <=2.0` - operator lists, converted to an interval

use std::sync::LazyLock;

use regex::Regex;
use tracing::warn;

use crate::constraint::bounds::{ensure_three, is_numeric_version, next_major, next_minor};
use crate::constraint::compiler::ConstraintCompiler;
use crate::constraint::types::{Compilation, CompiledExpression, Constraint, Dialect, Operator};

static INTERVAL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([\[(])\s*([^,\s]*)\s*,\s*([^\])\s]*)\s*([\])])$").unwrap()
});

static EXACT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[\s*(\d+(?:\.\d+)*)\s*\]$").unwrap());

static OPERATOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(<=|>=|<|>|=)\s*(\d+(?:\.\d+)*)$").unwrap());

/// One side of an interval
#[derive(Debug, Clone, PartialEq, Eq)]
struct Bound {
    version: String,
    inclusive: bool,
}

/// Interval with optional lower and upper bounds
#[derive(Debug, Default, PartialEq, Eq)]
struct Interval {
    lower: Option<Bound>,
    upper: Option<Bound>,
}

impl Interval {
    /// Read the bracket form `[lo,hi)`
    fn from_brackets(spec: &str) -> Option<Self> {
        let caps = INTERVAL_RE.captures(spec)?;
        let side = |version: &str, inclusive: bool| {
            (!version.is_empty()).then(|| Bound {
                version: version.to_string(),
                inclusive,
            })
        };

        Some(Self {
            lower: side(&caps[2], &caps[1] == "["),
            upper: side(&caps[3], &caps[4] == "]"),
        })
    }

    /// Read an operator list such as `>1.0, <=2.0`
    ///
    /// A later clause replaces an earlier one on the same side.
    fn from_operators(spec: &str) -> Option<Self> {
        let mut interval = Self::default();

        for clause in spec.split(',').map(str::trim) {
            let caps = OPERATOR_RE.captures(clause)?;
            let version = caps[2].to_string();
            let bound = |inclusive| {
                Some(Bound {
                    version: version.clone(),
                    inclusive,
                })
            };

            match &caps[1] {
                ">" => interval.lower = bound(false),
                ">=" => interval.lower = bound(true),
                "<" => interval.upper = bound(false),
                "<=" => interval.upper = bound(true),
                _ => {
                    interval.lower = bound(true);
                    interval.upper = bound(true);
                }
            }
        }

        Some(interval)
    }

    fn into_constraints(self) -> Vec<Constraint> {
        let lower = self.lower.map(|bound| {
            let op = if bound.inclusive {
                Operator::GreaterThanOrEqual
            } else {
                Operator::GreaterThan
            };
            Constraint::new(op, ensure_three(&bound.version))
        });
        let upper = self.upper.map(|bound| {
            let op = if bound.inclusive {
                Operator::LessThanOrEqual
            } else {
                Operator::LessThan
            };
            Constraint::new(op, ensure_three(&bound.version))
        });

        let constraints: Vec<Constraint> = lower.into_iter().chain(upper).collect();
        if constraints.is_empty() {
            vec![Constraint::new(Operator::GreaterThanOrEqual, "0.0.0")]
        } else {
            constraints
        }
    }
}

pub struct NugetCompiler;

impl ConstraintCompiler for NugetCompiler {
    fn dialect(&self) -> Dialect {
        Dialect::Nuget
    }

    fn compile(&self, raw: &str) -> Compilation {
        let spec = raw.trim();
        if spec.is_empty() {
            return Compilation::empty();
        }

        match compile_range(spec) {
            Some(constraints) => Compilation::compiled(CompiledExpression::all_of(constraints)),
            None => {
                warn!("Unsupported NuGet version range: {}", spec);
                Compilation::empty()
            }
        }
    }
}

fn compile_range(spec: &str) -> Option<Vec<Constraint>> {
    if let Some(caps) = EXACT_RE.captures(spec) {
        return Some(vec![Constraint::new(Operator::Equal, ensure_three(&caps[1]))]);
    }

    if let Some(interval) = Interval::from_brackets(spec) {
        return Some(interval.into_constraints());
    }

    if spec == "*" {
        return Some(vec![Constraint::new(Operator::GreaterThanOrEqual, "0.0.0")]);
    }

    if let Some(base) = spec.strip_suffix(".*") {
        if !is_numeric_version(base) {
            return None;
        }
        let floor = ensure_three(base);
        let ceiling = if base.contains('.') {
            next_minor(&floor)
        } else {
            next_major(&floor)
        };
        return Some(vec![
            Constraint::new(Operator::GreaterThanOrEqual, floor),
            Constraint::new(Operator::LessThan, ceiling),
        ]);
    }

    if is_numeric_version(spec) {
        return Some(vec![Constraint::new(
            Operator::GreaterThanOrEqual,
            ensure_three(spec),
        )]);
    }

    Interval::from_operators(spec).map(Interval::into_constraints)
}
