//! npm range compiler
//!
//! Supports npm range specifications:
//! - `1.2.3`, `=1.2.3` - exact match
//! - `^1.2.3` - compatible with version (>=1.2.3 <2.0.0, narrower for 0.x)
//! - `~1.2.3` - approximately equivalent (>=1.2.3 <1.3.0)
//! - `>=1.2.3`, `>1.2.3`, `<=1.2.3`, `<1.2.3` - comparison operators
//! - `1.2.x`, `1.x`, `1.*`, `*` - wildcards
//! - `1.0.0 - 2.0.0` - hyphen range (inclusive on both ends)
//! - `a b` (AND) and `a || b` (OR)
//! - `latest` and `npm:alias@1.2.3` - matched literally
//!
//! Ranges that point at a URL, git remote or local path are ignored.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{info, warn};

use crate::constraint::bounds::{ensure_three, next_major, next_minor, next_patch, triple};
use crate::constraint::compiler::ConstraintCompiler;
use crate::constraint::types::{
    Compilation, CompiledExpression, Constraint, Dialect, LATEST, Operator,
};

const ALIAS_PREFIX: &str = "npm:";

/// Source specifiers that have no version semantics
static IGNORED_SOURCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:^|[\s|])(?:https?://|file:|git(?:\+[a-z0-9]+)?://)").unwrap()
});

static HYPHEN_RANGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(\d+(?:\.\d+){0,2})\s+-\s+(\d+(?:\.\d+){0,2})\s*$").unwrap()
});

/// Optional operator followed by a version, wildcard, `latest` or alias
static TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(<=|>=|<|>|=|~|\^)?\s*(\d+(?:\.\d+)*(?:\.[x*])?(?:-[0-9a-z.]+)?|latest|npm:[^\s@]+@\d+(?:\.\d+)*|\*)",
    )
    .unwrap()
});

pub struct NpmCompiler;

impl ConstraintCompiler for NpmCompiler {
    fn dialect(&self) -> Dialect {
        Dialect::Npm
    }

    fn compile(&self, raw: &str) -> Compilation {
        let spec = raw.trim();

        if spec == LATEST {
            return Compilation::with_special(
                CompiledExpression::all_of(vec![Constraint::new(Operator::Equal, LATEST)]),
                vec![LATEST.to_string()],
            );
        }

        if IGNORED_SOURCE_RE.is_match(spec) {
            info!("Ignoring npm range pointing at a source location: {}", spec);
            return Compilation::Ignored;
        }

        if spec.starts_with(ALIAS_PREFIX) {
            return match alias_target(spec) {
                Some(version) => Compilation::with_special(
                    CompiledExpression::all_of(vec![Constraint::new(Operator::Equal, version)]),
                    vec![version.to_string()],
                ),
                None => {
                    warn!("Malformed npm alias: {}", spec);
                    Compilation::with_special(CompiledExpression::default(), Vec::new())
                }
            };
        }

        let groups: Vec<Vec<Constraint>> = spec
            .split("||")
            .map(compile_group)
            .filter(|group| !group.is_empty())
            .collect();

        if groups.is_empty() && !spec.is_empty() {
            warn!("Unsupported npm range: {}", spec);
        }
        Compilation::compiled(CompiledExpression::new(groups))
    }
}

/// Version after the last `@` of `npm:name@version`
fn alias_target(spec: &str) -> Option<&str> {
    let at = spec.rfind('@').filter(|&at| at > ALIAS_PREFIX.len())?;
    let version = &spec[at + 1..];
    (!version.is_empty()).then_some(version)
}

/// Compile one whitespace-separated AND group, or a hyphen range
fn compile_group(group: &str) -> Vec<Constraint> {
    if let Some(caps) = HYPHEN_RANGE_RE.captures(group) {
        return vec![
            Constraint::new(Operator::GreaterThanOrEqual, ensure_three(&caps[1])),
            Constraint::new(Operator::LessThanOrEqual, ensure_three(&caps[2])),
        ];
    }

    let mut constraints = Vec::new();

    for caps in TOKEN_RE.captures_iter(group.trim()) {
        let op = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
        let token = &caps[2];
        let lower = token.to_ascii_lowercase();

        if lower == LATEST {
            constraints.push(Constraint::new(Operator::Equal, LATEST));
            continue;
        }
        if lower.starts_with(ALIAS_PREFIX) {
            if let Some(version) = alias_target(token) {
                constraints.push(Constraint::new(Operator::Equal, version));
            }
            continue;
        }

        match op {
            "~" => {
                let floor = ensure_three(token);
                let ceiling = next_minor(&floor);
                constraints.push(Constraint::new(Operator::GreaterThanOrEqual, floor));
                constraints.push(Constraint::new(Operator::LessThan, ceiling));
            }
            "^" => {
                let floor = ensure_three(token);
                let ceiling = match triple(token) {
                    [major, ..] if major > 0 => next_major(&floor),
                    [_, minor, _] if minor > 0 => next_minor(&floor),
                    _ => next_patch(&floor),
                };
                constraints.push(Constraint::new(Operator::GreaterThanOrEqual, floor));
                constraints.push(Constraint::new(Operator::LessThan, ceiling));
            }
            "" | "=" => match expand_wildcard(&lower) {
                Some(expanded) => constraints.extend(expanded),
                None => constraints.push(Constraint::new(Operator::Equal, ensure_three(token))),
            },
            _ => {
                let Ok(op) = op.parse::<Operator>() else {
                    continue;
                };
                constraints.push(Constraint::new(op, ensure_three(token)));
            }
        }
    }

    constraints
}

/// Expand `*`, `M.x` and `M.m.x` (also spelled with `*`) into bounds
fn expand_wildcard(token: &str) -> Option<Vec<Constraint>> {
    if token == "*" {
        return Some(vec![Constraint::new(Operator::GreaterThanOrEqual, "0.0.0")]);
    }

    let is_wild = |part: &str| part == "x" || part == "*";
    let parts: Vec<&str> = token.split('.').collect();
    let (floor, ceiling) = match parts.as_slice() {
        [_, x] if is_wild(x) => {
            let floor = ensure_three(token);
            let ceiling = next_major(&floor);
            (floor, ceiling)
        }
        [_, _, x] if is_wild(x) => {
            let floor = ensure_three(token);
            let ceiling = next_minor(&floor);
            (floor, ceiling)
        }
        _ => return None,
    };

    Some(vec![
        Constraint::new(Operator::GreaterThanOrEqual, floor),
        Constraint::new(Operator::LessThan, ceiling),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn rendered(raw: &str) -> String {
        NpmCompiler
            .compile(raw)
            .expression()
            .map(ToString::to_string)
            .unwrap_or_default()
    }

    #[rstest]
    // exact
    #[case("1.2.3", "=1.2.3")]
    #[case("=1.2", "=1.2.0")]
    #[case("v1.2.3", "=1.2.3")]
    // caret
    #[case("^1.2.3", ">=1.2.3 <2.0.0")]
    #[case("^0.2.3", ">=0.2.3 <0.3.0")]
    #[case("^0.0.3", ">=0.0.3 <0.0.4")]
    #[case("^1", ">=1.0.0 <2.0.0")]
    // tilde
    #[case("~1.2.3", ">=1.2.3 <1.3.0")]
    #[case("~1.2", ">=1.2.0 <1.3.0")]
    #[case("~1", ">=1.0.0 <1.1.0")]
    // comparison
    #[case(">=1.2.3", ">=1.2.3")]
    #[case(">= 1.2", ">=1.2.0")]
    #[case("<2", "<2.0.0")]
    #[case(">1.0.0 <=1.5.0", ">1.0.0 <=1.5.0")]
    // wildcards
    #[case("*", ">=0.0.0")]
    #[case("2.x", ">=2.0.0 <3.0.0")]
    #[case("1.*", ">=1.0.0 <2.0.0")]
    #[case("3.3.X", ">=3.3.0 <3.4.0")]
    #[case("^1.x", ">=1.0.0 <2.0.0")]
    // hyphen
    #[case("1.0.0 - 2.0.0", ">=1.0.0 <=2.0.0")]
    #[case("1.2 - 2", ">=1.2.0 <=2.0.0")]
    #[case("1.0.0 - 2.0.0 || 3.x", ">=1.0.0 <=2.0.0 || >=3.0.0 <4.0.0")]
    #[case("<0.5.0 || 1 - 1.2", "<0.5.0 || >=1.0.0 <=1.2.0")]
    // OR
    #[case(">=1.0.0 <2.0.0 || 3.0.0", ">=1.0.0 <2.0.0 || =3.0.0")]
    #[case("^1.0.0 || ^2.0.0", ">=1.0.0 <2.0.0 || >=2.0.0 <3.0.0")]
    #[case("|| ^1.0.0", ">=1.0.0 <2.0.0")]
    fn compiles_ranges(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(rendered(raw), expected);
    }

    #[test]
    fn latest_is_a_special_match() {
        let compiled = NpmCompiler.compile(" latest ");
        assert_eq!(compiled.special_matches(), Some(&["latest".to_string()][..]));
        assert_eq!(rendered("latest"), "=latest");
    }

    #[test]
    fn latest_inside_a_group_stays_literal() {
        assert_eq!(rendered("latest || ^1.0.0"), "=latest || >=1.0.0 <2.0.0");
        assert!(NpmCompiler.compile("latest || ^1.0.0").special_matches().is_none());
    }

    #[rstest]
    #[case("npm:string-width@4.2.3", "4.2.3")]
    #[case("npm:@scope/pkg@1.0.0", "1.0.0")]
    fn alias_matches_its_target(#[case] raw: &str, #[case] target: &str) {
        let compiled = NpmCompiler.compile(raw);
        assert_eq!(compiled.special_matches(), Some(&[target.to_string()][..]));
        assert_eq!(rendered(raw), format!("={target}"));
    }

    #[rstest]
    #[case("npm:string-width")]
    #[case("npm:@scope/pkg")]
    #[case("npm:pkg@")]
    fn malformed_alias_has_no_matches(#[case] raw: &str) {
        let compiled = NpmCompiler.compile(raw);
        assert!(compiled.is_ok());
        assert_eq!(compiled.special_matches(), Some(&[][..]));
        assert_eq!(compiled.expression(), Some(&CompiledExpression::default()));
    }

    #[rstest]
    #[case("https://github.com/user/repo/archive/v1.0.0.tar.gz")]
    #[case("http://example.com/pkg.tgz")]
    #[case("file:../local-package")]
    #[case("git://github.com/user/repo.git")]
    #[case("git+ssh://git@github.com/user/repo.git#v1.0.0")]
    #[case("^1.0.0 || https://example.com/pkg.tgz")]
    fn source_locations_are_ignored(#[case] raw: &str) {
        assert_eq!(NpmCompiler.compile(raw), Compilation::Ignored);
    }

    #[rstest]
    #[case("")]
    #[case("next")]
    #[case("beta")]
    #[case("workspace-protocol")]
    fn unsupported_ranges_compile_to_nothing(#[case] raw: &str) {
        assert_eq!(NpmCompiler.compile(raw), Compilation::empty());
    }
}
