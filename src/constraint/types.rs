//! Common types for compiled range expressions

use std::fmt;

use serde::Serialize;

/// Literal that only ever matches itself
pub const LATEST: &str = "latest";

/// Comparison operator of a single constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Equal,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
}

impl Operator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Equal => "=",
            Operator::NotEqual => "!=",
            Operator::LessThan => "<",
            Operator::LessThanOrEqual => "<=",
            Operator::GreaterThan => ">",
            Operator::GreaterThanOrEqual => ">=",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Operator {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "=" | "==" => Ok(Operator::Equal),
            "!=" => Ok(Operator::NotEqual),
            "<" => Ok(Operator::LessThan),
            "<=" => Ok(Operator::LessThanOrEqual),
            ">" => Ok(Operator::GreaterThan),
            ">=" => Ok(Operator::GreaterThanOrEqual),
            _ => Err(()),
        }
    }
}

/// Operator plus the version string it compares against
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constraint {
    pub op: Operator,
    pub version: String,
}

impl Constraint {
    pub fn new(op: Operator, version: impl Into<String>) -> Self {
        Self {
            op,
            version: version.into(),
        }
    }

    pub fn is_latest(&self) -> bool {
        self.version == LATEST
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.op, self.version)
    }
}

/// OR of AND-groups of constraints
///
/// Satisfied when every constraint of at least one group holds. An
/// expression without groups matches nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompiledExpression {
    pub groups: Vec<Vec<Constraint>>,
}

impl CompiledExpression {
    pub fn new(groups: Vec<Vec<Constraint>>) -> Self {
        Self { groups }
    }

    /// Expression with a single AND-group
    pub fn all_of(group: Vec<Constraint>) -> Self {
        Self {
            groups: vec![group],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

impl fmt::Display for CompiledExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let groups: Vec<String> = self
            .groups
            .iter()
            .map(|group| {
                group
                    .iter()
                    .map(Constraint::to_string)
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect();
        f.write_str(&groups.join(" || "))
    }
}

impl Serialize for CompiledExpression {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let groups: Vec<Vec<String>> = self
            .groups
            .iter()
            .map(|group| group.iter().map(Constraint::to_string).collect())
            .collect();
        groups.serialize(serializer)
    }
}

/// Range grammar of one ecosystem
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum Dialect {
    /// npm ranges (`^1.2.3`, `~1.2`, `1.x`, `>=1 <2 || 3.0.0`)
    Npm,
    /// Python requirement specifiers (`>=1.0,<2.0`, `~=1.4`, `==1.2.*`)
    #[value(alias = "pypi")]
    Python,
    /// NuGet intervals (`[1.0,2.0)`, `1.*`, `1.0`)
    Nuget,
}

impl Dialect {
    pub fn as_str(&self) -> &'static str {
        match self {
            Dialect::Npm => "npm",
            Dialect::Python => "python",
            Dialect::Nuget => "nuget",
        }
    }
}

impl std::str::FromStr for Dialect {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "npm" | "a" => Ok(Dialect::Npm),
            "python" | "pypi" | "b" => Ok(Dialect::Python),
            "nuget" | "c" => Ok(Dialect::Nuget),
            _ => Err(()),
        }
    }
}

/// Outcome of compiling a range string
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Compilation {
    /// The range compiled; `expression` may still be empty
    Compiled {
        expression: CompiledExpression,
        /// Matches decided by the range itself (`latest`, `npm:alias@1.0.0`)
        special_matches: Option<Vec<String>>,
    },
    /// The range points at a URL or file and has no version semantics
    Ignored,
}

impl Compilation {
    pub fn compiled(expression: CompiledExpression) -> Self {
        Compilation::Compiled {
            expression,
            special_matches: None,
        }
    }

    pub fn with_special(expression: CompiledExpression, matches: Vec<String>) -> Self {
        Compilation::Compiled {
            expression,
            special_matches: Some(matches),
        }
    }

    pub fn empty() -> Self {
        Self::compiled(CompiledExpression::default())
    }

    /// `false` only for [`Compilation::Ignored`]
    pub fn is_ok(&self) -> bool {
        matches!(self, Compilation::Compiled { .. })
    }

    pub fn expression(&self) -> Option<&CompiledExpression> {
        match self {
            Compilation::Compiled { expression, .. } => Some(expression),
            Compilation::Ignored => None,
        }
    }

    pub fn special_matches(&self) -> Option<&[String]> {
        match self {
            Compilation::Compiled {
                special_matches, ..
            } => special_matches.as_deref(),
            Compilation::Ignored => None,
        }
    }
}

/// A range together with the candidates it selected
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Analysis {
    pub raw: String,
    #[serde(rename = "parsed")]
    pub expression: Option<CompiledExpression>,
    pub matches: Vec<String>,
}
