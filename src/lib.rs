//! Canonicalization and range evaluation for package version strings
//!
//! Free-form version strings from different ecosystems are parsed into a
//! [`StructuredVersion`] with a total order, and npm, PEP 440 and NuGet style
//! ranges are compiled into a flat OR-of-AND list of constraints that can be
//! evaluated against candidate versions.

pub mod config;
pub mod constraint;
pub mod output;
pub mod version;

pub use constraint::{
    Analysis, Compilation, CompiledExpression, Constraint, Dialect, Operator, analyze, compile,
    evaluate,
};
pub use version::compare::{compare, sort};
pub use version::parser::{parse, parse_all};
pub use version::types::StructuredVersion;
