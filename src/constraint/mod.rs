//! Range compilation and evaluation
//!
//! # Architecture
//!
//! ```text
//! "^1.2 || 3.x" ──▶ ConstraintCompiler ──▶ CompiledExpression ──▶ evaluate ──▶ matches
//!                   (npm / python / nuget)   OR of AND-groups      (parse + compare)
//! ```
//!
//! Compilers work on version-number strings only and normalize every bound
//! to `major.minor.patch`. The evaluator is the only part that parses and
//! orders versions.

pub mod bounds;
pub mod compiler;
pub mod compilers;
pub mod evaluator;
pub mod types;

pub use compiler::{ConstraintCompiler, compile, compiler_for};
pub use evaluator::{analyze, evaluate};
pub use types::{Analysis, Compilation, CompiledExpression, Constraint, Dialect, LATEST, Operator};
