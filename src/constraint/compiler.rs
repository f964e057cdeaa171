//! Range compilation abstraction for different dialects

use crate::constraint::compilers::{NpmCompiler, NugetCompiler, PypiCompiler};
use crate::constraint::types::{Compilation, Dialect};

/// Trait for dialect-specific range compilation
///
/// Each ecosystem writes ranges differently:
/// - npm: `^1.2.3`, `~1.2`, `1.x`, `1.0.0 - 2.0.0`, `a || b`
/// - Python: `>=1.0,<2.0`, `~=1.4`, `==1.2.*`
/// - NuGet: `[1.0,2.0)`, `1.*`, `1.0`
///
/// Implementations never fail: input they do not understand compiles to an
/// empty expression.
pub trait ConstraintCompiler: Send + Sync {
    /// Returns the dialect this compiler handles
    fn dialect(&self) -> Dialect;

    /// Translate a raw range into an OR-of-AND constraint expression
    fn compile(&self, raw: &str) -> Compilation;
}

/// Compiler for a dialect
pub fn compiler_for(dialect: Dialect) -> &'static dyn ConstraintCompiler {
    match dialect {
        Dialect::Npm => &NpmCompiler,
        Dialect::Python => &PypiCompiler,
        Dialect::Nuget => &NugetCompiler,
    }
}

/// Compile `raw` with the rules of `dialect`
pub fn compile(dialect: Dialect, raw: &str) -> Compilation {
    compiler_for(dialect).compile(raw)
}
