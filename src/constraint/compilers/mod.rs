//! Dialect-specific range compilers

pub mod npm;
pub mod nuget;
pub mod pypi;

pub use npm::NpmCompiler;
pub use nuget::NugetCompiler;
pub use pypi::PypiCompiler;
