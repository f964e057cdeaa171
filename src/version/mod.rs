//! Version canonicalization layer
//!
//! Turns free-form version strings into structured values and orders them.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │    Stage    │────▶│   Parser    │────▶│  Comparator │
//! │ (alias/wt)  │     │ (raw → sv)  │     │ (sv ⇄ sv)   │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!        │                                       ▲
//!        └───────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`stage`]: Stage alias and precedence weight table
//! - [`types`]: `StructuredVersion` and its component types
//! - [`parser`]: Best-effort parser from raw strings
//! - [`compare`]: Total order, stage predicates and sorting
//! - [`error`]: Error types for persisting parsed versions

pub mod compare;
pub mod error;
pub mod parser;
pub mod stage;
pub mod types;
