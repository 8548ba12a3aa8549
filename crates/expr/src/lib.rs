//! Program-tree and value primitives shared across the tally rewrite and
//! preview subsystems.
//!
//! The shell's own parser and evaluator live on the host side of the
//! boundary; this crate only defines the shapes they exchange with the
//! rewrite pipeline and the preview evaluator:
//!
//! - [`Expr`] — the parsed program tree the tree-transform chain rewrites.
//! - [`Value`] — the closed set of semantic result categories the preview
//!   formatter dispatches over.
//! - [`Namespace`] — the ordered variable map, with the deep-copy semantics
//!   needed for isolated preview snapshots.
//! - [`SymExpr`] — an explicit wrapper for symbolic results, replacing
//!   operator behavior that would otherwise have to be patched onto the
//!   host's math-expression type globally.

mod error;
mod expr;
mod namespace;
mod sym;
mod value;

pub use error::{EvalError, ParseError};
pub use expr::{BinOp, Expr, UnOp};
pub use namespace::Namespace;
pub use sym::SymExpr;
pub use value::{Exact, HostObject, Timestamp, Value};
