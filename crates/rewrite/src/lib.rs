//! Input rewriting for the tally shell.
//!
//! Two cooperating layers run before the host evaluator sees anything:
//!
//! - the **text pipeline** ([`TextTransforms`]) rewrites raw typed lines
//!   into valid expression syntax (implicit multiplication, shorthand
//!   function definitions, embedded typeset-math spans, previous-result
//!   substitution);
//! - the **tree chain** ([`TreeTransforms`]) rewrites the parsed program
//!   tree to pick exact arithmetic types, promote nested tuples to matrices
//!   and promote date-looking strings to date values.
//!
//! Both layers share one failure policy: a rewrite whose precondition does
//! not hold passes the input through untouched. Nothing here ever raises
//! past the pipeline; malformed input is the host parser's to report.

pub mod date;
mod text;
mod tree;
mod vault;

pub use text::{KnownVars, LineReport, TextTransforms, strip_info_marker};
pub use tree::{TreeCtx, TreeTransforms};
pub use vault::{PlaceholderMap, extract, restore};
