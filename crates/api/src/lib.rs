//! Host-boundary surface for the tally rewrite and preview subsystems.
//!
//! Everything the core consumes from the surrounding shell is expressed here
//! as a trait: the expression parser/evaluator pair ([`Host`]), the input
//! buffer with its monotonically versioned text ([`Document`]), and the
//! status-line slot previews are published to ([`StatusSink`]). The
//! configuration toggles live in [`Settings`], persisted as JSON of
//! non-default values.
//!
//! The `test-support` feature adds [`stub::StubHost`], a small deterministic
//! host implementation used by workspace tests in place of a real math
//! engine.

mod host;
mod settings;

#[cfg(feature = "test-support")]
pub mod stub;

pub use host::{DocSnapshot, Document, Host, StatusSink};
pub use settings::{Settings, SettingsError};
