//! Speculative result preview.
//!
//! While a line is still being typed, this crate evaluates the in-progress
//! text against an isolated snapshot of the user's variables and renders a
//! single-line preview of the would-be result, without side effects and
//! without blocking input.
//!
//! # Design
//!
//! - [`SnapshotStore`] owns the isolated namespace copy. It is replaced
//!   wholesale on refresh (atomic pointer swap), never edited in place, so
//!   in-flight evaluations keep the handle they loaded and no lock is
//!   needed.
//! - [`PreviewEvaluator`] runs the full rewrite stack over the buffer text
//!   and evaluates the result against a scratch clone of the snapshot.
//!   Every failure path degrades to "no preview"; nothing raises past this
//!   boundary.
//! - [`PreviewScheduler`] is the single-flight-with-retry coordinator: at
//!   most one flight per buffer, every completion checked against the
//!   buffer's current version, stale results dropped and retried against
//!   the latest text.
//! - [`PreviewExtension`] is the lifecycle glue the host registers:
//!   clear-before-run, refresh-after-run, trigger-on-text-change.

mod eval;
mod extension;
mod scheduler;
mod snapshot;

pub use eval::PreviewEvaluator;
pub use extension::PreviewExtension;
pub use scheduler::PreviewScheduler;
pub use snapshot::SnapshotStore;
