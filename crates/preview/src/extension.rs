//! Shell lifecycle glue for the preview feature.
//!
//! The hosting shell owns the live namespace, the input buffer, and the
//! status line; this module owns nothing but the wiring between them and
//! the preview machinery. Hooks map onto shell events: clear the status
//! before a submission runs, re-snapshot after it finishes, kick the
//! scheduler on every keystroke.

use std::sync::Arc;

use arc_swap::ArcSwap;
use tracing::info;

use tally_api::{Document, Host, Settings, StatusSink};
use tally_expr::{Namespace, Value};
use tally_rewrite::date::DateParser;

use crate::scheduler::PreviewScheduler;
use crate::snapshot::SnapshotStore;

/// Preview hook object, one per shell session.
pub struct PreviewExtension {
	store: Arc<SnapshotStore>,
	scheduler: PreviewScheduler,
	sink: Arc<dyn StatusSink>,
	settings: Arc<ArcSwap<Settings>>,
}

impl PreviewExtension {
	/// Wires the preview machinery to a shell session.
	///
	/// Takes an initial snapshot of `live` so previews work before the
	/// first submission. Returns `None` when previews are disabled in
	/// `settings`; toggling the setting at runtime means dropping the
	/// extension or loading a fresh one.
	pub fn load(
		host: Arc<dyn Host>,
		document: Arc<dyn Document>,
		sink: Arc<dyn StatusSink>,
		settings: Settings,
		live: &Namespace,
		date_parser: Option<Arc<dyn DateParser>>,
	) -> Option<Self> {
		if !settings.preview {
			info!("previews disabled, not loading");
			return None;
		}
		let store = Arc::new(SnapshotStore::new());
		store.refresh(live);
		let settings = Arc::new(ArcSwap::from_pointee(settings));
		let scheduler = PreviewScheduler::new(
			host,
			document,
			Arc::clone(&sink),
			Arc::clone(&store),
			Arc::clone(&settings),
			date_parser,
		);
		Some(Self { store, scheduler, sink, settings })
	}

	/// A submission is about to run; take the preview off the status line.
	pub fn before_run(&self) {
		self.sink.set_status("");
	}

	/// A submission finished; re-snapshot the live namespace.
	pub fn after_run(&self, live: &Namespace) {
		self.store.refresh(live);
	}

	/// The input buffer changed.
	pub fn text_changed(&self) {
		self.scheduler.on_text_changed();
	}

	/// The shell injected variables outside a submission; merge them into
	/// the current snapshot so they preview immediately.
	pub fn push(&self, vars: impl IntoIterator<Item = (String, Value)>) {
		self.store.push(vars);
	}

	/// Applies changed settings to subsequent flights.
	pub fn update_settings(&self, settings: Settings) {
		self.settings.store(Arc::new(settings));
	}

	/// Tears the extension down, leaving the status line empty.
	pub fn unload(self) {
		self.sink.set_status("");
	}
}
