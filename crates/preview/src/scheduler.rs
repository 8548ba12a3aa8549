//! Debounced, single-flight preview scheduling.
//!
//! # Protocol
//!
//! Each input buffer has at most one active flight. A text change either
//! starts a flight or, if one is active, lets it observe the version bump:
//! when a flight's evaluation completes, the captured version is compared
//! against the buffer's current version under the state lock. A match
//! publishes the result and ends the flight; a mismatch discards the result
//! and retries against the new text. This is a retry loop, not a queue —
//! the most recent text always wins, and a stale result is never published.
//!
//! Explicitly, per buffer: `Idle` → `Dispatched(version)` on text change;
//! `Dispatched(v)` stays dispatched (with the new version observed at
//! completion) on further changes; `Dispatched(v)` → `Idle` only when the
//! completed result's captured version still matches.
//!
//! # Cancellation
//!
//! An in-flight evaluation is never forcibly killed; its result is simply
//! dropped when stale. As a latency enhancement, each attempt carries a
//! cancellation token, fired when a text change moves the document past the
//! version the attempt captured, so a cooperating host can abandon a long
//! evaluation early. Correctness never depends on it, and an attempt that is
//! already evaluating the current text is never interrupted.

use std::sync::Arc;

use arc_swap::ArcSwap;
use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use tally_api::{Document, Host, Settings, StatusSink};
use tally_rewrite::date::DateParser;

use crate::eval::PreviewEvaluator;
use crate::snapshot::SnapshotStore;

struct FlightState {
	running: bool,
	interrupt: Option<CancellationToken>,
	/// Document version the active attempt is evaluating.
	captured_version: u64,
}

struct Inner {
	host: Arc<dyn Host>,
	document: Arc<dyn Document>,
	sink: Arc<dyn StatusSink>,
	store: Arc<SnapshotStore>,
	settings: Arc<ArcSwap<Settings>>,
	date_parser: Option<Arc<dyn DateParser>>,
	evaluator: PreviewEvaluator,
	state: Mutex<FlightState>,
	runtime: Handle,
}

/// Single-flight preview coordinator for one input buffer.
#[derive(Clone)]
pub struct PreviewScheduler {
	inner: Arc<Inner>,
}

impl PreviewScheduler {
	/// Builds a scheduler wired to the given collaborators.
	///
	/// Must be called from within a tokio runtime; flights are spawned on
	/// the runtime that is current at construction time.
	pub fn new(
		host: Arc<dyn Host>,
		document: Arc<dyn Document>,
		sink: Arc<dyn StatusSink>,
		store: Arc<SnapshotStore>,
		settings: Arc<ArcSwap<Settings>>,
		date_parser: Option<Arc<dyn DateParser>>,
	) -> Self {
		Self {
			inner: Arc::new(Inner {
				host,
				document,
				sink,
				store,
				settings,
				date_parser,
				evaluator: PreviewEvaluator::new(),
				state: Mutex::new(FlightState {
					running: false,
					interrupt: None,
					captured_version: 0,
				}),
				runtime: Handle::current(),
			}),
		}
	}

	/// Reacts to a buffer text change.
	///
	/// Starts a flight when idle; otherwise returns and lets the flight
	/// observe the version bump at completion and retry on its own. The
	/// active attempt's cancellation token is fired only when the document
	/// has actually moved past the version that attempt captured, so a
	/// redundant notification never interrupts an evaluation of the
	/// current text.
	pub fn on_text_changed(&self) {
		let mut state = self.inner.state.lock();
		if state.running {
			if self.inner.document.version() != state.captured_version {
				if let Some(interrupt) = &state.interrupt {
					interrupt.cancel();
				}
			}
			trace!("flight active, coalescing into retry");
			return;
		}
		state.running = true;
		drop(state);

		let inner = Arc::clone(&self.inner);
		self.inner.runtime.spawn(flight(inner));
	}
}

async fn flight(inner: Arc<Inner>) {
	loop {
		let settings = inner.settings.load_full();
		let debounce = Duration::from_millis(settings.preview_debounce_ms);
		if !debounce.is_zero() {
			tokio::time::sleep(debounce).await;
		}

		let doc = inner.document.capture();
		let snapshot = inner.store.current();
		let interrupt = CancellationToken::new();
		{
			let mut state = inner.state.lock();
			state.interrupt = Some(interrupt.clone());
			state.captured_version = doc.version;
		}

		let worker = {
			let inner = Arc::clone(&inner);
			let text = doc.text.clone();
			let settings = Arc::clone(&settings);
			tokio::task::spawn_blocking(move || {
				inner.evaluator.preview(
					&text,
					&snapshot,
					inner.host.as_ref(),
					&settings,
					inner.date_parser.as_deref(),
					&interrupt,
				)
			})
		};
		// a panicking host evaluation degrades to "no preview"
		let preview = worker.await.unwrap_or(None);

		let mut state = inner.state.lock();
		if inner.document.version() == doc.version {
			inner.sink.set_status(preview.as_deref().unwrap_or(""));
			state.running = false;
			state.interrupt = None;
			debug!(version = doc.version, shown = preview.is_some(), "preview published");
			return;
		}
		drop(state);
		trace!(stale = doc.version, "discarding stale preview, retrying");
	}
}
