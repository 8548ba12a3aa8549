//! The isolated namespace snapshot.

use std::sync::Arc;

use arc_swap::ArcSwap;
use tracing::debug;

use tally_expr::{Namespace, Value};

/// Holds the namespace copy preview evaluations run against.
///
/// The snapshot is replaced wholesale on every refresh; readers that loaded
/// the previous handle keep evaluating against it undisturbed. Mutation of
/// the live namespace never retroactively affects a snapshot already taken.
#[derive(Default)]
pub struct SnapshotStore {
	current: ArcSwap<Namespace>,
}

impl SnapshotStore {
	/// Empty store; call [`SnapshotStore::refresh`] before first use.
	pub fn new() -> Self {
		Self::default()
	}

	/// Rebuilds the snapshot from the live namespace and swaps it in.
	///
	/// Values that cannot be deeply copied are omitted; module references
	/// are shared by handle.
	pub fn refresh(&self, live: &Namespace) {
		let snapshot = live.snapshot();
		debug!(live = live.len(), isolated = snapshot.len(), "snapshot refreshed");
		self.current.store(Arc::new(snapshot));
	}

	/// Current snapshot handle.
	pub fn current(&self) -> Arc<Namespace> {
		self.current.load_full()
	}

	/// Merges freshly pushed variables into the current snapshot.
	///
	/// Used when the host injects variables between executions, so they are
	/// previewable without waiting for the next refresh. The merge builds a
	/// new namespace and swaps; it never edits the published one.
	pub fn push(&self, vars: impl IntoIterator<Item = (String, Value)>) {
		let mut merged = (*self.current()).clone();
		for (name, value) in vars {
			if let Some(copy) = value.snapshot() {
				merged.insert(name, copy);
			}
		}
		self.current.store(Arc::new(merged));
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_refresh_replaces_wholesale() {
		let store = SnapshotStore::new();
		let mut live = Namespace::new();
		live.insert("x", Value::Int(1));
		store.refresh(&live);

		let old = store.current();
		live.insert("x", Value::Int(2));
		store.refresh(&live);

		// the earlier handle still sees the earlier value
		assert_eq!(old.get("x"), Some(&Value::Int(1)));
		assert_eq!(store.current().get("x"), Some(&Value::Int(2)));
	}

	#[test]
	fn test_push_merges_without_refresh() {
		let store = SnapshotStore::new();
		store.refresh(&Namespace::new());
		store.push([("k".to_string(), Value::Int(7))]);
		assert_eq!(store.current().get("k"), Some(&Value::Int(7)));
	}
}
