//! The variable namespace and its isolation copy.

use indexmap::IndexMap;
use tracing::trace;

use crate::value::Value;

/// Ordered map from identifier to value.
///
/// The live namespace is owned by the host shell; the preview subsystem only
/// ever works with [`Namespace::snapshot`] copies of it.
#[derive(Clone, Default)]
pub struct Namespace {
	entries: IndexMap<String, Value>,
}

impl Namespace {
	/// Creates an empty namespace.
	pub fn new() -> Self {
		Self::default()
	}

	/// Looks up a variable.
	pub fn get(&self, name: &str) -> Option<&Value> {
		self.entries.get(name)
	}

	/// Binds a variable, replacing any previous value.
	pub fn insert(&mut self, name: impl Into<String>, value: Value) {
		self.entries.insert(name.into(), value);
	}

	/// Removes a binding.
	pub fn remove(&mut self, name: &str) -> Option<Value> {
		self.entries.shift_remove(name)
	}

	/// Number of bindings.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// True when no variables are bound.
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Iterates bindings in insertion order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
		self.entries.iter().map(|(k, v)| (k.as_str(), v))
	}

	/// Builds an isolated copy for speculative evaluation.
	///
	/// Module references are shared by handle; values that cannot be deeply
	/// copied are omitted rather than failing the whole refresh, so they are
	/// simply unavailable to previews.
	pub fn snapshot(&self) -> Namespace {
		let mut entries = IndexMap::with_capacity(self.entries.len());
		for (name, value) in &self.entries {
			match value.snapshot() {
				Some(copy) => {
					entries.insert(name.clone(), copy);
				}
				None => trace!(name, "omitting non-isolable value from snapshot"),
			}
		}
		Namespace { entries }
	}
}

impl std::fmt::Debug for Namespace {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_map().entries(self.entries.iter()).finish()
	}
}

#[cfg(test)]
mod tests {
	use std::sync::Arc;

	use super::*;
	use crate::value::HostObject;

	struct Opaque;

	impl HostObject for Opaque {
		fn plain(&self) -> String {
			"<opaque>".to_string()
		}
	}

	#[test]
	fn test_snapshot_omits_non_isolable_entries() {
		let mut live = Namespace::new();
		live.insert("x", Value::Int(5));
		live.insert("gadget", Value::Other(Arc::new(Opaque)));

		let snap = live.snapshot();
		assert_eq!(snap.get("x"), Some(&Value::Int(5)));
		assert!(snap.get("gadget").is_none());
		assert_eq!(snap.len(), 1);
	}

	#[test]
	fn test_snapshot_is_independent_of_later_live_mutation() {
		let mut live = Namespace::new();
		live.insert("x", Value::Int(5));
		let snap = live.snapshot();

		live.insert("x", Value::Int(99));
		assert_eq!(snap.get("x"), Some(&Value::Int(5)));
	}
}
