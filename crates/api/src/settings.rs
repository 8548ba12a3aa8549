//! Configuration toggles and their on-disk persistence.

use std::io::ErrorKind;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure to load or persist [`Settings`].
#[derive(Debug, Error)]
pub enum SettingsError {
	#[error("settings io error: {0}")]
	Io(#[from] std::io::Error),
	#[error("malformed settings file: {0}")]
	Malformed(#[from] serde_json::Error),
}

/// Boolean and integer toggles controlling the rewrite and preview features.
///
/// Missing fields in a stored file fall back to their defaults, so files
/// written by older versions keep loading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
	/// Insert `*` between a numeric literal and a trailing identifier.
	pub implicit_multiply: bool,
	/// Treat `^` as the power operator.
	pub caret_power: bool,
	/// Rewrite `f(x) = body` into a lambda assignment.
	pub auto_lambda: bool,
	/// Prefix a leading binary operator with the previous result.
	pub auto_previous: bool,
	/// Promote nested tuples to matrices.
	pub auto_matrix: bool,
	/// Promote natural-language date strings to date values.
	pub auto_date: bool,
	/// Extract and parse typeset-math spans.
	pub parse_typeset: bool,
	/// Enable the speculative result preview.
	pub preview: bool,
	/// Delay between a keystroke and preview dispatch, in milliseconds.
	pub preview_debounce_ms: u64,
}

impl Default for Settings {
	fn default() -> Self {
		Self {
			implicit_multiply: true,
			caret_power: false,
			auto_lambda: true,
			auto_previous: true,
			auto_matrix: true,
			auto_date: true,
			parse_typeset: true,
			preview: true,
			preview_debounce_ms: 30,
		}
	}
}

impl Settings {
	/// Loads settings from `path`, treating a missing file as defaults.
	pub fn load(path: &Path) -> Result<Self, SettingsError> {
		let text = match std::fs::read_to_string(path) {
			Ok(text) => text,
			Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Self::default()),
			Err(err) => return Err(err.into()),
		};
		Ok(serde_json::from_str(&text)?)
	}

	/// Persists only the fields that differ from their defaults.
	pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
		let text = serde_json::to_string_pretty(&self.non_default_values())?;
		std::fs::write(path, text)?;
		Ok(())
	}

	/// JSON object of the fields that differ from their defaults.
	pub fn non_default_values(&self) -> serde_json::Value {
		let serde_json::Value::Object(current) =
			serde_json::to_value(self).unwrap_or_default()
		else {
			return serde_json::Value::Object(serde_json::Map::new());
		};
		let serde_json::Value::Object(defaults) =
			serde_json::to_value(Self::default()).unwrap_or_default()
		else {
			return serde_json::Value::Object(serde_json::Map::new());
		};
		let non_default = current
			.into_iter()
			.filter(|(key, value)| defaults.get(key) != Some(value))
			.collect();
		serde_json::Value::Object(non_default)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_non_default_values_only_lists_changes() {
		let mut settings = Settings::default();
		assert_eq!(settings.non_default_values(), serde_json::json!({}));

		settings.caret_power = true;
		settings.preview_debounce_ms = 100;
		assert_eq!(
			settings.non_default_values(),
			serde_json::json!({"caret_power": true, "preview_debounce_ms": 100})
		);
	}

	#[test]
	fn test_save_load_round_trip() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("tally.json");

		let mut settings = Settings::default();
		settings.auto_matrix = false;
		settings.save(&path).unwrap();

		let loaded = Settings::load(&path).unwrap();
		assert_eq!(loaded, settings);

		let text = std::fs::read_to_string(&path).unwrap();
		assert!(!text.contains("implicit_multiply"), "defaults should not be persisted: {text}");
	}

	#[test]
	fn test_load_missing_file_gives_defaults() {
		let dir = tempfile::tempdir().unwrap();
		let loaded = Settings::load(&dir.path().join("absent.json")).unwrap();
		assert_eq!(loaded, Settings::default());
	}

	#[test]
	fn test_load_rejects_malformed_json() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("tally.json");
		std::fs::write(&path, "{not json").unwrap();
		assert!(matches!(Settings::load(&path), Err(SettingsError::Malformed(_))));
	}
}
