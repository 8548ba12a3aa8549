//! Placeholder vault for embedded sub-language spans.
//!
//! Typeset-math spans must survive the regex passes untouched: an embedded
//! `$\frac{1}{2}$` would otherwise be shredded by implicit-multiplication
//! insertion. [`extract`] swaps each span for an opaque token and [`restore`]
//! swaps the tokens back through a caller-supplied renderer.
//!
//! Tokens are parenthesized decimal numbers, so any later pass treats them
//! as an atomic literal and never splits one. A token whose digits already
//! occur in the line is rehashed until unique, which keeps the round trip
//! exact even for adversarial input that spells out a token's own digits.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use regex::Regex;
use tracing::trace;

/// Token-to-original-text map for one transform pass.
///
/// Created by [`extract`], consumed by [`restore`], and discarded with the
/// pass; it never outlives a single pipeline run.
#[derive(Debug, Default, Clone)]
pub struct PlaceholderMap {
	entries: Vec<(String, String)>,
}

impl PlaceholderMap {
	/// Number of distinct protected spans.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// True when nothing was extracted.
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}

/// Replaces every non-overlapping match of `pattern` with an opaque token.
///
/// Identical spans share one token, mirroring set semantics: restoring
/// replaces all occurrences alike.
pub fn extract(line: &str, pattern: &Regex) -> (String, PlaceholderMap) {
	let mut map = PlaceholderMap::default();
	let mut out = line.to_string();
	for m in pattern.find_iter(line) {
		let span = m.as_str();
		if map.entries.iter().any(|(_, original)| original == span) {
			continue;
		}
		let token = fresh_token(span, &out, &map);
		out = out.replace(span, &token);
		trace!(span, token, "protected span");
		map.entries.push((token, span.to_string()));
	}
	(out, map)
}

/// Replaces each token with `renderer(original_span)`.
///
/// The renderer receives the span exactly as matched, delimiters included.
pub fn restore(line: &str, map: &PlaceholderMap, renderer: impl Fn(&str) -> String) -> String {
	let mut out = line.to_string();
	for (token, original) in &map.entries {
		out = out.replace(token.as_str(), &renderer(original));
	}
	out
}

fn fresh_token(span: &str, line: &str, map: &PlaceholderMap) -> String {
	let mut salt = 0u64;
	loop {
		let mut hasher = DefaultHasher::new();
		span.hash(&mut hasher);
		salt.hash(&mut hasher);
		let token = format!("({})", hasher.finish());
		let taken = line.contains(&token) || map.entries.iter().any(|(t, _)| *t == token);
		if !taken {
			return token;
		}
		salt += 1;
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn typeset() -> Regex {
		Regex::new(r"\$[^$]*\$").unwrap()
	}

	#[test]
	fn test_round_trip_is_exact() {
		let line = r"2 + $\frac{1}{2}$ * 3";
		let (masked, map) = extract(line, &typeset());
		assert!(!masked.contains('$'));
		assert_eq!(map.len(), 1);
		assert_eq!(restore(&masked, &map, |s| s.to_string()), line);
	}

	#[test]
	fn test_identical_spans_share_one_token() {
		let line = r"$x$ + $x$ + $y$";
		let (masked, map) = extract(line, &typeset());
		assert_eq!(map.len(), 2);
		assert_eq!(restore(&masked, &map, |s| s.to_string()), line);
	}

	#[test]
	fn test_token_collision_with_literal_digits_is_avoided() {
		// Find the token extract would pick, then feed a line that already
		// contains those digits so the naive choice would corrupt.
		let span = r"$a$";
		let (masked, map) = extract(span, &typeset());
		let naive_token = masked.clone();
		assert_eq!(map.len(), 1);

		let line = format!(r"{naive_token} + $a$");
		let (masked, map) = extract(&line, &typeset());
		assert_eq!(restore(&masked, &map, |s| s.to_string()), line);
	}

	#[test]
	fn test_tokens_are_atomic_numeric_literals() {
		let (masked, map) = extract(r"$\pi$", &typeset());
		assert_eq!(map.len(), 1);
		assert!(masked.starts_with('(') && masked.ends_with(')'));
		assert!(masked[1..masked.len() - 1].chars().all(|c| c.is_ascii_digit()));
	}
}
