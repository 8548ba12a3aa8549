//! The line-level rewrite pipeline.
//!
//! Stages run in a fixed order over every line of one submission:
//!
//! 1. symbol normalization (`⋅` to `*`, optionally `^` to `**`);
//! 2. recording of `name = ...` assignment targets so later lines of the
//!    same submission see the name as declared;
//! 3. typeset-math span extraction through the placeholder vault;
//! 4. implicit-multiplication insertion;
//! 5. typeset-math restoration into parse-and-evaluate calls;
//!
//! then, on the first line only:
//!
//! 6. previous-result prefixing for a leading binary operator;
//! 7. shorthand function definitions (`f(x) = body`) into lambda
//!    assignments.
//!
//! No stage fails: a line whose shape a rule does not recognize passes
//! through unchanged and any parse error is the host's to report.

use std::collections::HashMap;

use regex::{Captures, Regex};
use tracing::trace;

use tally_api::Settings;
use tally_expr::Namespace;

use crate::vault;

/// Identifier pattern: any valid variable name.
const VAR: &str = r"[^\d\W]\w*";

/// What the pipeline knows about an identifier when deciding whether a
/// numeric literal followed by it is an implicit multiplication.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VarKind {
	/// Bound in the live namespace to a registered unit-prefix object.
	UnitPrefix,
	/// Bound in the live namespace to any other value.
	Bound,
	/// Assigned earlier in this same submission; value unknown.
	Declared,
}

/// The identifiers implicit multiplication may splice against.
///
/// Seeded from the live namespace, extended by assignment targets seen in
/// earlier lines of the same multi-line input. Lives for one pipeline run.
#[derive(Debug, Default, Clone)]
pub struct KnownVars {
	vars: HashMap<String, VarKind>,
}

impl KnownVars {
	/// Empty set; only same-submission assignments will be known.
	pub fn new() -> Self {
		Self::default()
	}

	/// Seeds the set from the live namespace.
	pub fn from_namespace(ns: &Namespace) -> Self {
		let vars = ns
			.iter()
			.map(|(name, value)| {
				let kind = if value.is_unit_prefix() { VarKind::UnitPrefix } else { VarKind::Bound };
				(name.to_string(), kind)
			})
			.collect();
		Self { vars }
	}

	/// Marks a name as assigned in this submission, value unknown.
	///
	/// Supersedes what the namespace said: a reassigned unit prefix splices
	/// plain from here on.
	pub fn declare(&mut self, name: &str) {
		self.vars.insert(name.to_string(), VarKind::Declared);
	}

	fn kind(&self, name: &str) -> Option<VarKind> {
		self.vars.get(name).copied()
	}
}

/// Per-submission side channel out of [`strip_info_marker`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LineReport {
	/// The first line carried a leading `?` info-query marker (stripped).
	pub info_requested: bool,
}

/// Strips a leading `?` info-query marker from the first line.
///
/// Submission-side only: the host runs this before the pipeline and drives
/// its help UI off the report. The preview path skips it, so `?`-prefixed
/// input fails to parse and previews nothing.
pub fn strip_info_marker(lines: &mut [String]) -> LineReport {
	let mut report = LineReport::default();
	if let Some(first) = lines.first_mut() {
		if first.len() > 1 && first.starts_with('?') {
			report.info_requested = true;
			first.remove(0);
		}
	}
	report
}

/// The ordered text rewrite pipeline, with its patterns compiled once.
pub struct TextTransforms {
	var_def: Regex,
	typeset_span: Regex,
	implicit_mult: Regex,
	lambda_def: Regex,
}

impl Default for TextTransforms {
	fn default() -> Self {
		Self::new()
	}
}

impl TextTransforms {
	/// Compiles the pipeline's patterns.
	pub fn new() -> Self {
		Self {
			var_def: Regex::new(&format!(r"^({VAR})\s*=(.*)")).expect("static pattern"),
			typeset_span: Regex::new(r"\$[^$]*\$").expect("static pattern"),
			// (format-specifier marker)?(hex | engineering | plain number)(identifier)?
			implicit_mult: Regex::new(&format!(
				r"(% ?)?(0x[0-9a-f]*|0X[0-9A-F]*|\d*\.?\d+e-?\d+|\d*\.?\d+)({VAR})?"
			))
			.expect("static pattern"),
			lambda_def: Regex::new(&format!(r"^({VAR})\((.*)\)\s*=([^=].*)")).expect("static pattern"),
		}
	}

	/// Runs the pipeline over one submission, in place.
	///
	/// With every toggle off the lines come back byte-for-byte unchanged.
	pub fn apply(&self, lines: &mut [String], known: &mut KnownVars, settings: &Settings) {
		for line in lines.iter_mut() {
			*line = line.replace('⋅', "*");
			if settings.caret_power {
				*line = line.replace('^', "**");
			}

			if let Some(caps) = self.var_def.captures(line) {
				known.declare(&caps[1]);
			}

			let (masked, map) = if settings.parse_typeset {
				vault::extract(line, &self.typeset_span)
			} else {
				(line.clone(), vault::PlaceholderMap::default())
			};
			*line = masked;

			if settings.implicit_multiply {
				*line = self
					.implicit_mult
					.replace_all(line, |caps: &Captures<'_>| splice_multiply(caps, known))
					.into_owned();
			}

			if settings.parse_typeset {
				*line = vault::restore(line, &map, render_typeset_call);
			}
		}

		if settings.auto_previous {
			if let Some(first) = lines.first_mut() {
				// '-' is ambiguous with negation and intentionally excluded
				if first.starts_with(['+', '*', '/']) {
					trace!("prefixing previous result");
					first.insert(0, '_');
				}
			}
		}

		if settings.auto_lambda {
			if let Some(first) = lines.first_mut() {
				*first = self
					.lambda_def
					.replace(first, |caps: &Captures<'_>| {
						format!("{} = lambda {}:{}", &caps[1], &caps[2], &caps[3])
					})
					.into_owned();
			}
		}
	}
}

/// One rewrite decision per candidate span; no recursion into spliced text.
fn splice_multiply(caps: &Captures<'_>, known: &KnownVars) -> String {
	let whole = &caps[0];
	let Some(ident) = caps.get(3).map(|m| m.as_str()) else {
		return whole.to_string();
	};
	// a trailing bare exponent letter is ambiguous: 2e-4 is a number
	if ident.eq_ignore_ascii_case("e") {
		return whole.to_string();
	}
	// a format-specifier marker means this is not arithmetic
	if caps.get(1).is_some() {
		return whole.to_string();
	}
	let number = &caps[2];
	match known.kind(ident) {
		Some(VarKind::UnitPrefix) => {
			trace!(number, ident, "implicit multiply (unit prefix)");
			format!("({number}*{ident})")
		}
		Some(VarKind::Bound | VarKind::Declared) => {
			trace!(number, ident, "implicit multiply");
			format!("{number}*{ident}")
		}
		None => whole.to_string(),
	}
}

/// Renders a protected typeset span into a call the host parser evaluates.
///
/// The delimiters are stripped, the span is escaped into a string literal,
/// and the ambiguous identifier `i` is pinned to the imaginary unit.
fn render_typeset_call(span: &str) -> String {
	let inner = span.trim_matches('$');
	let escaped = inner.replace('\\', r"\\").replace('"', "\\\"");
	format!(r#"parse_typeset("{escaped}").subs(i, I)"#)
}

#[cfg(test)]
mod tests;
