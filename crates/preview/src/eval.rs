//! The speculative evaluator and its single-line formatting policy.

use tokio_util::sync::CancellationToken;
use tracing::trace;
use unicode_width::UnicodeWidthStr;

use tally_api::{Host, Settings};
use tally_expr::{Namespace, Value};
use tally_rewrite::date::DateParser;
use tally_rewrite::{KnownVars, TextTransforms, TreeCtx, TreeTransforms};

/// Evaluates in-progress buffer text against a namespace snapshot.
///
/// Stateless apart from the compiled rewrite patterns; one instance serves
/// every flight of a scheduler.
pub struct PreviewEvaluator {
	text: TextTransforms,
	tree: TreeTransforms,
}

impl Default for PreviewEvaluator {
	fn default() -> Self {
		Self::new()
	}
}

impl PreviewEvaluator {
	/// Compiles the rewrite patterns once.
	pub fn new() -> Self {
		Self { text: TextTransforms::new(), tree: TreeTransforms }
	}

	/// Best-effort preview of `raw` against `snapshot`.
	///
	/// `None` on any parse, evaluation or formatting rejection; the buffer
	/// is known to be a possibly-incomplete edit, so failure is silent by
	/// design. The snapshot itself is never mutated: evaluation runs over a
	/// scratch clone.
	pub fn preview(
		&self,
		raw: &str,
		snapshot: &Namespace,
		host: &dyn Host,
		settings: &Settings,
		date_parser: Option<&dyn DateParser>,
		interrupt: &CancellationToken,
	) -> Option<String> {
		let mut lines: Vec<String> = raw.split('\n').map(ToString::to_string).collect();
		let mut known = KnownVars::from_namespace(snapshot);
		self.text.apply(&mut lines, &mut known, settings);
		let code = lines.join("\n");

		let parsed = match host.parse_expr(&code) {
			Ok(expr) => expr,
			Err(err) => {
				trace!(%err, "no preview: buffer does not parse as an expression");
				return None;
			}
		};

		let ctx = TreeCtx {
			settings,
			host,
			scope: Some(snapshot),
			date_parser,
		};
		let tree = self.tree.apply(parsed, &ctx);

		let mut scratch = snapshot.clone();
		let value = match host.eval_interruptible(&tree, &mut scratch, interrupt) {
			Ok(Some(value)) => value,
			Ok(None) => return None,
			Err(err) => {
				trace!(%err, "no preview: speculative evaluation failed");
				return None;
			}
		};

		format_single_line(&value, host)
	}
}

/// Renders one value under the single-line policy.
///
/// Category dispatch is a closed match: plain numeric formatting for exact
/// and machine scalars, the math pretty-printer (after forcing numeric
/// evaluation of irrational constants) for symbolic values and containers,
/// and the generic plain display form for everything else.
fn format_single_line(value: &Value, host: &dyn Host) -> Option<String> {
	let mut rendered = match value {
		Value::Int(_) | Value::Exact(_) | Value::Float(_) => value.to_string(),
		Value::Symbolic(_) | Value::Seq(_) | Value::Map(_) | Value::Matrix { .. } => {
			host.pretty(&host.evalf(value))
		}
		// quoted, so a string result is distinguishable from an identifier
		Value::Str(s) => format!("{s:?}"),
		Value::DateTime(_) => value.to_string(),
		Value::Module(obj) | Value::Other(obj) => obj.display_plain(),
	};

	if rendered.contains('\n') {
		// fall back to the plain string form before giving up
		rendered = value.to_string();
		if rendered.contains('\n') {
			return None;
		}
	}

	if rendered.width() > host.terminal_width() {
		trace!(width = rendered.width(), "no preview: rendering exceeds terminal width");
		return None;
	}

	Some(rendered)
}

#[cfg(test)]
mod tests {
	use tally_api::stub::StubHost;

	use super::*;

	fn preview(host: &StubHost, text: &str, snapshot: &Namespace) -> Option<String> {
		PreviewEvaluator::new().preview(
			text,
			snapshot,
			host,
			&Settings::default(),
			None,
			&CancellationToken::new(),
		)
	}

	fn snapshot_with_x() -> Namespace {
		let mut ns = Namespace::new();
		ns.insert("x", Value::Int(5));
		ns
	}

	#[test]
	fn test_complete_expression_previews() {
		let host = StubHost::new();
		assert_eq!(preview(&host, "x + 1", &snapshot_with_x()), Some("6".to_string()));
	}

	#[test]
	fn test_incomplete_expression_gives_no_preview() {
		let host = StubHost::new();
		assert_eq!(preview(&host, "x +", &snapshot_with_x()), None);
	}

	#[test]
	fn test_undefined_name_gives_no_preview() {
		let host = StubHost::new();
		assert_eq!(preview(&host, "y + 1", &snapshot_with_x()), None);
	}

	#[test]
	fn test_none_result_gives_no_preview() {
		let host = StubHost::new();
		assert_eq!(preview(&host, "noop()", &snapshot_with_x()), None);
	}

	#[test]
	fn test_preview_never_mutates_snapshot() {
		let host = StubHost::new();
		let snapshot = snapshot_with_x();
		let first = preview(&host, "x * x", &snapshot);
		let second = preview(&host, "x * x", &snapshot);
		assert_eq!(first, Some("25".to_string()));
		assert_eq!(first, second);
		assert_eq!(snapshot.get("x"), Some(&Value::Int(5)));
		assert_eq!(snapshot.len(), 1);
	}

	#[test]
	fn test_exact_promotion_flows_through_preview() {
		let host = StubHost::new();
		assert_eq!(preview(&host, "1/3", &Namespace::new()), Some("1/3".to_string()));
	}

	#[test]
	fn test_matrix_preview_renders_single_line() {
		let host = StubHost::new();
		let text = "((1, 2), (3, 4))";
		assert_eq!(
			preview(&host, text, &Namespace::new()),
			Some("[[1, 2], [3, 4]]".to_string())
		);
	}

	#[test]
	fn test_multiline_pretty_falls_back_to_plain_form() {
		let mut host = StubHost::new();
		host.multiline_matrix = true;
		// pretty is multi-line, but the plain Display form is single-line
		assert_eq!(
			preview(&host, "((1, 2), (3, 4))", &Namespace::new()),
			Some("[[1, 2], [3, 4]]".to_string())
		);
	}

	#[test]
	fn test_width_overflow_gives_no_preview() {
		let mut host = StubHost::new();
		host.width = 4;
		assert_eq!(preview(&host, "12345 + 0", &Namespace::new()), None);
	}

	#[test]
	fn test_implicit_multiply_applies_to_preview_text() {
		let host = StubHost::new();
		assert_eq!(preview(&host, "4x", &snapshot_with_x()), Some("20".to_string()));
	}

	#[test]
	fn test_info_query_input_gives_no_preview() {
		let host = StubHost::new();
		let mut ns = Namespace::new();
		ns.insert("si", Value::Int(1));
		assert_eq!(preview(&host, "?si", &ns), None);
	}

	#[test]
	fn test_string_results_preview_quoted() {
		let host = StubHost::new();
		assert_eq!(
			preview(&host, r#""abc""#, &Namespace::new()),
			Some(r#""abc""#.to_string())
		);
	}

	#[test]
	fn test_symbolic_preview_forces_numeric_and_pretty_prints() {
		let host = StubHost::new();
		let mut ns = Namespace::new();
		ns.insert(
			"x",
			Value::Symbolic(tally_expr::SymExpr::new(tally_expr::Expr::Name("x".into()))),
		);
		assert_eq!(preview(&host, "x + 1", &ns), Some("x + 1".to_string()));
	}
}
