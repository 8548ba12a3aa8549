//! Traits implemented by the host shell.

use tokio_util::sync::CancellationToken;

use tally_expr::{EvalError, Expr, Namespace, ParseError, Value};

/// The host's parse/evaluate/format primitives.
///
/// The expression language itself (grammar, numeric and symbolic semantics,
/// pretty-printing) belongs to the host; the rewrite pipeline and the
/// preview evaluator only drive it through this surface.
pub trait Host: Send + Sync {
	/// Parses one line as a single expression.
	///
	/// Statements (assignments, definitions) must be rejected: the preview
	/// path relies on this to skip anything with side effects.
	fn parse_expr(&self, text: &str) -> Result<Expr, ParseError>;

	/// Evaluates a program tree against `ns` as the only writable scope.
	///
	/// `Ok(None)` means the evaluation produced nothing to show.
	fn eval(&self, expr: &Expr, ns: &mut Namespace) -> Result<Option<Value>, EvalError>;

	/// Like [`Host::eval`], but a cooperating host may poll `interrupt` and
	/// abandon a long evaluation early.
	///
	/// The default ignores the token; interruption is a latency
	/// enhancement, never a correctness requirement.
	fn eval_interruptible(
		&self,
		expr: &Expr,
		ns: &mut Namespace,
		interrupt: &CancellationToken,
	) -> Result<Option<Value>, EvalError> {
		let _ = interrupt;
		self.eval(expr, ns)
	}

	/// Forces numeric evaluation of irrational constants inside a value.
	fn evalf(&self, value: &Value) -> Value;

	/// Math pretty-printer. May return multi-line text; the preview
	/// formatter applies its own single-line policy on top.
	fn pretty(&self, value: &Value) -> String;

	/// Current terminal width in columns.
	fn terminal_width(&self) -> usize;
}

/// Captured text and identity of an input buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocSnapshot {
	/// The buffer's full text.
	pub text: String,
	/// Identity of that text; strictly increases on every edit.
	pub version: u64,
}

/// The input buffer being edited.
pub trait Document: Send + Sync {
	/// Atomically captures current text and version.
	fn capture(&self) -> DocSnapshot;

	/// Current version without the text.
	fn version(&self) -> u64;
}

/// The single status-line slot previews are rendered into.
pub trait StatusSink: Send + Sync {
	/// Replaces the status line; the empty string clears it.
	fn set_status(&self, text: &str);
}
