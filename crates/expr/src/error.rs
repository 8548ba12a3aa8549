use thiserror::Error;

/// Failure to parse a line as a single expression.
///
/// The host parser decides what is and is not an expression; this type only
/// carries its message across the boundary. Preview evaluation treats any
/// parse failure as "no preview", never as a user-visible error.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("parse error: {0}")]
pub struct ParseError(pub String);

/// Failure while evaluating a program tree.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("evaluation error: {0}")]
pub struct EvalError(pub String);

impl EvalError {
	/// Convenience constructor for host evaluators.
	pub fn msg(msg: impl Into<String>) -> Self {
		Self(msg.into())
	}
}

impl ParseError {
	/// Convenience constructor for host parsers.
	pub fn msg(msg: impl Into<String>) -> Self {
		Self(msg.into())
	}
}
