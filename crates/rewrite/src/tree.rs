//! The parsed-program rewrite chain.
//!
//! Runs once over the tree the host parser produced from an already
//! text-transformed line, applying three local, non-overlapping promotions:
//! integer literals to exact-integer constructor calls, nested tuples to
//! matrix constructor calls, and date-looking string literals to timestamp
//! constructor calls. Each stage is a total function from node to node with
//! identity as the default; a failed precondition keeps the original node.

use tracing::trace;

use tally_api::{Host, Settings};
use tally_expr::{Expr, Namespace};

use crate::date::DateParser;

/// Collaborators and toggles one chain run needs.
pub struct TreeCtx<'a> {
	/// Feature toggles.
	pub settings: &'a Settings,
	/// Host evaluator, used to validate tentative matrix promotions.
	pub host: &'a dyn Host,
	/// Scope matrix validation evaluates against; `None` skips validation
	/// and trusts the shape predicate alone.
	pub scope: Option<&'a Namespace>,
	/// Optional date-parsing collaborator; `None` disables date promotion.
	pub date_parser: Option<&'a dyn DateParser>,
}

/// The ordered tree transform chain.
#[derive(Debug, Default, Clone, Copy)]
pub struct TreeTransforms;

impl TreeTransforms {
	/// Applies the chain to one parsed tree.
	pub fn apply(&self, expr: Expr, ctx: &TreeCtx<'_>) -> Expr {
		let expr = promote_exact(expr);
		let expr = promote_matrices(expr, ctx);
		promote_dates(expr, ctx)
	}
}

/// Wraps every integer literal in an exact-integer constructor call so
/// downstream arithmetic defaults to exact rather than floating-point.
fn promote_exact(expr: Expr) -> Expr {
	match expr {
		Expr::Int(n) => Expr::call("Integer", vec![Expr::Int(n)]),
		other => other.map_children(&mut promote_exact),
	}
}

fn promote_matrices(expr: Expr, ctx: &TreeCtx<'_>) -> Expr {
	if !ctx.settings.auto_matrix {
		return expr;
	}
	if let Expr::Tuple(elems) = &expr {
		if is_matrix_shaped(elems) {
			let candidate = Expr::call("Matrix", vec![expr.clone()]);
			if validates(&candidate, ctx) {
				trace!("promoted nested tuple to matrix");
				return candidate;
			}
			trace!("matrix promotion rejected by evaluation, keeping tuple");
		}
	}
	expr.map_children(&mut |child| promote_matrices(child, ctx))
}

/// Narrow shape predicate: non-empty, every element a tuple, all rows the
/// same non-zero arity. Anything else (ranges, argument packs) stays a
/// tuple unconditionally.
fn is_matrix_shaped(elems: &[Expr]) -> bool {
	let mut rows = elems.iter().map(|elem| match elem {
		Expr::Tuple(cells) => Some(cells.len()),
		_ => None,
	});
	let Some(Some(first)) = rows.next() else {
		return false;
	};
	first > 0 && rows.all(|len| len == Some(first))
}

/// Evaluates the tentative constructor call in isolation; any evaluation
/// failure keeps the original tuple.
fn validates(candidate: &Expr, ctx: &TreeCtx<'_>) -> bool {
	let Some(scope) = ctx.scope else {
		return true;
	};
	let mut scratch = scope.clone();
	ctx.host.eval(candidate, &mut scratch).is_ok()
}

fn promote_dates(expr: Expr, ctx: &TreeCtx<'_>) -> Expr {
	if !ctx.settings.auto_date {
		return expr;
	}
	let Some(parser) = ctx.date_parser else {
		return expr;
	};
	promote_dates_inner(expr, parser)
}

fn promote_dates_inner(expr: Expr, parser: &dyn DateParser) -> Expr {
	if let Expr::Str(text) = &expr {
		if let Some(ts) = parser.parse_strict(text) {
			trace!(text, "promoted string literal to timestamp");
			return Expr::call(
				"datetime",
				vec![
					Expr::Int(i64::from(ts.year)),
					Expr::Int(i64::from(ts.month)),
					Expr::Int(i64::from(ts.day)),
					Expr::Int(i64::from(ts.hour)),
					Expr::Int(i64::from(ts.minute)),
					Expr::Int(i64::from(ts.second)),
					Expr::Int(i64::from(ts.micro)),
				],
			);
		}
	}
	expr.map_children(&mut |child| promote_dates_inner(child, parser))
}
