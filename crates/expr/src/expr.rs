//! The parsed program tree.
//!
//! The tree is a closed sum type rather than an open trait object: every
//! promotion rule in the rewrite chain is a total function from node to node
//! with identity as the default, and [`Expr::map_children`] is the single
//! traversal primitive they are all built on.

use std::collections::BTreeSet;

/// Binary operators the rewrites need to represent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
	Add,
	Sub,
	Mul,
	Div,
	Pow,
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
	Neg,
	Pos,
}

/// One node of a parsed expression or statement.
///
/// Produced by the host parser, rewritten by the tree-transform chain, and
/// handed back to the host evaluator. Statement forms (`Assign`) appear here
/// so transforms can traverse whole submitted lines, but the preview path
/// only ever sees expression roots.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
	/// Integer literal.
	Int(i64),
	/// Floating-point literal.
	Float(f64),
	/// String literal.
	Str(String),
	/// Identifier reference.
	Name(String),
	/// Unary operation.
	Unary { op: UnOp, operand: Box<Expr> },
	/// Binary operation.
	Binary { op: BinOp, lhs: Box<Expr>, rhs: Box<Expr> },
	/// Call with positional arguments.
	Call { callee: Box<Expr>, args: Vec<Expr> },
	/// Attribute access (`base.name`).
	Attr { base: Box<Expr>, name: String },
	/// Tuple literal.
	Tuple(Vec<Expr>),
	/// Anonymous function.
	Lambda { params: Vec<String>, body: Box<Expr> },
	/// Assignment statement (`target = value`).
	Assign { target: String, value: Box<Expr> },
}

impl Expr {
	/// Builds a call to a named constructor, e.g. `Integer(4)`.
	pub fn call(name: &str, args: Vec<Expr>) -> Self {
		Self::Call {
			callee: Box::new(Self::Name(name.to_string())),
			args,
		}
	}

	/// Rebuilds this node with `f` applied to each direct child.
	///
	/// Leaves are returned unchanged. Transforms recurse by calling
	/// themselves through this, so each rule stays local to one node shape.
	pub fn map_children(self, f: &mut impl FnMut(Expr) -> Expr) -> Self {
		match self {
			leaf @ (Self::Int(_) | Self::Float(_) | Self::Str(_) | Self::Name(_)) => leaf,
			Self::Unary { op, operand } => Self::Unary {
				op,
				operand: Box::new(f(*operand)),
			},
			Self::Binary { op, lhs, rhs } => Self::Binary {
				op,
				lhs: Box::new(f(*lhs)),
				rhs: Box::new(f(*rhs)),
			},
			Self::Call { callee, args } => Self::Call {
				callee: Box::new(f(*callee)),
				args: args.into_iter().map(&mut *f).collect(),
			},
			Self::Attr { base, name } => Self::Attr {
				base: Box::new(f(*base)),
				name,
			},
			Self::Tuple(elems) => Self::Tuple(elems.into_iter().map(&mut *f).collect()),
			Self::Lambda { params, body } => Self::Lambda {
				params,
				body: Box::new(f(*body)),
			},
			Self::Assign { target, value } => Self::Assign {
				target,
				value: Box::new(f(*value)),
			},
		}
	}

	/// Collects the free identifiers referenced by this tree, sorted.
	///
	/// Lambda parameters shadow outer names within their body.
	pub fn free_names(&self) -> Vec<String> {
		fn walk(expr: &Expr, bound: &mut Vec<String>, out: &mut BTreeSet<String>) {
			match expr {
				Expr::Name(name) => {
					if !bound.iter().any(|b| b == name) {
						out.insert(name.clone());
					}
				}
				Expr::Int(_) | Expr::Float(_) | Expr::Str(_) => {}
				Expr::Unary { operand, .. } => walk(operand, bound, out),
				Expr::Binary { lhs, rhs, .. } => {
					walk(lhs, bound, out);
					walk(rhs, bound, out);
				}
				Expr::Call { callee, args } => {
					walk(callee, bound, out);
					for arg in args {
						walk(arg, bound, out);
					}
				}
				Expr::Attr { base, .. } => walk(base, bound, out),
				Expr::Tuple(elems) => {
					for elem in elems {
						walk(elem, bound, out);
					}
				}
				Expr::Lambda { params, body } => {
					let depth = bound.len();
					bound.extend(params.iter().cloned());
					walk(body, bound, out);
					bound.truncate(depth);
				}
				Expr::Assign { value, .. } => walk(value, bound, out),
			}
		}

		let mut out = BTreeSet::new();
		walk(self, &mut Vec::new(), &mut out);
		out.into_iter().collect()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_map_children_identity_on_leaves() {
		let expr = Expr::Int(4);
		assert_eq!(expr.clone().map_children(&mut |e| e), expr);
	}

	#[test]
	fn test_map_children_visits_call_args() {
		let expr = Expr::call("f", vec![Expr::Int(1), Expr::Int(2)]);
		let doubled = expr.map_children(&mut |e| match e {
			Expr::Int(n) => Expr::Int(n * 2),
			other => other,
		});
		assert_eq!(doubled, Expr::call("f", vec![Expr::Int(2), Expr::Int(4)]));
	}

	#[test]
	fn test_free_names_sorted_and_deduped() {
		let expr = Expr::Binary {
			op: BinOp::Add,
			lhs: Box::new(Expr::Name("y".into())),
			rhs: Box::new(Expr::Binary {
				op: BinOp::Mul,
				lhs: Box::new(Expr::Name("x".into())),
				rhs: Box::new(Expr::Name("y".into())),
			}),
		};
		assert_eq!(expr.free_names(), vec!["x".to_string(), "y".to_string()]);
	}

	#[test]
	fn test_free_names_lambda_params_are_bound() {
		let expr = Expr::Lambda {
			params: vec!["x".into()],
			body: Box::new(Expr::Binary {
				op: BinOp::Add,
				lhs: Box::new(Expr::Name("x".into())),
				rhs: Box::new(Expr::Name("k".into())),
			}),
		};
		assert_eq!(expr.free_names(), vec!["k".to_string()]);
	}
}
