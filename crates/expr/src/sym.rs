//! Symbolic-result wrapper.
//!
//! The shell lets symbolic expressions be *used* like functions: call syntax
//! multiplies (`2x(4)` is `8x`), index syntax substitutes the free symbols in
//! name order, and `.real`/`.imag` project components. Instead of patching
//! this behavior onto the math engine's expression type globally (a
//! load-order-dependent, process-wide side effect), the behavior lives here
//! as ordinary methods on a wrapper this crate owns.

use std::fmt;

use crate::error::EvalError;
use crate::expr::{BinOp, Expr};
use crate::value::Value;

/// An unevaluated symbolic expression with free variables.
#[derive(Debug, Clone, PartialEq)]
pub struct SymExpr {
	expr: Expr,
}

impl SymExpr {
	/// Wraps a program tree as a symbolic value.
	pub fn new(expr: Expr) -> Self {
		Self { expr }
	}

	/// The underlying tree.
	pub fn expr(&self) -> &Expr {
		&self.expr
	}

	/// Free symbols, sorted by name.
	pub fn free_symbols(&self) -> Vec<String> {
		self.expr.free_names()
	}

	/// Call syntax on a symbolic value is scalar multiplication.
	///
	/// Exactly one argument is accepted; the result is `arg * self`.
	pub fn implicit_call(&self, args: &[Value]) -> Result<Self, EvalError> {
		let [arg] = args else {
			return Err(EvalError::msg(
				"implicit multiply of a symbolic expression expects a single argument",
			));
		};
		let lhs = literal_tree(arg)
			.ok_or_else(|| EvalError::msg("argument cannot be used in a symbolic product"))?;
		Ok(Self::new(Expr::Binary {
			op: BinOp::Mul,
			lhs: Box::new(lhs),
			rhs: Box::new(self.expr.clone()),
		}))
	}

	/// Index syntax substitutes the free symbols, sorted by name.
	///
	/// The argument count must match the free-symbol count exactly.
	pub fn substitute(&self, args: &[Value]) -> Result<Self, EvalError> {
		let symbols = self.free_symbols();
		if args.len() != symbols.len() {
			return Err(EvalError(format!(
				"expected {} arguments for free symbols {:?}",
				symbols.len(),
				symbols
			)));
		}
		let mut replacements = Vec::with_capacity(symbols.len());
		for (symbol, arg) in symbols.iter().zip(args) {
			let tree = literal_tree(arg)
				.ok_or_else(|| EvalError::msg("argument cannot be substituted for a symbol"))?;
			replacements.push((symbol.clone(), tree));
		}
		Ok(Self::new(substitute_names(self.expr.clone(), &replacements)))
	}

	/// Real component, as a `re(..)` call for the host to evaluate.
	pub fn real(&self) -> Self {
		Self::new(Expr::call("re", vec![self.expr.clone()]))
	}

	/// Imaginary component, as an `im(..)` call for the host to evaluate.
	pub fn imag(&self) -> Self {
		Self::new(Expr::call("im", vec![self.expr.clone()]))
	}
}

fn substitute_names(expr: Expr, replacements: &[(String, Expr)]) -> Expr {
	if let Expr::Name(name) = &expr {
		if let Some((_, tree)) = replacements.iter().find(|(n, _)| n == name) {
			return tree.clone();
		}
	}
	expr.map_children(&mut |child| substitute_names(child, replacements))
}

fn literal_tree(value: &Value) -> Option<Expr> {
	match value {
		Value::Int(n) => Some(Expr::Int(*n)),
		Value::Float(x) => Some(Expr::Float(*x)),
		Value::Exact(e) if e.is_integer() => Some(Expr::Int(e.numer())),
		Value::Exact(e) => Some(Expr::Binary {
			op: BinOp::Div,
			lhs: Box::new(Expr::Int(e.numer())),
			rhs: Box::new(Expr::Int(e.denom())),
		}),
		Value::Symbolic(s) => Some(s.expr.clone()),
		_ => None,
	}
}

impl fmt::Display for SymExpr {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", render(&self.expr, 0))
	}
}

fn precedence(op: BinOp) -> u8 {
	match op {
		BinOp::Add | BinOp::Sub => 1,
		BinOp::Mul | BinOp::Div => 2,
		BinOp::Pow => 3,
	}
}

fn op_text(op: BinOp) -> &'static str {
	match op {
		BinOp::Add => " + ",
		BinOp::Sub => " - ",
		BinOp::Mul => "*",
		BinOp::Div => "/",
		BinOp::Pow => "**",
	}
}

fn render(expr: &Expr, parent_prec: u8) -> String {
	match expr {
		Expr::Int(n) => n.to_string(),
		Expr::Float(x) => x.to_string(),
		Expr::Str(s) => format!("{s:?}"),
		Expr::Name(name) => name.clone(),
		Expr::Unary { op, operand } => {
			let sign = match op {
				crate::expr::UnOp::Neg => "-",
				crate::expr::UnOp::Pos => "+",
			};
			format!("{sign}{}", render(operand, 4))
		}
		Expr::Binary { op, lhs, rhs } => {
			let prec = precedence(*op);
			let text = format!(
				"{}{}{}",
				render(lhs, prec),
				op_text(*op),
				render(rhs, prec + 1)
			);
			if prec < parent_prec {
				format!("({text})")
			} else {
				text
			}
		}
		Expr::Call { callee, args } => {
			let args = args.iter().map(|a| render(a, 0)).collect::<Vec<_>>().join(", ");
			format!("{}({args})", render(callee, 4))
		}
		Expr::Attr { base, name } => format!("{}.{name}", render(base, 4)),
		Expr::Tuple(elems) => {
			let inner = elems.iter().map(|e| render(e, 0)).collect::<Vec<_>>().join(", ");
			format!("({inner})")
		}
		Expr::Lambda { params, body } => {
			format!("lambda {}: {}", params.join(", "), render(body, 0))
		}
		Expr::Assign { target, value } => format!("{target} = {}", render(value, 0)),
	}
}
