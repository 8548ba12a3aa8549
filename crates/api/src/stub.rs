//! Deterministic stub host for workspace tests.
//!
//! A miniature expression language standing in for the real math engine:
//! enough grammar and arithmetic to exercise the rewrite pipeline and the
//! preview evaluator end to end, with knobs for the behaviors tests need to
//! provoke (narrow terminals, multi-line pretty output, slow evaluations).
//!
//! The grammar is expressions only. Anything statement-shaped (`=`, `:`)
//! fails to lex, which is exactly the contract [`Host::parse_expr`] demands.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use tally_expr::{BinOp, Exact, EvalError, Expr, Namespace, ParseError, SymExpr, Timestamp, UnOp, Value};

use crate::host::Host;

/// Configurable stub implementation of [`Host`].
#[derive(Debug, Default)]
pub struct StubHost {
	/// Reported terminal width; 0 means the 80-column default.
	pub width: usize,
	/// Render matrices one row per line from [`Host::pretty`].
	pub multiline_matrix: bool,
	/// Artificial evaluation latency, for scheduler tests.
	pub eval_delay: Option<Duration>,
	evals: AtomicUsize,
}

impl StubHost {
	/// Stub with default knobs.
	pub fn new() -> Self {
		Self::default()
	}

	/// Number of evaluations performed so far.
	pub fn eval_count(&self) -> usize {
		self.evals.load(Ordering::SeqCst)
	}
}

impl Host for StubHost {
	fn parse_expr(&self, text: &str) -> Result<Expr, ParseError> {
		let tokens = lex(text)?;
		let mut parser = Parser { tokens, pos: 0 };
		let expr = parser.expr()?;
		if parser.pos != parser.tokens.len() {
			return Err(ParseError::msg("trailing input after expression"));
		}
		Ok(expr)
	}

	fn eval(&self, expr: &Expr, ns: &mut Namespace) -> Result<Option<Value>, EvalError> {
		self.evals.fetch_add(1, Ordering::SeqCst);
		if let Some(delay) = self.eval_delay {
			std::thread::sleep(delay);
		}
		eval_node(expr, ns)
	}

	fn eval_interruptible(
		&self,
		expr: &Expr,
		ns: &mut Namespace,
		interrupt: &CancellationToken,
	) -> Result<Option<Value>, EvalError> {
		self.evals.fetch_add(1, Ordering::SeqCst);
		if let Some(delay) = self.eval_delay {
			let step = Duration::from_millis(1);
			let mut waited = Duration::ZERO;
			while waited < delay {
				if interrupt.is_cancelled() {
					return Err(EvalError::msg("interrupted"));
				}
				std::thread::sleep(step);
				waited += step;
			}
		}
		eval_node(expr, ns)
	}

	fn evalf(&self, value: &Value) -> Value {
		match value {
			Value::Symbolic(sym) if sym.free_symbols().is_empty() => {
				match eval_node(sym.expr(), &mut Namespace::new()) {
					Ok(Some(v)) => v,
					_ => value.clone(),
				}
			}
			Value::Seq(elems) => Value::Seq(elems.iter().map(|v| self.evalf(v)).collect()),
			Value::Map(entries) => Value::Map(
				entries.iter().map(|(k, v)| (k.clone(), self.evalf(v))).collect(),
			),
			Value::Matrix { rows, cols, elems } => Value::Matrix {
				rows: *rows,
				cols: *cols,
				elems: elems.iter().map(|v| self.evalf(v)).collect(),
			},
			other => other.clone(),
		}
	}

	fn pretty(&self, value: &Value) -> String {
		match value {
			Value::Matrix { rows, cols, elems } if self.multiline_matrix => {
				let mut lines = Vec::with_capacity(*rows);
				for r in 0..*rows {
					let row = (0..*cols)
						.filter_map(|c| elems.get(r * cols + c))
						.map(ToString::to_string)
						.collect::<Vec<_>>()
						.join(" ");
					lines.push(format!("[{row}]"));
				}
				lines.join("\n")
			}
			other => other.to_string(),
		}
	}

	fn terminal_width(&self) -> usize {
		if self.width == 0 { 80 } else { self.width }
	}
}

// ---- lexer ----

#[derive(Debug, Clone, PartialEq)]
enum Token {
	Int(i64),
	Float(f64),
	Str(String),
	Ident(String),
	Plus,
	Minus,
	Star,
	StarStar,
	Slash,
	LParen,
	RParen,
	Comma,
	Dot,
}

fn lex(text: &str) -> Result<Vec<Token>, ParseError> {
	let mut tokens = Vec::new();
	let chars: Vec<char> = text.chars().collect();
	let mut i = 0;
	while i < chars.len() {
		let c = chars[i];
		match c {
			' ' | '\t' | '\n' | '\r' => i += 1,
			'+' => {
				tokens.push(Token::Plus);
				i += 1;
			}
			'-' => {
				tokens.push(Token::Minus);
				i += 1;
			}
			'*' => {
				if chars.get(i + 1) == Some(&'*') {
					tokens.push(Token::StarStar);
					i += 2;
				} else {
					tokens.push(Token::Star);
					i += 1;
				}
			}
			'/' => {
				tokens.push(Token::Slash);
				i += 1;
			}
			'(' => {
				tokens.push(Token::LParen);
				i += 1;
			}
			')' => {
				tokens.push(Token::RParen);
				i += 1;
			}
			',' => {
				tokens.push(Token::Comma);
				i += 1;
			}
			'"' => {
				let (s, next) = lex_string(&chars, i)?;
				tokens.push(Token::Str(s));
				i = next;
			}
			'.' if chars.get(i + 1).is_some_and(|c| c.is_ascii_digit()) => {
				let (tok, next) = lex_number(&chars, i)?;
				tokens.push(tok);
				i = next;
			}
			'.' => {
				tokens.push(Token::Dot);
				i += 1;
			}
			'0'..='9' => {
				let (tok, next) = lex_number(&chars, i)?;
				tokens.push(tok);
				i = next;
			}
			c if c.is_alphabetic() || c == '_' => {
				let start = i;
				while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
					i += 1;
				}
				tokens.push(Token::Ident(chars[start..i].iter().collect()));
			}
			other => {
				return Err(ParseError(format!("unexpected character {other:?}")));
			}
		}
	}
	Ok(tokens)
}

fn lex_string(chars: &[char], start: usize) -> Result<(String, usize), ParseError> {
	let mut s = String::new();
	let mut i = start + 1;
	while i < chars.len() {
		match chars[i] {
			'"' => return Ok((s, i + 1)),
			'\\' => {
				let escaped = chars
					.get(i + 1)
					.ok_or_else(|| ParseError::msg("unterminated escape"))?;
				s.push(*escaped);
				i += 2;
			}
			c => {
				s.push(c);
				i += 1;
			}
		}
	}
	Err(ParseError::msg("unterminated string literal"))
}

fn lex_number(chars: &[char], start: usize) -> Result<(Token, usize), ParseError> {
	let mut i = start;
	if chars[i] == '0' && matches!(chars.get(i + 1), Some('x' | 'X')) {
		i += 2;
		let hex_start = i;
		while i < chars.len() && chars[i].is_ascii_hexdigit() {
			i += 1;
		}
		let digits: String = chars[hex_start..i].iter().collect();
		let n = i64::from_str_radix(&digits, 16)
			.map_err(|_| ParseError::msg("invalid hexadecimal literal"))?;
		return Ok((Token::Int(n), i));
	}

	let mut is_float = false;
	while i < chars.len() && chars[i].is_ascii_digit() {
		i += 1;
	}
	if chars.get(i) == Some(&'.') && chars.get(i + 1).is_some_and(|c| c.is_ascii_digit()) {
		is_float = true;
		i += 1;
		while i < chars.len() && chars[i].is_ascii_digit() {
			i += 1;
		}
	}
	if matches!(chars.get(i), Some('e' | 'E'))
		&& (chars.get(i + 1).is_some_and(|c| c.is_ascii_digit())
			|| (chars.get(i + 1) == Some(&'-') && chars.get(i + 2).is_some_and(|c| c.is_ascii_digit())))
	{
		is_float = true;
		i += 1;
		if chars.get(i) == Some(&'-') {
			i += 1;
		}
		while i < chars.len() && chars[i].is_ascii_digit() {
			i += 1;
		}
	}
	let text: String = chars[start..i].iter().collect();
	if is_float {
		let x: f64 = text.parse().map_err(|_| ParseError::msg("invalid numeric literal"))?;
		Ok((Token::Float(x), i))
	} else {
		let n: i64 = text.parse().map_err(|_| ParseError::msg("integer literal out of range"))?;
		Ok((Token::Int(n), i))
	}
}

// ---- parser ----

struct Parser {
	tokens: Vec<Token>,
	pos: usize,
}

impl Parser {
	fn peek(&self) -> Option<&Token> {
		self.tokens.get(self.pos)
	}

	fn bump(&mut self) -> Option<Token> {
		let tok = self.tokens.get(self.pos).cloned();
		if tok.is_some() {
			self.pos += 1;
		}
		tok
	}

	fn expect(&mut self, tok: &Token) -> Result<(), ParseError> {
		if self.peek() == Some(tok) {
			self.pos += 1;
			Ok(())
		} else {
			Err(ParseError(format!("expected {tok:?}")))
		}
	}

	fn expr(&mut self) -> Result<Expr, ParseError> {
		let mut lhs = self.term()?;
		loop {
			let op = match self.peek() {
				Some(Token::Plus) => BinOp::Add,
				Some(Token::Minus) => BinOp::Sub,
				_ => break,
			};
			self.pos += 1;
			let rhs = self.term()?;
			lhs = Expr::Binary { op, lhs: Box::new(lhs), rhs: Box::new(rhs) };
		}
		Ok(lhs)
	}

	fn term(&mut self) -> Result<Expr, ParseError> {
		let mut lhs = self.power()?;
		loop {
			let op = match self.peek() {
				Some(Token::Star) => BinOp::Mul,
				Some(Token::Slash) => BinOp::Div,
				_ => break,
			};
			self.pos += 1;
			let rhs = self.power()?;
			lhs = Expr::Binary { op, lhs: Box::new(lhs), rhs: Box::new(rhs) };
		}
		Ok(lhs)
	}

	fn power(&mut self) -> Result<Expr, ParseError> {
		let base = self.unary()?;
		if self.peek() == Some(&Token::StarStar) {
			self.pos += 1;
			// right associative
			let exp = self.power()?;
			return Ok(Expr::Binary {
				op: BinOp::Pow,
				lhs: Box::new(base),
				rhs: Box::new(exp),
			});
		}
		Ok(base)
	}

	fn unary(&mut self) -> Result<Expr, ParseError> {
		match self.peek() {
			Some(Token::Minus) => {
				self.pos += 1;
				Ok(Expr::Unary { op: UnOp::Neg, operand: Box::new(self.unary()?) })
			}
			Some(Token::Plus) => {
				self.pos += 1;
				Ok(Expr::Unary { op: UnOp::Pos, operand: Box::new(self.unary()?) })
			}
			_ => self.postfix(),
		}
	}

	fn postfix(&mut self) -> Result<Expr, ParseError> {
		let mut expr = self.atom()?;
		loop {
			match self.peek() {
				Some(Token::LParen) => {
					self.pos += 1;
					let args = self.args()?;
					expr = Expr::Call { callee: Box::new(expr), args };
				}
				Some(Token::Dot) => {
					self.pos += 1;
					let Some(Token::Ident(name)) = self.bump() else {
						return Err(ParseError::msg("expected attribute name after '.'"));
					};
					expr = Expr::Attr { base: Box::new(expr), name };
				}
				_ => break,
			}
		}
		Ok(expr)
	}

	fn args(&mut self) -> Result<Vec<Expr>, ParseError> {
		let mut args = Vec::new();
		if self.peek() == Some(&Token::RParen) {
			self.pos += 1;
			return Ok(args);
		}
		loop {
			args.push(self.expr()?);
			match self.bump() {
				Some(Token::Comma) => {}
				Some(Token::RParen) => return Ok(args),
				_ => return Err(ParseError::msg("expected ',' or ')' in argument list")),
			}
		}
	}

	fn atom(&mut self) -> Result<Expr, ParseError> {
		match self.bump() {
			Some(Token::Int(n)) => Ok(Expr::Int(n)),
			Some(Token::Float(x)) => Ok(Expr::Float(x)),
			Some(Token::Str(s)) => Ok(Expr::Str(s)),
			Some(Token::Ident(name)) => Ok(Expr::Name(name)),
			Some(Token::LParen) => {
				if self.peek() == Some(&Token::RParen) {
					self.pos += 1;
					return Ok(Expr::Tuple(Vec::new()));
				}
				let first = self.expr()?;
				if self.peek() == Some(&Token::Comma) {
					let mut elems = vec![first];
					while self.peek() == Some(&Token::Comma) {
						self.pos += 1;
						if self.peek() == Some(&Token::RParen) {
							break;
						}
						elems.push(self.expr()?);
					}
					self.expect(&Token::RParen)?;
					return Ok(Expr::Tuple(elems));
				}
				self.expect(&Token::RParen)?;
				Ok(first)
			}
			other => Err(ParseError(format!("unexpected token {other:?}"))),
		}
	}
}

// ---- evaluator ----

fn eval_node(expr: &Expr, ns: &mut Namespace) -> Result<Option<Value>, EvalError> {
	// `noop(..)` models a host call that completes without a displayable
	// result, the equivalent of an expression evaluating to nothing.
	if let Expr::Call { callee, .. } = expr {
		if matches!(callee.as_ref(), Expr::Name(name) if name == "noop") {
			return Ok(None);
		}
	}
	Ok(Some(eval_value(expr, ns)?))
}

fn eval_value(expr: &Expr, ns: &mut Namespace) -> Result<Value, EvalError> {
	match expr {
		Expr::Int(n) => Ok(Value::Int(*n)),
		Expr::Float(x) => Ok(Value::Float(*x)),
		Expr::Str(s) => Ok(Value::Str(s.clone())),
		Expr::Name(name) => ns
			.get(name)
			.cloned()
			.ok_or_else(|| EvalError(format!("name '{name}' is not defined"))),
		Expr::Unary { op, operand } => {
			let value = eval_value(operand, ns)?;
			match (op, value) {
				(UnOp::Pos, v) => Ok(v),
				(UnOp::Neg, Value::Int(n)) => Ok(Value::Int(-n)),
				(UnOp::Neg, Value::Exact(e)) => Ok(Value::Exact(Exact::ratio(-e.numer(), e.denom()))),
				(UnOp::Neg, Value::Float(x)) => Ok(Value::Float(-x)),
				(UnOp::Neg, v) => Err(EvalError(format!("cannot negate {v:?}"))),
			}
		}
		Expr::Binary { op, lhs, rhs } => {
			let lhs = eval_value(lhs, ns)?;
			let rhs = eval_value(rhs, ns)?;
			binary(*op, lhs, rhs)
		}
		Expr::Call { callee, args } => {
			let arg_values = args
				.iter()
				.map(|a| eval_value(a, ns))
				.collect::<Result<Vec<_>, _>>()?;
			call(callee, arg_values, ns)
		}
		Expr::Attr { base, name } => {
			let base = eval_value(base, ns)?;
			match (base, name.as_str()) {
				(Value::Symbolic(sym), "real") => Ok(Value::Symbolic(sym.real())),
				(Value::Symbolic(sym), "imag") => Ok(Value::Symbolic(sym.imag())),
				(_, name) => Err(EvalError(format!("unknown attribute '{name}'"))),
			}
		}
		Expr::Tuple(elems) => {
			let values = elems
				.iter()
				.map(|e| eval_value(e, ns))
				.collect::<Result<Vec<_>, _>>()?;
			Ok(Value::Seq(values))
		}
		Expr::Lambda { .. } | Expr::Assign { .. } => {
			Err(EvalError::msg("statement form is not evaluable as an expression"))
		}
	}
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
		Value::Symbolic(sym) => Some(sym.expr().clone()),
		_ => None,
	}
}

fn binary(op: BinOp, lhs: Value, rhs: Value) -> Result<Value, EvalError> {
	if matches!(lhs, Value::Symbolic(_)) || matches!(rhs, Value::Symbolic(_)) {
		let l = literal_tree(&lhs).ok_or_else(|| EvalError::msg("non-numeric symbolic operand"))?;
		let r = literal_tree(&rhs).ok_or_else(|| EvalError::msg("non-numeric symbolic operand"))?;
		return Ok(Value::Symbolic(SymExpr::new(Expr::Binary {
			op,
			lhs: Box::new(l),
			rhs: Box::new(r),
		})));
	}

	match (lhs, rhs) {
		(Value::Int(a), Value::Int(b)) => int_binary(op, a, b),
		(Value::Exact(a), Value::Exact(b)) => exact_binary(op, a, b),
		(Value::Exact(a), Value::Int(b)) => exact_binary(op, a, Exact::int(b)),
		(Value::Int(a), Value::Exact(b)) => exact_binary(op, Exact::int(a), b),
		(a, b) => {
			let x = as_float(&a)?;
			let y = as_float(&b)?;
			let out = match op {
				BinOp::Add => x + y,
				BinOp::Sub => x - y,
				BinOp::Mul => x * y,
				BinOp::Div => x / y,
				BinOp::Pow => x.powf(y),
			};
			Ok(Value::Float(out))
		}
	}
}

fn as_float(value: &Value) -> Result<f64, EvalError> {
	match value {
		Value::Int(n) => Ok(*n as f64),
		Value::Exact(e) => Ok(e.numer() as f64 / e.denom() as f64),
		Value::Float(x) => Ok(*x),
		other => Err(EvalError(format!("{other:?} is not numeric"))),
	}
}

fn int_binary(op: BinOp, a: i64, b: i64) -> Result<Value, EvalError> {
	let overflow = || EvalError::msg("integer overflow");
	match op {
		BinOp::Add => a.checked_add(b).map(Value::Int).ok_or_else(overflow),
		BinOp::Sub => a.checked_sub(b).map(Value::Int).ok_or_else(overflow),
		BinOp::Mul => a.checked_mul(b).map(Value::Int).ok_or_else(overflow),
		BinOp::Div => {
			if b == 0 {
				Err(EvalError::msg("division by zero"))
			} else {
				Ok(Value::Float(a as f64 / b as f64))
			}
		}
		BinOp::Pow => {
			if let Ok(exp) = u32::try_from(b) {
				a.checked_pow(exp).map(Value::Int).ok_or_else(overflow)
			} else {
				Ok(Value::Float((a as f64).powi(b as i32)))
			}
		}
	}
}

fn exact_binary(op: BinOp, a: Exact, b: Exact) -> Result<Value, EvalError> {
	let result = match op {
		BinOp::Add => Exact::ratio(
			a.numer() * b.denom() + b.numer() * a.denom(),
			a.denom() * b.denom(),
		),
		BinOp::Sub => Exact::ratio(
			a.numer() * b.denom() - b.numer() * a.denom(),
			a.denom() * b.denom(),
		),
		BinOp::Mul => Exact::ratio(a.numer() * b.numer(), a.denom() * b.denom()),
		BinOp::Div => {
			if b.numer() == 0 {
				return Err(EvalError::msg("division by zero"));
			}
			Exact::ratio(a.numer() * b.denom(), a.denom() * b.numer())
		}
		BinOp::Pow => {
			let Ok(exp) = u32::try_from(b.numer()) else {
				return Err(EvalError::msg("non-integer exponent on exact value"));
			};
			if !b.is_integer() {
				return Err(EvalError::msg("non-integer exponent on exact value"));
			}
			Exact::ratio(
				a.numer()
					.checked_pow(exp)
					.ok_or_else(|| EvalError::msg("integer overflow"))?,
				a.denom()
					.checked_pow(exp)
					.ok_or_else(|| EvalError::msg("integer overflow"))?,
			)
		}
	};
	Ok(Value::Exact(result))
}

fn call(callee: &Expr, args: Vec<Value>, ns: &mut Namespace) -> Result<Value, EvalError> {
	if let Expr::Name(name) = callee {
		match name.as_str() {
			"Integer" => {
				return match args.as_slice() {
					[Value::Int(n)] => Ok(Value::Exact(Exact::int(*n))),
					[Value::Exact(e)] => Ok(Value::Exact(*e)),
					_ => Err(EvalError::msg("Integer() expects a single integer")),
				};
			}
			"Matrix" => {
				let [arg] = args.as_slice() else {
					return Err(EvalError::msg("Matrix() expects a single tuple argument"));
				};
				return matrix_from_rows(arg);
			}
			"datetime" => return datetime_from_args(&args),
			"re" | "im" => {
				let [arg] = args.as_slice() else {
					return Err(EvalError(format!("{name}() expects a single argument")));
				};
				return match (name.as_str(), arg) {
					("re", Value::Symbolic(sym)) => Ok(Value::Symbolic(sym.real())),
					("im", Value::Symbolic(sym)) => Ok(Value::Symbolic(sym.imag())),
					("re", v @ (Value::Int(_) | Value::Exact(_) | Value::Float(_))) => Ok(v.clone()),
					("im", Value::Int(_) | Value::Exact(_) | Value::Float(_)) => Ok(Value::Int(0)),
					_ => Err(EvalError(format!("{name}() expects a numeric argument"))),
				};
			}
			_ => {}
		}
	}

	let callee_value = eval_value(callee, ns)?;
	match callee_value {
		Value::Symbolic(sym) => sym.implicit_call(&args).map(Value::Symbolic),
		other => Err(EvalError(format!("{other:?} is not callable"))),
	}
}

fn matrix_from_rows(arg: &Value) -> Result<Value, EvalError> {
	let Value::Seq(rows) = arg else {
		return Err(EvalError::msg("Matrix() expects a tuple of rows"));
	};
	if rows.is_empty() {
		return Err(EvalError::msg("Matrix() expects at least one row"));
	}
	let mut elems = Vec::new();
	let mut cols = None;
	for row in rows {
		let Value::Seq(cells) = row else {
			return Err(EvalError::msg("Matrix() rows must be tuples"));
		};
		match cols {
			None => cols = Some(cells.len()),
			Some(c) if c != cells.len() => {
				return Err(EvalError::msg("Matrix() rows have mismatched lengths"));
			}
			Some(_) => {}
		}
		elems.extend(cells.iter().cloned());
	}
	let cols = cols.unwrap_or(0);
	if cols == 0 {
		return Err(EvalError::msg("Matrix() rows must not be empty"));
	}
	Ok(Value::Matrix { rows: rows.len(), cols, elems })
}

fn datetime_from_args(args: &[Value]) -> Result<Value, EvalError> {
	if args.len() < 3 || args.len() > 7 {
		return Err(EvalError::msg("datetime() expects 3 to 7 integer arguments"));
	}
	let mut fields = [0i64; 7];
	for (slot, arg) in fields.iter_mut().zip(args) {
		*slot = match arg {
			Value::Int(n) => *n,
			Value::Exact(e) if e.is_integer() => e.numer(),
			_ => return Err(EvalError::msg("datetime() expects integer arguments")),
		};
	}
	Ok(Value::DateTime(Timestamp {
		year: fields[0] as i32,
		month: fields[1] as u32,
		day: fields[2] as u32,
		hour: fields[3] as u32,
		minute: fields[4] as u32,
		second: fields[5] as u32,
		micro: fields[6] as u32,
	}))
}

#[cfg(test)]
mod tests {
	use super::*;

	fn eval_text(host: &StubHost, text: &str, ns: &mut Namespace) -> Option<Value> {
		let expr = host.parse_expr(text).ok()?;
		host.eval(&expr, ns).ok().flatten()
	}

	#[test]
	fn test_arithmetic_with_precedence() {
		let host = StubHost::new();
		let mut ns = Namespace::new();
		assert_eq!(eval_text(&host, "2 + 3 * 4", &mut ns), Some(Value::Int(14)));
		assert_eq!(eval_text(&host, "2 ** 3 ** 2", &mut ns), Some(Value::Int(512)));
	}

	#[test]
	fn test_exact_division_stays_rational() {
		let host = StubHost::new();
		let mut ns = Namespace::new();
		let v = eval_text(&host, "Integer(1) / Integer(3)", &mut ns).unwrap();
		assert_eq!(v, Value::Exact(Exact::ratio(1, 3)));
	}

	#[test]
	fn test_incomplete_expression_fails_to_parse() {
		let host = StubHost::new();
		assert!(host.parse_expr("x +").is_err());
		assert!(host.parse_expr("f = lambda x: x").is_err());
	}

	#[test]
	fn test_undefined_name_fails_to_evaluate() {
		let host = StubHost::new();
		let expr = host.parse_expr("missing + 1").unwrap();
		assert!(host.eval(&expr, &mut Namespace::new()).is_err());
	}

	#[test]
	fn test_matrix_builtin_rejects_ragged_rows() {
		let host = StubHost::new();
		let mut ns = Namespace::new();
		let expr = host.parse_expr("Matrix(((1, 2), (3,)))").unwrap();
		assert!(host.eval(&expr, &mut ns).is_err());

		let ok = eval_text(&host, "Matrix(((1, 2), (3, 4)))", &mut ns).unwrap();
		assert_eq!(
			ok,
			Value::Matrix {
				rows: 2,
				cols: 2,
				elems: vec![Value::Int(1), Value::Int(2), Value::Int(3), Value::Int(4)],
			}
		);
	}

	#[test]
	fn test_symbolic_arithmetic_builds_trees() {
		let host = StubHost::new();
		let mut ns = Namespace::new();
		ns.insert("x", Value::Symbolic(SymExpr::new(Expr::Name("x".into()))));
		let v = eval_text(&host, "x + 1", &mut ns).unwrap();
		match v {
			Value::Symbolic(sym) => assert_eq!(sym.to_string(), "x + 1"),
			other => panic!("expected symbolic, got {other:?}"),
		}
	}

	#[test]
	fn test_hex_literals_lex_as_integers() {
		let host = StubHost::new();
		let mut ns = Namespace::new();
		assert_eq!(eval_text(&host, "0xff", &mut ns), Some(Value::Int(255)));
	}
}
