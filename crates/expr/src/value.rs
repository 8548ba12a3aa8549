//! Boundary value model.
//!
//! [`Value`] is the wire type between the host evaluator and the preview
//! formatter: a closed set of semantic categories (numeric, symbolic,
//! sequence, mapping, ...) with one formatting rule per category on the
//! preview side. Host-specific result types that do not fit a category
//! travel as [`HostObject`] trait objects and keep their own display and
//! copy behavior.

use std::fmt;
use std::sync::Arc;

use crate::sym::SymExpr;

/// An exact numeric scalar: an integer or a normalized rational.
///
/// Arithmetic on exacts belongs to the host evaluator; this type only
/// carries the result across the boundary and renders it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Exact {
	num: i64,
	den: i64,
}

impl Exact {
	/// Exact integer.
	pub const fn int(n: i64) -> Self {
		Self { num: n, den: 1 }
	}

	/// Exact ratio, normalized to lowest terms with a positive denominator.
	///
	/// A zero denominator is the host evaluator's bug to report; here it is
	/// pinned to the integer zero so display code never divides by it.
	pub fn ratio(num: i64, den: i64) -> Self {
		if den == 0 {
			return Self::int(0);
		}
		let sign = if den < 0 { -1 } else { 1 };
		let g = gcd(num.unsigned_abs(), den.unsigned_abs()) as i64;
		Self {
			num: sign * num / g,
			den: sign.saturating_mul(den) / g,
		}
	}

	/// Numerator after normalization.
	pub const fn numer(self) -> i64 {
		self.num
	}

	/// Denominator after normalization (always positive).
	pub const fn denom(self) -> i64 {
		self.den
	}

	/// True when the value is a whole integer.
	pub const fn is_integer(self) -> bool {
		self.den == 1
	}
}

fn gcd(mut a: u64, mut b: u64) -> u64 {
	while b != 0 {
		let r = a % b;
		a = b;
		b = r;
	}
	a.max(1)
}

impl fmt::Display for Exact {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if self.den == 1 {
			write!(f, "{}", self.num)
		} else {
			write!(f, "{}/{}", self.num, self.den)
		}
	}
}

/// A calendar timestamp produced by date promotion.
///
/// Stored as plain fields so this crate carries no calendar dependency; the
/// date-parsing collaborator that produces it validates the fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timestamp {
	pub year: i32,
	pub month: u32,
	pub day: u32,
	pub hour: u32,
	pub minute: u32,
	pub second: u32,
	pub micro: u32,
}

impl fmt::Display for Timestamp {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
			self.year, self.month, self.day, self.hour, self.minute, self.second
		)?;
		if self.micro != 0 {
			write!(f, ".{:06}", self.micro)?;
		}
		Ok(())
	}
}

/// A host-owned value outside the closed category set.
///
/// The preview subsystem never inspects these beyond the operations below;
/// the defaults make an object opaque, non-copyable and not a unit prefix.
pub trait HostObject: Send + Sync {
	/// Plain string form, the equivalent of the value's `Display`.
	fn plain(&self) -> String;

	/// Generic single-purpose display form, first-line/plain-text variant.
	fn display_plain(&self) -> String {
		self.plain()
	}

	/// Whether this object is a registered engineering unit prefix.
	///
	/// Drives the parenthesized form of implicit multiplication (`4MB`
	/// becomes `(4*MB)` rather than `4*MB`).
	fn is_unit_prefix(&self) -> bool {
		false
	}

	/// Attempts an independent deep copy for namespace isolation.
	///
	/// `None` means the value cannot be isolated and is omitted from
	/// preview snapshots.
	fn deep_copy(&self) -> Option<Arc<dyn HostObject>> {
		None
	}
}

/// One evaluation result, in the closed category set the preview formatter
/// dispatches over.
#[derive(Clone)]
pub enum Value {
	/// Machine integer.
	Int(i64),
	/// Exact integer or rational.
	Exact(Exact),
	/// Floating-point scalar.
	Float(f64),
	/// Unevaluated symbolic expression.
	Symbolic(SymExpr),
	/// String.
	Str(String),
	/// Ordered sequence (list or tuple result).
	Seq(Vec<Value>),
	/// Key-value mapping with string keys.
	Map(Vec<(String, Value)>),
	/// Dense matrix in row-major order.
	Matrix { rows: usize, cols: usize, elems: Vec<Value> },
	/// Calendar timestamp.
	DateTime(Timestamp),
	/// Module reference; process-wide, shared into snapshots by handle.
	Module(Arc<dyn HostObject>),
	/// Anything else the host produced.
	Other(Arc<dyn HostObject>),
}

impl fmt::Debug for Value {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Int(n) => write!(f, "Int({n})"),
			Self::Exact(e) => write!(f, "Exact({e})"),
			Self::Float(x) => write!(f, "Float({x})"),
			Self::Symbolic(s) => f.debug_tuple("Symbolic").field(s).finish(),
			Self::Str(s) => write!(f, "Str({s:?})"),
			Self::Seq(elems) => f.debug_tuple("Seq").field(elems).finish(),
			Self::Map(entries) => f.debug_tuple("Map").field(entries).finish(),
			Self::Matrix { rows, cols, elems } => f
				.debug_struct("Matrix")
				.field("rows", rows)
				.field("cols", cols)
				.field("elems", elems)
				.finish(),
			Self::DateTime(ts) => write!(f, "DateTime({ts})"),
			Self::Module(m) => write!(f, "Module({})", m.plain()),
			Self::Other(o) => write!(f, "Other({})", o.plain()),
		}
	}
}

impl PartialEq for Value {
	fn eq(&self, other: &Self) -> bool {
		match (self, other) {
			(Self::Int(a), Self::Int(b)) => a == b,
			(Self::Exact(a), Self::Exact(b)) => a == b,
			(Self::Float(a), Self::Float(b)) => a == b,
			(Self::Symbolic(a), Self::Symbolic(b)) => a == b,
			(Self::Str(a), Self::Str(b)) => a == b,
			(Self::Seq(a), Self::Seq(b)) => a == b,
			(Self::Map(a), Self::Map(b)) => a == b,
			(
				Self::Matrix { rows: ar, cols: ac, elems: ae },
				Self::Matrix { rows: br, cols: bc, elems: be },
			) => ar == br && ac == bc && ae == be,
			(Self::DateTime(a), Self::DateTime(b)) => a == b,
			(Self::Module(a), Self::Module(b)) => Arc::ptr_eq(a, b),
			(Self::Other(a), Self::Other(b)) => Arc::ptr_eq(a, b),
			_ => false,
		}
	}
}

impl Value {
	/// Whether this value is a registered engineering unit prefix.
	pub fn is_unit_prefix(&self) -> bool {
		match self {
			Self::Other(obj) => obj.is_unit_prefix(),
			_ => false,
		}
	}

	/// Attempts an isolation-grade copy of this value.
	///
	/// Modules are shared by handle (they are process-wide and never
	/// mutated through the snapshot). Host objects decide their own copy
	/// support; a refusal anywhere inside a container makes the whole value
	/// non-isolable, so the snapshot omits the entry rather than leak a
	/// shared mutable reference into speculative evaluation.
	pub fn snapshot(&self) -> Option<Value> {
		match self {
			Self::Module(handle) => Some(Self::Module(Arc::clone(handle))),
			Self::Other(obj) => obj.deep_copy().map(Self::Other),
			Self::Seq(elems) => elems
				.iter()
				.map(Self::snapshot)
				.collect::<Option<Vec<_>>>()
				.map(Self::Seq),
			Self::Map(entries) => entries
				.iter()
				.map(|(k, v)| v.snapshot().map(|v| (k.clone(), v)))
				.collect::<Option<Vec<_>>>()
				.map(Self::Map),
			Self::Matrix { rows, cols, elems } => elems
				.iter()
				.map(Self::snapshot)
				.collect::<Option<Vec<_>>>()
				.map(|elems| Self::Matrix { rows: *rows, cols: *cols, elems }),
			other => Some(other.clone()),
		}
	}
}

/// Plain string form, the fallback the preview formatter retries with when
/// a pretty rendering spans multiple lines.
impl fmt::Display for Value {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Int(n) => write!(f, "{n}"),
			Self::Exact(e) => write!(f, "{e}"),
			Self::Float(x) => write!(f, "{x}"),
			Self::Symbolic(s) => write!(f, "{s}"),
			Self::Str(s) => write!(f, "{s}"),
			Self::Seq(elems) => {
				write!(f, "(")?;
				for (i, elem) in elems.iter().enumerate() {
					if i > 0 {
						write!(f, ", ")?;
					}
					write!(f, "{elem}")?;
				}
				write!(f, ")")
			}
			Self::Map(entries) => {
				write!(f, "{{")?;
				for (i, (key, value)) in entries.iter().enumerate() {
					if i > 0 {
						write!(f, ", ")?;
					}
					write!(f, "{key}: {value}")?;
				}
				write!(f, "}}")
			}
			Self::Matrix { rows, cols, elems } => {
				write!(f, "[")?;
				for r in 0..*rows {
					if r > 0 {
						write!(f, ", ")?;
					}
					write!(f, "[")?;
					for c in 0..*cols {
						if c > 0 {
							write!(f, ", ")?;
						}
						if let Some(elem) = elems.get(r * cols + c) {
							write!(f, "{elem}")?;
						}
					}
					write!(f, "]")?;
				}
				write!(f, "]")
			}
			Self::DateTime(ts) => write!(f, "{ts}"),
			Self::Module(handle) => write!(f, "{}", handle.plain()),
			Self::Other(obj) => write!(f, "{}", obj.plain()),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	struct Opaque;

	impl HostObject for Opaque {
		fn plain(&self) -> String {
			"<opaque>".to_string()
		}
	}

	struct Copyable(i64);

	impl HostObject for Copyable {
		fn plain(&self) -> String {
			format!("<copyable {}>", self.0)
		}

		fn deep_copy(&self) -> Option<Arc<dyn HostObject>> {
			Some(Arc::new(Self(self.0)))
		}
	}

	#[test]
	fn test_exact_normalizes_sign_and_terms() {
		let e = Exact::ratio(4, -6);
		assert_eq!((e.numer(), e.denom()), (-2, 3));
		assert_eq!(e.to_string(), "-2/3");
		assert_eq!(Exact::ratio(8, 4).to_string(), "2");
	}

	#[test]
	fn test_snapshot_shares_modules_by_handle() {
		let handle: Arc<dyn HostObject> = Arc::new(Opaque);
		let module = Value::Module(Arc::clone(&handle));
		match module.snapshot() {
			Some(Value::Module(copy)) => assert!(Arc::ptr_eq(&copy, &handle)),
			other => panic!("expected shared module handle, got {other:?}"),
		}
	}

	#[test]
	fn test_snapshot_refuses_non_copyable_host_objects() {
		let value = Value::Other(Arc::new(Opaque));
		assert!(value.snapshot().is_none());
	}

	#[test]
	fn test_snapshot_refusal_propagates_out_of_containers() {
		let seq = Value::Seq(vec![Value::Int(1), Value::Other(Arc::new(Opaque))]);
		assert!(seq.snapshot().is_none());
		let ok = Value::Seq(vec![Value::Int(1), Value::Other(Arc::new(Copyable(7)))]);
		assert!(ok.snapshot().is_some());
	}

	#[test]
	fn test_plain_display_is_single_line_for_scalars() {
		assert_eq!(Value::Int(6).to_string(), "6");
		assert_eq!(Value::Exact(Exact::ratio(1, 2)).to_string(), "1/2");
		assert_eq!(
			Value::Seq(vec![Value::Int(1), Value::Int(2)]).to_string(),
			"(1, 2)"
		);
	}
}
