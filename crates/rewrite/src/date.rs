//! The optional date-parsing collaborator.
//!
//! Date promotion only ever runs through the [`DateParser`] trait; the
//! bundled [`NaturalDateParser`] implementation (behind the `auto-date`
//! feature) accepts a fixed list of common spellings. Parsing is strict:
//! the whole string must be a date, trailing text rejects.

use tally_expr::Timestamp;

/// Strict natural-language date parsing.
pub trait DateParser: Send + Sync {
	/// Parses `text` as a date; `None` unless the entire string is one.
	fn parse_strict(&self, text: &str) -> Option<Timestamp>;
}

#[cfg(feature = "auto-date")]
pub use natural::NaturalDateParser;

#[cfg(feature = "auto-date")]
mod natural {
	use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};

	use super::{DateParser, Timestamp};

	const DATETIME_FORMATS: &[&str] = &[
		"%Y-%m-%d %H:%M:%S",
		"%Y-%m-%dT%H:%M:%S",
		"%Y-%m-%d %H:%M",
		"%d/%m/%Y %H:%M",
	];

	const DATE_FORMATS: &[&str] = &[
		"%Y-%m-%d",
		"%d/%m/%Y",
		"%d %B %Y",
		"%B %d %Y",
		"%d %b %Y",
		"%b %d %Y",
	];

	/// Format-list date parser over chrono.
	#[derive(Debug, Default, Clone, Copy)]
	pub struct NaturalDateParser;

	impl DateParser for NaturalDateParser {
		fn parse_strict(&self, text: &str) -> Option<Timestamp> {
			let text = text.trim();
			for format in DATETIME_FORMATS {
				if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
					return Some(from_datetime(dt));
				}
			}
			for format in DATE_FORMATS {
				if let Ok(date) = NaiveDate::parse_from_str(text, format) {
					return Some(from_datetime(date.and_hms_opt(0, 0, 0)?));
				}
			}
			None
		}
	}

	fn from_datetime(dt: NaiveDateTime) -> Timestamp {
		Timestamp {
			year: dt.year(),
			month: dt.month(),
			day: dt.day(),
			hour: dt.hour(),
			minute: dt.minute(),
			second: dt.second(),
			micro: dt.nanosecond() / 1_000,
		}
	}

	#[cfg(test)]
	mod tests {
		use super::*;

		#[test]
		fn test_accepts_common_spellings() {
			let parser = NaturalDateParser;
			let ts = parser.parse_strict("2024-03-05").unwrap();
			assert_eq!((ts.year, ts.month, ts.day), (2024, 3, 5));

			let ts = parser.parse_strict("5 March 2024").unwrap();
			assert_eq!((ts.year, ts.month, ts.day), (2024, 3, 5));

			let ts = parser.parse_strict("2024-03-05 13:30:00").unwrap();
			assert_eq!((ts.hour, ts.minute), (13, 30));
		}

		#[test]
		fn test_rejects_non_dates_and_trailing_text() {
			let parser = NaturalDateParser;
			assert!(parser.parse_strict("hello").is_none());
			assert!(parser.parse_strict("2024-03-05 and more").is_none());
			assert!(parser.parse_strict("").is_none());
		}
	}
}
