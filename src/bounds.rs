//! Numeric parameters constrained to an interval.
//!
//! Every numeric setting of a diagram run goes through a [`Bounds`] before it
//! reaches [`DiagramConfig`](crate::config::DiagramConfig). Each side of the
//! interval is optional and may be open or closed; an excluded boundary value
//! is reported with the "less than" / "greater than" wording rather than the
//! generic "not greater" / "not less" one.

use std::fmt::Display;
use std::str::FromStr;

use thiserror::Error;

/// Scalar types a [`Bounds`] can parse and check.
pub trait NumericKind: Copy + PartialOrd + Display + FromStr + Send + Sync + 'static {
	/// Human-readable name of the kind, used in parse errors.
	const NAME: &'static str;
}

macro_rules! numeric_kind {
	($($ty:ty => $name:literal),* $(,)?) => {
		$(impl NumericKind for $ty {
			const NAME: &'static str = $name;
		})*
	};
}

numeric_kind! {
	i16 => "short",
	i32 => "integer",
	i64 => "long",
	f32 => "float",
	f64 => "double",
}

/// Why a raw value was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoundsError {
	/// The text is not a number of the expected kind.
	#[error("could not parse value {value} as {kind}")]
	Parse {
		/// The rejected text.
		value: String,
		/// [`NumericKind::NAME`] of the expected kind.
		kind: &'static str,
	},

	/// The number lies outside the interval.
	#[error("invalid value {value}; {message}")]
	Range {
		/// The rejected value as given.
		value: String,
		/// Which boundary was crossed.
		message: String,
	},
}

/// Lower/upper limits with per-side inclusivity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds<T> {
	/// Lower limit; `None` leaves the low side open-ended.
	pub min: Option<T>,
	/// Upper limit; `None` leaves the high side open-ended.
	pub max: Option<T>,
	/// Whether `min` itself is allowed.
	pub min_inclusive: bool,
	/// Whether `max` itself is allowed.
	pub max_inclusive: bool,
}

impl<T: NumericKind> Bounds<T> {
	/// Bounds from both limits and their inclusivity.
	pub fn new(min: Option<T>, max: Option<T>, min_inclusive: bool, max_inclusive: bool) -> Self {
		Self {
			min,
			max,
			min_inclusive,
			max_inclusive,
		}
	}

	/// Accepts any value that parses.
	pub fn unbounded() -> Self {
		Self::new(None, None, true, true)
	}

	/// `value >= min`
	pub fn at_least(min: T) -> Self {
		Self::new(Some(min), None, true, true)
	}

	/// `value > min`
	pub fn greater_than(min: T) -> Self {
		Self::new(Some(min), None, false, true)
	}

	/// `min <= value <= max`
	pub fn between(min: T, max: T) -> Self {
		Self::new(Some(min), Some(max), true, true)
	}

	/// Parses `raw` as `T` and checks it against the bounds.
	pub fn validate(&self, raw: &str) -> Result<T, BoundsError> {
		let value = raw.parse::<T>().map_err(|_| BoundsError::Parse {
			value: raw.to_string(),
			kind: T::NAME,
		})?;
		// NaN parses for float kinds but compares with nothing.
		if value.partial_cmp(&value).is_none() {
			return Err(BoundsError::Parse {
				value: raw.to_string(),
				kind: T::NAME,
			});
		}
		self.check_with_text(value, raw)
	}

	/// Checks an already-typed value.
	pub fn check(&self, value: T) -> Result<T, BoundsError> {
		self.check_with_text(value, &value.to_string())
	}

	fn check_with_text(&self, value: T, text: &str) -> Result<T, BoundsError> {
		let message = match (self.min, self.max) {
			(_, Some(max)) if value >= max && !self.max_inclusive => {
				Some(format!("must be less than {max}"))
			}
			(Some(min), _) if value <= min && !self.min_inclusive => {
				Some(format!("must be greater than {min}"))
			}
			(_, Some(max)) if value > max => Some(format!("must not be greater than {max}")),
			(Some(min), _) if value < min => Some(format!("must not be less than {min}")),
			_ => None,
		};
		match message {
			Some(message) => Err(BoundsError::Range {
				value: text.to_string(),
				message,
			}),
			None => Ok(value),
		}
	}

	/// Turns the bounds into a `clap` value parser.
	pub fn parser(self) -> impl Fn(&str) -> Result<T, BoundsError> + Clone + Send + Sync + 'static {
		move |raw: &str| self.validate(raw)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	fn range_message(err: BoundsError) -> String {
		match err {
			BoundsError::Range { message, .. } => message,
			other => panic!("expected range error, got {other:?}"),
		}
	}

	#[test]
	fn accepts_values_inside_interval() {
		assert_eq!(Bounds::new(Some(20.0), Some(100.0), true, true).validate("50"), Ok(50.0));
		assert_eq!(Bounds::new(Some(20.0f32), Some(100.0), false, false).validate("60.0"), Ok(60.0));
		assert_eq!(Bounds::new(Some(20), Some(100), true, false).validate("81"), Ok(81));
		assert_eq!(Bounds::new(None, Some(100.0), true, true).validate("0.0"), Ok(0.0));
		assert_eq!(Bounds::new(None, Some(100.0f32), false, false).validate("10"), Ok(10.0));
		assert_eq!(Bounds::new(None, Some(100), true, false).validate("30"), Ok(30));
		assert_eq!(Bounds::new(Some(20.0), None, true, true).validate("21.1"), Ok(21.1));
		assert_eq!(Bounds::new(Some(20.0f32), None, false, false).validate("1001.2"), Ok(1001.2));
		assert_eq!(Bounds::new(Some(20), None, true, false).validate("300"), Ok(300));
	}

	#[test]
	fn closed_edges_are_allowed() {
		assert_eq!(Bounds::new(Some(20.0), Some(100.0), true, true).validate("100"), Ok(100.0));
		assert_eq!(Bounds::new(Some(20), Some(100), true, false).validate("20"), Ok(20));
		assert_eq!(Bounds::new(None, Some(100.0), true, true).validate("100.0"), Ok(100.0));
		assert_eq!(Bounds::new(Some(20.0), None, true, true).validate("20.0"), Ok(20.0));
		assert_eq!(Bounds::new(Some(20), None, true, false).validate("20"), Ok(20));
	}

	#[test]
	fn open_edges_report_exclusive_message() {
		let open = Bounds::new(Some(20.0f32), Some(100.0), false, false);
		assert_eq!(range_message(open.validate("20").unwrap_err()), "must be greater than 20");
		assert_eq!(range_message(open.validate("100").unwrap_err()), "must be less than 100");
		assert_eq!(
			range_message(Bounds::new(Some(20), Some(100), true, false).validate("100").unwrap_err()),
			"must be less than 100"
		);
		assert!(Bounds::new(None, Some(100.0f32), false, false).validate("100").is_err());
		assert!(Bounds::new(None, Some(100), true, false).validate("100").is_err());
		assert!(Bounds::new(Some(20.0f32), None, false, false).validate("20").is_err());
	}

	#[test]
	fn values_outside_report_closed_message() {
		let closed = Bounds::new(Some(20.0), Some(100.0), true, true);
		assert_eq!(range_message(closed.validate("10").unwrap_err()), "must not be less than 20");
		assert_eq!(
			range_message(closed.validate("1000").unwrap_err()),
			"must not be greater than 100"
		);
		assert!(Bounds::new(Some(20.0f32), Some(100.0), false, false).validate("1000").is_err());
		assert!(Bounds::new(Some(20), Some(100), true, false).validate("1").is_err());
		assert!(Bounds::new(None, Some(100.0f32), false, false).validate("100.1").is_err());
		assert!(Bounds::new(None, Some(100), true, false).validate("22222").is_err());
		assert!(Bounds::new(Some(20.0), None, true, true).validate("0").is_err());
		assert!(Bounds::new(Some(20.0f32), None, false, false).validate("1.1").is_err());
		assert!(Bounds::new(Some(20), None, true, false).validate("12").is_err());
	}

	fn parse_failed<T>(r: Result<T, BoundsError>) -> bool {
		matches!(r, Err(BoundsError::Parse { .. }))
	}

	#[test]
	fn malformed_numbers_fail_to_parse() {
		assert!(parse_failed(Bounds::<f64>::unbounded().validate("50xx")));
		assert!(parse_failed(Bounds::<f32>::unbounded().validate("xx50")));
		assert!(parse_failed(Bounds::<i32>::unbounded().validate("One")));
		assert!(parse_failed(Bounds::<i32>::unbounded().validate("10.2")));
		assert!(parse_failed(Bounds::<i32>::unbounded().validate("1.1e3")));
		assert!(parse_failed(Bounds::<f64>::unbounded().validate("NaN")));
		assert!(parse_failed(Bounds::<i16>::unbounded().validate("40000")));
	}

	#[test]
	fn parse_error_names_kind() {
		let err = Bounds::<i64>::unbounded().validate("abc").unwrap_err();
		assert_eq!(err.to_string(), "could not parse value abc as long");
	}

	#[test]
	fn check_uses_same_rules() {
		let bounds = Bounds::greater_than(0);
		assert_eq!(bounds.check(5), Ok(5));
		assert!(bounds.check(0).is_err());
	}

	#[test]
	fn parser_closure_validates() {
		let parse = Bounds::between(0.0, 100.0).parser();
		assert_eq!(parse("98"), Ok(98.0));
		assert!(parse("101").is_err());
	}

	proptest! {
		#[test]
		fn validate_matches_bound_predicates(
			v in -200i32..200,
			min in -100i32..100,
			span in 0i32..100,
			min_inclusive: bool,
			max_inclusive: bool,
		) {
			let max = min + span;
			let bounds = Bounds::new(Some(min), Some(max), min_inclusive, max_inclusive);
			let lower_ok = if min_inclusive { v >= min } else { v > min };
			let upper_ok = if max_inclusive { v <= max } else { v < max };
			prop_assert_eq!(bounds.validate(&v.to_string()).is_ok(), lower_ok && upper_ok);
		}

		#[test]
		fn unbounded_side_never_rejects(v in any::<i64>()) {
			prop_assert_eq!(Bounds::<i64>::unbounded().validate(&v.to_string()), Ok(v));
		}
	}
}
