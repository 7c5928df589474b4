//! Tagged value model for declarations and bound values.
//!
//! Every flag and positional argument carries a [`DefaultValue`] that fixes
//! its [`ValueKind`]. A plain scalar default only fixes the kind; a
//! [`DefaultValue::Choices`] default also restricts bound values to the
//! listed choices. Values bound during a parse are stored as [`Value`]s.
//!
//! # Examples
//!
//! ```
//! use optparse_core::{DefaultValue, Scalar, ValueKind};
//!
//! let port = DefaultValue::from(8080);
//! assert_eq!(port.kind(), ValueKind::Int);
//!
//! let role = DefaultValue::from(["manager", "student"]);
//! assert!(role.is_choices());
//! assert_eq!(role.reference(), &Scalar::from("manager"));
//! ```

use std::fmt;

use chrono::{NaiveDateTime, TimeDelta};
use serde::{Deserialize, Serialize, Serializer};

/// Layout used to read and print timestamp values (`YYYY-MM-DD hh:mm`).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// The scalar types a declaration can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Bool,
    String,
    Int,
    Float,
    Timestamp,
    Duration,
}

impl ValueKind {
    /// Lowercase name, as used in schema definition files.
    pub fn as_str(self) -> &'static str {
        match self {
            ValueKind::Bool => "bool",
            ValueKind::String => "string",
            ValueKind::Int => "int",
            ValueKind::Float => "float",
            ValueKind::Timestamp => "timestamp",
            ValueKind::Duration => "duration",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single typed value.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Bool(bool),
    String(String),
    Int(i64),
    Float(f64),
    Timestamp(NaiveDateTime),
    /// Signed duration with nanosecond precision.
    Duration(TimeDelta),
}

impl Scalar {
    /// Returns the kind tag of this scalar.
    pub fn kind(&self) -> ValueKind {
        match self {
            Scalar::Bool(_) => ValueKind::Bool,
            Scalar::String(_) => ValueKind::String,
            Scalar::Int(_) => ValueKind::Int,
            Scalar::Float(_) => ValueKind::Float,
            Scalar::Timestamp(_) => ValueKind::Timestamp,
            Scalar::Duration(_) => ValueKind::Duration,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Bool(v) => write!(f, "{v}"),
            Scalar::String(v) => f.write_str(v),
            Scalar::Int(v) => write!(f, "{v}"),
            Scalar::Float(v) => write!(f, "{v}"),
            Scalar::Timestamp(v) => write!(f, "{}", v.format(TIMESTAMP_FORMAT)),
            Scalar::Duration(v) => f.write_str(&format_duration(v)),
        }
    }
}

impl Serialize for Scalar {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Scalar::Bool(v) => serializer.serialize_bool(*v),
            Scalar::String(v) => serializer.serialize_str(v),
            Scalar::Int(v) => serializer.serialize_i64(*v),
            Scalar::Float(v) => serializer.serialize_f64(*v),
            Scalar::Timestamp(_) | Scalar::Duration(_) => serializer.collect_str(self),
        }
    }
}

/// Declared default of a flag or argument.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DefaultValue {
    /// Fixes the kind only.
    Scalar(Scalar),
    /// Non-empty, homogeneous set of allowed values.
    Choices(Vec<Scalar>),
}

impl DefaultValue {
    /// Scalar used as the coercion target: the scalar itself, or the first
    /// choice of a choice set.
    ///
    /// Choice sets are checked to be non-empty when a declaration is
    /// registered; a hand-built empty set reports `false`.
    pub fn reference(&self) -> &Scalar {
        static EMPTY: Scalar = Scalar::Bool(false);
        match self {
            DefaultValue::Scalar(scalar) => scalar,
            DefaultValue::Choices(choices) => choices.first().unwrap_or(&EMPTY),
        }
    }

    /// Kind every bound value must have.
    pub fn kind(&self) -> ValueKind {
        self.reference().kind()
    }

    pub fn is_choices(&self) -> bool {
        matches!(self, DefaultValue::Choices(_))
    }

    pub fn choices(&self) -> Option<&[Scalar]> {
        match self {
            DefaultValue::Scalar(_) => None,
            DefaultValue::Choices(choices) => Some(choices),
        }
    }
}

/// A value bound during parsing.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Single(Scalar),
    /// Accumulated values of a variadic argument, in encounter order.
    Many(Vec<Scalar>),
}

impl Value {
    /// Bound scalars, one for [`Value::Single`].
    pub fn scalars(&self) -> &[Scalar] {
        match self {
            Value::Single(scalar) => std::slice::from_ref(scalar),
            Value::Many(items) => items,
        }
    }
}

macro_rules! scalar_conversions {
    ($($ty:ty => |$v:ident| $build:expr;)*) => {
        $(
            impl From<$ty> for Scalar {
                fn from($v: $ty) -> Self {
                    $build
                }
            }

            impl From<$ty> for DefaultValue {
                fn from(value: $ty) -> Self {
                    DefaultValue::Scalar(Scalar::from(value))
                }
            }

            impl From<Vec<$ty>> for DefaultValue {
                fn from(values: Vec<$ty>) -> Self {
                    DefaultValue::Choices(values.into_iter().map(Scalar::from).collect())
                }
            }

            impl<const N: usize> From<[$ty; N]> for DefaultValue {
                fn from(values: [$ty; N]) -> Self {
                    DefaultValue::Choices(values.into_iter().map(Scalar::from).collect())
                }
            }
        )*
    };
}

scalar_conversions! {
    bool => |v| Scalar::Bool(v);
    &str => |v| Scalar::String(v.to_string());
    String => |v| Scalar::String(v);
    i64 => |v| Scalar::Int(v);
    i32 => |v| Scalar::Int(i64::from(v));
    f64 => |v| Scalar::Float(v);
    NaiveDateTime => |v| Scalar::Timestamp(v);
    TimeDelta => |v| Scalar::Duration(v);
}

impl From<Scalar> for DefaultValue {
    fn from(scalar: Scalar) -> Self {
        DefaultValue::Scalar(scalar)
    }
}

impl From<Vec<Scalar>> for DefaultValue {
    fn from(choices: Vec<Scalar>) -> Self {
        DefaultValue::Choices(choices)
    }
}

const NANOS_PER_MICRO: u64 = 1_000;
const NANOS_PER_MILLI: u64 = 1_000_000;
const NANOS_PER_SECOND: u64 = 1_000_000_000;
const NANOS_PER_MINUTE: u64 = 60 * NANOS_PER_SECOND;
const NANOS_PER_HOUR: u64 = 60 * NANOS_PER_MINUTE;

/// Formats a duration as a unit-suffixed literal (`1h30m0s`, `1.5s`, `250ms`).
///
/// The output is accepted back by the duration coercer.
pub fn format_duration(duration: &TimeDelta) -> String {
    let Some(nanos) = duration.num_nanoseconds() else {
        return format!("{}s", duration.num_seconds());
    };
    if nanos == 0 {
        return "0s".to_string();
    }

    let sign = if nanos < 0 { "-" } else { "" };
    let nanos = nanos.unsigned_abs();

    if nanos < NANOS_PER_MICRO {
        return format!("{sign}{nanos}ns");
    }
    if nanos < NANOS_PER_MILLI {
        return format!("{sign}{}µs", decimal(nanos, NANOS_PER_MICRO));
    }
    if nanos < NANOS_PER_SECOND {
        return format!("{sign}{}ms", decimal(nanos, NANOS_PER_MILLI));
    }

    let hours = nanos / NANOS_PER_HOUR;
    let minutes = nanos % NANOS_PER_HOUR / NANOS_PER_MINUTE;
    let seconds = nanos % NANOS_PER_MINUTE;

    let mut out = String::from(sign);
    if hours > 0 {
        out.push_str(&format!("{hours}h"));
    }
    if hours > 0 || minutes > 0 {
        out.push_str(&format!("{minutes}m"));
    }
    out.push_str(&decimal(seconds, NANOS_PER_SECOND));
    out.push('s');
    out
}

fn decimal(value: u64, unit: u64) -> String {
    let whole = value / unit;
    let fraction = value % unit;
    if fraction == 0 {
        return whole.to_string();
    }
    let width = unit.ilog10() as usize;
    let digits = format!("{fraction:0width$}");
    format!("{whole}.{}", digits.trim_end_matches('0'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_choice_set_reference_is_first_choice() {
        let default = DefaultValue::from(vec![2_i64, 3]);
        assert_eq!(default.reference(), &Scalar::Int(2));
        assert_eq!(default.kind(), ValueKind::Int);
        assert_eq!(default.choices().map(<[Scalar]>::len), Some(2));
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(&TimeDelta::zero()), "0s");
        assert_eq!(format_duration(&TimeDelta::minutes(90)), "1h30m0s");
        assert_eq!(format_duration(&TimeDelta::milliseconds(1500)), "1.5s");
        assert_eq!(format_duration(&TimeDelta::milliseconds(250)), "250ms");
        assert_eq!(format_duration(&TimeDelta::nanoseconds(1500)), "1.5µs");
        assert_eq!(format_duration(&TimeDelta::nanoseconds(42)), "42ns");
        assert_eq!(format_duration(&TimeDelta::seconds(-61)), "-1m1s");
    }

    #[test]
    fn test_scalar_serializes_to_plain_json() {
        let timestamp = NaiveDateTime::parse_from_str("2020-05-01 13:45", TIMESTAMP_FORMAT)
            .expect("valid timestamp");
        let values = Value::Many(vec![
            Scalar::from("math"),
            Scalar::Int(3),
            Scalar::Timestamp(timestamp),
            Scalar::Duration(TimeDelta::seconds(5)),
        ]);

        let json = serde_json::to_value(&values).expect("serializes");
        assert_eq!(
            json,
            serde_json::json!(["math", 3, "2020-05-01 13:45", "5s"])
        );
    }
}
