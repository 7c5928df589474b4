//! Typed reads of bound values.
//!
//! Reads return the bound value when one exists and fall back to the
//! declared default otherwise; for a choice-set default the fallback is the
//! first choice. Absence is only an error through the `require_*` methods.
//!
//! # Examples
//!
//! ```
//! use optparse_core::Registry;
//!
//! let mut registry = Registry::new();
//! registry
//!     .register("")?
//!     .add_flag("dir", None, "/var/users")?
//!     .add_flag("retries", Some('r'), 3)?;
//!
//! let root = registry.parse(["-r", "5"]).unwrap();
//! assert_eq!(root.flag::<i64>("retries"), Some(5));
//! assert_eq!(root.flag::<String>("dir").as_deref(), Some("/var/users"));
//! assert!(root.require_flag::<String>("dir").is_err());
//! # Ok::<(), optparse_core::SchemaError>(())
//! ```

use chrono::{NaiveDateTime, TimeDelta};

use crate::error::{BadArgumentReason, ParseError};
use crate::types::{ArgDecl, CommandSchema};
use crate::value::{Scalar, Value, ValueKind};

/// Rust types a [`Scalar`] can be read as.
pub trait FromScalar: Sized {
    /// Kind of scalar this type reads.
    const KIND: ValueKind;

    fn from_scalar(scalar: &Scalar) -> Option<Self>;
}

macro_rules! from_scalar {
    ($($ty:ty => $kind:ident,)*) => {
        $(
            impl FromScalar for $ty {
                const KIND: ValueKind = ValueKind::$kind;

                fn from_scalar(scalar: &Scalar) -> Option<Self> {
                    match scalar {
                        Scalar::$kind(value) => Some(value.clone()),
                        _ => None,
                    }
                }
            }
        )*
    };
}

from_scalar! {
    bool => Bool,
    String => String,
    i64 => Int,
    f64 => Float,
    NaiveDateTime => Timestamp,
    TimeDelta => Duration,
}

impl ArgDecl {
    /// Bound scalar, or the default reference when nothing is bound.
    /// For a variadic argument this is the first accumulated value.
    pub fn effective(&self) -> &Scalar {
        self.value()
            .and_then(|value| value.scalars().first())
            .unwrap_or_else(|| self.default_value().reference())
    }
}

impl CommandSchema {
    /// Reads a flag as `T`; `None` when the flag is undeclared or `T` does
    /// not match its kind.
    pub fn flag<T: FromScalar>(&self, name: &str) -> Option<T> {
        self.find_flag(name)
            .and_then(|flag| T::from_scalar(flag.as_arg().effective()))
    }

    /// Reads a positional argument as `T`.
    pub fn arg<T: FromScalar>(&self, name: &str) -> Option<T> {
        self.find_arg(name)
            .and_then(|arg| T::from_scalar(arg.effective()))
    }

    /// Reads every value bound to a (variadic) argument; empty when unset.
    pub fn arg_values<T: FromScalar>(&self, name: &str) -> Option<Vec<T>> {
        let arg = self.find_arg(name)?;
        if arg.kind() != T::KIND {
            return None;
        }
        arg.value()
            .map_or(&[][..], Value::scalars)
            .iter()
            .map(T::from_scalar)
            .collect()
    }

    /// True when a flag or argument named `name` received a value.
    pub fn is_set(&self, name: &str) -> bool {
        self.find_flag(name).is_some_and(|flag| flag.is_set())
            || self.find_arg(name).is_some_and(ArgDecl::is_set)
    }

    /// Reads a positional argument that must have been supplied.
    ///
    /// # Errors
    ///
    /// [`ParseError::BadArgument`] with [`BadArgumentReason::Unset`] when no
    /// value was bound (or no such argument exists), or
    /// [`BadArgumentReason::TypeMismatch`] when `T` does not match.
    pub fn require_arg<T: FromScalar>(&self, name: &str) -> Result<T, ParseError> {
        require(name, self.find_arg(name))
    }

    /// Reads a flag that must have been supplied.
    ///
    /// # Errors
    ///
    /// Same as [`require_arg`](Self::require_arg).
    pub fn require_flag<T: FromScalar>(&self, name: &str) -> Result<T, ParseError> {
        require(name, self.find_flag(name).map(|flag| flag.as_arg()))
    }
}

fn require<T: FromScalar>(name: &str, decl: Option<&ArgDecl>) -> Result<T, ParseError> {
    let scalar = decl
        .and_then(ArgDecl::value)
        .and_then(|value| value.scalars().first())
        .ok_or_else(|| ParseError::bad_argument(name, BadArgumentReason::Unset))?;

    T::from_scalar(scalar).ok_or_else(|| {
        ParseError::bad_argument(
            name,
            BadArgumentReason::TypeMismatch {
                expected: T::KIND,
                found: scalar.kind(),
            },
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Registry;

    fn registry() -> Registry {
        let mut registry = Registry::new();
        registry
            .register("info")
            .unwrap()
            .add_arg("category", ["manager", "student"])
            .unwrap()
            .add_arg("username", "")
            .unwrap()
            .add_arg("subjects...", "")
            .unwrap()
            .add_flag("version", Some('V'), "1.0.1")
            .unwrap()
            .add_flag("timeout", None, TimeDelta::seconds(30))
            .unwrap();
        registry
    }

    #[test]
    fn test_unset_reads_fall_back_to_defaults() {
        let mut registry = registry();
        let info = registry.parse(["info"]).unwrap();

        assert_eq!(info.flag::<String>("version").as_deref(), Some("1.0.1"));
        assert_eq!(info.flag::<TimeDelta>("timeout"), Some(TimeDelta::seconds(30)));
        assert_eq!(info.arg::<String>("category").as_deref(), Some("manager"));
        assert_eq!(info.arg_values::<String>("subjects"), Some(Vec::new()));
        assert!(!info.is_set("version"));
    }

    #[test]
    fn test_kind_mismatch_reads_none() {
        let mut registry = registry();
        let info = registry.parse(["info", "student"]).unwrap();

        assert_eq!(info.arg::<i64>("category"), None);
        assert_eq!(info.arg_values::<i64>("subjects"), None);
        assert_eq!(info.flag::<bool>("missing"), None);
    }

    #[test]
    fn test_require_reports_unset_and_mismatch() {
        let mut registry = registry();
        let info = registry.parse(["info", "student"]).unwrap();

        assert_eq!(info.require_arg::<String>("category").unwrap(), "student");
        assert_eq!(
            info.require_arg::<String>("username").unwrap_err(),
            ParseError::BadArgument {
                name: "username".to_string(),
                reason: BadArgumentReason::Unset,
            }
        );
        assert_eq!(
            info.require_arg::<bool>("category").unwrap_err(),
            ParseError::BadArgument {
                name: "category".to_string(),
                reason: BadArgumentReason::TypeMismatch {
                    expected: ValueKind::Bool,
                    found: ValueKind::String,
                },
            }
        );
    }

    #[test]
    fn test_duration_flag_reads_bound_value() {
        let mut registry = registry();
        let info = registry.parse(["info", "--timeout", "1m30s"]).unwrap();

        assert_eq!(info.flag::<TimeDelta>("timeout"), Some(TimeDelta::seconds(90)));
        assert_eq!(info.require_flag::<TimeDelta>("timeout"), Ok(TimeDelta::seconds(90)));
    }
}
