//! Bound-value validation.
//!
//! A value bound to a declaration with a scalar default must have the same
//! kind as that default. A value bound to a declaration with a choice-set
//! default must equal one of the choices. Variadic values are checked
//! element by element.
//!
//! # Examples
//!
//! ```
//! use optparse_core::Registry;
//!
//! let mut registry = Registry::new();
//! registry.register("info")?.add_arg("category", ["manager", "student"])?;
//!
//! assert!(registry.parse(["info", "student"]).is_ok());
//! assert!(registry.parse(["info", "teacher"]).is_err());
//! # Ok::<(), optparse_core::SchemaError>(())
//! ```

use crate::error::{BadArgumentReason, ParseError};
use crate::types::ArgDecl;
use crate::value::{DefaultValue, Scalar};

/// Checks the declaration's bound value against its default.
///
/// An unset declaration is valid; presence is only enforced by the
/// `require_*` accessors.
///
/// # Errors
///
/// [`ParseError::BadArgument`] with [`BadArgumentReason::TypeMismatch`] or
/// [`BadArgumentReason::NotAChoice`].
pub fn validate(decl: &ArgDecl) -> Result<(), ParseError> {
    let Some(value) = decl.value() else {
        return Ok(());
    };
    value
        .scalars()
        .iter()
        .try_for_each(|scalar| check_scalar(decl.default_value(), scalar))
        .map_err(|reason| ParseError::bad_argument(decl.name(), reason))
}

fn check_scalar(default: &DefaultValue, scalar: &Scalar) -> Result<(), BadArgumentReason> {
    match default {
        DefaultValue::Scalar(expected) if expected.kind() == scalar.kind() => Ok(()),
        DefaultValue::Scalar(expected) => Err(BadArgumentReason::TypeMismatch {
            expected: expected.kind(),
            found: scalar.kind(),
        }),
        DefaultValue::Choices(choices) if choices.contains(scalar) => Ok(()),
        DefaultValue::Choices(choices) => Err(BadArgumentReason::NotAChoice {
            value: scalar.clone(),
            choices: choices.clone(),
        }),
    }
}
