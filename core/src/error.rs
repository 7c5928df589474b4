//! Error types for schema registration and parsing.
//!
//! [`SchemaError`] is returned while declaring commands, flags and
//! arguments. [`ParseError`] is returned by
//! [`Registry::parse`](crate::Registry::parse) and by the `require_*`
//! accessors; parsing stops at the first error.

use thiserror::Error;

use crate::value::{Scalar, ValueKind};

/// Errors raised while turning a token vector into bound values.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    /// The first token names a command that is not registered.
    #[error("unknown command '{name}' found in the arguments")]
    UnknownCommand { name: String },

    /// A flag token has no matching declaration, or is malformed
    /// (`---x`, `--`).
    #[error("unknown flag '{token}' found in the arguments")]
    UnknownFlag {
        /// Flag name with its leading dashes removed.
        name: String,
        /// The token as it appeared after normalization.
        token: String,
    },

    /// A flag or argument could not be bound.
    #[error("bad argument '{name}': {reason}")]
    BadArgument {
        /// Declared name of the flag or argument.
        name: String,
        reason: BadArgumentReason,
    },
}

impl ParseError {
    pub(crate) fn unknown_flag(token: &str) -> Self {
        ParseError::UnknownFlag {
            name: token.trim_start_matches('-').to_string(),
            token: token.to_string(),
        }
    }

    pub(crate) fn bad_argument(name: &str, reason: BadArgumentReason) -> Self {
        ParseError::BadArgument {
            name: name.to_string(),
            reason,
        }
    }
}

/// Why a [`ParseError::BadArgument`] was raised.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BadArgumentReason {
    /// A non-boolean flag was the last token.
    #[error("a value is required")]
    MissingValue,

    /// `--no-<name>` was used on a non-boolean flag.
    #[error("only boolean flags can be inverted with 'no-'")]
    InvertedNonBoolean,

    /// The token could not be converted to the declared kind.
    #[error("'{token}' is not a valid {expected}")]
    InvalidValue { token: String, expected: ValueKind },

    /// The value is not a member of the declared choice set.
    #[error("'{value}' is not one of [{}]", join(.choices))]
    NotAChoice { value: Scalar, choices: Vec<Scalar> },

    /// The bound value's kind differs from the declared kind.
    #[error("expected a {expected} value, found a {found}")]
    TypeMismatch { expected: ValueKind, found: ValueKind },

    /// A required read found nothing bound.
    #[error("no value was supplied")]
    Unset,
}

fn join(choices: &[Scalar]) -> String {
    choices
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Errors raised while declaring commands, flags and arguments.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// Name is empty, starts with a dash, or contains `=` or whitespace.
    #[error("invalid name: '{0}'")]
    InvalidName(String),
    /// Short name must be a single character other than `-` or `=`.
    #[error("invalid short flag name: '{0}'")]
    InvalidShortName(char),
    /// A flag with this long name is already declared on the command.
    #[error("duplicate flag: --{0}")]
    DuplicateFlag(String),
    /// A flag with this short name is already declared on the command.
    #[error("duplicate short flag: -{0}")]
    DuplicateShortName(char),
    /// An argument with this name is already declared on the command.
    #[error("duplicate argument: {0}")]
    DuplicateArg(String),
    /// Choice set is empty or mixes kinds.
    #[error("invalid choice set for '{0}': choices must be non-empty and of one type")]
    InvalidChoices(String),
    /// A `no-` flag was declared with a non-boolean default.
    #[error("flag '{0}' uses the 'no-' prefix but is not boolean")]
    NonBooleanInversion(String),
    /// A variadic argument must be the last positional argument.
    #[error("argument '{0}' declared after the variadic argument")]
    VariadicNotLast(String),
}
