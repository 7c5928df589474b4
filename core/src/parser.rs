//! Command resolution and token binding.
//!
//! [`Registry::parse`] runs the full pipeline:
//!
//! 1. [`normalize`] the raw tokens (assignments, short clusters, malformed
//!    flag rejection);
//! 2. resolve the command from the first token;
//! 3. bind the remaining tokens to flags and positional arguments, coercing
//!    and validating each value as it is bound.
//!
//! Binding works on a copy of the resolved command with every value unset.
//! The registry's copy is replaced only when the whole parse succeeds, so a
//! failed parse leaves the registry untouched.

use std::iter::Peekable;

use tracing::{debug, trace};

use crate::coerce::coerce;
use crate::error::{BadArgumentReason, ParseError};
use crate::registry::Registry;
use crate::token::{is_flag, is_short_flag, normalize};
use crate::types::{ArgDecl, CommandSchema, INVERT_PREFIX};
use crate::validate::validate;
use crate::value::Value;

impl Registry {
    /// Parses `tokens` (the argument vector without the program name) and
    /// returns the resolved command with its values bound.
    ///
    /// # Errors
    ///
    /// - [`ParseError::UnknownCommand`] when the first token names an
    ///   unregistered command, or the root is needed but not registered;
    /// - [`ParseError::UnknownFlag`] for undeclared or malformed flags;
    /// - [`ParseError::BadArgument`] for missing, unconvertible or
    ///   out-of-set values.
    ///
    /// # Examples
    ///
    /// ```
    /// use optparse_core::Registry;
    ///
    /// let mut registry = Registry::new();
    /// registry
    ///     .register("info")?
    ///     .add_arg("category", ["manager", "student"])?
    ///     .add_arg("username", "")?
    ///     .add_arg("subjects...", "")?
    ///     .add_flag("verbose", Some('v'), false)?;
    ///
    /// let info = registry
    ///     .parse(["info", "student", "-v", "thatisuday", "math", "science"])
    ///     .unwrap();
    ///
    /// assert_eq!(info.name(), "info");
    /// assert_eq!(info.arg::<String>("category").as_deref(), Some("student"));
    /// assert_eq!(info.flag::<bool>("verbose"), Some(true));
    /// assert_eq!(
    ///     info.arg_values::<String>("subjects"),
    ///     Some(vec!["math".to_string(), "science".to_string()])
    /// );
    /// # Ok::<(), optparse_core::SchemaError>(())
    /// ```
    pub fn parse<I, S>(&mut self, tokens: I) -> Result<&CommandSchema, ParseError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let tokens = normalize(tokens)?;
        let (name, rest) = resolve_command(self, &tokens)?;

        let mut command = self
            .get(&name)
            .cloned()
            .ok_or_else(|| ParseError::UnknownCommand { name: name.clone() })?;
        command.clear_values();

        debug!(command = %name, tokens = ?rest, "Resolved command");
        bind(&mut command, rest)?;

        Ok(self.commands_mut().entry(name).insert_entry(command).into_mut())
    }
}

/// Splits the command name off the normalized tokens.
///
/// The root command is chosen when there are no tokens, the first token is
/// a flag, or the first token is not a registered command while the root
/// declares positional arguments. Otherwise the first token is the command
/// name and must be registered.
fn resolve_command<'t>(
    registry: &Registry,
    tokens: &'t [String],
) -> Result<(String, &'t [String]), ParseError> {
    let root_takes_args = registry.root().is_some_and(CommandSchema::has_args);

    let name = match tokens.first() {
        None => None,
        Some(first) if is_flag(first) => None,
        Some(first) if !registry.contains(first) && root_takes_args => None,
        Some(first) => Some(first),
    };

    match name {
        Some(name) if registry.contains(name) => Ok((name.clone(), &tokens[1..])),
        Some(name) => Err(ParseError::UnknownCommand { name: name.clone() }),
        None if registry.root().is_some() => Ok((String::new(), tokens)),
        None => Err(ParseError::UnknownCommand {
            name: String::new(),
        }),
    }
}

/// Binds every token to the command's flags and positional arguments.
fn bind(command: &mut CommandSchema, tokens: &[String]) -> Result<(), ParseError> {
    let mut tokens = tokens.iter().peekable();

    while let Some(token) = tokens.next() {
        if is_flag(token) {
            bind_flag(command, token, &mut tokens)?;
        } else {
            bind_positional(command, token)?;
        }
    }

    Ok(())
}

fn bind_flag<'t, I>(
    command: &mut CommandSchema,
    token: &str,
    rest: &mut Peekable<I>,
) -> Result<(), ParseError>
where
    I: Iterator<Item = &'t String>,
{
    let written = token.trim_start_matches('-');

    let (name, inverted) = if is_short_flag(token) {
        let long = written
            .chars()
            .next()
            .and_then(|short| command.long_name_for(short))
            .ok_or_else(|| ParseError::unknown_flag(token))?;
        (long.to_string(), false)
    } else {
        match written.strip_prefix(INVERT_PREFIX) {
            Some(base) => (base.to_string(), true),
            None => (written.to_string(), false),
        }
    };

    let flag = command
        .flag_mut(&name)
        .ok_or_else(|| ParseError::unknown_flag(token))?;

    if flag.is_boolean() {
        trace!(flag = %name, value = !inverted, "Bound boolean flag");
        flag.as_arg_mut().set_value(Value::Single((!inverted).into()));
    } else if inverted {
        return Err(ParseError::bad_argument(
            &name,
            BadArgumentReason::InvertedNonBoolean,
        ));
    } else {
        match rest.peek() {
            None => {
                return Err(ParseError::bad_argument(
                    &name,
                    BadArgumentReason::MissingValue,
                ));
            }
            Some(next) if is_flag(next) => {
                debug!(flag = %name, next = %next, "Flag followed by another flag, left unbound");
            }
            Some(_) => {
                if let Some(raw) = rest.next() {
                    let decl = flag.as_arg_mut();
                    let scalar = coerce_for(decl, raw)?;
                    trace!(flag = %name, value = %scalar, "Bound flag");
                    decl.set_value(Value::Single(scalar));
                }
            }
        }
    }

    validate(flag.as_arg())
}

fn bind_positional(command: &mut CommandSchema, token: &str) -> Result<(), ParseError> {
    let Some(arg) = command
        .args_mut()
        .iter_mut()
        .find(|arg| arg.is_variadic() || !arg.is_set())
    else {
        debug!(token, "No positional argument left, token ignored");
        return Ok(());
    };

    let scalar = coerce_for(arg, token)?;
    trace!(arg = %arg.name(), value = %scalar, "Bound argument");

    if arg.is_variadic() {
        match arg.value_mut() {
            Some(Value::Many(items)) => items.push(scalar),
            slot => *slot = Some(Value::Many(vec![scalar])),
        }
    } else {
        arg.set_value(Value::Single(scalar));
    }

    validate(arg)
}

fn coerce_for(decl: &ArgDecl, token: &str) -> Result<crate::value::Scalar, ParseError> {
    coerce(token, decl.kind()).ok_or_else(|| {
        ParseError::bad_argument(
            decl.name(),
            BadArgumentReason::InvalidValue {
                token: token.to_string(),
                expected: decl.kind(),
            },
        )
    })
}
