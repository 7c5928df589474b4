//! Declarations for flags and positional arguments.
//!
//! A [`CommandSchema`] owns the flags and ordered positional arguments of one
//! command. It doubles as the parse result: after a successful
//! [`Registry::parse`](crate::Registry::parse) the returned schema carries
//! the bound values, readable through the accessors in
//! [`accessor`](crate::accessor).

use std::collections::{BTreeMap, HashMap};

use crate::error::SchemaError;
use crate::value::{DefaultValue, Value, ValueKind};

/// Trailing marker that declares a variadic positional argument.
pub const VARIADIC_MARKER: &str = "...";

/// Prefix that inverts a boolean long flag (`--no-color`).
pub const INVERT_PREFIX: &str = "no-";

/// A positional argument declaration and its bound value.
///
/// # Examples
///
/// ```
/// use optparse_core::ArgDecl;
///
/// let subjects = ArgDecl::new("subjects...", "").unwrap();
/// assert_eq!(subjects.name(), "subjects");
/// assert!(subjects.is_variadic());
/// assert!(subjects.value().is_none());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ArgDecl {
    name: String,
    variadic: bool,
    default: DefaultValue,
    value: Option<Value>,
}

impl ArgDecl {
    /// Creates a declaration. A trailing `...` marks it variadic and is
    /// stripped from the stored name.
    ///
    /// # Errors
    ///
    /// [`SchemaError::InvalidName`] for empty or dash-prefixed names and
    /// [`SchemaError::InvalidChoices`] for an empty or mixed choice set.
    pub fn new(name: &str, default: impl Into<DefaultValue>) -> Result<Self, SchemaError> {
        let (name, variadic) = match name.strip_suffix(VARIADIC_MARKER) {
            Some(stripped) => (stripped, true),
            None => (name, false),
        };
        check_name(name)?;
        let default = default.into();
        check_choices(name, &default)?;
        Ok(Self {
            name: name.to_string(),
            variadic,
            default,
            value: None,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// True when the argument collects all remaining positional tokens.
    pub fn is_variadic(&self) -> bool {
        self.variadic
    }

    pub fn default_value(&self) -> &DefaultValue {
        &self.default
    }

    /// Kind every bound value must have.
    pub fn kind(&self) -> ValueKind {
        self.default.kind()
    }

    /// The bound value, `None` until a parse binds one.
    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    pub fn is_set(&self) -> bool {
        self.value.is_some()
    }

    pub(crate) fn set_value(&mut self, value: Value) {
        self.value = Some(value);
    }

    pub(crate) fn value_mut(&mut self) -> &mut Option<Value> {
        &mut self.value
    }

    pub(crate) fn clear(&mut self) {
        self.value = None;
    }
}

/// A flag declaration: an [`ArgDecl`] plus an optional short name.
///
/// A flag is boolean iff its default is a boolean.
#[derive(Debug, Clone, PartialEq)]
pub struct FlagDecl {
    decl: ArgDecl,
    short: Option<char>,
}

impl FlagDecl {
    pub fn name(&self) -> &str {
        self.decl.name()
    }

    pub fn short(&self) -> Option<char> {
        self.short
    }

    pub fn is_boolean(&self) -> bool {
        self.decl.kind() == ValueKind::Bool
    }

    pub fn default_value(&self) -> &DefaultValue {
        self.decl.default_value()
    }

    pub fn value(&self) -> Option<&Value> {
        self.decl.value()
    }

    pub fn is_set(&self) -> bool {
        self.decl.is_set()
    }

    /// The underlying declaration shared with positional arguments.
    pub fn as_arg(&self) -> &ArgDecl {
        &self.decl
    }

    pub(crate) fn as_arg_mut(&mut self) -> &mut ArgDecl {
        &mut self.decl
    }
}

/// Flags and positional arguments of one command.
///
/// Obtained from [`Registry::register`](crate::Registry::register); the root
/// command has the empty name.
///
/// # Examples
///
/// ```
/// use optparse_core::Registry;
///
/// let mut registry = Registry::new();
/// let info = registry.register("info").unwrap();
/// info.add_arg("category", ["manager", "student"])
///     .unwrap()
///     .add_flag("verbose", Some('v'), false)
///     .unwrap()
///     .add_flag("no-clean", None, true)
///     .unwrap();
///
/// assert_eq!(info.name(), "info");
/// assert!(info.find_flag("clean").is_some());
/// assert_eq!(info.find_short('v').map(|f| f.name()), Some("verbose"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct CommandSchema {
    name: String,
    flags: BTreeMap<String, FlagDecl>,
    short_names: HashMap<char, String>,
    args: Vec<ArgDecl>,
}

impl CommandSchema {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            flags: BTreeMap::new(),
            short_names: HashMap::new(),
            args: Vec::new(),
        }
    }

    /// Command name; empty for the root command.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_root(&self) -> bool {
        self.name.is_empty()
    }

    /// Declares a flag.
    ///
    /// The default fixes the flag's kind; a choice-set default also limits
    /// the accepted values. A name written as `no-<name>` declares the
    /// boolean flag `<name>`, so both `--<name>` and `--no-<name>` work.
    ///
    /// # Errors
    ///
    /// Returns a [`SchemaError`] for invalid or duplicate names, an invalid
    /// choice set, or a non-boolean `no-` flag.
    pub fn add_flag(
        &mut self,
        name: &str,
        short: Option<char>,
        default: impl Into<DefaultValue>,
    ) -> Result<&mut Self, SchemaError> {
        let default = default.into();
        let name = match name.strip_prefix(INVERT_PREFIX) {
            Some(stripped) if default.kind() == ValueKind::Bool => stripped,
            Some(_) => return Err(SchemaError::NonBooleanInversion(name.to_string())),
            None => name,
        };

        let decl = ArgDecl::new(name, default)?;
        if decl.is_variadic() {
            return Err(SchemaError::InvalidName(name.to_string()));
        }
        if self.flags.contains_key(name) {
            return Err(SchemaError::DuplicateFlag(name.to_string()));
        }
        if let Some(c) = short {
            if c == '-' || c == '=' || c.is_whitespace() {
                return Err(SchemaError::InvalidShortName(c));
            }
            if self.short_names.contains_key(&c) {
                return Err(SchemaError::DuplicateShortName(c));
            }
            self.short_names.insert(c, name.to_string());
        }

        self.flags
            .insert(name.to_string(), FlagDecl { decl, short });
        Ok(self)
    }

    /// Declares the next positional argument.
    ///
    /// Arguments bind in declaration order. A name ending in `...` declares
    /// a variadic argument, which must be the last one.
    ///
    /// # Errors
    ///
    /// Returns a [`SchemaError`] for invalid or duplicate names, an invalid
    /// choice set, or an argument following a variadic one.
    pub fn add_arg(
        &mut self,
        name: &str,
        default: impl Into<DefaultValue>,
    ) -> Result<&mut Self, SchemaError> {
        let decl = ArgDecl::new(name, default)?;
        if self.find_arg(decl.name()).is_some() {
            return Err(SchemaError::DuplicateArg(decl.name().to_string()));
        }
        if self.args.last().is_some_and(ArgDecl::is_variadic) {
            return Err(SchemaError::VariadicNotLast(decl.name().to_string()));
        }
        self.args.push(decl);
        Ok(self)
    }

    /// Finds a flag by long name (without dashes).
    pub fn find_flag(&self, name: &str) -> Option<&FlagDecl> {
        self.flags.get(name)
    }

    /// Finds a flag by its short name.
    pub fn find_short(&self, short: char) -> Option<&FlagDecl> {
        self.short_names
            .get(&short)
            .and_then(|name| self.flags.get(name))
    }

    /// Finds a positional argument by name (without the variadic marker).
    pub fn find_arg(&self, name: &str) -> Option<&ArgDecl> {
        self.args.iter().find(|arg| arg.name() == name)
    }

    /// Flags sorted by long name.
    pub fn flag_decls(&self) -> impl Iterator<Item = &FlagDecl> {
        self.flags.values()
    }

    /// Positional arguments in binding order.
    pub fn arg_decls(&self) -> &[ArgDecl] {
        &self.args
    }

    pub fn has_args(&self) -> bool {
        !self.args.is_empty()
    }

    pub(crate) fn long_name_for(&self, short: char) -> Option<&str> {
        self.short_names.get(&short).map(String::as_str)
    }

    pub(crate) fn flag_mut(&mut self, name: &str) -> Option<&mut FlagDecl> {
        self.flags.get_mut(name)
    }

    pub(crate) fn args_mut(&mut self) -> &mut [ArgDecl] {
        &mut self.args
    }

    /// Drops every bound value.
    pub(crate) fn clear_values(&mut self) {
        self.flags
            .values_mut()
            .for_each(|flag| flag.as_arg_mut().clear());
        self.args.iter_mut().for_each(ArgDecl::clear);
    }
}

fn check_name(name: &str) -> Result<(), SchemaError> {
    if name.is_empty()
        || name.starts_with('-')
        || name.contains('=')
        || name.chars().any(char::is_whitespace)
    {
        return Err(SchemaError::InvalidName(name.to_string()));
    }
    Ok(())
}

fn check_choices(name: &str, default: &DefaultValue) -> Result<(), SchemaError> {
    if let Some(choices) = default.choices() {
        let Some(first) = choices.first() else {
            return Err(SchemaError::InvalidChoices(name.to_string()));
        };
        if choices.iter().any(|choice| choice.kind() != first.kind()) {
            return Err(SchemaError::InvalidChoices(name.to_string()));
        }
    }
    Ok(())
}
