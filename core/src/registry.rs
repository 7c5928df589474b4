//! Command registry.
//!
//! The registry maps command names to their [`CommandSchema`]. The empty
//! name is the root command. A registry is a plain owned value: parsing
//! needs `&mut` access, so sharing one across threads requires external
//! synchronization or a clone per thread.

use std::collections::HashMap;

use crate::error::SchemaError;
use crate::token::is_flag;
use crate::types::CommandSchema;

/// Registered commands, keyed by name (empty = root).
///
/// # Examples
///
/// ```
/// use optparse_core::Registry;
///
/// let mut registry = Registry::new();
/// registry.register("")?.add_flag("force", Some('f'), false)?;
/// registry.register("info")?.add_arg("username", "")?;
///
/// assert_eq!(registry.command_names(), vec!["", "info"]);
/// # Ok::<(), optparse_core::SchemaError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Registry {
    commands: HashMap<String, CommandSchema>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a [`RegistryBuilder`].
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Registers a command, or returns the already registered one.
    ///
    /// # Errors
    ///
    /// [`SchemaError::InvalidName`] when the name could never be matched as
    /// a command: it looks like a flag, or contains `=` or whitespace.
    pub fn register(&mut self, name: &str) -> Result<&mut CommandSchema, SchemaError> {
        if is_flag(name) || name.contains('=') || name.chars().any(char::is_whitespace) {
            return Err(SchemaError::InvalidName(name.to_string()));
        }
        Ok(self
            .commands
            .entry(name.to_string())
            .or_insert_with(|| CommandSchema::new(name)))
    }

    pub fn get(&self, name: &str) -> Option<&CommandSchema> {
        self.commands.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    /// The root command, if registered.
    pub fn root(&self) -> Option<&CommandSchema> {
        self.commands.get("")
    }

    /// Sorted command names; the root sorts first as `""`.
    pub fn command_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.commands.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub(crate) fn commands_mut(&mut self) -> &mut HashMap<String, CommandSchema> {
        &mut self.commands
    }
}

type Declare = Box<dyn FnOnce(&mut CommandSchema) -> Result<(), SchemaError>>;

/// Builder that collects command declarations and validates them once.
///
/// The first declaration error is reported by [`build`](Self::build).
///
/// # Examples
///
/// ```
/// use optparse_core::Registry;
///
/// let registry = Registry::builder()
///     .command("", |root| {
///         root.add_arg("output", "")?
///             .add_flag("verbose", Some('v'), false)?;
///         Ok(())
///     })
///     .command("info", |info| {
///         info.add_arg("subjects...", "")?;
///         Ok(())
///     })
///     .build()
///     .unwrap();
///
/// assert!(registry.contains("info"));
/// ```
#[derive(Default)]
pub struct RegistryBuilder {
    commands: Vec<(String, Declare)>,
}

impl RegistryBuilder {
    /// Adds declarations for `name`. Several calls for the same name apply
    /// in order to the same command.
    pub fn command<F>(mut self, name: &str, declare: F) -> Self
    where
        F: FnOnce(&mut CommandSchema) -> Result<(), SchemaError> + 'static,
    {
        self.commands.push((name.to_string(), Box::new(declare)));
        self
    }

    /// Runs every declaration and returns the finished registry.
    ///
    /// # Errors
    ///
    /// Returns the first [`SchemaError`] raised by a declaration.
    pub fn build(self) -> Result<Registry, SchemaError> {
        let mut registry = Registry::new();
        for (name, declare) in self.commands {
            declare(registry.register(&name)?)?;
        }
        Ok(registry)
    }
}

impl std::fmt::Debug for RegistryBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryBuilder")
            .field(
                "commands",
                &self.commands.iter().map(|(name, _)| name).collect::<Vec<_>>(),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_returns_existing_command() {
        let mut registry = Registry::new();
        registry
            .register("info")
            .unwrap()
            .add_flag("verbose", Some('v'), false)
            .unwrap();

        let again = registry.register("info").unwrap();
        assert!(again.find_flag("verbose").is_some());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_register_rejects_flag_like_names() {
        let mut registry = Registry::new();
        assert!(matches!(
            registry.register("--info"),
            Err(SchemaError::InvalidName(_))
        ));
        assert!(registry.register("-").is_ok());
    }

    #[test]
    fn test_builder_reports_first_error() {
        let result = Registry::builder()
            .command("", |root| {
                root.add_flag("verbose", Some('v'), false)?;
                Ok(())
            })
            .command("", |root| {
                root.add_flag("version", Some('v'), "")?;
                Ok(())
            })
            .build();

        assert_eq!(result.unwrap_err(), SchemaError::DuplicateShortName('v'));
    }
}
