//! Serializable registry definitions.
//!
//! A definition lists commands with their positional arguments and flags.
//! Each declaration carries a literal `default` and an optional `type`;
//! without `type` the kind follows the literal (bool, int, float, string,
//! or a list for a choice set).
//!
//! # Example YAML
//!
//! ```yaml
//! commands:
//!   - name: ""
//!     args:
//!       - { name: output, default: "" }
//!     flags:
//!       - { name: force, short: f, default: false }
//!       - { name: dir, default: /var/users }
//!   - name: info
//!     args:
//!       - { name: category, default: [manager, student] }
//!       - { name: "subjects...", default: "" }
//!     flags:
//!       - { name: since, type: timestamp, default: "2020-01-01 00:00" }
//!       - { name: timeout, type: duration, default: 30s }
//! ```

use std::io::{BufReader, BufWriter};
use std::path::Path;

use optparse_core::{DefaultValue, Registry, Scalar, ValueKind, coerce};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ConfigError, Result};

/// A default value as written in a definition file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Literal {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    /// Choice set.
    List(Vec<Literal>),
}

/// A positional argument declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArgDefinition {
    /// Argument name; a trailing `...` makes it variadic.
    pub name: String,
    /// Explicit kind; inferred from `default` when absent.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<ValueKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Literal>,
}

/// A flag declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlagDefinition {
    /// Long name without dashes; `no-<name>` declares an inverted boolean.
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short: Option<char>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<ValueKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Literal>,
}

/// One command; the empty name is the root command.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommandDefinition {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub args: Vec<ArgDefinition>,
    #[serde(default)]
    pub flags: Vec<FlagDefinition>,
}

/// Top-level definition file.
///
/// # Examples
///
/// ```
/// use optparse_config::RegistryDefinition;
///
/// let yaml = r#"
/// commands:
///   - name: ""
///     args:
///       - { name: output, default: "" }
///     flags:
///       - { name: verbose, short: v, default: false }
/// "#;
///
/// let mut registry = RegistryDefinition::from_yaml_str(yaml)
///     .unwrap()
///     .into_registry()
///     .unwrap();
/// let root = registry.parse(["-v", "out.txt"]).unwrap();
/// assert_eq!(root.flag::<bool>("verbose"), Some(true));
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistryDefinition {
    #[serde(default)]
    pub commands: Vec<CommandDefinition>,
}

impl RegistryDefinition {
    /// Loads a definition file; `.json` files are read as JSON, anything
    /// else as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](ConfigError::IoError) if the file cannot be read,
    /// or a JSON/YAML error if parsing fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let reader = BufReader::new(std::fs::File::open(path)?);
        let definition: Self = if is_json(path) {
            serde_json::from_reader(reader)?
        } else {
            serde_yaml::from_reader(reader)?
        };
        debug!(
            path = %path.display(),
            commands = definition.commands.len(),
            "Loaded registry definition"
        );
        Ok(definition)
    }

    /// Saves the definition, choosing the format by extension as
    /// [`load`](Self::load) does.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](ConfigError::IoError) if the file cannot be
    /// written, or a JSON/YAML error if serialization fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let writer = BufWriter::new(std::fs::File::create(path)?);
        if is_json(path) {
            serde_json::to_writer_pretty(writer, self)?;
        } else {
            serde_yaml::to_writer(writer, self)?;
        }
        Ok(())
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Registers every command, argument and flag.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidDefault`] or
    /// [`ConfigError::MissingDefault`] for unusable defaults, and
    /// [`ConfigError::SchemaError`] when the registry rejects a declaration.
    pub fn to_registry(&self) -> Result<Registry> {
        let mut registry = Registry::new();
        for command in &self.commands {
            let schema = registry.register(&command.name)?;
            for arg in &command.args {
                let default = resolve_default(&arg.name, arg.kind, arg.default.as_ref())?;
                schema.add_arg(&arg.name, default)?;
            }
            for flag in &command.flags {
                let default = resolve_default(&flag.name, flag.kind, flag.default.as_ref())?;
                schema.add_flag(&flag.name, flag.short, default)?;
            }
        }
        Ok(registry)
    }

    /// Consuming form of [`to_registry`](Self::to_registry).
    pub fn into_registry(self) -> Result<Registry> {
        self.to_registry()
    }
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

/// Turns a literal default (and optional explicit kind) into a typed
/// default value.
fn resolve_default(
    name: &str,
    kind: Option<ValueKind>,
    literal: Option<&Literal>,
) -> Result<DefaultValue> {
    let Some(literal) = literal else {
        return zero_value(kind.unwrap_or(ValueKind::String))
            .map(DefaultValue::Scalar)
            .ok_or_else(|| ConfigError::MissingDefault(name.to_string()));
    };

    match literal {
        Literal::List(items) => {
            let kind = kind.or_else(|| items.first().and_then(literal_kind));
            items
                .iter()
                .map(|item| match item {
                    Literal::List(_) => Err(invalid(name, "choice sets cannot be nested")),
                    scalar => to_scalar(name, scalar, kind),
                })
                .collect::<Result<Vec<_>>>()
                .map(DefaultValue::Choices)
        }
        scalar => to_scalar(name, scalar, kind).map(DefaultValue::Scalar),
    }
}

fn literal_kind(literal: &Literal) -> Option<ValueKind> {
    match literal {
        Literal::Bool(_) => Some(ValueKind::Bool),
        Literal::Int(_) => Some(ValueKind::Int),
        Literal::Float(_) => Some(ValueKind::Float),
        Literal::String(_) => Some(ValueKind::String),
        Literal::List(_) => None,
    }
}

fn to_scalar(name: &str, literal: &Literal, kind: Option<ValueKind>) -> Result<Scalar> {
    let kind = kind.or_else(|| literal_kind(literal)).unwrap_or(ValueKind::String);
    let scalar = match (literal, kind) {
        (Literal::Bool(v), ValueKind::Bool) => Some(Scalar::Bool(*v)),
        (Literal::Int(v), ValueKind::Int) => Some(Scalar::Int(*v)),
        (Literal::Int(v), ValueKind::Float) => Some(Scalar::Float(*v as f64)),
        (Literal::Float(v), ValueKind::Float) => Some(Scalar::Float(*v)),
        (Literal::Bool(v), ValueKind::String) => Some(Scalar::String(v.to_string())),
        (Literal::Int(v), ValueKind::String) => Some(Scalar::String(v.to_string())),
        (Literal::Float(v), ValueKind::String) => Some(Scalar::String(v.to_string())),
        (Literal::String(s), kind) => coerce(s, kind),
        _ => None,
    };
    scalar.ok_or_else(|| invalid(name, &format!("{literal:?} is not a valid {kind}")))
}

fn zero_value(kind: ValueKind) -> Option<Scalar> {
    match kind {
        ValueKind::Bool => Some(Scalar::Bool(false)),
        ValueKind::String => Some(Scalar::String(String::new())),
        ValueKind::Int => Some(Scalar::Int(0)),
        ValueKind::Float => Some(Scalar::Float(0.0)),
        ValueKind::Duration => optparse_core::parse_duration("0").map(Scalar::Duration),
        ValueKind::Timestamp => None,
    }
}

fn invalid(name: &str, detail: &str) -> ConfigError {
    ConfigError::InvalidDefault {
        name: name.to_string(),
        detail: detail.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_is_inferred_from_literal() {
        assert_eq!(
            resolve_default("n", None, Some(&Literal::Int(3))).unwrap(),
            DefaultValue::Scalar(Scalar::Int(3))
        );
        assert_eq!(
            resolve_default("b", None, Some(&Literal::Bool(true))).unwrap(),
            DefaultValue::Scalar(Scalar::Bool(true))
        );
        assert_eq!(
            resolve_default("s", None, None).unwrap(),
            DefaultValue::Scalar(Scalar::String(String::new()))
        );
    }

    #[test]
    fn test_explicit_kind_coerces_string_literal() {
        let default = resolve_default(
            "timeout",
            Some(ValueKind::Duration),
            Some(&Literal::String("1m30s".into())),
        )
        .unwrap();
        assert_eq!(default.kind(), ValueKind::Duration);
        assert_eq!(default.reference().to_string(), "1m30s");
    }

    #[test]
    fn test_int_literal_widens_to_float() {
        assert_eq!(
            resolve_default("ratio", Some(ValueKind::Float), Some(&Literal::Int(1))).unwrap(),
            DefaultValue::Scalar(Scalar::Float(1.0))
        );
    }

    #[test]
    fn test_list_becomes_choice_set() {
        let default = resolve_default(
            "level",
            Some(ValueKind::Int),
            Some(&Literal::List(vec![Literal::Int(1), Literal::String("2".into())])),
        )
        .unwrap();
        assert_eq!(
            default,
            DefaultValue::Choices(vec![Scalar::Int(1), Scalar::Int(2)])
        );
    }

    #[test]
    fn test_unusable_defaults_are_rejected() {
        assert!(matches!(
            resolve_default("since", Some(ValueKind::Timestamp), None),
            Err(ConfigError::MissingDefault(_))
        ));
        assert!(matches!(
            resolve_default(
                "since",
                Some(ValueKind::Timestamp),
                Some(&Literal::String("yesterday".into()))
            ),
            Err(ConfigError::InvalidDefault { .. })
        ));
        assert!(matches!(
            resolve_default(
                "nested",
                None,
                Some(&Literal::List(vec![Literal::List(Vec::new())]))
            ),
            Err(ConfigError::InvalidDefault { .. })
        ));
        assert!(matches!(
            resolve_default("flag", Some(ValueKind::Bool), Some(&Literal::Int(1))),
            Err(ConfigError::InvalidDefault { .. })
        ));
    }
}
