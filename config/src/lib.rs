//! File-based registry definitions for `optparse-core`.
//!
//! Commands, positional arguments and flags can be declared in a YAML or
//! JSON file instead of code, then turned into a ready-to-parse
//! [`Registry`](optparse_core::Registry).
//!
//! # Quick start
//!
//! ```no_run
//! use optparse_config::RegistryDefinition;
//!
//! let mut registry = RegistryDefinition::load("commands.yaml")
//!     .unwrap()
//!     .to_registry()
//!     .unwrap();
//!
//! let command = registry.parse(std::env::args().skip(1)).unwrap();
//! println!("resolved '{}'", command.name());
//! ```

mod definition;
mod error;

pub use definition::{ArgDefinition, CommandDefinition, FlagDefinition, Literal, RegistryDefinition};
pub use error::{ConfigError, Result};
