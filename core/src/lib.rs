//! getopt-style command-line parsing against a registered schema.
//!
//! This crate converts a raw argument vector into typed, validated values:
//!
//! - [`Registry`] — commands by name (empty = root), each a
//!   [`CommandSchema`] of flags ([`FlagDecl`]) and ordered positional
//!   arguments ([`ArgDecl`]).
//! - [`DefaultValue`] — fixes a declaration's [`ValueKind`], and with
//!   [`DefaultValue::Choices`] restricts it to an allowed set.
//! - [`Registry::parse`] — normalizes tokens ([`token`]), resolves the
//!   command, binds flags and arguments, [`coerce`]s and [`validate`]s each
//!   value.
//! - [`accessor`] — typed reads that fall back to declared defaults.
//!
//! Accepted grammar: `--flag`, `--flag value`, `--flag=value`,
//! `--no-flag` (booleans only), `-f`, `-f value`, `-f=value` and clusters
//! like `-abc` where only the last flag may take a value. A command name,
//! if any, is the first token.
//!
//! # Example
//!
//! ```
//! use optparse_core::*;
//!
//! let mut registry = Registry::new();
//! registry
//!     .register("")?
//!     .add_arg("output", "")?
//!     .add_flag("force", Some('f'), false)?
//!     .add_flag("verbose", Some('v'), false)?
//!     .add_flag("dir", None, "/var/users")?;
//!
//! let root = registry.parse(["-fv", "--dir=./sub/dir", "userinfo"]).unwrap();
//!
//! assert!(root.is_root());
//! assert_eq!(root.arg::<String>("output").as_deref(), Some("userinfo"));
//! assert_eq!(root.flag::<bool>("force"), Some(true));
//! assert_eq!(root.flag::<String>("dir").as_deref(), Some("./sub/dir"));
//!
//! let err = registry.parse(["--bogus"]).unwrap_err();
//! assert!(matches!(err, ParseError::UnknownFlag { ref name, .. } if name == "bogus"));
//! # Ok::<(), SchemaError>(())
//! ```

pub mod accessor;
mod coerce;
mod error;
mod parser;
mod registry;
pub mod token;
mod types;
mod validate;
mod value;

pub use accessor::FromScalar;
pub use coerce::{coerce, parse_bool, parse_duration, parse_timestamp};
pub use error::{BadArgumentReason, ParseError, SchemaError};
pub use registry::{Registry, RegistryBuilder};
pub use types::*;
pub use validate::validate;
pub use value::{DefaultValue, Scalar, TIMESTAMP_FORMAT, Value, ValueKind, format_duration};
