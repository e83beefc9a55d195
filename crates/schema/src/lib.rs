//! Schema types for the argot argument engine.
//!
//! Defines what an input is interpreted against: [`Declaration`]s for flags
//! and positionals, the [`CommandNode`] tree, [`ParserOptions`], and the
//! [`PrefixTree`] symbol table used to look commands and flags up. Schemas are
//! built once and are read-only while inputs are interpreted.

#![warn(missing_docs)]

/// Command tree and registration rules.
pub mod command;
/// Flag and positional declarations.
pub mod declaration;
/// Registration errors.
pub mod error;
/// JSON schema documents.
pub mod file;
/// Parser and engine options.
pub mod options;
/// Prefix-tree symbol table.
pub mod trie;
/// Typed values and defaults.
pub mod value;

pub use command::CommandNode;
pub use declaration::{Alias, AliasKind, Declaration, DeclarationKind};
pub use error::SchemaError;
pub use file::{CommandSpec, SCHEMA_FORMAT_VERSION, SchemaFile};
pub use options::{
    DeprecatedPolicy, ExcessValuePolicy, MultiplePolicy, ParserOptions, UnrecognizedPolicy,
};
pub use trie::{Lookup, PrefixTree};
pub use value::{DefaultValue, Value};
