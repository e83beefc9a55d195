//! JSON schema documents.
//!
//! A [`SchemaFile`] describes a command tree and its options as data. Loading
//! goes through the same registration calls as programmatic construction, so
//! every uniqueness rule applies.

use crate::command::CommandNode;
use crate::declaration::Declaration;
use crate::error::SchemaError;
use crate::options::ParserOptions;
use serde::{Deserialize, Serialize};

/// Format version written by this crate.
pub const SCHEMA_FORMAT_VERSION: &str = "0.1.0";

/// A command described as data.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandSpec {
    /// Canonical name.
    pub name: String,
    /// Alternative names.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    /// Description for help renderers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Whether the command is deprecated.
    #[serde(default)]
    pub deprecated: bool,
    /// Shown when a deprecated command is invoked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecation_message: Option<String>,
    /// Whether the command sees its parent's declarations.
    #[serde(default)]
    pub inherit: bool,
    /// Flags and positionals, in order.
    #[serde(default)]
    pub declarations: Vec<Declaration>,
    /// Subcommands.
    #[serde(default)]
    pub commands: Vec<CommandSpec>,
}

impl CommandSpec {
    /// Register everything described into a [`CommandNode`] tree.
    pub fn build(self) -> Result<CommandNode, SchemaError> {
        let mut node = CommandNode::new(self.name).with_inherit(self.inherit);
        for alias in self.aliases {
            node = node.with_alias(alias);
        }
        if let Some(description) = self.description {
            node = node.with_description(description);
        }
        if self.deprecated {
            node = node.with_deprecation(self.deprecation_message);
        }
        for decl in self.declarations {
            node.add_declaration(decl)?;
        }
        for child in self.commands {
            node.add_subcommand(child.build()?)?;
        }
        Ok(node)
    }
}

/// A schema document: options plus the root command.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaFile {
    /// Document format version.
    #[serde(default = "default_version")]
    pub version: String,
    /// Parser and engine options.
    #[serde(default)]
    pub options: ParserOptions,
    /// The program's root command.
    pub root: CommandSpec,
}

fn default_version() -> String {
    SCHEMA_FORMAT_VERSION.to_string()
}

impl SchemaFile {
    /// Deserialize a schema document.
    pub fn from_json(json: &str) -> Result<Self, SchemaError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Build the command tree, returning it with the document's options.
    pub fn into_parts(self) -> Result<(CommandNode, ParserOptions), SchemaError> {
        let root = self.root.build()?;
        Ok((root, self.options))
    }
}
