use argot_diagnostics::{Diagnostic, codes, render_problem};
use std::collections::BTreeMap;

/// Errors raised while registering declarations and commands.
///
/// All of them are reported to users as command diagnostics.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// A key or alias is already registered in the same scope.
    #[error("duplicate argument key '{key}' in command '{command}'")]
    DuplicateKey {
        /// The clashing key.
        key: String,
        /// The command the declaration was registered on.
        command: String,
    },

    /// A sibling command already uses the name or alias.
    #[error("duplicate command name '{name}' under '{parent}'")]
    DuplicateCommand {
        /// The clashing name or alias.
        name: String,
        /// The parent command.
        parent: String,
    },

    /// The declaration cannot be registered as written.
    #[error("invalid declaration '{key}': {reason}")]
    InvalidDeclaration {
        /// Key of the offending declaration.
        key: String,
        /// What is wrong with it.
        reason: String,
    },

    /// A schema document could not be deserialized.
    #[error("invalid schema JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

impl SchemaError {
    /// Convert into a diagnostic carrying the problem/expected/received triple.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            SchemaError::DuplicateKey { key, command } => Diagnostic::new(
                codes::DUPLICATE_KEY,
                render_problem(
                    codes::DUPLICATE_KEY,
                    "default",
                    &[("key", key.as_str())],
                    format!("duplicate argument key {key}"),
                ),
                "a unique key",
                key.as_str(),
            )
            .with_context(BTreeMap::from([
                ("key".to_string(), key.clone()),
                ("command".to_string(), command.clone()),
            ])),
            SchemaError::DuplicateCommand { name, parent } => Diagnostic::new(
                codes::DUPLICATE_COMMAND,
                render_problem(
                    codes::DUPLICATE_COMMAND,
                    "default",
                    &[("command", name.as_str())],
                    format!("duplicate command name {name}"),
                ),
                "a unique command name",
                name.as_str(),
            )
            .with_context(BTreeMap::from([
                ("command".to_string(), name.clone()),
                ("parent".to_string(), parent.clone()),
            ])),
            SchemaError::InvalidDeclaration { key, reason } => Diagnostic::new(
                codes::INVALID_DECLARATION,
                render_problem(
                    codes::INVALID_DECLARATION,
                    "default",
                    &[("key", key.as_str()), ("reason", reason.as_str())],
                    format!("invalid declaration {key}: {reason}"),
                ),
                "a well-formed declaration",
                key.as_str(),
            ),
            SchemaError::InvalidJson(e) => Diagnostic::new(
                codes::INVALID_DECLARATION,
                "schema document is not valid",
                "a schema JSON document",
                e.to_string(),
            ),
        }
    }
}
