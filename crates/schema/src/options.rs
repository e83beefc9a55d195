use serde::{Deserialize, Serialize};

/// What to do with a flag that matches no declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnrecognizedPolicy {
    /// Ignore it.
    Skip,
    /// Report it.
    #[default]
    Throw,
}

/// What to do with extra values given to a single-valued declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExcessValuePolicy {
    /// Keep the first value.
    Drop,
    /// Report the excess values.
    #[default]
    Throw,
}

/// What to do when a declaration occurs more than once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MultiplePolicy {
    /// Concatenate every occurrence's values (array declarations only).
    Append,
    /// Keep the first occurrence.
    Drop,
    /// Report the repetition.
    Throw,
    /// Keep the last occurrence.
    Overwrite,
}

impl std::fmt::Display for MultiplePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MultiplePolicy::Append => write!(f, "append"),
            MultiplePolicy::Drop => write!(f, "drop"),
            MultiplePolicy::Throw => write!(f, "throw"),
            MultiplePolicy::Overwrite => write!(f, "overwrite"),
        }
    }
}

/// How a deprecated command is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeprecatedPolicy {
    /// Report it as deprecated, with its message.
    #[default]
    Error,
    /// Report it as if it did not exist.
    UnknownCommand,
}

/// Options recognized by the parser and resolution engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ParserOptions {
    /// Flags with no matching declaration.
    pub unrecognized_argument: UnrecognizedPolicy,
    /// More than one value for a single-valued declaration.
    pub too_many_values: ExcessValuePolicy,
    /// Repeated single-valued declarations. `append` is rejected when applied.
    pub too_many_definitions: MultiplePolicy,
    /// Repeated array declarations.
    pub array_multiple_definitions: MultiplePolicy,
    /// Invocation of a deprecated command.
    pub deprecated_commands: DeprecatedPolicy,
    /// When set, keys are also looked up as `{PREFIX}_{KEY}` environment variables.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment_prefix: Option<String>,
    /// Fail when the input does not start with a command.
    pub must_provide_command: bool,
    /// Accept `--name=value` as a flag with an inline first value.
    pub inline_values: bool,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            unrecognized_argument: UnrecognizedPolicy::Throw,
            too_many_values: ExcessValuePolicy::Throw,
            too_many_definitions: MultiplePolicy::Throw,
            array_multiple_definitions: MultiplePolicy::Append,
            deprecated_commands: DeprecatedPolicy::Error,
            environment_prefix: None,
            must_provide_command: false,
            inline_values: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let opts: ParserOptions = serde_json::from_str(
            r#"{"unrecognizedArgument": "skip", "deprecatedCommands": "unknown-command"}"#,
        )
        .unwrap();
        assert_eq!(opts.unrecognized_argument, UnrecognizedPolicy::Skip);
        assert_eq!(opts.deprecated_commands, DeprecatedPolicy::UnknownCommand);
        assert_eq!(opts.array_multiple_definitions, MultiplePolicy::Append);
        assert_eq!(opts.too_many_definitions, MultiplePolicy::Throw);
        assert!(opts.inline_values);
    }

    #[test]
    fn unknown_policy_value_is_rejected() {
        let res: Result<ParserOptions, _> = serde_json::from_str(r#"{"tooManyValues": "append"}"#);
        assert!(res.is_err());
    }
}
