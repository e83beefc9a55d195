use crate::error::SchemaError;
use crate::value::DefaultValue;
use serde::{Deserialize, Serialize};

/// Whether an alias is written with `--` or `-`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AliasKind {
    /// `--name`
    Long,
    /// `-n`, exactly one character.
    Short,
}

/// An alternative spelling of a flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alias {
    /// Long or short form.
    pub kind: AliasKind,
    /// The alias text without dashes.
    pub value: String,
}

/// Flag or positional, with the names it is matched by.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum DeclarationKind {
    /// A named flag, `--long` plus any aliases.
    Flag {
        /// Primary key, written `--long`.
        long: String,
        /// Alternative spellings.
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        aliases: Vec<Alias>,
    },
    /// A bare argument matched by position.
    Positional {
        /// Key used to refer to the value.
        key: String,
        /// Registration position among its command's positionals.
        #[serde(default)]
        index: usize,
    },
}

fn default_types() -> Vec<String> {
    vec!["string".to_string()]
}

/// One expected input: a flag or positional with its rules.
///
/// Immutable once registered on a [`CommandNode`](crate::CommandNode).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Declaration {
    /// Flag or positional.
    #[serde(flatten)]
    pub kind: DeclarationKind,
    /// Candidate type names, tried in order.
    #[serde(default = "default_types")]
    pub types: Vec<String>,
    /// Whether the argument may be absent.
    #[serde(default)]
    pub optional: bool,
    /// Used when the flag is present with no value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specified_default: Option<DefaultValue>,
    /// Used when the argument is absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unspecified_default: Option<DefaultValue>,
    /// Keys that must be present whenever this one is.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<String>,
    /// Keys that must not be present together with this one.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conflicts: Vec<String>,
    /// When present, no other argument may be.
    #[serde(default)]
    pub exclusive: bool,
    /// Keys whose presence makes this argument optional.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required_unless_present: Vec<String>,
    /// Accepts a list of values.
    #[serde(default)]
    pub array: bool,
    /// Free-form description for help renderers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Declaration {
    fn with_kind(kind: DeclarationKind) -> Self {
        Self {
            kind,
            types: default_types(),
            optional: false,
            specified_default: None,
            unspecified_default: None,
            dependencies: Vec::new(),
            conflicts: Vec::new(),
            exclusive: false,
            required_unless_present: Vec::new(),
            array: false,
            description: None,
        }
    }

    /// A required string flag named `--long`.
    pub fn flag(long: impl Into<String>) -> Self {
        Self::with_kind(DeclarationKind::Flag {
            long: long.into(),
            aliases: Vec::new(),
        })
    }

    /// A required string positional named `key`.
    pub fn positional(key: impl Into<String>) -> Self {
        Self::with_kind(DeclarationKind::Positional {
            key: key.into(),
            index: 0,
        })
    }

    /// Add an alias. Ignored for positionals.
    pub fn with_alias(mut self, kind: AliasKind, value: impl Into<String>) -> Self {
        if let DeclarationKind::Flag { aliases, .. } = &mut self.kind {
            aliases.push(Alias {
                kind,
                value: value.into(),
            });
        }
        self
    }

    /// Replace the candidate types.
    pub fn with_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.types = types.into_iter().map(Into::into).collect();
        self
    }

    /// Set whether the argument may be absent.
    pub fn with_optional(mut self, optional: bool) -> Self {
        self.optional = optional;
        self
    }

    /// Set the present-without-value default.
    pub fn with_specified_default(mut self, value: impl Into<DefaultValue>) -> Self {
        self.specified_default = Some(value.into());
        self
    }

    /// Set the absent default.
    pub fn with_unspecified_default(mut self, value: impl Into<DefaultValue>) -> Self {
        self.unspecified_default = Some(value.into());
        self
    }

    /// Add a dependency key.
    pub fn with_dependency(mut self, key: impl Into<String>) -> Self {
        self.dependencies.push(key.into());
        self
    }

    /// Add a conflicting key.
    pub fn with_conflict(mut self, key: impl Into<String>) -> Self {
        self.conflicts.push(key.into());
        self
    }

    /// Mark as exclusive.
    pub fn with_exclusive(mut self, exclusive: bool) -> Self {
        self.exclusive = exclusive;
        self
    }

    /// Add a key whose presence makes this argument optional.
    pub fn with_required_unless_present(mut self, key: impl Into<String>) -> Self {
        self.required_unless_present.push(key.into());
        self
    }

    /// Mark as array-typed.
    pub fn with_array(mut self, array: bool) -> Self {
        self.array = array;
        self
    }

    /// Attach a description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Primary key: the long name of a flag or the key of a positional.
    pub fn key(&self) -> &str {
        match &self.kind {
            DeclarationKind::Flag { long, .. } => long,
            DeclarationKind::Positional { key, .. } => key,
        }
    }

    /// Whether this is a flag.
    pub fn is_flag(&self) -> bool {
        matches!(self.kind, DeclarationKind::Flag { .. })
    }

    /// Whether this is a positional.
    pub fn is_positional(&self) -> bool {
        matches!(self.kind, DeclarationKind::Positional { .. })
    }

    /// Flag aliases (empty for positionals).
    pub fn aliases(&self) -> &[Alias] {
        match &self.kind {
            DeclarationKind::Flag { aliases, .. } => aliases,
            DeclarationKind::Positional { .. } => &[],
        }
    }

    /// Every key this declaration is registered under.
    pub fn lookup_keys(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.key()).chain(self.aliases().iter().map(|a| a.value.as_str()))
    }

    /// The key as a user would write it: `--long` or `<key>`.
    pub fn display_name(&self) -> String {
        match &self.kind {
            DeclarationKind::Flag { long, .. } => format!("--{long}"),
            DeclarationKind::Positional { key, .. } => format!("<{key}>"),
        }
    }

    /// Candidate types joined for diagnostics, e.g. `number | boolean`.
    pub fn type_summary(&self) -> String {
        self.types.join(" | ")
    }

    /// Check the declaration is well formed on its own.
    pub fn validate(&self) -> Result<(), SchemaError> {
        let invalid = |reason: &str| SchemaError::InvalidDeclaration {
            key: self.key().to_string(),
            reason: reason.to_string(),
        };
        let key = self.key();
        if key.is_empty() {
            return Err(invalid("key is empty"));
        }
        if key.chars().any(char::is_whitespace) {
            return Err(invalid("key contains whitespace"));
        }
        if self.is_flag() && key.starts_with('-') {
            return Err(invalid("flag key must not start with '-'"));
        }
        if self.types.is_empty() {
            return Err(invalid("at least one type is required"));
        }
        for alias in self.aliases() {
            if alias.value.is_empty() || alias.value.starts_with('-') {
                return Err(invalid("alias must be non-empty and written without dashes"));
            }
            if alias.kind == AliasKind::Short && alias.value.chars().count() != 1 {
                return Err(invalid("short alias must be a single character"));
            }
        }
        Ok(())
    }
}
