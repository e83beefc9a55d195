use argot_diagnostics::Span;
use serde::Serialize;
use std::collections::BTreeMap;

/// How a flag occurrence was written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "form", rename_all = "lowercase")]
pub enum FlagForm {
    /// `--name`
    Long,
    /// `-n`
    Short,
    /// `-abc`: several single-character flags with no values.
    Group {
        /// Member flags, in the order written.
        members: Vec<char>,
    },
}

/// One appearance of a flag in the input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlagOccurrence {
    /// The flag as written, dashes included (`--count`, `-abc`).
    pub raw: String,
    /// Values following the flag, in input order. Empty for a bare flag.
    pub values: Vec<String>,
    /// Long, short or group.
    #[serde(flatten)]
    pub form: FlagForm,
    /// Position among all occurrences of the input, flags and positionals alike.
    pub ordinal: usize,
    /// Source span from the first dash to the last value.
    pub span: Span,
}

impl FlagOccurrence {
    /// Whether this is a short-flag group.
    pub fn is_group(&self) -> bool {
        matches!(self.form, FlagForm::Group { .. })
    }

    /// Group members, empty for other forms.
    pub fn members(&self) -> &[char] {
        match &self.form {
            FlagForm::Group { members } => members,
            FlagForm::Long | FlagForm::Short => &[],
        }
    }
}

/// One bare value at a positional index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PositionalOccurrence {
    /// The token text.
    pub raw: String,
    /// Always exactly one value when produced by the parser.
    pub values: Vec<String>,
    /// Position among all occurrences of the input.
    pub ordinal: usize,
    /// Source span of the token.
    pub span: Span,
}

/// The command path matched at the start of the input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedCommand {
    /// Canonical names from the root's subcommand down to the deepest match.
    pub path: Vec<String>,
    /// Whether the deepest matched command is deprecated.
    pub deprecated: bool,
    /// Deprecation message of the deepest matched command.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecation_message: Option<String>,
    /// Source span covering the command words.
    pub span: Span,
}

impl ResolvedCommand {
    /// The path joined with spaces, as a user would type it.
    pub fn display_path(&self) -> String {
        self.path.join(" ")
    }
}

/// Raw structure of an input: command path, flags and positionals.
///
/// Occurrences are kept exactly as written; nothing is merged or coerced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParsedArguments {
    /// Matched command, if the input started with one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<ResolvedCommand>,
    /// Flag identifier as written (without dashes) → occurrences in input order.
    pub flags: BTreeMap<String, Vec<FlagOccurrence>>,
    /// Positional index → occurrence.
    pub positionals: BTreeMap<usize, PositionalOccurrence>,
}

impl ParsedArguments {
    /// Command path, empty when no command was matched.
    pub fn command_path(&self) -> &[String] {
        self.command.as_ref().map_or(&[], |c| c.path.as_slice())
    }

    /// Every flag occurrence, in input order.
    pub fn flag_occurrences(&self) -> Vec<(&str, &FlagOccurrence)> {
        let mut all: Vec<(&str, &FlagOccurrence)> = self
            .flags
            .iter()
            .flat_map(|(key, occs)| occs.iter().map(move |o| (key.as_str(), o)))
            .collect();
        all.sort_by_key(|(_, o)| o.ordinal);
        all
    }
}
