//! Diagnostics for the argot argument engine.
//!
//! Provides [`Diagnostic`], [`Category`] and [`Span`], used to report why an
//! input could not be interpreted against a schema. Every diagnostic carries
//! the `problem` / `expected` / `received` triple and renders as
//! `"<problem>, expected '<expected>' received '<received>'"`.
//! Diagnostic codes are defined in the [`codes`] module.

#![warn(missing_docs)]

/// Diagnostic ID constants auto-generated from `spec/diagnostics.json`.
pub mod codes;

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;

/// Byte span in the interpreted input.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Span {
    /// Byte offset of the first character (0-based).
    pub start: usize,
    /// Byte offset one past the last character.
    pub end: usize,
}

impl Span {
    /// Create a span covering `[start, end)`.
    ///
    /// Panics if `end < start`.
    pub fn new(start: usize, end: usize) -> Self {
        assert!(end >= start, "Span end ({end}) < start ({start})");
        Self { start, end }
    }

    /// Create a zero-width span at the given position.
    pub fn empty(pos: usize) -> Self {
        Self {
            start: pos,
            end: pos,
        }
    }

    /// Smallest span covering both `self` and `other`.
    pub fn cover(self, other: Span) -> Self {
        Self {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

/// Which pipeline stage a diagnostic belongs to, derived from its code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum Category {
    /// Malformed input or token stream (`ARG1xxx`).
    Parse,
    /// A declaration could not be satisfied or coerced (`ARG2xxx`).
    Coercion,
    /// Command resolution or schema registration (`ARG3xxx`).
    Command,
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Category::Parse => write!(f, "parse"),
            Category::Coercion => write!(f, "coercion"),
            Category::Command => write!(f, "command"),
        }
    }
}

/// A diagnostic produced by the tokenizer, parser, engine or schema registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Unique diagnostic code (e.g., `"ARG2008"`).
    pub id: Cow<'static, str>,
    /// Human-readable description of what went wrong.
    pub problem: String,
    /// What the engine required.
    pub expected: String,
    /// What was actually present in the input.
    pub received: String,
    /// Byte span in the input this diagnostic relates to, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span: Option<Span>,
    /// Machine-readable context for tooling (`"arg"`, `"position"`, ...).
    ///
    /// Uses `BTreeMap` for deterministic key ordering in serialized output.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<BTreeMap<String, String>>,
}

impl Diagnostic {
    /// Create a diagnostic from its code and the problem/expected/received triple.
    pub fn new(
        id: impl Into<Cow<'static, str>>,
        problem: impl Into<String>,
        expected: impl Into<String>,
        received: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            problem: problem.into(),
            expected: expected.into(),
            received: received.into(),
            span: None,
            context: None,
        }
    }

    /// Attach a source span (builder pattern).
    pub fn with_span(mut self, span: Option<Span>) -> Self {
        self.span = span;
        self
    }

    /// Attach machine-readable context metadata (builder pattern).
    ///
    /// Replaces any context already present.
    pub fn with_context(mut self, ctx: BTreeMap<String, String>) -> Self {
        self.context = Some(ctx);
        self
    }

    /// Look up a single context value.
    pub fn context_value(&self, key: &str) -> Option<&str> {
        self.context
            .as_ref()
            .and_then(|ctx| ctx.get(key))
            .map(String::as_str)
    }

    /// Pipeline stage this diagnostic belongs to.
    ///
    /// Codes outside the known ranges are treated as coercion diagnostics.
    pub fn category(&self) -> Category {
        match self.id.as_bytes().get(3) {
            Some(b'1') => Category::Parse,
            Some(b'3') => Category::Command,
            _ => Category::Coercion,
        }
    }

    /// Returns the human-readable explanation for this diagnostic's code, if available.
    pub fn explain(&self) -> Option<&'static str> {
        explain(&self.id)
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}, expected '{}' received '{}'",
            self.problem, self.expected, self.received
        )
    }
}

/// Returns the human-readable explanation for a diagnostic code, if known.
///
/// Auto-generated from `spec/diagnostics.json` at build time.
pub fn explain(id: &str) -> Option<&'static str> {
    include!(concat!(env!("OUT_DIR"), "/generated_explain.rs"))
}

/// Returns the problem template for a diagnostic code and variant, if known.
///
/// Templates contain `{key}` placeholders naming context keys.
pub fn message_template_for(id: &str, variant: &str) -> Option<&'static str> {
    include!(concat!(env!("OUT_DIR"), "/generated_templates.rs"))
}

/// Render a problem template, substituting `{key}` placeholders.
///
/// Falls back to `fallback` when no template exists for `(id, variant)`.
/// Unknown placeholders are left as written.
pub fn render_problem(
    id: &str,
    variant: &str,
    substitutions: &[(&str, &str)],
    fallback: String,
) -> String {
    let Some(template) = message_template_for(id, variant) else {
        return fallback;
    };
    let mut rendered = String::with_capacity(template.len() + 16);
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        rendered.push_str(&rest[..open]);
        let after_open = &rest[open + 1..];
        let Some(close) = after_open.find('}') else {
            rendered.push_str(&rest[open..]);
            return rendered;
        };
        let key = &after_open[..close];
        match substitutions.iter().find(|(k, _)| *k == key) {
            Some((_, value)) => rendered.push_str(value),
            None => rendered.push_str(&rest[open..open + close + 2]),
        }
        rest = &after_open[close + 1..];
    }
    rendered.push_str(rest);
    rendered
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_new_valid() {
        let s = Span::new(5, 10);
        assert_eq!(s.start, 5);
        assert_eq!(s.end, 10);
    }

    #[test]
    #[should_panic(expected = "Span end (3) < start (5)")]
    fn span_new_inverted_panics() {
        Span::new(5, 3);
    }

    #[test]
    fn span_cover_joins_ranges() {
        let s = Span::new(4, 6).cover(Span::new(0, 2));
        assert_eq!(s, Span::new(0, 6));
    }

    #[test]
    fn display_renders_triple() {
        let d = Diagnostic::new(
            codes::TOO_MANY_VALUES,
            "too many values for --count",
            "1 value",
            "2",
        );
        assert_eq!(
            d.to_string(),
            "too many values for --count, expected '1 value' received '2'"
        );
    }

    #[test]
    fn category_follows_code_range() {
        let parse = Diagnostic::new(codes::PARSER_OUT_OF_TOKENS, "p", "e", "r");
        let coercion = Diagnostic::new(codes::INVALID_VALUE, "p", "e", "r");
        let command = Diagnostic::new(codes::DEPRECATED_COMMAND, "p", "e", "r");
        assert_eq!(parse.category(), Category::Parse);
        assert_eq!(coercion.category(), Category::Coercion);
        assert_eq!(command.category(), Category::Command);
    }

    #[test]
    fn context_value_lookup() {
        let d = Diagnostic::new(codes::INVALID_VALUE, "p", "number", "true").with_context(
            BTreeMap::from([("position".to_string(), "2".to_string())]),
        );
        assert_eq!(d.context_value("position"), Some("2"));
        assert_eq!(d.context_value("arg"), None);
    }

    #[test]
    fn every_code_has_explanation_and_template() {
        for id in [
            codes::PARSER_OUT_OF_TOKENS,
            codes::PARSER_UNEXPECTED_TOKEN,
            codes::INVALID_INPUT,
            codes::MISSING_ARGUMENT,
            codes::MISSING_VALUE,
            codes::UNMET_DEPENDENCY,
            codes::CONFLICTING_ARGUMENT,
            codes::EXCLUSIVE_ARGUMENT,
            codes::TOO_MANY_DEFINITIONS,
            codes::APPEND_NOT_ALLOWED,
            codes::TOO_MANY_VALUES,
            codes::UNRECOGNIZED_ARGUMENT,
            codes::UNKNOWN_TYPE,
            codes::RESOLVER_FAILED,
            codes::UNKNOWN_COMMAND,
            codes::MISSING_COMMAND,
            codes::DUPLICATE_KEY,
            codes::DUPLICATE_COMMAND,
            codes::INVALID_DECLARATION,
        ] {
            assert!(explain(id).is_some(), "missing explanation for {id}");
            assert!(
                message_template_for(id, "default").is_some(),
                "missing default template for {id}"
            );
        }
        assert!(message_template_for(codes::INVALID_VALUE, "element").is_some());
        assert!(message_template_for(codes::DEPRECATED_COMMAND, "withMessage").is_some());
    }

    #[test]
    fn render_problem_substitutes_placeholders() {
        let rendered = render_problem(
            codes::INVALID_VALUE,
            "element",
            &[("position", "2"), ("arg", "--n")],
            String::new(),
        );
        assert_eq!(rendered, "invalid value for argument number 2 of --n");
    }

    #[test]
    fn render_problem_uses_fallback_for_unknown_variant() {
        let rendered = render_problem(codes::INVALID_VALUE, "nope", &[], "fallback".into());
        assert_eq!(rendered, "fallback");
    }

    #[test]
    fn serializes_without_empty_optionals() {
        let d = Diagnostic::new(
            codes::MISSING_COMMAND,
            "no command provided",
            "a command",
            "nothing",
        );
        let json = serde_json::to_value(&d).unwrap();
        assert_eq!(json["id"], "ARG3003");
        assert!(json.get("span").is_none());
        assert!(json.get("context").is_none());
    }
}
