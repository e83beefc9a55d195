//! Pretty diagnostic rendering using ariadne.
//!
//! Converts interpretation [`Diagnostic`]s into ariadne [`Report`]s annotated
//! against the interpreted input line. Falls back to structured JSON when the
//! output is piped or when the user explicitly requests it.

use std::io::{self, IsTerminal};

use anyhow::Result;
use argot_diagnostics::{Category, Diagnostic};
use ariadne::{Color, Config, Label, Report, ReportKind, Source};

// ── Output format ───────────────────────────────────────────────────────

/// Output format for results and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Format {
    /// Coloured, source-annotated output (ariadne).
    Pretty,
    /// Machine-readable JSON.
    Json,
}

impl Format {
    /// Use the explicit choice, or pretty for a terminal and JSON for a pipe.
    pub(crate) fn resolve_or_detect(explicit: Option<&str>) -> Self {
        match explicit {
            Some("json") => Format::Json,
            Some("pretty") => Format::Pretty,
            _ => {
                if io::stdout().is_terminal() {
                    Format::Pretty
                } else {
                    Format::Json
                }
            }
        }
    }
}

fn category_color(category: Category) -> Color {
    match category {
        Category::Parse => Color::Red,
        Category::Command => Color::Magenta,
        _ => Color::Yellow,
    }
}

fn context_note(diag: &Diagnostic) -> Option<String> {
    let ctx = diag.context.as_ref().filter(|ctx| !ctx.is_empty())?;
    Some(
        ctx.iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join(", "),
    )
}

// ── Pretty rendering ────────────────────────────────────────────────────

/// Render diagnostics to stderr, annotating `source` where a span is known.
pub(crate) fn render_diagnostics_pretty(source: &str, name: &str, diagnostics: &[Diagnostic]) {
    let config = Config::default()
        .with_compact(false)
        .with_color(io::stderr().is_terminal());
    let mut cache = (name, Source::from(source));

    for diag in diagnostics {
        let Some(span) = &diag.span else {
            eprintln!("error[{}]: {diag}", diag.id);
            if let Some(note) = context_note(diag) {
                eprintln!("  = note: {note}");
            }
            if let Some(explanation) = diag.explain() {
                eprintln!("  = help: {explanation}");
            }
            continue;
        };

        // Clamp to the input; argv offsets assume single-space joins.
        let start = span.start.min(source.len());
        let end = span.end.min(source.len()).max(start);

        let mut builder = Report::build(ReportKind::Error, (name, start..end))
            .with_code(diag.id.as_ref())
            .with_message(&diag.problem)
            .with_config(config)
            .with_label(
                Label::new((name, start..end))
                    .with_message(format!(
                        "expected {}, received '{}'",
                        diag.expected, diag.received
                    ))
                    .with_color(category_color(diag.category())),
            );
        if let Some(note) = context_note(diag) {
            builder = builder.with_note(note);
        }
        if let Some(explanation) = diag.explain() {
            builder = builder.with_help(explanation);
        }
        builder.finish().eprint(&mut cache).ok();
    }
}

/// Print a summary line such as `2 errors (coercion)`.
pub(crate) fn print_summary(diagnostics: &[Diagnostic]) {
    use ariadne::Fmt;

    if diagnostics.is_empty() {
        return;
    }
    let n = diagnostics.len();
    let s = if n == 1 { "" } else { "s" };
    let mut categories: Vec<String> = diagnostics.iter().map(|d| d.category().to_string()).collect();
    categories.dedup();
    eprintln!(
        "{} ({})",
        format!("{n} error{s}").fg(Color::Red),
        categories.join(", ")
    );
}

// ── JSON rendering ──────────────────────────────────────────────────────

/// Print a JSON value to stdout.
pub(crate) fn print_json(value: &serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
