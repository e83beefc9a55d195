use crate::grammar::ast::{PositionalOccurrence, ResolvedCommand};
use argot_diagnostics::{Diagnostic, Span, codes, render_problem};
use argot_schema::{Declaration, DeprecatedPolicy};
use std::collections::BTreeMap;

pub(super) fn missing_argument(decl: &Declaration) -> Diagnostic {
    let arg = decl.display_name();
    Diagnostic::new(
        codes::MISSING_ARGUMENT,
        render_problem(
            codes::MISSING_ARGUMENT,
            "default",
            &[("arg", arg.as_str())],
            format!("missing argument {arg}, no default"),
        ),
        decl.type_summary(),
        "nothing",
    )
    .with_context(ctx!("arg" => arg))
}

pub(super) fn missing_value(decl: &Declaration, span: Span) -> Diagnostic {
    let arg = decl.display_name();
    Diagnostic::new(
        codes::MISSING_VALUE,
        render_problem(
            codes::MISSING_VALUE,
            "default",
            &[("arg", arg.as_str())],
            format!("no value provided for {arg}"),
        ),
        decl.type_summary(),
        "nothing",
    )
    .with_span(Some(span))
    .with_context(ctx!("arg" => arg))
}

pub(super) fn unmet_dependency(decl: &Declaration, dependency: &str, span: Option<Span>) -> Diagnostic {
    let arg = decl.display_name();
    Diagnostic::new(
        codes::UNMET_DEPENDENCY,
        render_problem(
            codes::UNMET_DEPENDENCY,
            "default",
            &[("arg", arg.as_str()), ("dependency", dependency)],
            format!("unmet dependency for {arg}"),
        ),
        dependency,
        "nothing",
    )
    .with_span(span)
    .with_context(ctx!("arg" => arg, "dependency" => dependency))
}

pub(super) fn conflicting_argument(decl: &Declaration, conflict: &str, span: Option<Span>) -> Diagnostic {
    let arg = decl.display_name();
    Diagnostic::new(
        codes::CONFLICTING_ARGUMENT,
        render_problem(
            codes::CONFLICTING_ARGUMENT,
            "default",
            &[("arg", arg.as_str()), ("conflict", conflict)],
            format!("{arg} conflicts with {conflict}"),
        ),
        format!("{arg} without {conflict}"),
        conflict,
    )
    .with_span(span)
    .with_context(ctx!("arg" => arg, "conflict" => conflict))
}

pub(super) fn exclusive_argument(decl: &Declaration, others: &[String], span: Option<Span>) -> Diagnostic {
    let arg = decl.display_name();
    Diagnostic::new(
        codes::EXCLUSIVE_ARGUMENT,
        render_problem(
            codes::EXCLUSIVE_ARGUMENT,
            "default",
            &[("arg", arg.as_str())],
            format!("{arg} must be used on its own"),
        ),
        format!("{arg} alone"),
        others.join(" "),
    )
    .with_span(span)
    .with_context(ctx!("arg" => arg))
}

pub(super) fn too_many_definitions(decl: &Declaration, count: usize, span: Span) -> Diagnostic {
    let arg = decl.display_name();
    let count = count.to_string();
    Diagnostic::new(
        codes::TOO_MANY_DEFINITIONS,
        render_problem(
            codes::TOO_MANY_DEFINITIONS,
            "default",
            &[("arg", arg.as_str()), ("count", count.as_str())],
            format!("{arg} was defined {count} times"),
        ),
        "1 definition",
        count.as_str(),
    )
    .with_span(Some(span))
    .with_context(ctx!("arg" => arg, "count" => count))
}

pub(super) fn append_not_allowed(decl: &Declaration, span: Span) -> Diagnostic {
    let arg = decl.display_name();
    Diagnostic::new(
        codes::APPEND_NOT_ALLOWED,
        render_problem(
            codes::APPEND_NOT_ALLOWED,
            "default",
            &[("arg", arg.as_str())],
            format!("cannot append repeated definitions of non-array {arg}"),
        ),
        "drop, overwrite or throw",
        "append",
    )
    .with_span(Some(span))
    .with_context(ctx!("arg" => arg))
}

/// `position` is the 1-based argument number for array elements.
pub(super) fn invalid_value(
    decl: &Declaration,
    type_name: &str,
    raw: &str,
    reason: String,
    position: Option<usize>,
    span: Option<Span>,
) -> Diagnostic {
    let arg = decl.display_name();
    let (problem, mut context): (String, BTreeMap<String, String>) = match position {
        Some(position) => {
            let position = position.to_string();
            (
                render_problem(
                    codes::INVALID_VALUE,
                    "element",
                    &[("arg", arg.as_str()), ("position", position.as_str())],
                    format!("invalid value for argument number {position} of {arg}"),
                ),
                ctx!("position" => position),
            )
        }
        None => (
            render_problem(
                codes::INVALID_VALUE,
                "single",
                &[("arg", arg.as_str())],
                format!("invalid value for {arg}"),
            ),
            BTreeMap::new(),
        ),
    };
    context.insert("arg".to_string(), arg);
    context.insert("type".to_string(), type_name.to_string());
    context.insert("reason".to_string(), reason);
    Diagnostic::new(codes::INVALID_VALUE, problem, type_name, raw)
        .with_span(span)
        .with_context(context)
}

pub(super) fn too_many_values(decl: &Declaration, excess: &[String], span: Option<Span>) -> Diagnostic {
    let arg = decl.display_name();
    let excess = excess.join(" ");
    Diagnostic::new(
        codes::TOO_MANY_VALUES,
        render_problem(
            codes::TOO_MANY_VALUES,
            "default",
            &[("arg", arg.as_str())],
            format!("too many values for {arg}"),
        ),
        "1 value",
        excess.as_str(),
    )
    .with_span(span)
    .with_context(ctx!("arg" => arg, "excess" => excess))
}

pub(super) fn unknown_type(decl: &Declaration, type_name: &str) -> Diagnostic {
    let arg = decl.display_name();
    Diagnostic::new(
        codes::UNKNOWN_TYPE,
        render_problem(
            codes::UNKNOWN_TYPE,
            "default",
            &[("type", type_name)],
            format!("no coercer registered for type {type_name}"),
        ),
        "a registered type",
        type_name,
    )
    .with_context(ctx!("arg" => arg, "type" => type_name))
}

pub(super) fn unrecognized_argument(raw: &str, suggestion: Option<String>, span: Span) -> Diagnostic {
    let mut context: BTreeMap<String, String> = ctx!("arg" => raw);
    if let Some(suggestion) = suggestion {
        context.insert("suggestion".to_string(), suggestion);
    }
    Diagnostic::new(
        codes::UNRECOGNIZED_ARGUMENT,
        render_problem(
            codes::UNRECOGNIZED_ARGUMENT,
            "default",
            &[("arg", raw)],
            format!("unrecognized argument {raw}"),
        ),
        "a declared flag",
        raw,
    )
    .with_span(Some(span))
    .with_context(context)
}

pub(super) fn deprecated_command(command: &ResolvedCommand, policy: DeprecatedPolicy) -> Diagnostic {
    let path = command.display_path();
    match policy {
        DeprecatedPolicy::UnknownCommand => Diagnostic::new(
            codes::UNKNOWN_COMMAND,
            render_problem(
                codes::UNKNOWN_COMMAND,
                "default",
                &[("command", path.as_str())],
                format!("unknown command {path}"),
            ),
            "a known command",
            path.as_str(),
        )
        .with_span(Some(command.span))
        .with_context(ctx!("command" => path)),
        DeprecatedPolicy::Error => {
            let mut context: BTreeMap<String, String> = ctx!("command" => path.as_str());
            let problem = match &command.deprecation_message {
                Some(message) => {
                    context.insert("message".to_string(), message.clone());
                    render_problem(
                        codes::DEPRECATED_COMMAND,
                        "withMessage",
                        &[("command", path.as_str()), ("message", message.as_str())],
                        format!("command {path} is deprecated: {message}"),
                    )
                }
                None => render_problem(
                    codes::DEPRECATED_COMMAND,
                    "default",
                    &[("command", path.as_str())],
                    format!("command {path} is deprecated"),
                ),
            };
            Diagnostic::new(codes::DEPRECATED_COMMAND, problem, "a supported command", path.as_str())
                .with_span(Some(command.span))
                .with_context(context)
        }
    }
}

pub(super) fn missing_command(first: Option<&PositionalOccurrence>) -> Diagnostic {
    Diagnostic::new(
        codes::MISSING_COMMAND,
        render_problem(
            codes::MISSING_COMMAND,
            "default",
            &[],
            "no command provided".to_string(),
        ),
        "a command",
        first.map_or("nothing", |p| p.raw.as_str()),
    )
    .with_span(first.map(|p| p.span))
}
