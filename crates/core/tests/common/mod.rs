//! Shared test helpers for `argot_core` integration tests.

#![allow(unreachable_pub)]

use argot_core::schema::{AliasKind, CommandNode, Declaration, Value};
use argot_core::{Diagnostic, Error, Resolution, ResolvedValue};

// ─── Schema fixtures ─────────────────────────────────────────────────────────

/// Root with sibling commands `clone` and `add`, each taking string positionals.
#[allow(dead_code)]
pub fn clone_add_schema() -> CommandNode {
    let mut clone = CommandNode::new("clone");
    clone
        .add_declaration(Declaration::positional("url"))
        .unwrap();
    let mut add = CommandNode::new("add");
    add.add_declaration(Declaration::positional("paths").with_array(true))
        .unwrap();
    let mut root = CommandNode::new("vcs");
    root.add_declaration(
        Declaration::positional("args")
            .with_array(true)
            .with_optional(true),
    )
    .unwrap();
    root.add_subcommand(clone).unwrap();
    root.add_subcommand(add).unwrap();
    root
}

/// Root declaring only the given flags.
#[allow(dead_code)]
pub fn root_with(decls: impl IntoIterator<Item = Declaration>) -> CommandNode {
    let mut root = CommandNode::new("app");
    for decl in decls {
        root.add_declaration(decl).unwrap();
    }
    root
}

/// A boolean flag `--verbose` / `-v` that is true when written bare.
#[allow(dead_code)]
pub fn verbose_flag() -> Declaration {
    Declaration::flag("verbose")
        .with_alias(AliasKind::Short, "v")
        .with_types(["boolean"])
        .with_optional(true)
        .with_specified_default(true)
}

// ─── Result helpers ──────────────────────────────────────────────────────────

/// The single value of `key`, panicking if absent or multi.
#[allow(dead_code)]
pub fn single<'a>(resolution: &'a Resolution, key: &str) -> &'a Value {
    resolution
        .get(key)
        .and_then(ResolvedValue::as_single)
        .unwrap_or_else(|| panic!("expected a single value for {key}"))
}

/// The elements of `key`, panicking if absent or single.
#[allow(dead_code)]
pub fn multi<'a>(resolution: &'a Resolution, key: &str) -> &'a [Value] {
    resolution
        .get(key)
        .and_then(ResolvedValue::as_multi)
        .unwrap_or_else(|| panic!("expected multiple values for {key}"))
}

/// Diagnostics of a coercion error, panicking on any other outcome.
#[allow(dead_code)]
pub fn coercion_diags(result: Result<Resolution, Error>) -> Vec<Diagnostic> {
    match result {
        Err(Error::Coercion(diags)) => diags,
        other => panic!("expected a coercion error, got {other:?}"),
    }
}

/// Diagnostic codes, in order.
#[allow(dead_code)]
pub fn codes_of(diags: &[Diagnostic]) -> Vec<String> {
    diags.iter().map(|d| d.id.to_string()).collect()
}

/// Numbers as values.
#[allow(dead_code)]
pub fn numbers(ns: &[f64]) -> Vec<Value> {
    ns.iter().copied().map(Value::Number).collect()
}
