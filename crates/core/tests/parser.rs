//! Tests for the structural parser.
//!
//! Covers: command descent, positional fallback, flag forms, value
//! collection, inline values, short-flag groups and parse errors.

mod common;

use argot_core::grammar::ast::{FlagForm, ParsedArguments};
use argot_core::grammar::lexer::{TokKind, tokenize};
use argot_core::grammar::parser::{ParseError, parse};
use argot_core::schema::{CommandNode, ParserOptions};
use argot_core::{Span, codes};
use common::clone_add_schema;

fn parse_str(input: &str, root: &CommandNode) -> Result<ParsedArguments, ParseError> {
    parse(&tokenize(input), root, &ParserOptions::default())
}

fn positional_texts(parsed: &ParsedArguments) -> Vec<&str> {
    parsed.positionals.values().map(|p| p.raw.as_str()).collect()
}

// ─── Commands ────────────────────────────────────────────────────────────────

#[test]
fn sibling_command_resolves_with_positionals() {
    let root = clone_add_schema();
    let parsed = parse_str("add file1 file2", &root).unwrap();
    assert_eq!(parsed.command_path(), ["add".to_string()]);
    assert_eq!(positional_texts(&parsed), vec!["file1", "file2"]);
    assert_eq!(parsed.positionals[&0].values, vec!["file1".to_string()]);
}

#[test]
fn unknown_first_word_becomes_positional_zero() {
    let root = clone_add_schema();
    let parsed = parse_str("unknown file1", &root).unwrap();
    assert!(parsed.command.is_none());
    assert_eq!(parsed.positionals[&0].raw, "unknown");
    assert_eq!(parsed.positionals[&1].raw, "file1");
}

#[test]
fn descent_is_greedy_and_keeps_leftover_word() {
    let mut remote = CommandNode::new("remote");
    remote.add_subcommand(CommandNode::new("add")).unwrap();
    let mut root = CommandNode::new("vcs");
    root.add_subcommand(remote).unwrap();

    let parsed = parse_str("remote add origin", &root).unwrap();
    assert_eq!(parsed.command_path(), ["remote".to_string(), "add".to_string()]);
    assert_eq!(positional_texts(&parsed), vec!["origin"]);

    let parsed = parse_str("remote rename origin", &root).unwrap();
    assert_eq!(parsed.command_path(), ["remote".to_string()]);
    assert_eq!(positional_texts(&parsed), vec!["rename", "origin"]);
}

#[test]
fn command_alias_resolves_to_canonical_name() {
    let mut root = CommandNode::new("vcs");
    root.add_subcommand(CommandNode::new("remove").with_alias("rm"))
        .unwrap();
    let parsed = parse_str("rm x", &root).unwrap();
    assert_eq!(parsed.command_path(), ["remove".to_string()]);
    assert_eq!(parsed.command.unwrap().span, Span::new(0, 2));
}

#[test]
fn deprecation_of_deepest_command_is_recorded() {
    let mut root = CommandNode::new("vcs");
    root.add_subcommand(
        CommandNode::new("checkout").with_deprecation(Some("use switch".to_string())),
    )
    .unwrap();
    let command = parse_str("checkout main", &root).unwrap().command.unwrap();
    assert!(command.deprecated);
    assert_eq!(command.deprecation_message.as_deref(), Some("use switch"));
}

#[test]
fn quoted_word_can_name_a_command() {
    let root = clone_add_schema();
    let parsed = parse_str("'clone' url", &root).unwrap();
    assert_eq!(parsed.command_path(), ["clone".to_string()]);
}

// ─── Flags ───────────────────────────────────────────────────────────────────

#[test]
fn long_flag_collects_values_until_next_denotion() {
    let root = CommandNode::new("app");
    let parsed = parse_str("--n 1 2 3 --name x", &root).unwrap();
    assert_eq!(parsed.flags["n"][0].values, vec!["1", "2", "3"]);
    assert_eq!(parsed.flags["n"][0].form, FlagForm::Long);
    assert_eq!(parsed.flags["n"][0].raw, "--n");
    assert_eq!(parsed.flags["name"][0].values, vec!["x"]);
}

#[test]
fn words_after_a_flag_are_its_values_not_positionals() {
    let root = clone_add_schema();
    let parsed = parse_str("add a --force b", &root).unwrap();
    assert_eq!(positional_texts(&parsed), vec!["a"]);
    assert_eq!(parsed.flags["force"][0].values, vec!["b"]);
}

#[test]
fn bare_flag_has_no_values() {
    let parsed = parse_str("--verbose", &CommandNode::new("app")).unwrap();
    assert!(parsed.flags["verbose"][0].values.is_empty());
}

#[test]
fn repeated_flags_are_preserved_in_order() {
    let parsed = parse_str("--tag a --tag b -t c", &CommandNode::new("app")).unwrap();
    let tags = &parsed.flags["tag"];
    assert_eq!(tags.len(), 2);
    assert_eq!(tags[0].values, vec!["a"]);
    assert_eq!(tags[1].values, vec!["b"]);
    assert!(tags[0].ordinal < tags[1].ordinal);
    assert_eq!(parsed.flags["t"][0].form, FlagForm::Short);
}

#[test]
fn inline_value_splits_on_first_equals() {
    let parsed = parse_str("--define=a=b c", &CommandNode::new("app")).unwrap();
    assert_eq!(parsed.flags["define"][0].values, vec!["a=b", "c"]);
}

#[test]
fn double_quoted_inline_value_keeps_its_whitespace() {
    let parsed = parse_str(r#"--name="a b" rest"#, &CommandNode::new("app")).unwrap();
    let flag = &parsed.flags["name"][0];
    assert_eq!(flag.values, vec!["a b", "rest"]);
    assert_eq!(flag.span, Span::new(0, 17));
}

#[test]
fn single_quoted_inline_value_is_unquoted() {
    let parsed = parse_str("--name='x'", &CommandNode::new("app")).unwrap();
    assert_eq!(parsed.flags["name"][0].values, vec!["x"]);
}

#[test]
fn unterminated_inline_quote_takes_remaining_values() {
    let parsed = parse_str("--name='a b c --other", &CommandNode::new("app")).unwrap();
    assert_eq!(parsed.flags["name"][0].values, vec!["a b c"]);
    assert!(parsed.flags.contains_key("other"));
}

#[test]
fn inline_values_can_be_disabled() {
    let options = ParserOptions {
        inline_values: false,
        ..ParserOptions::default()
    };
    let parsed = parse(&tokenize("--define=a"), &CommandNode::new("app"), &options).unwrap();
    assert!(parsed.flags.contains_key("define=a"));
}

#[test]
fn short_group_records_members() {
    let parsed = parse_str("-abc", &CommandNode::new("app")).unwrap();
    let group = &parsed.flags["abc"][0];
    assert_eq!(group.members(), ['a', 'b', 'c']);
    assert!(group.values.is_empty());
    assert_eq!(group.raw, "-abc");
}

#[test]
fn values_after_group_go_to_last_member() {
    let parsed = parse_str("-xvf archive.tar", &CommandNode::new("app")).unwrap();
    assert_eq!(parsed.flags["xvf"][0].members(), ['x', 'v']);
    let last = &parsed.flags["f"][0];
    assert_eq!(last.form, FlagForm::Short);
    assert_eq!(last.values, vec!["archive.tar"]);
}

#[test]
fn flag_span_covers_values() {
    let parsed = parse_str("--n 1 22", &CommandNode::new("app")).unwrap();
    assert_eq!(parsed.flags["n"][0].span, Span::new(0, 8));
}

// ─── Errors ──────────────────────────────────────────────────────────────────

#[test]
fn trailing_denotion_runs_out_of_tokens() {
    let err = parse_str("--n 1 --", &CommandNode::new("app")).unwrap_err();
    assert!(matches!(err, ParseError::OutOfTokens { offset: 8, .. }));
    let diag = err.to_diagnostic();
    assert_eq!(diag.id, codes::PARSER_OUT_OF_TOKENS);
    assert_eq!(
        diag.to_string(),
        "ran out of tokens, expected 'a flag identifier' received 'end of input'"
    );
}

#[test]
fn value_after_lone_dash_is_unexpected() {
    let err = parse_str("- value", &CommandNode::new("app")).unwrap_err();
    match &err {
        ParseError::UnexpectedToken { found, text, .. } => {
            assert_eq!(*found, TokKind::Value);
            assert_eq!(text, "value");
        }
        other => panic!("unexpected error {other:?}"),
    }
    let diag = err.to_diagnostic();
    assert_eq!(diag.id, codes::PARSER_UNEXPECTED_TOKEN);
    assert_eq!(diag.problem, "unexpected value token");
    assert_eq!(diag.span, Some(Span::new(2, 7)));
}

#[test]
fn triple_dash_is_unexpected() {
    let err = parse_str("---x", &CommandNode::new("app")).unwrap_err();
    assert!(matches!(
        err,
        ParseError::UnexpectedToken {
            found: TokKind::FlagDenotion,
            ..
        }
    ));
}
