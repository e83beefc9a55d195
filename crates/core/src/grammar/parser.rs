use super::{
    ast::{FlagForm, FlagOccurrence, ParsedArguments, PositionalOccurrence, ResolvedCommand},
    lexer::{TokKind, Token},
};
use argot_diagnostics::{Diagnostic, Span, codes, render_problem};
use argot_schema::{CommandNode, ParserOptions};
use tracing::debug;

/// Errors raised while structuring a token stream.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// Input ended where another token was required.
    #[error("ran out of tokens, expected {expected}")]
    OutOfTokens {
        /// What the parser was looking for.
        expected: &'static str,
        /// Byte offset of the end of input.
        offset: usize,
    },
    /// A token of the wrong kind appeared.
    #[error("unexpected {found} token '{text}', expected {expected}")]
    UnexpectedToken {
        /// What the parser was looking for.
        expected: &'static str,
        /// Kind of the token found instead.
        found: TokKind,
        /// Text of the token found instead.
        text: String,
        /// Source span of the token found instead.
        span: Span,
    },
}

impl ParseError {
    /// Convert into a diagnostic carrying the problem/expected/received triple.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            ParseError::OutOfTokens { expected, offset } => Diagnostic::new(
                codes::PARSER_OUT_OF_TOKENS,
                render_problem(
                    codes::PARSER_OUT_OF_TOKENS,
                    "default",
                    &[],
                    "ran out of tokens".to_string(),
                ),
                *expected,
                "end of input",
            )
            .with_span(Some(Span::empty(*offset)))
            .with_context(ctx!("expected" => *expected)),
            ParseError::UnexpectedToken {
                expected,
                found,
                text,
                span,
            } => {
                let found = found.to_string();
                Diagnostic::new(
                    codes::PARSER_UNEXPECTED_TOKEN,
                    render_problem(
                        codes::PARSER_UNEXPECTED_TOKEN,
                        "default",
                        &[("found", found.as_str())],
                        format!("unexpected {found} token"),
                    ),
                    *expected,
                    text.as_str(),
                )
                .with_span(Some(*span))
                .with_context(ctx!("expected" => *expected, "found" => found))
            }
        }
    }
}

/// Structure a token stream against a command tree.
///
/// A leading run of bare tokens naming commands is matched greedily, starting
/// at `root`'s subcommands and descending one level per token. The first bare
/// token that does not match becomes positional 0, and bare tokens up to the
/// first flag become positionals at increasing indices. Every flag collects
/// the values that follow it up to the next denotion.
pub fn parse(
    tokens: &[Token<'_>],
    root: &CommandNode,
    options: &ParserOptions,
) -> Result<ParsedArguments, ParseError> {
    Parser::new(tokens, options).parse(root)
}

struct Parser<'t, 'a> {
    toks: &'t [Token<'a>],
    pos: usize,
    inline_values: bool,
    ordinal: usize,
    out: ParsedArguments,
}

impl<'t, 'a> Parser<'t, 'a> {
    fn new(toks: &'t [Token<'a>], options: &ParserOptions) -> Self {
        Self {
            toks,
            pos: 0,
            inline_values: options.inline_values,
            ordinal: 0,
            out: ParsedArguments::default(),
        }
    }

    // ── Token navigation ────────────────────────────────────────────────

    fn peek(&self) -> Option<&'t Token<'a>> {
        self.toks.get(self.pos)
    }

    fn end_offset(&self) -> usize {
        self.toks.last().map_or(0, |t| t.end)
    }

    fn next_ordinal(&mut self) -> usize {
        let ordinal = self.ordinal;
        self.ordinal += 1;
        ordinal
    }

    // ── Main parse loop ─────────────────────────────────────────────────

    fn parse(mut self, root: &CommandNode) -> Result<ParsedArguments, ParseError> {
        self.parse_command(root);
        while let Some(tok) = self.peek() {
            match tok.kind {
                TokKind::Value => self.parse_positional(tok),
                TokKind::FlagDenotion => self.parse_flag()?,
                TokKind::Ident => {
                    return Err(ParseError::UnexpectedToken {
                        expected: "a flag or value",
                        found: tok.kind,
                        text: tok.text.to_string(),
                        span: tok.span(),
                    });
                }
            }
        }
        debug!(
            command = ?self.out.command.as_ref().map(|c| c.display_path()),
            flags = self.out.flags.len(),
            positionals = self.out.positionals.len(),
            "parsed input structure"
        );
        Ok(self.out)
    }

    fn parse_command(&mut self, root: &CommandNode) {
        let mut node = root;
        let mut path = Vec::new();
        let mut span: Option<Span> = None;
        while let Some(tok) = self.peek() {
            if tok.kind != TokKind::Value {
                break;
            }
            let Some(child) = node.subcommand(tok.text) else {
                break;
            };
            path.push(child.name().to_string());
            span = Some(span.map_or(tok.span(), |s| s.cover(tok.span())));
            node = child.as_ref();
            self.pos += 1;
        }
        if let Some(span) = span {
            self.out.command = Some(ResolvedCommand {
                path,
                deprecated: node.is_deprecated(),
                deprecation_message: node.deprecation_message().map(str::to_string),
                span,
            });
        }
    }

    fn parse_positional(&mut self, tok: &Token<'a>) {
        self.pos += 1;
        let index = self.out.positionals.len();
        let ordinal = self.next_ordinal();
        self.out.positionals.insert(
            index,
            PositionalOccurrence {
                raw: tok.text.to_string(),
                values: vec![tok.text.to_string()],
                ordinal,
                span: tok.span(),
            },
        );
    }

    fn parse_flag(&mut self) -> Result<(), ParseError> {
        let toks = self.toks;
        let first = &toks[self.pos];
        self.pos += 1;
        let long = matches!(self.peek(), Some(t) if t.kind == TokKind::FlagDenotion);
        if long {
            self.pos += 1;
        }
        let ident = self.expect_ident()?;
        let values = self.collect_values();
        let span = values
            .last()
            .map_or(first.span().cover(ident.span()), |v| first.span().cover(v.span()));

        if long {
            let (key, inline) = match ident.text.split_once('=') {
                Some((key, value)) if self.inline_values && !key.is_empty() => (key, Some(value)),
                _ => (ident.text, None),
            };
            let mut rest = values.as_slice();
            let mut collected = Vec::with_capacity(values.len() + 1);
            if let Some(inline) = inline {
                let (value, consumed) = join_inline_value(inline, ident, rest);
                collected.push(value);
                rest = &rest[consumed..];
            }
            collected.extend(rest.iter().map(|v| v.text.to_string()));
            self.push_flag(key, format!("--{key}"), FlagForm::Long, collected, span);
            return Ok(());
        }

        let mut members: Vec<char> = ident.text.chars().collect();
        if members.len() == 1 {
            let values = values.iter().map(|v| v.text.to_string()).collect();
            self.push_flag(ident.text, format!("-{}", ident.text), FlagForm::Short, values, span);
            return Ok(());
        }

        // Values after a group belong to its last member, as in `-xvf archive.tar`.
        let trailing = if values.is_empty() { None } else { members.pop() };
        let group_span = first.span().cover(ident.span());
        self.push_flag(
            ident.text,
            format!("-{}", ident.text),
            FlagForm::Group { members },
            Vec::new(),
            group_span,
        );
        if let Some(last) = trailing {
            let key = last.to_string();
            let values = values.iter().map(|v| v.text.to_string()).collect();
            self.push_flag(&key, format!("-{key}"), FlagForm::Short, values, span);
        }
        Ok(())
    }

    fn expect_ident(&mut self) -> Result<&'t Token<'a>, ParseError> {
        const EXPECTED: &str = "a flag identifier";
        match self.peek() {
            None => Err(ParseError::OutOfTokens {
                expected: EXPECTED,
                offset: self.end_offset(),
            }),
            Some(tok) if tok.kind == TokKind::Ident => {
                self.pos += 1;
                Ok(tok)
            }
            Some(tok) => Err(ParseError::UnexpectedToken {
                expected: EXPECTED,
                found: tok.kind,
                text: tok.text.to_string(),
                span: tok.span(),
            }),
        }
    }

    fn collect_values(&mut self) -> Vec<&'t Token<'a>> {
        let mut values = Vec::new();
        while let Some(tok) = self.peek() {
            if tok.kind != TokKind::Value {
                break;
            }
            values.push(tok);
            self.pos += 1;
        }
        values
    }

    fn push_flag(
        &mut self,
        key: &str,
        raw: String,
        form: FlagForm,
        values: Vec<String>,
        span: Span,
    ) {
        let ordinal = self.next_ordinal();
        self.out
            .flags
            .entry(key.to_string())
            .or_default()
            .push(FlagOccurrence {
                raw,
                values,
                form,
                ordinal,
                span,
            });
    }
}

/// Rebuild a quoted inline value such as `--name="a b"`.
///
/// The tokenizer only recognizes quotes at the start of a token, so the quoted
/// text arrives split at whitespace: the opening part inside the identifier
/// and the rest as values. Returns the unquoted value and how many of `values`
/// it consumed. An unterminated quote takes every remaining value.
fn join_inline_value(inline: &str, ident: &Token<'_>, values: &[&Token<'_>]) -> (String, usize) {
    let Some(quote) = inline.chars().next().filter(|c| matches!(*c, '"' | '\'')) else {
        return (inline.to_string(), 0);
    };
    let body = &inline[1..];
    if let Some(unquoted) = body.strip_suffix(quote) {
        return (unquoted.to_string(), 0);
    }
    let mut joined = body.to_string();
    let mut prev_end = ident.end;
    for (i, tok) in values.iter().enumerate() {
        joined.push_str(&" ".repeat(tok.start.saturating_sub(prev_end).max(1)));
        prev_end = tok.end;
        match tok.text.strip_suffix(quote) {
            Some(head) => {
                joined.push_str(head);
                return (joined, i + 1);
            }
            None => joined.push_str(tok.text),
        }
    }
    (joined, values.len())
}
