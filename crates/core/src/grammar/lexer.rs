use argot_diagnostics::{Diagnostic, Span, codes, render_problem};
use serde::Serialize;

/// Classification of a lexer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TokKind {
    /// A single `-`.
    FlagDenotion,
    /// An unquoted run directly following a denotion.
    Ident,
    /// A quoted or unquoted literal.
    Value,
}

impl std::fmt::Display for TokKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokKind::FlagDenotion => write!(f, "flag denotion"),
            TokKind::Ident => write!(f, "identifier"),
            TokKind::Value => write!(f, "value"),
        }
    }
}

/// A token that borrows its text from the source input.
///
/// `start`/`end` cover the token as written, quotes included, while `text`
/// is the content with any surrounding quotes removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token<'a> {
    /// The classification of this token.
    pub kind: TokKind,
    /// Token content.
    pub text: &'a str,
    /// Byte offset of the first character.
    pub start: usize,
    /// Byte offset one past the last character.
    pub end: usize,
}

impl Token<'_> {
    /// Source span of the token.
    pub fn span(&self) -> Span {
        Span::new(self.start, self.end)
    }
}

/// Errors raised before any token is produced.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenizeError {
    /// Byte input that is not UTF-8 text.
    #[error("input is not valid UTF-8 (valid up to byte {valid_up_to})")]
    InvalidUtf8 {
        /// Length of the longest valid prefix.
        valid_up_to: usize,
    },
}

impl TokenizeError {
    /// Convert into a diagnostic carrying the problem/expected/received triple.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            TokenizeError::InvalidUtf8 { valid_up_to } => Diagnostic::new(
                codes::INVALID_INPUT,
                render_problem(
                    codes::INVALID_INPUT,
                    "default",
                    &[],
                    "input is not a valid string".to_string(),
                ),
                "a UTF-8 string",
                format!("invalid bytes at offset {valid_up_to}"),
            )
            .with_span(Some(Span::empty(*valid_up_to)))
            .with_context(ctx!("offset" => valid_up_to.to_string())),
        }
    }
}

/// Tokenize an input string.
///
/// Single left-to-right pass: `-` becomes a [`TokKind::FlagDenotion`] and, when
/// followed by anything other than `-` or whitespace, the following run of
/// non-whitespace becomes one [`TokKind::Ident`]. Whitespace separates tokens
/// and is never emitted. A `"` or `'` starts a quoted [`TokKind::Value`] that
/// runs verbatim to the matching quote; an unterminated quote runs to the end
/// of input. Anything else is a run of non-whitespace [`TokKind::Value`].
pub fn tokenize(input: &str) -> Vec<Token<'_>> {
    let mut toks = Vec::new();
    let mut chars = input.char_indices().peekable();
    while let Some((start, c)) = chars.next() {
        if c.is_whitespace() {
            continue;
        }
        if c == '-' {
            toks.push(Token {
                kind: TokKind::FlagDenotion,
                text: &input[start..start + 1],
                start,
                end: start + 1,
            });
            let ident_start = start + 1;
            if chars
                .peek()
                .is_some_and(|&(_, next)| next != '-' && !next.is_whitespace())
            {
                let end = run_end(input, &mut chars);
                toks.push(Token {
                    kind: TokKind::Ident,
                    text: &input[ident_start..end],
                    start: ident_start,
                    end,
                });
            }
        } else if c == '"' || c == '\'' {
            let content_start = start + 1;
            let mut content_end = input.len();
            let mut end = input.len();
            for (i, ch) in chars.by_ref() {
                if ch == c {
                    content_end = i;
                    end = i + 1;
                    break;
                }
            }
            toks.push(Token {
                kind: TokKind::Value,
                text: &input[content_start..content_end],
                start,
                end,
            });
        } else {
            let end = run_end(input, &mut chars);
            toks.push(Token {
                kind: TokKind::Value,
                text: &input[start..end],
                start,
                end,
            });
        }
    }
    toks
}

/// Tokenize byte input, rejecting anything that is not UTF-8.
pub fn tokenize_bytes(input: &[u8]) -> Result<Vec<Token<'_>>, TokenizeError> {
    let text = std::str::from_utf8(input).map_err(|e| TokenizeError::InvalidUtf8 {
        valid_up_to: e.valid_up_to(),
    })?;
    Ok(tokenize(text))
}

/// Tokenize an already split argument vector.
///
/// Elements starting with `-` are read as flags: each leading `-` is a
/// denotion and the remainder is one identifier, whitespace included. Every
/// other element is a single value taken verbatim, with no quote handling.
/// Offsets are those the tokens would have in the elements joined by single
/// spaces.
pub fn tokenize_args<S: AsRef<str>>(args: &[S]) -> Vec<Token<'_>> {
    let mut toks = Vec::new();
    let mut offset = 0usize;
    for arg in args {
        let arg = arg.as_ref();
        if arg.starts_with('-') {
            let dashes = arg.len() - arg.trim_start_matches('-').len();
            for i in 0..dashes {
                toks.push(Token {
                    kind: TokKind::FlagDenotion,
                    text: &arg[i..=i],
                    start: offset + i,
                    end: offset + i + 1,
                });
            }
            if dashes < arg.len() {
                toks.push(Token {
                    kind: TokKind::Ident,
                    text: &arg[dashes..],
                    start: offset + dashes,
                    end: offset + arg.len(),
                });
            }
        } else {
            toks.push(Token {
                kind: TokKind::Value,
                text: arg,
                start: offset,
                end: offset + arg.len(),
            });
        }
        offset += arg.len() + 1;
    }
    toks
}

/// Consume non-whitespace characters, returning the byte offset where the run ends.
fn run_end(
    input: &str,
    chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>,
) -> usize {
    while let Some(&(i, ch)) = chars.peek() {
        if ch.is_whitespace() {
            return i;
        }
        chars.next();
    }
    input.len()
}
