//! argot core library.
//!
//! Interprets command-line input against a declarative schema: the input is
//! tokenized, structured into a command path plus flag and positional
//! occurrences, then resolved and coerced into typed values. The main entry
//! point is [`Interpreter`]; the stages are also available on their own as
//! [`tokenize`], [`parse`] and [`coerce`].

#![warn(missing_docs)]

/// Shorthand for building a `BTreeMap<String, String>` context from key-value pairs.
macro_rules! ctx {
    ($($k:expr => $v:expr),+ $(,)?) => {
        std::collections::BTreeMap::from([$(($k.into(), $v.into())),+])
    };
}

/// Type coercers and the coercer registry.
pub mod coerce;
/// Interpretation errors.
pub mod error;
/// Tokenizer, parse-tree types and structural parser.
pub mod grammar;
/// Interpreter facade running the whole pipeline.
pub mod interpreter;
/// Resolution and coercion engine.
pub mod resolve;
/// Resolver capability and built-in resolvers.
pub mod resolver;

// ── Convenience re-exports ──────────────────────────────────────────────────

// Pipeline stages
pub use grammar::lexer::{TokKind, Token, TokenizeError, tokenize, tokenize_args, tokenize_bytes};
pub use grammar::parser::{ParseError, parse};
pub use resolve::{Resolution, ResolvedValue, ValueSource, coerce};

// Parse tree
pub use grammar::ast::{FlagForm, FlagOccurrence, ParsedArguments, PositionalOccurrence, ResolvedCommand};

// Capabilities
pub use coerce::{Coercer, CoercerRegistry};
pub use resolver::{BoxError, EnvResolver, Resolver, StaticResolver};

// Facade and errors
pub use error::Error;
pub use interpreter::Interpreter;

// Diagnostics and schema (re-exported from their crates)
pub use argot_diagnostics::{Diagnostic, Span, codes};
pub use argot_schema as schema;
