/// Parse-tree types: flag and positional occurrences, resolved command.
pub mod ast;
/// Tokenizer — splits raw input into borrowed tokens.
pub mod lexer;
/// Structural parser — turns tokens into a [`ast::ParsedArguments`] skeleton.
pub mod parser;
