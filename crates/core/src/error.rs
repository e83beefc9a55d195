use crate::grammar::lexer::TokenizeError;
use crate::grammar::parser::ParseError;
use crate::resolver::BoxError;
use argot_diagnostics::{Diagnostic, codes, render_problem};

/// Why an input could not be interpreted.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The input could not be read as text.
    #[error(transparent)]
    Tokenize(#[from] TokenizeError),

    /// The token stream is malformed.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// A declaration could not be satisfied. Holds every failure of the
    /// declaration that stopped the pass, or every unrecognized flag.
    #[error("{}", join_diagnostics(.0))]
    Coercion(Vec<Diagnostic>),

    /// The command is deprecated, missing, or the schema is inconsistent.
    #[error("{0}")]
    Command(Diagnostic),

    /// A resolver failed.
    #[error("resolver '{id}' failed for '{key}': {source}")]
    Resolver {
        /// The failing resolver's id.
        id: String,
        /// The key being resolved.
        key: String,
        /// The resolver's error.
        #[source]
        source: BoxError,
    },
}

fn join_diagnostics(diags: &[Diagnostic]) -> String {
    diags
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl Error {
    /// Every diagnostic this error carries.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        match self {
            Error::Tokenize(e) => vec![e.to_diagnostic()],
            Error::Parse(e) => vec![e.to_diagnostic()],
            Error::Coercion(diags) => diags.clone(),
            Error::Command(diag) => vec![diag.clone()],
            Error::Resolver { id, key, source } => {
                let reason = source.to_string();
                vec![
                    Diagnostic::new(
                        codes::RESOLVER_FAILED,
                        render_problem(
                            codes::RESOLVER_FAILED,
                            "default",
                            &[("resolver", id.as_str()), ("arg", key.as_str())],
                            format!("resolver {id} failed for {key}"),
                        ),
                        "a resolver answer",
                        reason.as_str(),
                    )
                    .with_context(ctx!("resolver" => id.as_str(), "arg" => key.as_str(), "reason" => reason)),
                ]
            }
        }
    }
}

impl From<argot_schema::SchemaError> for Error {
    fn from(e: argot_schema::SchemaError) -> Self {
        Error::Command(e.to_diagnostic())
    }
}
