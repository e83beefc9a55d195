use crate::coerce::{Coercer, CoercerRegistry};
use crate::error::Error;
use crate::grammar::lexer::{Token, tokenize, tokenize_args, tokenize_bytes};
use crate::grammar::parser::parse;
use crate::resolve::{Resolution, coerce};
use crate::resolver::Resolver;
use argot_schema::{CommandNode, ParserOptions, SchemaError, SchemaFile};
use std::sync::Arc;
use tracing::debug;

/// Runs the whole pipeline against one schema.
///
/// Cheap to clone; the schema is shared and never mutated.
#[derive(Clone)]
pub struct Interpreter {
    schema: Arc<CommandNode>,
    options: ParserOptions,
    resolvers: Vec<Arc<dyn Resolver>>,
    coercers: CoercerRegistry,
}

impl std::fmt::Debug for Interpreter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Interpreter")
            .field("schema", &self.schema.name())
            .field("options", &self.options)
            .field(
                "resolvers",
                &self.resolvers.iter().map(|r| r.id()).collect::<Vec<_>>(),
            )
            .field("coercers", &self.coercers)
            .finish()
    }
}

impl Interpreter {
    /// Interpret against `schema` with default options and the built-in coercers.
    pub fn new(schema: CommandNode) -> Self {
        Self::from_shared(Arc::new(schema))
    }

    /// Interpret against an already shared schema.
    pub fn from_shared(schema: Arc<CommandNode>) -> Self {
        Self {
            schema,
            options: ParserOptions::default(),
            resolvers: Vec::new(),
            coercers: CoercerRegistry::default(),
        }
    }

    /// Build the schema described by a document, using its options.
    pub fn from_schema_file(file: SchemaFile) -> Result<Self, SchemaError> {
        let (root, options) = file.into_parts()?;
        Ok(Self::new(root).with_options(options))
    }

    /// Replace the options.
    pub fn with_options(mut self, options: ParserOptions) -> Self {
        self.options = options;
        self
    }

    /// Append a resolver to the chain.
    pub fn with_resolver(mut self, resolver: Arc<dyn Resolver>) -> Self {
        self.resolvers.push(resolver);
        self
    }

    /// Register a coercer, replacing any with the same type name.
    pub fn with_coercer(mut self, coercer: Arc<dyn Coercer>) -> Self {
        self.coercers.register(coercer);
        self
    }

    /// The root command.
    pub fn schema(&self) -> &CommandNode {
        &self.schema
    }

    /// Current options.
    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    /// Interpret an input string.
    pub async fn interpret(&self, input: &str) -> Result<Resolution, Error> {
        self.run(&tokenize(input)).await
    }

    /// Interpret byte input, which must be UTF-8.
    pub async fn interpret_bytes(&self, input: &[u8]) -> Result<Resolution, Error> {
        self.run(&tokenize_bytes(input)?).await
    }

    /// Interpret an already split argument vector.
    pub async fn interpret_args<S: AsRef<str> + Sync>(&self, args: &[S]) -> Result<Resolution, Error> {
        self.run(&tokenize_args(args)).await
    }

    /// Interpret `input`, or print `usage` and every diagnostic to stderr and
    /// exit with status 2.
    pub fn interpret_or_exit(&self, input: &str, usage: &str) -> Resolution {
        match futures::executor::block_on(self.interpret(input)) {
            Ok(resolution) => resolution,
            Err(err) => {
                eprintln!("{usage}");
                for diagnostic in err.diagnostics() {
                    eprintln!("  {diagnostic}");
                }
                std::process::exit(2);
            }
        }
    }

    async fn run(&self, tokens: &[Token<'_>]) -> Result<Resolution, Error> {
        debug!(tokens = tokens.len(), "tokenized input");
        let parsed = parse(tokens, &self.schema, &self.options)?;
        let declarations = self.schema.effective_declarations(parsed.command_path());
        debug!(
            command = ?parsed.command_path(),
            declarations = declarations.len(),
            "resolving against effective declarations"
        );
        coerce(
            &parsed,
            &self.options,
            &declarations,
            &self.resolvers,
            &self.coercers,
        )
        .await
    }
}
