mod render;

use std::fs;
use std::process;

use anyhow::{Context, Result};
use argot_core::schema::{SchemaFile, UnrecognizedPolicy};
use argot_core::{Interpreter, tokenize};
use argot_diagnostics as diag;
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::render::{Format, print_json, print_summary, render_diagnostics_pretty};

// ── CLI definition ──────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "argot",
    version,
    about = "Interpret command-line arguments against a declarative schema"
)]
struct Cli {
    /// Output mode: "pretty" for coloured terminal output, "json" for
    /// machine-readable JSON. Defaults to "pretty" when stdout is a TTY,
    /// "json" otherwise.
    #[arg(long, global = true, value_parser = ["pretty", "json"])]
    output: Option<String>,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Print the token stream of an input string.
    Tokens { input: String },

    /// Interpret arguments against a schema document.
    ///
    /// Arguments after `--` are taken as an argument vector; `--input`
    /// takes one string and tokenizes it instead.
    Parse {
        /// Path to the schema JSON document.
        #[arg(long)]
        schema: String,
        /// Interpret this string instead of the trailing arguments.
        #[arg(long, conflicts_with = "args")]
        input: Option<String>,
        /// Resolve missing keys from `{PREFIX}_{KEY}` environment variables.
        #[arg(long)]
        env_prefix: Option<String>,
        /// Ignore flags the resolved command does not declare.
        #[arg(long)]
        skip_unrecognized: bool,
        /// Fail when the input does not start with a command.
        #[arg(long)]
        require_command: bool,
        /// Arguments to interpret.
        #[arg(last = true)]
        args: Vec<String>,
    },

    /// Explain a diagnostic ID (e.g. ARG2008).
    Explain { id: String },
}

/// Options for `argot parse`.
struct ParseArgs {
    schema: String,
    input: Option<String>,
    env_prefix: Option<String>,
    skip_unrecognized: bool,
    require_command: bool,
    args: Vec<String>,
}

// ── Main ────────────────────────────────────────────────────────────────

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let format = Format::resolve_or_detect(cli.output.as_deref());

    let result = match cli.cmd {
        Cmd::Tokens { input } => cmd_tokens(&input, format),
        Cmd::Parse {
            schema,
            input,
            env_prefix,
            skip_unrecognized,
            require_command,
            args,
        } => {
            let parse_args = ParseArgs {
                schema,
                input,
                env_prefix,
                skip_unrecognized,
                require_command,
                args,
            };
            cmd_parse(parse_args, format).await
        }
        Cmd::Explain { id } => cmd_explain(&id, format),
    };

    if let Err(err) = result {
        report_failure(&err, format);
        process::exit(1);
    }
}

// ── Commands ────────────────────────────────────────────────────────────

fn cmd_tokens(input: &str, format: Format) -> Result<()> {
    let tokens = tokenize(input);
    match format {
        Format::Json => print_json(&serde_json::to_value(&tokens)?)?,
        Format::Pretty => {
            for tok in &tokens {
                let kind = tok.kind.to_string();
                println!("{:>4}..{:<4} {kind:<15} {:?}", tok.start, tok.end, tok.text);
            }
        }
    }
    Ok(())
}

async fn cmd_parse(args: ParseArgs, format: Format) -> Result<()> {
    let text = fs::read_to_string(&args.schema)
        .with_context(|| format!("failed to read schema '{}'", args.schema))?;
    let file = SchemaFile::from_json(&text)
        .with_context(|| format!("failed to load schema '{}'", args.schema))?;
    let (root, mut options) = file
        .into_parts()
        .with_context(|| format!("schema '{}' is inconsistent", args.schema))?;

    if let Some(prefix) = args.env_prefix {
        options.environment_prefix = Some(prefix);
    }
    if args.skip_unrecognized {
        options.unrecognized_argument = UnrecognizedPolicy::Skip;
    }
    if args.require_command {
        options.must_provide_command = true;
    }
    debug!(schema = %args.schema, root = root.name(), ?options, "loaded schema");

    let interpreter = Interpreter::new(root).with_options(options);
    let (source, result) = match &args.input {
        Some(input) => (input.clone(), interpreter.interpret(input).await),
        None => (
            args.args.join(" "),
            interpreter.interpret_args(&args.args).await,
        ),
    };

    match result {
        Ok(resolution) => match format {
            Format::Json => print_json(&serde_json::json!({
                "resolution": resolution,
                "diagnostics": [],
            }))?,
            Format::Pretty => println!("{}", serde_json::to_string_pretty(&resolution)?),
        },
        Err(err) => {
            let diagnostics = err.diagnostics();
            match format {
                Format::Json => print_json(&serde_json::json!({
                    "resolution": null,
                    "diagnostics": diagnostics,
                }))?,
                Format::Pretty => {
                    render_diagnostics_pretty(&source, "input", &diagnostics);
                    print_summary(&diagnostics);
                }
            }
            process::exit(1);
        }
    }
    Ok(())
}

fn cmd_explain(id: &str, format: Format) -> Result<()> {
    match format {
        Format::Json => print_json(&serde_json::json!({
            "id": id,
            "explanation": diag::explain(id),
        }))?,
        Format::Pretty => {
            // Explanation is the expected output, so it goes to stdout.
            if let Some(text) = diag::explain(id) {
                use ariadne::Fmt;
                println!("{}: {}", id.fg(ariadne::Color::Cyan), text);
            } else {
                println!("{id}: (no explanation available)");
            }
        }
    }
    Ok(())
}

// ── Helpers ─────────────────────────────────────────────────────────────

/// Report a command failure (unreadable or invalid schema, I/O) in the
/// requested format.
fn report_failure(err: &anyhow::Error, format: Format) {
    match format {
        Format::Json => {
            let envelope = serde_json::json!({
                "success": false,
                "error": "command_failed",
                "message": format!("{err:#}"),
            });
            if print_json(&envelope).is_err() {
                eprintln!("error: {err:#}");
            }
        }
        Format::Pretty => eprintln!("error: {err:#}"),
    }
}
