mod render;

use std::fs;
use std::process;

use anyhow::{Context, Result};
use argtree_core::{
    Command, ErrorContext, ParseOutcome, ParserConfig, TokKind, load_tree_from_str,
    to_pretty_json, tokenize,
};
use argtree_diagnostics::{self as diag, Anchor, Diagnostic, Severity, Span, TokenRange};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::render::{Format, print_summary, render_diagnostics_pretty};

/// Name shown for the parsed command line in rendered diagnostics.
const INPUT_NAME: &str = "<input>";

// ── CLI definition ──────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "argtree",
    version,
    about = "argtree — parse command lines against declarative command trees and explain the diagnostics"
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
    /// Parse a command line and print the values of every activated command.
    Parse(InputArgs),

    /// Print the tokens of every activated command node.
    Tokens(InputArgs),

    /// Validate a tree definition.
    CheckTree {
        /// Path to the tree definition JSON.
        #[arg(long)]
        tree: String,
    },

    /// Explain a diagnostic ID (e.g. ARG2001).
    Explain { id: String },
}

/// A tree definition plus the command line to run through it.
#[derive(Args, Debug)]
struct InputArgs {
    /// Path to the tree definition JSON.
    #[arg(long)]
    tree: String,

    /// The command line as a single string.
    #[arg(long, conflicts_with = "input", allow_hyphen_values = true)]
    line: Option<String>,

    /// The command line as separate arguments, joined with single spaces.
    /// Put `--` before them when the first one starts with a dash.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    input: Vec<String>,
}

impl InputArgs {
    fn command_line(&self) -> String {
        match &self.line {
            Some(line) => line.clone(),
            None => self.input.join(" "),
        }
    }
}

// ── Main ────────────────────────────────────────────────────────────────

fn main() {
    init_tracing();
    let cli = Cli::parse();
    let format = Format::resolve_or_detect(cli.output.as_deref());

    if let Err(err) = run(cli.cmd, format) {
        match format {
            Format::Json => {
                let out = serde_json::json!({
                    "success": false,
                    "error": "command_failed",
                    "message": format!("{err:#}"),
                });
                println!("{out}");
            }
            Format::Pretty => eprintln!("error: {err:#}"),
        }
        process::exit(1);
    }
}

/// Log to stderr, filtered by `ARGTREE_LOG` (warnings only by default).
fn init_tracing() {
    let filter = EnvFilter::try_from_env("ARGTREE_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cmd: Cmd, format: Format) -> Result<()> {
    match cmd {
        Cmd::Parse(args) => cmd_parse(&args, format),
        Cmd::Tokens(args) => cmd_tokens(&args, format),
        Cmd::CheckTree { tree } => cmd_check_tree(&tree, format),
        Cmd::Explain { id } => cmd_explain(&id, format),
    }
}

// ── Commands ────────────────────────────────────────────────────────────

fn cmd_parse(args: &InputArgs, format: Format) -> Result<()> {
    let (root, config) = load_tree(&args.tree)?;
    let parser = argtree_core::Parser::with_config(&root, config)?;
    let outcome: ParseOutcome = parser.parse(&args.command_line());
    let resolved = outcome.resolved();

    match format {
        Format::Json => {
            let out = serde_json::json!({
                "ok": outcome.is_ok(),
                "values": outcome.values(),
                "diagnostics": resolved,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Format::Pretty => {
            // Values to stdout, diagnostics to stderr.
            if let Some(values) = outcome.values() {
                println!("{}", to_pretty_json(values));
            }
            render_diagnostics_pretty(outcome.input(), INPUT_NAME, &resolved);
            print_summary(outcome.diagnostics());
        }
    }

    exit_on_errors(outcome.diagnostics());
    Ok(())
}

/// One token of `tokens` output, positioned in the whole input.
#[derive(Serialize)]
struct TokenRow<'a> {
    kind: TokKind,
    text: &'a str,
    span: Span,
}

#[derive(Serialize)]
struct NodeRow<'a> {
    command: &'a str,
    offset: usize,
    tokens: Vec<TokenRow<'a>>,
}

fn cmd_tokens(args: &InputArgs, format: Format) -> Result<()> {
    let (root, config) = load_tree(&args.tree)?;
    let input = args.command_line();
    let chain = tokenize(&root, config, &input);
    let ctx = ErrorContext::new(&chain.nodes);

    let rows: Vec<NodeRow<'_>> = chain
        .nodes
        .iter()
        .enumerate()
        .map(|(node, tokens)| NodeRow {
            command: &tokens.command,
            offset: ctx.node_offset(node),
            tokens: tokens
                .tokens
                .iter()
                .enumerate()
                .map(|(i, token)| TokenRow {
                    kind: token.kind,
                    text: &token.text,
                    span: ctx.absolute_span(Anchor::new(node, TokenRange::single(i))),
                })
                .collect(),
        })
        .collect();

    match format {
        Format::Json => {
            let out = serde_json::json!({
                "nodes": rows,
                "diagnostics": chain.diagnostics,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Format::Pretty => {
            for row in &rows {
                println!("{} @{}", row.command, row.offset);
                for token in &row.tokens {
                    println!(
                        "  {:<18} {:>4}..{:<4} {}",
                        format!("{:?}", token.kind),
                        token.span.start,
                        token.span.end,
                        token.text
                    );
                }
            }
            for d in &chain.diagnostics {
                eprintln!("{d}");
            }
        }
    }

    exit_on_errors(&chain.diagnostics);
    Ok(())
}

fn cmd_check_tree(path: &str, format: Format) -> Result<()> {
    let (root, _config) = load_tree(path)?;
    let (commands, arguments) = count_declarations(&root);

    match format {
        Format::Json => {
            let out = serde_json::json!({
                "ok": true,
                "commands": commands,
                "arguments": arguments,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Format::Pretty => {
            eprintln!("tree ok: {commands} command(s), {arguments} argument(s)");
        }
    }
    Ok(())
}

fn cmd_explain(id: &str, format: Format) -> Result<()> {
    match format {
        Format::Json => {
            let text = diag::explain(id);
            let out = serde_json::json!({
                "id": id,
                "explanation": text,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Format::Pretty => {
            // Explanation is the expected output — write to stdout, not stderr.
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

/// Exit with code 1 if any diagnostic is an error.
/// Warnings do not cause a non-zero exit.
fn exit_on_errors(diagnostics: &[Diagnostic]) {
    if diagnostics
        .iter()
        .any(|d| matches!(d.severity, Severity::Error))
    {
        process::exit(1);
    }
}

/// Read, build, and validate a tree definition file.
fn load_tree(path: &str) -> Result<(Command, ParserConfig)> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("failed to read tree file '{path}'"))?;
    let tree = load_tree_from_str(&json).with_context(|| format!("invalid tree file '{path}'"))?;
    debug!(path, root = tree.0.name(), "loaded tree definition");
    Ok(tree)
}

fn count_declarations(command: &Command) -> (usize, usize) {
    command
        .subcommands()
        .iter()
        .map(count_declarations)
        .fold((1, command.arguments().len()), |(c, a), (sc, sa)| {
            (c + sc, a + sa)
        })
}
