use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use optparse_config::RegistryDefinition;
use optparse_core::{ArgDecl, CommandSchema, Registry, Value};
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Exit code for a registry definition that cannot be loaded or built.
const EXIT_SCHEMA: u8 = 1;
/// Exit code for tokens rejected by the parser.
const EXIT_PARSE: u8 = 2;

#[derive(Debug, Parser)]
#[command(name = "optparse")]
#[command(about = "getopt-style parsing against a command registry definition")]
#[command(version)]
struct Cli {
    /// Log parser decisions at debug level (RUST_LOG overrides).
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Parse tokens against a registry definition and print the bound values as JSON.
    Parse(ParseArgs),
    /// Load a registry definition and list its commands.
    Check(CheckArgs),
}

#[derive(Debug, Args)]
struct ParseArgs {
    /// Registry definition file (YAML, or JSON with a .json extension).
    #[arg(long)]
    schema: PathBuf,
    /// Tokens to parse, given after `--`.
    #[arg(last = true)]
    tokens: Vec<String>,
}

#[derive(Debug, Args)]
struct CheckArgs {
    /// Registry definition file (YAML, or JSON with a .json extension).
    #[arg(long)]
    schema: PathBuf,
}

/// Failure of a subcommand together with its exit code.
struct Failure {
    code: u8,
    message: String,
}

impl Failure {
    fn schema(err: impl std::fmt::Display) -> Self {
        Self {
            code: EXIT_SCHEMA,
            message: err.to_string(),
        }
    }

    fn parse(err: impl std::fmt::Display) -> Self {
        Self {
            code: EXIT_PARSE,
            message: err.to_string(),
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Command::Parse(args) => run_parse(args),
        Command::Check(args) => run_check(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(failure) => {
            eprintln!("error: {}", failure.message);
            ExitCode::from(failure.code)
        }
    }
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)),
        )
        .init();
}

fn load_registry(path: &Path) -> Result<Registry, Failure> {
    RegistryDefinition::load(path)
        .and_then(RegistryDefinition::into_registry)
        .map_err(|err| Failure::schema(format!("{}: {err}", path.display())))
}

fn run_parse(args: ParseArgs) -> Result<(), Failure> {
    let mut registry = load_registry(&args.schema)?;
    debug!(tokens = ?args.tokens, "Parsing tokens");

    let command = registry.parse(&args.tokens).map_err(Failure::parse)?;
    let report = ParseReport::from_command(command);
    let json = serde_json::to_string_pretty(&report).map_err(Failure::schema)?;
    println!("{json}");
    Ok(())
}

fn run_check(args: CheckArgs) -> Result<(), Failure> {
    let registry = load_registry(&args.schema)?;

    for name in registry.command_names() {
        let Some(command) = registry.get(name) else {
            continue;
        };
        let label = if command.is_root() { "(root)" } else { name };
        let args: Vec<String> = command
            .arg_decls()
            .iter()
            .map(|arg| {
                if arg.is_variadic() {
                    format!("{}...", arg.name())
                } else {
                    arg.name().to_string()
                }
            })
            .collect();
        let flags: Vec<String> = command
            .flag_decls()
            .map(|flag| match flag.short() {
                Some(short) => format!("-{short}/--{}", flag.name()),
                None => format!("--{}", flag.name()),
            })
            .collect();

        println!("{label}");
        if !args.is_empty() {
            println!("  args:  {}", args.join(" "));
        }
        if !flags.is_empty() {
            println!("  flags: {}", flags.join(" "));
        }
    }

    println!("OK: {} command(s)", registry.len());
    Ok(())
}

/// JSON view of a parsed command.
#[derive(Debug, Serialize)]
struct ParseReport {
    command: String,
    flags: BTreeMap<String, Entry>,
    args: BTreeMap<String, Entry>,
}

#[derive(Debug, Serialize)]
struct Entry {
    value: Value,
    bound: bool,
}

impl ParseReport {
    fn from_command(command: &CommandSchema) -> Self {
        Self {
            command: command.name().to_string(),
            flags: command
                .flag_decls()
                .map(|flag| (flag.name().to_string(), Entry::from_decl(flag.as_arg())))
                .collect(),
            args: command
                .arg_decls()
                .iter()
                .map(|arg| (arg.name().to_string(), Entry::from_decl(arg)))
                .collect(),
        }
    }
}

impl Entry {
    fn from_decl(decl: &ArgDecl) -> Self {
        let value = match decl.value() {
            Some(value) => value.clone(),
            None if decl.is_variadic() => Value::Many(Vec::new()),
            None => Value::Single(decl.effective().clone()),
        };
        Self {
            value,
            bound: decl.is_set(),
        }
    }
}
