//! schema-rewrite CLI
//!
//! Command-line interface for rewriting JSON with declarative rules files.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use schema_rewrite::{build_registry, load_rules, Decoder, Encoder, Rules, Schema};
use serde_json::Value;
use tracing::{debug, info};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "schema-rewrite")]
#[command(about = "Rewrite JSON values that match JSON Schema rules")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rewrite a stream of JSON values with a rules file
    Apply {
        /// Rules file: JSON array of {schema, replace, abort?} entries
        #[arg(long, short)]
        rules: PathBuf,

        /// Input file (stdin if not specified)
        input: Option<PathBuf>,

        /// Output file (stdout if not specified)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,

        /// Only test top-level values against the rules
        #[arg(long)]
        no_recursive: bool,
    },

    /// Check that every schema in a rules file compiles
    Check {
        /// Rules file to check
        rules: PathBuf,

        /// Output results as JSON (for automation)
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let _ = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .try_init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Apply {
            rules,
            input,
            output,
            pretty,
            no_recursive,
        } => run_apply(&rules, input.as_deref(), output.as_deref(), pretty, no_recursive),
        Commands::Check { rules, json } => run_check(&rules, json),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => ExitCode::from(code),
    }
}

fn run_apply(
    rules_path: &Path,
    input: Option<&Path>,
    output: Option<&Path>,
    pretty: bool,
    no_recursive: bool,
) -> Result<(), u8> {
    let rules = load_rules(rules_path).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;
    let registry = build_registry(&rules);
    registry.set_recursive_descent(!no_recursive);
    debug!(rules = registry.len(), recursive = !no_recursive, "loaded rules");

    let reader: Box<dyn Read> = match input {
        Some(path) => Box::new(BufReader::new(File::open(path).map_err(|e| {
            eprintln!("Error: cannot read {}: {}", path.display(), e);
            3u8
        })?)),
        None => Box::new(io::stdin().lock()),
    };
    let writer: Box<dyn Write> = match output {
        Some(path) => Box::new(BufWriter::new(File::create(path).map_err(|e| {
            eprintln!("Error writing to {}: {}", path.display(), e);
            3u8
        })?)),
        None => Box::new(io::stdout().lock()),
    };

    let mut decoder = Decoder::with_rules(reader, Rules::Registry(&registry));
    let mut encoder = Encoder::with_rules(writer, Rules::Void);
    encoder.set_pretty(pretty);

    let mut count = 0usize;
    loop {
        let value = match decoder.decode::<Value>() {
            Ok(Some(value)) => value,
            Ok(None) => break,
            Err(e) => {
                eprintln!("Error: value #{}: {}", count, e);
                return Err(e.exit_code() as u8);
            }
        };
        encoder.encode(&value).map_err(|e| {
            eprintln!("Error: {}", e);
            e.exit_code() as u8
        })?;
        count += 1;
    }
    encoder.flush().map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;

    info!(values = count, "rewrite complete");
    Ok(())
}

fn run_check(rules_path: &Path, json_output: bool) -> Result<(), u8> {
    let rules = load_rules(rules_path).map_err(|e| {
        report_error(json_output, &e.to_string());
        e.exit_code() as u8
    })?;

    let mut invalid = Vec::new();
    for (index, rule) in rules.iter().enumerate() {
        if let Err(e) = Schema::from_value(rule.schema.clone()).compile() {
            invalid.push((index, rule.label(index), e.to_string()));
        }
    }

    if json_output {
        let errors: Vec<Value> = invalid
            .iter()
            .map(|(index, _, message)| serde_json::json!({ "rule": index, "message": message }))
            .collect();
        let output = serde_json::json!({
            "valid": invalid.is_empty(),
            "rules": rules.len(),
            "errors": errors
        });
        println!("{}", output);
    } else if invalid.is_empty() {
        println!("{} rules checked, all valid", rules.len());
    } else {
        eprintln!("Invalid rules:");
        for (_, label, message) in &invalid {
            eprintln!("  {}: {}", label, message);
        }
    }

    if invalid.is_empty() {
        Ok(())
    } else {
        Err(1)
    }
}

/// Output an error message in plain text or JSON format.
fn report_error(json_output: bool, msg: &str) {
    if json_output {
        println!("{}", serde_json::json!({ "valid": false, "error": msg }));
    } else {
        eprintln!("Error: {}", msg);
    }
}
