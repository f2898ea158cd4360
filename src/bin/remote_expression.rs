//! Command-line interface for compiled remote expressions
//!
//! Evaluates, inspects and digests encoded programs, and writes sample programs
//! to experiment with.

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use remote_expression::capability::{Equatable, Numeric};
use remote_expression::codec;
use remote_expression::{
    CompiledProgram, EngineConfig, EvaluationContext, Evaluator, Expression, ProgramDigest,
    RuntimeValue,
};
use serde_json::Value as JsonValue;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process;

#[derive(Parser)]
#[command(name = "remote-expression")]
#[command(about = "Evaluate and inspect compiled remote expression programs")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// JSON engine configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate an encoded program against a JSON subject
    Eval {
        /// Encoded program file
        program: PathBuf,
        /// JSON subject file (reads from stdin if not provided)
        #[arg(short, long)]
        subject: Option<PathBuf>,
        /// Pretty-print JSON output
        #[arg(short, long)]
        pretty: bool,
    },
    /// Print the disassembly and metrics of an encoded program
    Inspect {
        /// Encoded program file
        program: PathBuf,
    },
    /// Print the content digest of an encoded program
    Digest {
        /// Encoded program file
        program: PathBuf,
    },
    /// Check that an encoded program decodes and is well formed
    Check {
        /// Encoded program file
        program: PathBuf,
    },
    /// Write a sample encoded program to stdout
    Sample {
        /// Which sample to emit
        #[arg(value_enum)]
        name: Sample,
        /// Pretty-print JSON output
        #[arg(short, long)]
        pretty: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Sample {
    /// `let x = 41 in x + 1`
    Increment,
    /// `let b = subject in if b == 0 then 0 else 100 / b`
    Diverge,
}

fn main() {
    human_panic::setup_panic!();

    let cli = Cli::parse();
    let level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    if let Err(err) = run(cli) {
        eprintln!("Error: {err:#}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Eval {
            program,
            subject,
            pretty,
        } => {
            let program = load_program(&program, &config)?;
            let subject = load_subject(subject.as_deref())?;
            let context = EvaluationContext::with_capabilities(config.capabilities());
            let result = Evaluator::with_config(config)
                .evaluate(&program, &context, &subject)
                .context("Evaluation failed")?;
            print_json(&result.to_json(), pretty)
        }
        Commands::Inspect { program } => {
            let program = load_program(&program, &config)?;
            println!("{program}");
            println!("nodes:  {}", program.node_count());
            println!("depth:  {}", program.depth());
            println!("digest: {}", ProgramDigest::of(&program));
            Ok(())
        }
        Commands::Digest { program } => {
            let program = load_program(&program, &config)?;
            println!("{}", ProgramDigest::of(&program));
            Ok(())
        }
        Commands::Check { program: path } => {
            let bytes = read_file(&path)?;
            let strict = EngineConfig {
                validate_on_decode: true,
                ..config
            };
            match codec::from_slice_with(&bytes, &strict) {
                Ok(_) => {
                    println!("OK");
                    Ok(())
                }
                Err(err) => bail!("{} is not a valid program: {err}", path.display()),
            }
        }
        Commands::Sample { name, pretty } => print_json(&codec::encode(&sample(name)), pretty),
    }
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    let Some(path) = path else {
        return Ok(EngineConfig::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config '{}'", path.display()))?;
    let config = EngineConfig::from_json_str(&text)
        .with_context(|| format!("Invalid config '{}'", path.display()))?;
    log::debug!("Loaded {config:?}");
    Ok(config)
}

fn load_program(path: &Path, config: &EngineConfig) -> Result<CompiledProgram> {
    let bytes = read_file(path)?;
    codec::from_slice_with(&bytes, config)
        .with_context(|| format!("Failed to decode program '{}'", path.display()))
}

fn load_subject(path: Option<&Path>) -> Result<RuntimeValue> {
    let text = match path {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read subject '{}'", path.display()))?,
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read subject from stdin")?;
            buffer
        }
    };
    if text.trim().is_empty() {
        return Ok(RuntimeValue::Unit);
    }
    let json: JsonValue = serde_json::from_str(&text).context("Subject is not JSON")?;
    Ok(RuntimeValue::from_json(&json)?)
}

fn read_file(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("Failed to read '{}'", path.display()))
}

fn print_json(json: &JsonValue, pretty: bool) -> Result<()> {
    let output = if pretty {
        serde_json::to_string_pretty(json)?
    } else {
        serde_json::to_string(json)?
    };
    println!("{output}");
    Ok(())
}

fn sample(name: Sample) -> CompiledProgram {
    match name {
        Sample::Increment => Expression::let_in(Expression::integer(41), |x| {
            x.add(Expression::integer(1), Numeric::integer())
        })
        .compile(),
        Sample::Diverge => Expression::let_in(Expression::<i64>::identity(), |b| {
            b.clone()
                .equal_to(Expression::integer(0), Equatable::integer())
                .diverge(
                    Expression::integer(0),
                    Expression::integer(100).divide(b, Numeric::integer()),
                )
        })
        .compile(),
    }
}
