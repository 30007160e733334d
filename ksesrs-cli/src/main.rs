use std::fs;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use ksesrs::{Kses, Policy, PolicyPreset, PolicySpec, SchemeAllowlist, StyleAllowlist, Tokenizer};
use serde::Serialize;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "kses")]
#[command(about = "Filter HTML against an allowlist of tags, attributes, schemes and styles")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Filter inputs and print the result
    Sanitize {
        /// Input string to filter
        #[arg(short, long)]
        input: Option<String>,

        /// File containing inputs (one per line); stdin is read when neither is given
        #[arg(short, long)]
        file: Option<PathBuf>,

        #[command(flatten)]
        config: FilterArgs,

        /// Output results in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Print the token stream of an input
    Tokens {
        /// Input string to split
        input: String,
    },

    /// Print a preset policy as JSON
    Policy {
        /// Preset name (`post` or `excerpt`)
        #[arg(default_value = "post")]
        preset: PolicyPreset,
    },
}

#[derive(Args)]
struct FilterArgs {
    /// Preset policy (`post`, `excerpt`) or `none` to strip every tag
    #[arg(short, long, default_value = "post", conflicts_with = "policy_file")]
    policy: String,

    /// JSON file with a custom policy
    #[arg(long)]
    policy_file: Option<PathBuf>,

    /// Allowed URI schemes, comma separated (defaults to the built-in list)
    #[arg(long, value_delimiter = ',')]
    schemes: Option<Vec<String>>,

    /// Allowed CSS properties, comma separated (defaults to the built-in list)
    #[arg(long, value_delimiter = ',')]
    styles: Option<Vec<String>>,

    /// Maximum comment nesting depth
    #[arg(long, default_value_t = ksesrs::kses::DEFAULT_MAX_COMMENT_DEPTH)]
    max_comment_depth: usize,
}

impl FilterArgs {
    fn policy_spec(&self) -> Result<PolicySpec> {
        if let Some(path) = &self.policy_file {
            let json = fs::read_to_string(path)
                .with_context(|| format!("Failed to read policy file: {:?}", path))?;
            let policy = Policy::from_json(&json)
                .with_context(|| format!("Failed to load policy file: {:?}", path))?;
            return Ok(policy.into());
        }
        if self.policy.eq_ignore_ascii_case("none") {
            return Ok(PolicySpec::None);
        }
        let preset: PolicyPreset = self.policy.parse()?;
        Ok(preset.into())
    }

    fn build(&self) -> Result<Kses> {
        let kses = Kses::new(
            self.policy_spec()?,
            self.schemes.as_ref().map(SchemeAllowlist::new),
            self.styles.as_ref().map(StyleAllowlist::new),
        )
        .with_max_comment_depth(self.max_comment_depth);
        debug!(
            tags = kses.policy().len(),
            schemes = kses.schemes().len(),
            styles = kses.styles().len(),
            "filter configured"
        );
        Ok(kses)
    }
}

#[derive(Serialize, Debug)]
struct FilterResult {
    input: String,
    output: String,
    changed: bool,
}

fn read_inputs<R: BufRead>(reader: R) -> Result<Vec<String>> {
    let mut inputs = Vec::new();
    for line in reader.lines() {
        let line = line.context("Failed to read line")?;
        if !line.trim().is_empty() {
            inputs.push(line);
        }
    }
    Ok(inputs)
}

fn read_inputs_from_file(file_path: &Path) -> Result<Vec<String>> {
    let file = fs::File::open(file_path)
        .with_context(|| format!("Failed to open file: {:?}", file_path))?;
    read_inputs(BufReader::new(file))
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Sanitize { input, file, config, json } => {
            let kses = config.build()?;
            let inputs = if let Some(input) = input {
                vec![input]
            } else if let Some(file) = file {
                read_inputs_from_file(&file)?
            } else {
                read_inputs(io::stdin().lock())?
            };
            info!(count = inputs.len(), "filtering inputs");

            let results: Vec<FilterResult> = inputs
                .into_iter()
                .map(|input| {
                    let output = kses.filter(&input);
                    FilterResult { changed: output != input, input, output }
                })
                .collect();

            if json {
                println!("{}", serde_json::to_string_pretty(&results)?);
            } else {
                for result in results {
                    println!("{}", result.output);
                }
            }
        }

        Commands::Tokens { input } => {
            for token in Tokenizer::new(&input) {
                println!("{},{},{}", token.kind, token.text.len(), token.text);
            }
        }

        Commands::Policy { preset } => {
            println!("{}", preset.policy().to_json()?);
        }
    }

    Ok(())
}
