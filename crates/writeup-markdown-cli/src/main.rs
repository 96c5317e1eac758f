//! writeup-markdown - Policy-driven Markdown rewriting for CTF writeups

use std::{
    io::{self, Read},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::{debug, info};
use serde::Serialize;
use writeup_markdown_config::Config;
use writeup_markdown_engine::{Params, summarize, token, tokenize, transform};

#[derive(Parser)]
#[command(name = "writeup-markdown")]
#[command(version, about = "Transform Markdown writeups into page bodies and summaries", long_about = None)]
#[command(after_help = "EXAMPLES:
    writeup-markdown transform README.md            Render a writeup body to HTML
    writeup-markdown transform --json README.md     Body plus extracted title as JSON
    writeup-markdown summary --max 80 README.md     One-line listing blurb
    cat README.md | writeup-markdown tokens -       Dump the token stream")]
struct Cli {
    /// Config file (defaults to ~/.config/writeup-markdown/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Transform a document under a named policy
    Transform {
        /// Markdown file, or `-` for stdin
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Preset (`full`, `summary`) or a policy from the config file
        #[arg(short, long, default_value = "full")]
        policy: String,

        /// Print Markdown instead of rendering to HTML
        #[arg(long)]
        no_render: bool,

        /// Print chip-annotated output
        #[arg(long)]
        debug: bool,

        /// Print title, text and parameters as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print a short plain-text summary
    Summary {
        /// Markdown file, or `-` for stdin
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Maximum length in characters (defaults to the configured length)
        #[arg(short, long)]
        max: Option<usize>,
    },

    /// Print the token stream
    Tokens {
        /// Markdown file, or `-` for stdin
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    title: &'a str,
    text: &'a str,
    params: &'a Params,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Transform {
            input,
            policy,
            no_render,
            debug,
            json,
        } => {
            let mut policy = config.policy(&policy)?;
            if no_render {
                policy.render = false;
            }
            policy.debug = debug;

            let source = read_input(&input)?;
            let out = transform(&source, &policy)
                .with_context(|| format!("Failed to transform {}", input.display()))?;

            if json {
                let fallback = fallback_title(&input);
                let output = JsonOutput {
                    title: out.title_or(&fallback),
                    text: &out.text,
                    params: &out.params,
                };
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                print!("{}", out.text);
            }
        }
        Command::Summary { input, max } => {
            let policy = config.policy("summary")?;
            let max = max.unwrap_or(config.summary_length);
            let source = read_input(&input)?;
            let summary = summarize(&source, &policy, max)
                .with_context(|| format!("Failed to summarize {}", input.display()))?;
            println!("{}", summary.text);
        }
        Command::Tokens { input } => {
            let source = read_input(&input)?;
            print!("{}", token::dump(&tokenize(&source)));
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    let loaded = match path {
        Some(path) => Config::load_from_path(path)?
            .with_context(|| format!("Config file not found: {}", path.display()))?,
        None => {
            let config_path = Config::config_path();
            match Config::load()? {
                Some(config) => {
                    info!("Loaded config from {}", config_path.display());
                    config
                }
                None => {
                    debug!("No config at {}, using defaults", config_path.display());
                    Config::default()
                }
            }
        }
    };
    Ok(loaded)
}

fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut source = String::new();
        io::stdin()
            .read_to_string(&mut source)
            .context("Failed to read stdin")?;
        return Ok(source);
    }
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// The file stem, as used for the page title of writeups without a heading.
fn fallback_title(path: &Path) -> String {
    path.file_stem()
        .filter(|_| path != Path::new("-"))
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use pretty_assertions::assert_eq;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn transform_defaults_to_full_policy() {
        let cli = Cli::try_parse_from(["writeup-markdown", "transform", "README.md"]).unwrap();
        match cli.command {
            Command::Transform {
                policy, no_render, ..
            } => {
                assert_eq!(policy, "full");
                assert!(!no_render);
            }
            _ => panic!("expected transform"),
        }
    }

    #[test]
    fn global_flags_follow_subcommand() {
        let cli = Cli::try_parse_from([
            "writeup-markdown",
            "summary",
            "-",
            "--max",
            "80",
            "--verbose",
            "--config",
            "cfg.toml",
        ])
        .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("cfg.toml")));
        assert!(matches!(cli.command, Command::Summary { max: Some(80), .. }));
    }

    #[test]
    fn fallback_title_is_file_stem() {
        assert_eq!(fallback_title(Path::new("web/baby-crypto.md")), "baby-crypto");
        assert_eq!(fallback_title(Path::new("-")), "");
    }
}
