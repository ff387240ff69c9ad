//! Parinfer CLI entrypoint: a thin consumer of `parinfer_core`'s three
//! public entry points (mirrors `ox-bin`'s `main`/config/logging wiring, but
//! as a one-shot batch tool rather than an interactive editor).

mod config;

use std::{
    io::{self, Read},
    path::PathBuf,
};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use parinfer_core::{indent_mode, paren_mode, smart_mode, Options};
use tracing::info;

use config::DefaultMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ModeArg {
    Smart,
    Indent,
    Paren,
}

/// Balances indentation and paren structure in Lisp-family source text.
#[derive(Parser, Debug)]
#[command(name = "parinfer", version, about = "Infer paren/indentation structure for Lisp-family source")]
struct Args {
    /// Source file to process. Reads stdin when omitted.
    path: Option<PathBuf>,

    /// Which entry point to run. Overrides the value in `parinfer.toml`.
    #[arg(long, value_enum)]
    mode: Option<ModeArg>,

    /// JSON-encoded `Options` document (cursor position, changes, etc).
    /// Defaults to `{}` when omitted.
    #[arg(long)]
    options: Option<String>,

    /// Path to a JSON file holding the `Options` document, as an alternative
    /// to `--options`.
    #[arg(long, conflicts_with = "options")]
    options_file: Option<PathBuf>,

    /// Override configuration file path (defaults to `./parinfer.toml`).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the full `Output` document as JSON instead of just the text.
    #[arg(long)]
    json: bool,
}

fn install_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

fn read_source(path: &Option<PathBuf>) -> Result<String> {
    match path {
        Some(p) => fs_read_to_string(p),
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("reading source text from stdin")?;
            Ok(buf)
        }
    }
}

fn fs_read_to_string(path: &PathBuf) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

fn resolve_options(args: &Args) -> Result<Options> {
    let raw = match (&args.options, &args.options_file) {
        (Some(json), None) => json.clone(),
        (None, Some(path)) => fs_read_to_string(path)?,
        (None, None) => "{}".to_string(),
        (Some(_), Some(_)) => unreachable!("clap enforces mutual exclusion"),
    };
    serde_json::from_str(&raw).context("parsing --options/--options-file as JSON")
}

fn resolve_mode(args: &Args, cfg: &config::Config) -> DefaultMode {
    match args.mode {
        Some(ModeArg::Smart) => DefaultMode::Smart,
        Some(ModeArg::Indent) => DefaultMode::Indent,
        Some(ModeArg::Paren) => DefaultMode::Paren,
        None => cfg.file.mode,
    }
}

fn main() -> Result<()> {
    install_tracing();

    let args = Args::parse();
    let cfg = config::load_from(args.config.clone())?;

    let text = read_source(&args.path)?;
    let mut options = resolve_options(&args)?;
    options.force_balance = options.force_balance || cfg.file.force_balance;
    options.return_parens = options.return_parens || cfg.file.return_parens;

    let mode = resolve_mode(&args, &cfg);
    info!(?mode, bytes = text.len(), "processing");

    let output = match mode {
        DefaultMode::Smart => smart_mode(&text, &options),
        DefaultMode::Indent => indent_mode(&text, &options),
        DefaultMode::Paren => paren_mode(&text, &options),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if output.success {
        print!("{}", output.text);
    } else {
        let err = output.error.as_ref().expect("failure implies an error");
        eprintln!("{} (line {}, x {})", err.kind.name(), err.line_no, err.x);
        std::process::exit(1);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_mode_falls_back_to_config_default() {
        let args = Args {
            path: None,
            mode: None,
            options: None,
            options_file: None,
            config: None,
            json: false,
        };
        let cfg = config::Config {
            file: config::ConfigFile {
                mode: DefaultMode::Paren,
                ..Default::default()
            },
        };
        assert_eq!(resolve_mode(&args, &cfg), DefaultMode::Paren);
    }

    #[test]
    fn resolve_options_defaults_to_empty_document() {
        let args = Args {
            path: None,
            mode: None,
            options: None,
            options_file: None,
            config: None,
            json: false,
        };
        let options = resolve_options(&args).unwrap();
        assert_eq!(options, Options::default());
    }
}
