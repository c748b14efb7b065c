//! Playroom CLI - headless tooling for playground code

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use playroom_core::config::{config_path, load_config, save_config};
use playroom_core::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "playroom")]
#[command(about = "Check, format and plan previews for component playground code", long_about = None)]
#[command(version)]
struct Cli {
    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Syntax-check a code file
    Check {
        /// File holding a JSX fragment
        file: PathBuf,
    },

    /// Re-indent a code file
    Format {
        /// File holding a JSX fragment
        file: PathBuf,

        /// Cursor line to carry through formatting (1-based)
        #[arg(long, default_value = "1")]
        line: u32,

        /// Cursor column to carry through formatting (1-based)
        #[arg(long, default_value = "1")]
        column: u32,

        /// Write the result back instead of printing it
        #[arg(short, long)]
        write: bool,
    },

    /// Print the preview frame matrix
    Frames {
        /// Viewport widths (defaults to the configured ones)
        #[arg(long, value_delimiter = ',')]
        widths: Vec<u32>,

        /// Theme names (defaults to the configured ones)
        #[arg(long, value_delimiter = ',')]
        themes: Vec<String>,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the configuration file
    Config {
        /// Write the defaults if no config file exists
        #[arg(long)]
        init: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Check { file } => run_check(&file)?,
        Commands::Format {
            file,
            line,
            column,
            write,
        } => run_format(&file, Position::new(line, column), write)?,
        Commands::Frames {
            widths,
            themes,
            json,
        } => run_frames(widths, themes, json)?,
        Commands::Config { init } => run_config(init)?,
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn read_code(file: &Path) -> Result<String> {
    fs::read_to_string(file).with_context(|| format!("Failed to read {}", file.display()))
}

fn run_check(file: &Path) -> Result<()> {
    let code = read_code(file)?;

    match validate_fragment(&code) {
        Ok(()) => {
            println!("{}: ok", file.display());
            Ok(())
        }
        Err(e) => {
            let message = e.to_string();
            match error_line(&message) {
                Some(line) => println!("{}:{}: {}", file.display(), line, e.message),
                None => println!("{}: {}", file.display(), message),
            }
            bail!("syntax check failed");
        }
    }
}

fn run_format(file: &Path, cursor: Position, write: bool) -> Result<()> {
    let code = read_code(file)?;
    let formatted = IndentFormatter::new()
        .format(&code, cursor)
        .with_context(|| format!("Failed to format {}", file.display()))?;
    debug!(
        "Cursor {}:{} -> {}:{}",
        cursor.line_number, cursor.column, formatted.line, formatted.ch
    );

    if write {
        if formatted.code == code {
            println!("{}: unchanged", file.display());
        } else {
            fs::write(file, &formatted.code)
                .with_context(|| format!("Failed to write {}", file.display()))?;
            println!("{}: formatted", file.display());
        }
    } else {
        println!("{}", formatted.code);
    }
    eprintln!("cursor: {}:{}", formatted.line, formatted.ch);
    Ok(())
}

fn run_frames(widths: Vec<u32>, themes: Vec<String>, json: bool) -> Result<()> {
    let config = load_config();
    let widths = if widths.is_empty() { config.widths.clone() } else { widths };
    let themes = if themes.is_empty() {
        config.themes.keys().cloned().collect()
    } else {
        themes
    };

    let frames = frame_matrix(&widths, &themes);
    if json {
        println!("{}", serde_json::to_string_pretty(&frames)?);
    } else {
        for frame in &frames {
            println!("{:>6}px  {}", frame.width, frame.theme);
        }
        println!("{} frames", frames.len());
    }
    Ok(())
}

fn run_config(init: bool) -> Result<()> {
    let path = config_path().context("Could not determine config directory")?;

    if init && !path.exists() {
        save_config(&PlayroomConfig::default())?;
        println!("Wrote defaults to {}", path.display());
    }

    let config = load_config();
    println!("# {}", path.display());
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}
