//! CLI argument parsing using clap

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format for gcsafe commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Compiler-style human-readable output
    Human,
    /// JSON Lines format (one JSON object per line)
    Jsonl,
}

/// Color output choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorChoice {
    /// Automatically detect if terminal supports color
    Auto,
    /// Always use color
    Always,
    /// Never use color
    Never,
}

impl From<ColorChoice> for termcolor::ColorChoice {
    fn from(choice: ColorChoice) -> Self {
        match choice {
            ColorChoice::Auto => termcolor::ColorChoice::Auto,
            ColorChoice::Always => termcolor::ColorChoice::Always,
            ColorChoice::Never => termcolor::ColorChoice::Never,
        }
    }
}

/// gcsafe CLI main entry point
#[derive(Parser, Debug)]
#[command(name = "gcsafe")]
#[command(about = "Garbage-collection safety checks over analyzed C++ translation units")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Output coloring
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Increase log verbosity (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file (defaults to ./gcsafe.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

/// Available gcsafe subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the pattern checks over translation unit dumps
    Check {
        /// Dumps or directories containing *.ast.json dumps
        #[arg(default_value = ".")]
        paths: Vec<PathBuf>,

        /// Output format
        #[arg(short, long, default_value = "human")]
        format: OutputFormat,

        /// Report violations as errors
        #[arg(long)]
        warnings_as_errors: bool,

        /// Also flag managed-reference wrappers on the stack
        #[arg(long)]
        enable_members_on_stack_check: bool,

        /// Glob patterns of paths to skip while walking directories
        #[arg(long)]
        exclude: Vec<String>,
    },

    /// Print the location classification of source paths
    Classify {
        #[arg(required = true)]
        paths: Vec<String>,

        /// Output format
        #[arg(short, long, default_value = "human")]
        format: OutputFormat,
    },

    /// Apply edit directives read from stdin
    ApplyEdits {
        /// Build directory that edit paths are relative to
        #[arg(short = 'p', long = "build-dir")]
        build_dir: PathBuf,

        /// Only edit files under these paths, relative to the current directory, or matching these globs
        filters: Vec<String>,
    },

    /// Write a default gcsafe.toml
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}
