//! Quill CLI — the command-line interface for the Quill documentation
//! generator.
//!
//! Provides `quill init` for project scaffolding and `quill build` for
//! running the incremental documentation build.

#![warn(missing_docs)]

mod build;
mod init;
mod pipeline;

use std::process;

use clap::{Parser, Subcommand};

/// Quill — an incremental documentation generator.
#[derive(Parser, Debug)]
#[command(name = "quill", version, about = "Quill documentation generator")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a custom `quill.toml` configuration file or project directory.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a new Quill project.
    Init {
        /// Project name (creates a subdirectory). If omitted, initializes in
        /// the current directory.
        name: Option<String>,
    },
    /// Build the documentation for the current project.
    Build(BuildArgs),
}

/// Arguments for the `quill build` subcommand.
#[derive(Parser, Debug)]
pub struct BuildArgs {
    /// Discard the build state cache and reprocess every file.
    #[arg(short, long)]
    pub rebuild: bool,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether to print verbose information.
    pub verbose: bool,
    /// Optional path to a custom config file or project directory.
    pub config: Option<String>,
}

fn main() {
    let cli = Cli::parse();

    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
        config: cli.config,
    };

    let result = match cli.command {
        Command::Init { name } => init::run(name),
        Command::Build(ref args) => build::run(args, &global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}
