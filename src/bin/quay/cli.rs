//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

/// Quay - partitions an annotated source tree into execution units
#[derive(Parser)]
#[command(name = "quay")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compile a project into execution units
    Compile(CompileArgs),

    /// Explain why a file belongs to its execution units
    Explain(ExplainArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct CompileArgs {
    /// Project root (defaults to the nearest directory with quay.toml, or the current directory)
    pub path: Option<PathBuf>,

    /// Print the compilation report as JSON
    #[arg(long)]
    pub json: bool,

    /// Number of worker threads
    #[arg(short, long, env = "QUAY_JOBS")]
    pub jobs: Option<usize>,
}

#[derive(Args)]
pub struct ExplainArgs {
    /// File to explain, relative to the project root
    pub file: String,

    /// Project root (defaults to the nearest directory with quay.toml, or the current directory)
    pub path: Option<PathBuf>,

    /// Print the explanation as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
