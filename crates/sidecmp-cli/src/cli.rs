use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use sidecmp_core::Verbosity;

#[derive(Parser)]
#[command(
    name = "sidecmp",
    about = "Side-by-side comparison of text, JSON, and property files",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Engine configuration file (TOML)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum VerbosityArg {
    Changes,
    Full,
}

impl From<VerbosityArg> for Verbosity {
    fn from(value: VerbosityArg) -> Self {
        match value {
            VerbosityArg::Changes => Verbosity::Changes,
            VerbosityArg::Full => Verbosity::Full,
        }
    }
}

#[derive(Subcommand)]
pub enum Command {
    /// Compare two inputs side by side
    Compare(CompareArgs),
    /// Show which comparison path two inputs would take
    Detect(DetectArgs),
    /// Show the categorized structural report for two JSON or property inputs
    Report(ReportArgs),
}

/// The two inputs. `-` reads one of them from stdin.
#[derive(Args)]
pub struct InputArgs {
    pub original: String,
    pub altered: String,
    /// Treat both inputs as property files
    #[arg(short, long)]
    pub properties: bool,
}

#[derive(Args)]
pub struct CompareArgs {
    #[command(flatten)]
    pub inputs: InputArgs,
    /// How much of a structural comparison to show
    #[arg(long)]
    pub verbosity: Option<VerbosityArg>,
}

#[derive(Args)]
pub struct DetectArgs {
    #[command(flatten)]
    pub inputs: InputArgs,
}

#[derive(Args)]
pub struct ReportArgs {
    #[command(flatten)]
    pub inputs: InputArgs,
}
