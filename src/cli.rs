use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "dbgc", version)]
#[command(about = "Find, comment out, re-enable or delete leftover debug print statements", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Report debug statements; exits with status 1 if any are found
    Scan(CommonArgs),
    /// Comment out debug statements
    Off(CommonArgs),
    /// Uncomment previously commented-out debug statements
    On(CommonArgs),
    /// Delete debug statements, active and commented-out
    Delete(CommonArgs),
}

#[derive(Args, Clone)]
pub struct CommonArgs {
    /// Path to file or directory (defaults to current directory)
    pub path: Option<PathBuf>,
    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
    /// Detect all output calls, not just debug statements
    #[arg(short, long)]
    pub all: bool,
    /// Pick the statements to change one by one
    #[arg(short, long)]
    pub interactive: bool,
    /// Show what would be changed without modifying files
    #[arg(short = 'd', long)]
    pub dry_run: bool,
    /// Force a language preset (go, c, cpp, java, rust) for every file
    #[arg(short, long)]
    pub lang: Option<String>,
    /// JSON file with extra call targets and settings
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Keyword marking a debug statement (case-insensitive)
    #[arg(short, long)]
    pub keyword: Option<String>,
    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Text)]
    pub format: Format,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    Text,
    Json,
}
