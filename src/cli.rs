use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "filing-sections",
    version,
    about = "Split regulatory filing HTML into outline-aligned markdown sections"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Split(SplitArgs),
    Anchors(AnchorsArgs),
}

#[derive(Args, Debug, Clone)]
pub struct SplitArgs {
    #[arg(long = "html")]
    pub html_path: PathBuf,

    #[arg(long = "outline")]
    pub outline_path: PathBuf,

    #[arg(long, default_value = "10q_content.md")]
    pub output: PathBuf,

    #[arg(long)]
    pub tree_json_path: Option<PathBuf>,

    #[arg(long)]
    pub manifest_path: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    pub dry_run: bool,
}

#[derive(Args, Debug, Clone)]
pub struct AnchorsArgs {
    #[arg(long = "html")]
    pub html_path: PathBuf,

    #[arg(long = "outline")]
    pub outline_path: PathBuf,

    #[arg(long)]
    pub report_path: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    pub fail_on_unresolved: bool,
}
