use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "mmeval",
    version,
    about = "Multimodal benchmark shard building and scoring tooling"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Shard(ShardArgs),
    Score(ScoreArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ShardArgs {
    #[arg(long, default_value = "tasks.json")]
    pub tasks_manifest: PathBuf,

    #[arg(long, default_value = "jsons")]
    pub json_root: PathBuf,

    #[arg(long, default_value = ".")]
    pub image_root: PathBuf,

    #[arg(long, default_value = "shards")]
    pub output_root: PathBuf,

    #[arg(long)]
    pub manifest_dir: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    pub json_lines: bool,

    #[arg(long)]
    pub jobs: Option<usize>,
}

#[derive(Args, Debug, Clone)]
pub struct ScoreArgs {
    #[arg(long)]
    pub records: PathBuf,

    #[arg(long)]
    pub predictions: PathBuf,

    #[arg(long, default_value = ".")]
    pub image_root: PathBuf,

    #[arg(long)]
    pub report_path: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    pub json_lines: bool,
}
