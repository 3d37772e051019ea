use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use plume::build::{build_site, Outcome};
use plume::config::Config;

/// Exit status when the posts directory was empty and a sample post was
/// written instead of a site (`EX_NOINPUT`).
const EXIT_NO_INPUT: u8 = 66;

/// Builds a static blog from a directory of markdown posts.
#[derive(Parser, Debug)]
#[command(name = "plume", version, about)]
struct Cli {
    /// The project directory. It and its parents are searched for `plume.yaml`.
    #[arg(default_value = ".")]
    project: PathBuf,

    /// Write the site here instead of the configured output directory.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> Result<ExitCode> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = Config::from_directory(&cli.project, cli.output.as_deref())
        .context("loading configuration")?;

    match build_site(&config, Utc::now()).context("building site")? {
        Outcome::Built(summary) => {
            println!("✅ {} post(s) built successfully!", summary.posts);
            println!(
                "   📝 Active: {} | 📦 Archived: {}",
                summary.active, summary.archived
            );
            if !summary.deleted.is_empty() {
                println!("🧹 Cleaned up {} old file(s)", summary.deleted.len());
            }
            println!("📂 Output directory: {}", summary.output_directory.display());
            Ok(ExitCode::SUCCESS)
        }
        Outcome::SamplePostCreated(path) => {
            println!("No markdown files found in {}", config.posts_directory.display());
            println!("📝 Created a sample post: {}", path.display());
            println!("Run the build again to generate the site.");
            Ok(ExitCode::from(EXIT_NO_INPUT))
        }
    }
}
