use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Result;
use batchpress::bootstrap::{self, DEFAULT_CONFIG_FILE};
use batchpress::commands::{run_compress, CompressOptions};
use bp_core::OutputFormat;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "batchpress")]
#[command(version, about = "Batch image conversion and archiving", long_about = None)]
struct Cli {
    /// Configuration file (defaults to ./batchpress.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Convert a batch of images and write the results
    Compress {
        /// Image files to convert
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Output format: png, jpg, jpeg, webp or original
        #[arg(short, long)]
        format: Option<String>,
        /// Directory receiving converted files or the archive
        #[arg(short, long, default_value = ".")]
        out_dir: PathBuf,
        /// Write one zip archive instead of separate files
        #[arg(long)]
        archive: bool,
        /// Directory receiving a thumbnail of every admitted image
        #[arg(long, value_name = "DIR")]
        previews: Option<PathBuf>,
        /// Remote transcode endpoint, overriding the configuration
        #[arg(long)]
        endpoint: Option<String>,
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    bootstrap::init_tracing_subscriber()?;
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => bootstrap::load_config(path)?,
        None => bootstrap::load_config_or_default(Path::new(DEFAULT_CONFIG_FILE))?,
    };

    match cli.command {
        Commands::Compress {
            files,
            format,
            out_dir,
            archive,
            previews,
            endpoint,
            json,
        } => {
            if endpoint.is_some() {
                config.transcode.endpoint = endpoint;
            }
            let format = format
                .as_deref()
                .map(OutputFormat::from_token)
                .unwrap_or_else(|| config.transcode.default_output_format());

            let app = bootstrap::build_app(&config)?;
            let summary = run_compress(
                &app,
                CompressOptions {
                    files,
                    format,
                    out_dir,
                    archive,
                    previews_dir: previews,
                },
            )
            .await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!("{}", summary.render());
            }
            Ok(if summary.is_clean() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
    }
}
