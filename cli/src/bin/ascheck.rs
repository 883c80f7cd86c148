use ascheck::{BatchOptions, ConfigOverrides, QualityFlag, run_batch};
use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use std::path::PathBuf;
use symmetry::AsymmetryConfig;
use tracing::{info, warn};
use tracing_subscriber::{self, EnvFilter};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score every image with the given extension in a directory
    Run {
        /// Directory holding the photographs
        read_dir: PathBuf,
        /// File extension to process, e.g. "png" or ".JPG"
        ext: String,
        /// TOML or JSON configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Binarization method (otsu, adaptive-mean)
        #[arg(long)]
        threshold_method: Option<String>,
        /// Opening and closing iterations
        #[arg(long)]
        morph_iterations: Option<u8>,
        /// Border added around the mask before cleaning, in pixels
        #[arg(long)]
        pad_width: Option<u32>,
        /// Padding fill (constant-white, edge-replicate)
        #[arg(long)]
        pad_mode: Option<String>,
        /// Contour point storage (simple, none)
        #[arg(long)]
        chain_approximation: Option<String>,
        /// Candidate ranking (point-count, area, bounding-box-area)
        #[arg(long)]
        ranking: Option<String>,
        /// Mirror axis relative to the object's extent (longest, shortest)
        #[arg(long)]
        mirror_axis: Option<String>,
        /// Skip the difference mask and contour overlay outputs
        #[arg(long)]
        no_diagnostics: bool,
        /// Where per-image outputs go (default: <READ_DIR>/bw)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
        /// Results table path (default: ascheck_results_<dirname>.txt)
        #[arg(short, long)]
        results: Option<PathBuf>,
        /// Images processed concurrently (default: available cores)
        #[arg(short, long)]
        jobs: Option<usize>,
        /// Only process the first N files
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Print the JSON schema of the configuration file
    Schema,
    /// Write a configuration file with every default filled in
    InitConfig {
        /// Destination TOML file
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            read_dir,
            ext,
            config,
            threshold_method,
            morph_iterations,
            pad_width,
            pad_mode,
            chain_approximation,
            ranking,
            mirror_axis,
            no_diagnostics,
            output_dir,
            results,
            jobs,
            limit,
        } => {
            let base = match &config {
                Some(path) => {
                    info!("Loading configuration from {}", path.display());
                    AsymmetryConfig::from_file(path)?
                }
                None => AsymmetryConfig::default(),
            };
            let overrides = ConfigOverrides {
                threshold_method,
                morph_iterations,
                pad_width,
                pad_mode,
                chain_approximation,
                ranking,
                mirror_axis,
                no_diagnostics,
            };

            let mut options = BatchOptions::new(read_dir, ext);
            options.config = overrides.apply(base);
            options.output_dir = output_dir;
            options.results_path = results;
            options.limit = limit;
            if let Some(jobs) = jobs {
                options.jobs = jobs;
            }

            let summary = run_batch(options).await?;

            for record in summary
                .records
                .iter()
                .filter(|r| r.flag == QualityFlag::Suspicious)
            {
                warn!("Check {} (score {:.4})", record.file_name, record.score);
            }
            info!(
                "Scored {} image(s), {} suspicious, {} skipped",
                summary.records.len(),
                summary.suspicious(),
                summary.skipped.len()
            );
            info!("Outputs in {}", summary.output_dir.display());
        }
        Commands::Schema => {
            let schema = AsymmetryConfig::schema();
            println!("{}", serde_json::to_string_pretty(&schema)?);
        }
        Commands::InitConfig { output } => {
            AsymmetryConfig::default().to_toml_file(&output)?;
            info!("Wrote default configuration to {}", output.display());
        }
    }

    Ok(())
}
