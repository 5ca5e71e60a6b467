use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use gdb_landxml::backend;
use gdb_landxml::{
    run_conversion, run_reverse_conversion, ConversionConfig, ReverseConfig, TracingSink,
};
use rayon::ThreadPoolBuilder;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// PROJ data directory (the one containing proj.db)
    #[arg(long, global = true, value_name = "DIR")]
    proj_data: Option<PathBuf>,

    /// Log debug output (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert every .gdb folder in a directory to LandXML CgPoints
    ToLandxml {
        /// Directory holding the .gdb folders
        #[arg(short, long, value_name = "DIR", default_value = "input_gdbs")]
        input: PathBuf,

        /// Directory receiving <name>_combined.xml files
        #[arg(short, long, value_name = "DIR", default_value = "output_xmls")]
        output: PathBuf,
    },

    /// Convert every LandXML file below a directory back to a File Geodatabase
    ToGdb {
        /// Directory searched recursively for .xml files
        #[arg(short, long, value_name = "DIR", default_value = "input_xmls")]
        input: PathBuf,

        /// Directory receiving <name>.gdb folders
        #[arg(short, long, value_name = "DIR", default_value = "output_gdbs")]
        output: PathBuf,

        /// Name of the point layer to create
        #[arg(long, value_name = "NAME", default_value = gdb_landxml::writer::DEFAULT_LAYER_NAME)]
        layer: String,

        /// Number of threads used to parse XML (default: number of CPU cores)
        #[arg(short, long)]
        threads: Option<usize>,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    // RUST_LOG wins over --verbose
    let default_level = if args.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let start_time = std::time::Instant::now();

    if let Some(dir) = &args.proj_data {
        backend::configure_proj_data(dir)
            .with_context(|| format!("Failed to use PROJ data directory {:?}", dir))?;
    }
    backend::ensure_ready().context("GDAL is not usable for File Geodatabases")?;

    let sink = TracingSink;
    match args.command {
        Command::ToLandxml { input, output } => {
            let config = ConversionConfig::new(input, output);
            let summary = run_conversion(&config, &sink)
                .with_context(|| format!("Conversion of {:?} failed", config.input_dir))?;
            info!("Converted {} of {} GDBs", summary.converted, summary.found);
        }
        Command::ToGdb {
            input,
            output,
            layer,
            threads,
        } => {
            if let Some(threads) = threads {
                ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .build_global()
                    .context("Failed to build thread pool")?;
            }
            let config = ReverseConfig::new(input, output).with_layer_name(layer);
            let summary = run_reverse_conversion(&config, &sink)
                .with_context(|| format!("Conversion of {:?} failed", config.input_dir))?;
            info!("Converted {} of {} XML files", summary.converted, summary.found);
        }
    }

    let elapsed = start_time.elapsed();
    info!("Total processing time: {:?}", elapsed);

    Ok(())
}
