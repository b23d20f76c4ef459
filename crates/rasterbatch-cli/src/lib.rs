//! Rasterbatch CLI - folder in, transformed folder out
//!
//! Loads every image of a folder, runs the rasterbatch-core pipeline over the
//! batch and optionally writes the results as `transformed_<name>`.

pub mod args;
pub mod config;
pub mod io;
pub mod report;
pub mod session;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use log::info;

use rasterbatch_core::{BatchRunner, Pipeline, RasterImage, TransformError};

pub use args::Args;
pub use config::RunConfig;
pub use report::RunSummary;
pub use session::FolderSession;

/// Initialize env_logger. `RUST_LOG` applies unless `-v` was given.
pub fn init_logger(verbose: u8) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    match verbose {
        0 => {}
        1 => {
            builder.filter_level(log::LevelFilter::Debug);
        }
        _ => {
            builder.filter_level(log::LevelFilter::Trace);
        }
    }
    builder.format_timestamp(None).init();
}

/// Load, transform and optionally save one folder.
pub fn run(args: &Args, session: &mut FolderSession) -> Result<RunSummary> {
    let config = RunConfig::resolve(args).context("Failed to read configuration")?;
    let pipeline = Pipeline::new(&config.parameters, config.options)
        .context("Invalid transformation parameters")?;

    let loaded = session
        .open(&args.input)
        .with_context(|| format!("Failed to load images from {}", args.input.display()))?;
    if loaded.is_empty() {
        bail!("No image in {} could be decoded", args.input.display());
    }

    let mut runner = BatchRunner::new(pipeline);
    if args.sequential {
        runner = runner.sequential();
    }

    let results: Vec<Result<RasterImage, TransformError>> = if args.strict {
        runner
            .run_strict(&loaded.images)
            .context("Batch aborted")?
            .into_iter()
            .map(Ok)
            .collect()
    } else {
        runner.run(&loaded.images)
    };

    let saved: Vec<PathBuf> = match &args.output {
        Some(dir) => io::save_batch(dir, &loaded.names, &results)
            .context("Failed to save transformed images")?,
        None => {
            info!("no output directory given, nothing saved");
            Vec::new()
        }
    };

    Ok(RunSummary {
        names: loaded.names.clone(),
        results,
        saved,
    })
}
