//! `rasterbatch` - transform every image in a folder.

use std::process::ExitCode;

use clap::Parser;
use log::{error, warn};

use rasterbatch_cli::{init_logger, run, Args, FolderSession};

fn main() -> ExitCode {
    let args = Args::parse();
    init_logger(args.verbose);

    let mut session = FolderSession::new();
    let summary = match run(&args, &mut session) {
        Ok(summary) => summary,
        Err(err) => {
            error!("{err:#}");
            return ExitCode::FAILURE;
        }
    };

    for line in summary.lines() {
        println!("{line}");
    }

    let failed = summary.failed();
    if failed > 0 {
        warn!("{} of {} images failed", failed, summary.results.len());
    }
    if let Some(dir) = &args.output {
        println!("Saved {} images to {}", summary.saved.len(), dir.display());
    }

    ExitCode::SUCCESS
}
