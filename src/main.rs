mod args;
mod report;

use clap::Parser;
use log::{debug, LevelFilter};
use snafu::ErrorCompat;
use std::error::Error;

use crate::args::Args;

fn main() {
    let args = Args::parse();

    if args.verbose {
        env_logger::Builder::new()
            .filter_level(LevelFilter::Debug)
            .init();
    } else {
        env_logger::init();
    }
    debug!("args: {:?}", args);

    if let Err(e) = report::run_report(&args) {
        eprintln!("An error occured: {}", e);
        let mut source = Error::source(e.as_ref());
        while let Some(cause) = source {
            eprintln!("  caused by: {}", cause);
            source = cause.source();
        }
        if let Some(bt) = ErrorCompat::backtrace(e.as_ref()) {
            eprintln!("trace: {}", bt);
        }
        std::process::exit(1);
    }
}
