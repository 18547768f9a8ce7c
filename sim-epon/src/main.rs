// Copyright (c) 2023 Graphcore Ltd. All rights reserved.

//! Run one EPON latency simulation and write the delay statistics as CSV.
//!
//! For example, run using:
//!   cargo run --release --bin sim-epon -- --direction upstream
//! --test-frames 1000 --seed 7 --output upstream.csv --progress true

use std::fs::File;
use std::io::{self, BufWriter, Write};

use byte_unit::{Byte, UnitType};
use clap::Parser;
use epon_engine::types::SimError;
use epon_track::Track;
use epon_track::builder::{TrackerConfig, setup_trackers};
use epon_track::entity::toplevel;
use indicatif::ProgressBar;
use log::{LevelFilter, info};
use sim_epon::config::{RunConfig, SimConfig};
use sim_epon::pipeline::{self, RunSummary};
use simplelog::{ConfigBuilder, WriteLogger};

/// Route plain `log` records to stderr, keeping stdout for the statistics.
fn init_logger(level: log::Level) -> Result<(), SimError> {
    let config = ConfigBuilder::new()
        .set_time_level(LevelFilter::Off)
        .set_location_level(LevelFilter::Off)
        .set_thread_level(LevelFilter::Off)
        .set_target_level(LevelFilter::Off)
        .build();
    WriteLogger::init(level.to_level_filter(), config, io::stderr())
        .map_err(|e| SimError(format!("Failed to set up logging: {e}")))
}

fn write_stats(config: &RunConfig, summary: &RunSummary) -> Result<(), SimError> {
    match &config.output {
        Some(path) => {
            let file = File::create(path)
                .map_err(|e| SimError(format!("Failed to create {}: {e}", path.display())))?;
            let mut w = BufWriter::new(file);
            summary
                .stats
                .write_csv(&mut w, summary.ticks, config.histogram)?;
        }
        None => {
            let mut w = io::stdout().lock();
            summary
                .stats
                .write_csv(&mut w, summary.ticks, config.histogram)?;
            w.flush()?;
        }
    }
    Ok(())
}

fn report(summary: &RunSummary) {
    let delivered = Byte::from_u64(summary.stats.delivered_bytes())
        .get_appropriate_unit(UnitType::Binary);
    info!(
        "Delivered {} frames ({delivered:.2}) in {} byte times",
        summary.frames, summary.ticks
    );
    info!(
        "Throughput {:.4}, total delay {}..{} byte times",
        summary.stats.throughput(summary.ticks),
        summary.stats.total().min(),
        summary.stats.total().max()
    );
}

fn main() -> Result<(), SimError> {
    let config = SimConfig::resolve(SimConfig::parse())?;
    init_logger(config.stdout_level)?;

    let tracker = setup_trackers(&TrackerConfig {
        enable: true,
        level: config.stdout_level,
        filter_regex: &config.stdout_filter_regex,
        file: config.log_file.as_deref(),
    })?;
    let top = toplevel(&tracker, "top");

    let progress_bar = if config.progress {
        ProgressBar::new(config.test_frames as u64)
    } else {
        ProgressBar::hidden()
    };

    let result = pipeline::build(&top, &config).and_then(|mut path| {
        pipeline::run(path.as_mut(), &config, |frames| {
            progress_bar.set_position(frames as u64);
        })
    });
    progress_bar.finish_and_clear();
    tracker.shutdown();

    let summary = result?;
    report(&summary);
    write_stats(&config, &summary)
}
