// Copyright (c) 2023 Graphcore Ltd. All rights reserved.

//! Run configuration from defaults, a TOML file, the environment and the
//! command line.
//!
//! [`SimConfig`] is both the clap parser and the serde representation. Every
//! field is optional so that only the sources that actually set a value
//! override it. Sources are merged lowest to highest priority:
//!
//! 1. [`SimConfig::default`],
//! 2. the TOML file named by `--config`,
//! 3. environment variables prefixed [`ENV_PREFIX`] (`SIM_EPON_TEST_FRAMES`),
//! 4. command-line options.
//!
//! The merged configuration is then checked and turned into a [`RunConfig`].

use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};
use epon_engine::sim_error;
use epon_engine::types::SimError;
use epon_models::constants::{
    BURST_FRAMES, MAX_PACKET_BYTES, MIN_PACKET_BYTES, TEST_FRAMES,
};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

pub const ENV_PREFIX: &str = "SIM_EPON_";

/// The data path to simulate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    /// 10G-EPON, OLT to ONU, continuous mode.
    #[default]
    Downstream,
    /// 10G-EPON, ONU to OLT, burst mode.
    Upstream,
    /// NG-EPON, ONU to OLT through the multi-lane RS.
    NgUpstream,
}

#[derive(Parser, Serialize, Deserialize, Clone, Debug, PartialEq)]
#[command(about = "Cycle-accurate latency simulation of the EPON data plane")]
pub struct SimConfig {
    /// Path to a TOML file setting any of the options below.
    #[arg(long)]
    #[serde(skip)]
    pub config: Option<PathBuf>,

    /// Data path to simulate.
    #[arg(long, value_enum)]
    pub direction: Option<Direction>,

    /// Number of frames to deliver before the run ends.
    #[arg(long)]
    pub test_frames: Option<usize>,

    /// Smallest packet size in bytes.
    #[arg(long)]
    pub min_packet_bytes: Option<usize>,

    /// Largest packet size in bytes.
    #[arg(long)]
    pub max_packet_bytes: Option<usize>,

    /// Probability that a packet is of the smallest size.
    #[arg(long)]
    pub min_size_probability: Option<f64>,

    /// Delay each frame by a random part of an FEC codeword.
    #[arg(long)]
    pub sparse_traffic: Option<bool>,

    /// Frames per upstream burst.
    #[arg(long)]
    pub burst_frames: Option<usize>,

    /// Write the delay histograms after the summary.
    #[arg(long)]
    pub histogram: Option<bool>,

    /// Only sample delays of minimum-size frames.
    #[arg(long)]
    pub min_size_frames_only: Option<bool>,

    /// Seed for all random number generators. Runs are repeatable when set.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Byte times after which an unfinished run fails. Use 0 for no limit.
    #[arg(long)]
    pub max_ticks: Option<u64>,

    /// CSV file to write statistics to. Written to stdout otherwise.
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Level of log message to display.
    #[arg(long)]
    pub stdout_level: Option<log::Level>,

    /// Set a regular expression for which entities should have logging level
    /// set to `--stdout-level`. Others will have level set to `Error`.
    #[arg(long)]
    pub stdout_filter_regex: Option<String>,

    /// Write log messages to this file instead of stderr.
    #[arg(long)]
    pub log_file: Option<String>,

    /// Show a progress bar for the delivered frame count.
    #[arg(long)]
    pub progress: Option<bool>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            config: None,
            direction: Some(Direction::default()),
            test_frames: Some(TEST_FRAMES),
            min_packet_bytes: Some(MIN_PACKET_BYTES),
            max_packet_bytes: Some(MAX_PACKET_BYTES),
            min_size_probability: Some(0.25),
            sparse_traffic: Some(false),
            burst_frames: Some(BURST_FRAMES),
            histogram: Some(false),
            min_size_frames_only: Some(false),
            seed: None,
            max_ticks: Some(0),
            output: None,
            stdout_level: Some(log::Level::Warn),
            stdout_filter_regex: Some(String::new()),
            log_file: None,
            progress: Some(false),
        }
    }
}

impl SimConfig {
    fn figment_with_defaults() -> Figment {
        Figment::new().merge(Serialized::defaults(SimConfig::default()))
    }

    fn figment_conf_file_merge(figment: Figment, conf_file: &Path) -> Result<Figment, SimError> {
        if conf_file.is_dir() {
            return sim_error!(format!("{} is not a file path", conf_file.display()));
        }
        if !conf_file.exists() {
            return sim_error!(format!("{} not found", conf_file.display()));
        }
        Ok(figment.merge(Toml::file(conf_file)))
    }

    fn figment_env_var_merge(figment: Figment) -> Figment {
        figment.merge(Env::prefixed(ENV_PREFIX))
    }

    /// Values given on the command line win over everything else.
    fn clap_merge(mut self, cli: SimConfig) -> SimConfig {
        macro_rules! take_given {
            ($($field:ident),*) => {
                $(
                    if cli.$field.is_some() {
                        self.$field = cli.$field;
                    }
                )*
            };
        }
        take_given!(
            config,
            direction,
            test_frames,
            min_packet_bytes,
            max_packet_bytes,
            min_size_probability,
            sparse_traffic,
            burst_frames,
            histogram,
            min_size_frames_only,
            seed,
            max_ticks,
            output,
            stdout_level,
            stdout_filter_regex,
            log_file,
            progress
        );
        self
    }

    /// Merge all configuration sources below the parsed command line `cli`.
    pub fn merge_sources(cli: SimConfig) -> Result<SimConfig, SimError> {
        let mut figment = Self::figment_with_defaults();
        if let Some(conf_file) = &cli.config {
            figment = Self::figment_conf_file_merge(figment, conf_file)?;
        }
        figment = Self::figment_env_var_merge(figment);

        let config: SimConfig = figment
            .extract()
            .map_err(|e| SimError(format!("Invalid configuration: {e}")))?;
        Ok(config.clap_merge(cli))
    }

    /// Merge all sources and check the result.
    pub fn resolve(cli: SimConfig) -> Result<RunConfig, SimError> {
        RunConfig::try_from(Self::merge_sources(cli)?)
    }
}

/// A checked configuration with every value present.
#[derive(Clone, Debug, PartialEq)]
pub struct RunConfig {
    pub direction: Direction,
    pub test_frames: usize,
    pub min_packet_bytes: usize,
    pub max_packet_bytes: usize,
    pub min_size_probability: f64,
    pub sparse_traffic: bool,
    pub burst_frames: usize,
    pub histogram: bool,
    pub min_size_frames_only: bool,
    pub seed: Option<u64>,
    pub max_ticks: u64,
    pub output: Option<PathBuf>,
    pub stdout_level: log::Level,
    pub stdout_filter_regex: String,
    pub log_file: Option<String>,
    pub progress: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        // The defaults always pass the checks.
        match RunConfig::try_from(SimConfig::default()) {
            Ok(config) => config,
            Err(e) => panic!("{e}"),
        }
    }
}

impl TryFrom<SimConfig> for RunConfig {
    type Error = SimError;

    fn try_from(config: SimConfig) -> Result<Self, SimError> {
        let defaults = SimConfig::default();
        macro_rules! value {
            ($field:ident) => {
                match config.$field.or(defaults.$field) {
                    Some(value) => value,
                    None => return sim_error!(concat!("No value for ", stringify!($field))),
                }
            };
        }

        let run_config = RunConfig {
            direction: value!(direction),
            test_frames: value!(test_frames),
            min_packet_bytes: value!(min_packet_bytes),
            max_packet_bytes: value!(max_packet_bytes),
            min_size_probability: value!(min_size_probability),
            sparse_traffic: value!(sparse_traffic),
            burst_frames: value!(burst_frames),
            histogram: value!(histogram),
            min_size_frames_only: value!(min_size_frames_only),
            seed: config.seed,
            max_ticks: value!(max_ticks),
            output: config.output,
            stdout_level: value!(stdout_level),
            stdout_filter_regex: value!(stdout_filter_regex),
            log_file: config.log_file,
            progress: value!(progress),
        };
        run_config.check()?;
        Ok(run_config)
    }
}

impl RunConfig {
    fn check(&self) -> Result<(), SimError> {
        if self.test_frames == 0 {
            return sim_error!("test_frames must be at least 1");
        }
        if self.burst_frames == 0 {
            return sim_error!("burst_frames must be at least 1");
        }
        if self.min_packet_bytes < MIN_PACKET_BYTES {
            return sim_error!(format!(
                "min_packet_bytes {} is below the Ethernet minimum of {MIN_PACKET_BYTES}",
                self.min_packet_bytes
            ));
        }
        if self.max_packet_bytes > MAX_PACKET_BYTES {
            return sim_error!(format!(
                "max_packet_bytes {} is above the supported maximum of {MAX_PACKET_BYTES}",
                self.max_packet_bytes
            ));
        }
        if self.min_packet_bytes > self.max_packet_bytes {
            return sim_error!(format!(
                "min_packet_bytes {} is above max_packet_bytes {}",
                self.min_packet_bytes, self.max_packet_bytes
            ));
        }
        if !(0.0..=1.0).contains(&self.min_size_probability) {
            return sim_error!(format!(
                "min_size_probability {} is not a probability",
                self.min_size_probability
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_line_overrides_only_given_values() {
        let defaults = SimConfig::default();
        let cli = SimConfig::parse_from(["sim-epon", "--test-frames", "12"]);
        assert_eq!(cli.direction, None);

        let merged = defaults.clone().clap_merge(cli);
        assert_eq!(merged.test_frames, Some(12));
        assert_eq!(merged.direction, defaults.direction);
    }

    #[test]
    fn direction_names() {
        let cli = SimConfig::parse_from(["sim-epon", "--direction", "ng-upstream"]);
        assert_eq!(cli.direction, Some(Direction::NgUpstream));
    }

    #[test]
    fn defaults_are_valid() {
        let config = RunConfig::default();
        assert_eq!(config.test_frames, TEST_FRAMES);
        assert_eq!(config.max_ticks, 0);
        assert_eq!(config.seed, None);
    }
}
