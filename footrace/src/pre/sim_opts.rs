use crate::core::race::RaceConfig;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser, Clone)]
#[clap(
    version = "0.1.0",
    author = "Alexander Heilmeier <alexander.heilmeier@tum.de>",
    name = "footrace",
    about = "A foot race of independent runners polled by a race coordinator"
)]
pub struct SimOpts {
    // FLAGS ---------------------------------------------------------------------------------------
    /// Activate debug logging
    #[clap(short, long)]
    pub debug: bool,

    // OPTIONS -------------------------------------------------------------------------------------
    /// Set number of simulation runs (races with more than one run are not displayed)
    #[clap(short, long, default_value = "1")]
    pub no_sim_runs: u32,

    /// Set path to a JSON race parameter file (defaults are used for missing values)
    #[clap(parse(from_os_str), short, long)]
    pub parfile_path: Option<PathBuf>,

    /// Set real-time factor, the race is simulated that many times faster than real-time
    #[clap(short, long, default_value = "1.0")]
    pub realtime_factor: f64,

    /// Set number of runners (overrides the parameter file)
    #[clap(long)]
    pub runner_count: Option<u32>,

    /// Set race length in meters (overrides the parameter file)
    #[clap(long)]
    pub race_length: Option<f64>,

    /// Set poll interval in seconds of race time (overrides the parameter file)
    #[clap(long)]
    pub poll_interval: Option<f64>,
}

impl SimOpts {
    /// override_race_config replaces the values of the race configuration by those that were set
    /// on the command line.
    pub fn override_race_config(&self, race_config: &mut RaceConfig) {
        if let Some(runner_count) = self.runner_count {
            race_config.runner_count = runner_count;
        }
        if let Some(race_length) = self.race_length {
            race_config.race_length = race_length;
        }
        if let Some(poll_interval) = self.poll_interval {
            race_config.poll_interval = poll_interval;
        }
    }
}
