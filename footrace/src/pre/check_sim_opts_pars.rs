use crate::core::race::RaceConfig;
use crate::pre::sim_opts::SimOpts;
use anyhow::Context;
use helpers::general::InputValueError;

/// check_sim_opts_pars assures that the inserted options and parameters are within reasonable
/// limits and raises an error if not.
pub fn check_sim_opts_pars(sim_opts: &SimOpts, race_config: &RaceConfig) -> anyhow::Result<()> {
    // PART 1: SIMULATION OPTIONS
    if sim_opts.no_sim_runs < 1 {
        return Err(InputValueError).context(format!(
            "no_sim_runs must be at least equal to one, but is {}!",
            sim_opts.no_sim_runs
        ));
    }

    if !(0.1 <= sim_opts.realtime_factor && sim_opts.realtime_factor <= 1000.0) {
        return Err(InputValueError).context(format!(
            "realtime_factor is {:.3}, which is not within the reasonable range of [0.1, 1000.0]!",
            sim_opts.realtime_factor
        ));
    }

    // PART 2: RACE PARAMETERS
    if race_config.runner_count < 1 {
        return Err(InputValueError).context("runner_count must be at least equal to one!");
    }

    if !(race_config.race_length > 0.0 && race_config.race_length.is_finite()) {
        return Err(InputValueError).context(format!(
            "race_length is {:.3}m, but must be a positive distance!",
            race_config.race_length
        ));
    }

    if !(0.01 <= race_config.poll_interval && race_config.poll_interval <= 10.0) {
        return Err(InputValueError).context(format!(
            "poll_interval is {:.3}s, which is not within the reasonable range of [0.01, 10.0]s!",
            race_config.poll_interval
        ));
    }

    Ok(())
}
