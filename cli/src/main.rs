use clap::Parser;
use footrace::core::handle_race::handle_race;
use footrace::interfaces::display::{ConsoleDisplay, SilentDisplay};
use footrace::post::race_result::{count_wins, RaceResult};
use footrace::pre::check_sim_opts_pars::check_sim_opts_pars;
use footrace::pre::read_sim_pars::read_sim_pars;
use footrace::pre::sim_opts::SimOpts;
use rayon::prelude::*;
use std::cmp::min;
use std::time::Instant;
use tracing::info;
use tracing_subscriber::EnvFilter;

// set maximum number of concurrently running races in case of running more than a single race
const MAX_NO_CONCURRENT_JOBS: u32 = 200;

fn main() -> anyhow::Result<()> {
    // PRE-PROCESSING ------------------------------------------------------------------------------
    // get simulation options from the command line arguments and read race parameters
    let sim_opts: SimOpts = SimOpts::parse();
    init_tracing(sim_opts.debug);

    let mut race_config = read_sim_pars(sim_opts.parfile_path.as_deref())?;
    sim_opts.override_race_config(&mut race_config);

    // check simulation options and parameters
    check_sim_opts_pars(&sim_opts, &race_config)?;

    info!(
        runner_count = race_config.runner_count,
        race_length = race_config.race_length,
        no_sim_runs = sim_opts.no_sim_runs,
        "simulating foot race"
    );

    // EXECUTION -----------------------------------------------------------------------------------
    let t_start = Instant::now();
    let mut race_results: Vec<RaceResult> = Vec::with_capacity(sim_opts.no_sim_runs as usize);

    if sim_opts.no_sim_runs == 1 {
        // SINGLE RACE -----------------------------------------------------------------------------
        race_results.push(handle_race(
            &race_config,
            sim_opts.realtime_factor,
            ConsoleDisplay::to_stdout(),
        )?);
    } else {
        // MULTIPLE RACES --------------------------------------------------------------------------
        let mut no_races_left = sim_opts.no_sim_runs;

        while no_races_left > 0 {
            // calculate number of races to execute in current loop
            let tmp_no_sim_runs = min(no_races_left, MAX_NO_CONCURRENT_JOBS);

            // simulate the races and save the results
            let tmp_race_results: anyhow::Result<Vec<RaceResult>> = (0..tmp_no_sim_runs)
                .into_par_iter()
                .map(|_| handle_race(&race_config, sim_opts.realtime_factor, SilentDisplay))
                .collect();
            race_results.extend(tmp_race_results?);

            // reduce remaining races
            no_races_left -= tmp_no_sim_runs;
        }
    }

    info!(
        execution_time_ms = t_start.elapsed().as_millis() as u64,
        "all races finished"
    );

    // POST-PROCESSING -----------------------------------------------------------------------------
    // the finishing order of a single race was already shown by the console display
    if race_results.len() > 1 {
        for (i, race_result) in race_results.iter().enumerate() {
            if let Some(winner) = race_result.get_winner() {
                println!(
                    "RESULT: Race {:3} won by runner {} in {:.3} seconds",
                    i + 1,
                    winner.runner,
                    winner.racetime
                );
            }
        }

        println!("RESULT: Wins per runner");
        for (runner, no_wins) in count_wins(&race_results, race_config.runner_count)
            .iter()
            .enumerate()
        {
            println!("{:3} : {}", runner, no_wins);
        }
    }

    Ok(())
}

/// init_tracing logs to stderr such that the race display on stdout is not interrupted. RUST_LOG
/// takes precedence over the debug flag.
fn init_tracing(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
