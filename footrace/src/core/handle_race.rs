use crate::core::coordinator::{Coordinator, CoordinatorCommand};
use crate::core::race::RaceConfig;
use crate::interfaces::display::RaceDisplay;
use crate::post::race_result::RaceResult;
use anyhow::Context;

/// handle_race creates a coordinator for the inserted configuration, starts the race, and blocks
/// until all runners finished. The poll timer fires every poll interval divided by the real-time
/// factor. All runner and timer threads are stopped when the function returns.
pub fn handle_race<D: RaceDisplay>(
    race_config: &RaceConfig,
    realtime_factor: f64,
    display: D,
) -> anyhow::Result<RaceResult> {
    let (tx, rx) = flume::unbounded();
    let coordinator = Coordinator::new(race_config.to_owned(), realtime_factor, tx.clone(), display);

    tx.send(CoordinatorCommand::Start)
        .context("Failed to send start command to the coordinator!")?;

    // the coordinator keeps its own sender, the local one is not needed anymore
    drop(tx);

    coordinator.run(rx)
}
