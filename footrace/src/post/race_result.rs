use crate::core::coordinator::FinishLedger;
use crate::core::race::RaceClock;
use crate::core::runner::RunnerId;
use helpers::general::{argsort, SortOrder};
use std::io::{self, Write};
use std::time::Instant;

/// FinishEntry contains the race time (s) a runner needed to reach the finish line.
#[derive(Debug, Clone, PartialEq)]
pub struct FinishEntry {
    pub runner: RunnerId,
    pub racetime: f64,
}

/// RaceResult contains the finishing order of a race, sorted by ascending race time. Runners with
/// identical finish instants are ordered by their runner id.
#[derive(Debug, Clone, PartialEq)]
pub struct RaceResult {
    pub finish_order: Vec<FinishEntry>,
}

impl RaceResult {
    pub fn from_ledger(finish_ledger: &FinishLedger, clock: &RaceClock) -> RaceResult {
        // the ledger iterates in runner id order, the stable sort therefore breaks ties by id
        let runners: Vec<RunnerId> = finish_ledger.keys().copied().collect();
        let finish_instants: Vec<Instant> = finish_ledger.values().copied().collect();

        RaceResult {
            finish_order: argsort(&finish_instants, SortOrder::Ascending)
                .into_iter()
                .map(|idx| FinishEntry {
                    runner: runners[idx],
                    racetime: clock.elapsed_racetime(finish_instants[idx]),
                })
                .collect(),
        }
    }

    pub fn get_winner(&self) -> Option<&FinishEntry> {
        self.finish_order.first()
    }

    /// write_results writes one line per runner in finishing order.
    pub fn write_results<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "RESULT: Finishing order")?;

        for (rank, entry) in self.finish_order.iter().enumerate() {
            writeln!(
                out,
                "{:3}. Runner {} finished in {:.3} seconds.",
                rank + 1,
                entry.runner,
                entry.racetime
            )?;
        }

        out.flush()
    }

    /// print_results prints the finishing order to the console output.
    pub fn print_results(&self) -> io::Result<()> {
        self.write_results(&mut io::stdout().lock())
    }
}

/// count_wins returns how often each runner won one of the inserted races (index = runner id).
pub fn count_wins(race_results: &[RaceResult], runner_count: u32) -> Vec<u32> {
    let mut wins = vec![0; runner_count as usize];

    for winner in race_results.iter().filter_map(|result| result.get_winner()) {
        if let Some(no_wins) = wins.get_mut(winner.runner.0 as usize) {
            *no_wins += 1;
        }
    }

    wins
}
