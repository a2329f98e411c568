use crate::core::race::{RaceClock, RaceConfig};
use crate::core::random_source::{RandomSource, SmallRngSource};
use crate::core::runner::{spawn_runner, RunnerCommand, RunnerHandle, RunnerId};
use crate::core::timer::{TimerKey, Timers};
use crate::interfaces::display::RaceDisplay;
use crate::interfaces::race_frame::RaceFrame;
use crate::post::race_result::RaceResult;
use anyhow::Context;
use flume::{Receiver, Sender};
use helpers::buffer::RingBuffer;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::thread::JoinHandle;
use std::time::Instant;
use tracing::{debug, info, warn};

pub const POLL_TIMER_KEY: TimerKey = "poll";
const NO_TICK_INTERVALS_AVG: usize = 10;

#[derive(Debug, Clone, PartialEq)]
pub enum CoordinatorCommand {
    /// Spawns the runners and arms the poll timer
    Start,
    /// Sent by the poll timer
    PollTick,
    /// Reply of a runner to a position poll
    PositionUpdate { runner: RunnerId, position: f64 },
    /// Sent by a runner when it reached the finish line
    RunnerFinished { runner: RunnerId },
}

pub type PositionTable = BTreeMap<RunnerId, f64>;
pub type FinishLedger = BTreeMap<RunnerId, Instant>;

/// Possible statemachine states:
/// * `NotStarted` -> waiting for the start command
/// * `Racing` -> polling the runners on every tick
/// * `Finished` -> all runners finished, the next tick renders once more, shows the results, and
/// cancels the poll timer
/// * `Stopped` -> terminal, ticks are ignored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinatorState {
    NotStarted,
    Racing,
    Finished,
    Stopped,
}

/// Flow tells the message loop whether to continue after a command was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop,
}

/// The Coordinator owns the authoritative view of the race: the position table and the finish
/// ledger. Both are only changed by the coordinator's own message loop, runners are reached through
/// their handles exclusively.
pub struct Coordinator<D: RaceDisplay> {
    config: RaceConfig,
    realtime_factor: f64,
    self_tx: Sender<CoordinatorCommand>,
    display: D,
    state: CoordinatorState,
    clock: Option<RaceClock>,
    runners: Vec<RunnerHandle>,
    runner_threads: Vec<JoinHandle<()>>,
    positions: PositionTable,
    finish_ledger: FinishLedger,
    timers: Timers,
    t_prev_tick: Option<Instant>,
    tick_intervals: RingBuffer<u32>,
    race_result: Option<RaceResult>,
}

impl<D: RaceDisplay> Coordinator<D> {
    /// new creates a coordinator that is reachable through the inserted sender. The matching
    /// receiver must be handed to `run` (or drained manually).
    pub fn new(
        config: RaceConfig,
        realtime_factor: f64,
        self_tx: Sender<CoordinatorCommand>,
        display: D,
    ) -> Coordinator<D> {
        Coordinator {
            config,
            realtime_factor,
            self_tx,
            display,
            state: CoordinatorState::NotStarted,
            clock: None,
            runners: vec![],
            runner_threads: vec![],
            positions: PositionTable::new(),
            finish_ledger: FinishLedger::new(),
            timers: Timers::new(),
            t_prev_tick: None,
            tick_intervals: RingBuffer::new(NO_TICK_INTERVALS_AVG),
            race_result: None,
        }
    }

    // ---------------------------------------------------------------------------------------------
    // MESSAGE LOOP --------------------------------------------------------------------------------
    // ---------------------------------------------------------------------------------------------

    /// run processes the inbox until the race is over, stops all runners, and returns the result.
    pub fn run(mut self, rx: Receiver<CoordinatorCommand>) -> anyhow::Result<RaceResult> {
        let loop_result = self.process_inbox(&rx);

        // stop timer and runners also if the loop was left due to an error
        self.shutdown();
        loop_result?;

        self.race_result
            .take()
            .context("Coordinator stopped before all runners finished!")
    }

    fn process_inbox(&mut self, rx: &Receiver<CoordinatorCommand>) -> anyhow::Result<()> {
        while let Ok(command) = rx.recv() {
            if self.handle_command(command, Instant::now())? == Flow::Stop {
                break;
            }
        }
        Ok(())
    }

    /// handle_command dispatches a single command. `now` is the instant the command is processed.
    pub fn handle_command(
        &mut self,
        command: CoordinatorCommand,
        now: Instant,
    ) -> anyhow::Result<Flow> {
        match command {
            CoordinatorCommand::Start => {
                if self.state == CoordinatorState::NotStarted {
                    self.start(now)?;
                } else {
                    warn!("ignoring start command, race was already started");
                }
            }
            CoordinatorCommand::PollTick => match self.state {
                CoordinatorState::Racing => self.on_poll_tick(now)?,
                CoordinatorState::Finished => {
                    self.on_final_tick(now)?;
                    return Ok(Flow::Stop);
                }
                CoordinatorState::NotStarted | CoordinatorState::Stopped => {}
            },
            CoordinatorCommand::PositionUpdate { runner, position } => {
                self.on_position_update(runner, position)
            }
            CoordinatorCommand::RunnerFinished { runner } => self.on_runner_finished(runner, now),
        }

        Ok(Flow::Continue)
    }

    // ---------------------------------------------------------------------------------------------
    // HANDLERS ------------------------------------------------------------------------------------
    // ---------------------------------------------------------------------------------------------

    /// start begins the race with runners that draw from their own entropy-seeded generators.
    pub fn start(&mut self, now: Instant) -> anyhow::Result<()> {
        self.start_with(now, |_| SmallRngSource::from_entropy())
    }

    /// start_with begins the race: it spawns the runners with the random sources created by
    /// make_random, sends each a start signal, and arms the poll timer.
    pub fn start_with<R, F>(&mut self, now: Instant, mut make_random: F) -> anyhow::Result<()>
    where
        R: RandomSource + 'static,
        F: FnMut(RunnerId) -> R,
    {
        self.clock = Some(RaceClock::new(now, self.realtime_factor));

        for i in 0..self.config.runner_count {
            let id = RunnerId(i);
            let (handle, thread) = spawn_runner(id, make_random(id))?;

            self.positions.insert(id, 0.0);
            handle.tell(RunnerCommand::Begin {
                race_length: self.config.race_length,
            });

            self.runners.push(handle);
            self.runner_threads.push(thread);
        }

        self.timers.start_timer_at_fixed_rate(
            POLL_TIMER_KEY,
            self.config.get_timer_interval(self.realtime_factor),
            self.self_tx.clone(),
            || CoordinatorCommand::PollTick,
        )?;
        self.state = CoordinatorState::Racing;

        info!(
            runner_count = self.config.runner_count,
            race_length = self.config.race_length,
            poll_interval = self.config.poll_interval,
            realtime_factor = self.realtime_factor,
            "race started"
        );
        Ok(())
    }

    /// on_poll_tick requests the positions of all runners and renders the current table. The
    /// replies are processed whenever they arrive, i.e. the rendered frame contains the replies to
    /// previous polls.
    fn on_poll_tick(&mut self, now: Instant) -> anyhow::Result<()> {
        self.record_tick(now);

        for runner in self.runners.iter() {
            let delivered = runner.tell(RunnerCommand::ReportPosition {
                reply_to: self.self_tx.clone(),
            });

            if !delivered {
                debug!(runner = %runner.get_id(), "runner is gone, skipping position poll");
            }
        }

        self.render(now)
    }

    /// on_final_tick is the first tick after the ledger was completed: render a last frame, show
    /// the results, then cancel the poll timer.
    fn on_final_tick(&mut self, now: Instant) -> anyhow::Result<()> {
        self.record_tick(now);
        self.render(now)?;

        let race_result = RaceResult::from_ledger(&self.finish_ledger, &self.get_clock(now));
        self.display.render_results(&race_result)?;

        self.timers.cancel(POLL_TIMER_KEY);
        self.state = CoordinatorState::Stopped;
        self.race_result = Some(race_result);

        debug!(
            avg_tick_interval_ms = self.tick_intervals.get_avg().unwrap_or(0.0),
            "poll timer stopped"
        );
        Ok(())
    }

    /// on_position_update overwrites the position of the runner unconditionally.
    fn on_position_update(&mut self, runner: RunnerId, position: f64) {
        match self.positions.get_mut(&runner) {
            Some(cur_position) => *cur_position = position,
            None => warn!(runner = %runner, "position update of unknown runner"),
        }
    }

    /// on_runner_finished stores the finish instant of the runner if it was not stored before and
    /// switches to the finished state as soon as all runners are in the ledger.
    fn on_runner_finished(&mut self, runner: RunnerId, now: Instant) {
        if !self.positions.contains_key(&runner) {
            warn!(runner = %runner, "finish signal of unknown runner");
            return;
        }

        let racetime = self.get_clock(now).elapsed_racetime(now);

        match self.finish_ledger.entry(runner) {
            Entry::Vacant(entry) => {
                entry.insert(now);
                debug!(runner = %runner, racetime, "runner finished");
            }
            Entry::Occupied(_) => {
                debug!(runner = %runner, "ignoring repeated finish signal");
                return;
            }
        }

        if self.state == CoordinatorState::Racing
            && self.finish_ledger.len() == self.config.runner_count as usize
        {
            info!("all runners finished");
            self.state = CoordinatorState::Finished;
        }
    }

    // ---------------------------------------------------------------------------------------------
    // METHODS (HELPERS) ---------------------------------------------------------------------------
    // ---------------------------------------------------------------------------------------------

    fn render(&mut self, now: Instant) -> anyhow::Result<()> {
        let frame = RaceFrame::new(
            self.get_clock(now).elapsed_racetime(now),
            self.config.race_length,
            self.positions.iter(),
        );
        self.display.render(&frame)
    }

    fn record_tick(&mut self, now: Instant) {
        if let Some(t_prev_tick) = self.t_prev_tick {
            let interval_ms = now.saturating_duration_since(t_prev_tick).as_millis();
            self.tick_intervals.push(interval_ms.min(u32::MAX as u128) as u32);
        }
        self.t_prev_tick = Some(now);
    }

    /// get_clock returns the race clock, which falls back to a clock starting now if the race was
    /// not started yet.
    fn get_clock(&self, now: Instant) -> RaceClock {
        self.clock
            .unwrap_or_else(|| RaceClock::new(now, self.realtime_factor))
    }

    /// shutdown cancels all timers, closes the runner inboxes, and waits for the runner threads.
    pub fn shutdown(&mut self) {
        self.timers.cancel_all();
        self.runners.clear();

        for thread in self.runner_threads.drain(..) {
            if thread.join().is_err() {
                warn!("runner thread panicked");
            }
        }
    }

    pub fn get_state(&self) -> CoordinatorState {
        self.state
    }

    pub fn get_positions(&self) -> &PositionTable {
        &self.positions
    }

    pub fn get_finish_ledger(&self) -> &FinishLedger {
        &self.finish_ledger
    }

    pub fn get_race_result(&self) -> Option<&RaceResult> {
        self.race_result.as_ref()
    }

    pub fn get_display(&self) -> &D {
        &self.display
    }

    pub fn is_poll_timer_active(&self) -> bool {
        self.timers.is_timer_active(POLL_TIMER_KEY)
    }
}

impl<D: RaceDisplay> Drop for Coordinator<D> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
