use crate::core::coordinator::CoordinatorCommand;
use crate::core::random_source::RandomSource;
use crate::core::speed_model::SpeedModel;
use anyhow::Context;
use flume::{Receiver, SendError, Sender};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::thread::{self, JoinHandle};
use tracing::{debug, trace};

/// RunnerId is the start number of a runner, starting at 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RunnerId(pub u32);

impl fmt::Display for RunnerId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug)]
pub enum RunnerCommand {
    /// Start signal, the runner draws its speed adjustment and begins at position 0
    Begin { race_length: f64 },
    /// Poll request, the runner moves by one tick and replies with its new position
    ReportPosition { reply_to: Sender<CoordinatorCommand> },
}

/// RunnerHandle is the coordinator's only way to reach a runner. Handles are compared, ordered,
/// and hashed by their runner id.
#[derive(Debug, Clone)]
pub struct RunnerHandle {
    id: RunnerId,
    tx: Sender<RunnerCommand>,
}

impl RunnerHandle {
    pub fn new(id: RunnerId, tx: Sender<RunnerCommand>) -> RunnerHandle {
        RunnerHandle { id, tx }
    }

    pub fn get_id(&self) -> RunnerId {
        self.id
    }

    /// tell enqueues a command for the runner without waiting for it to be processed. It returns
    /// false if the runner is gone.
    pub fn tell(&self, command: RunnerCommand) -> bool {
        self.tx.send(command).is_ok()
    }
}

impl PartialEq for RunnerHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for RunnerHandle {}

impl PartialOrd for RunnerHandle {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RunnerHandle {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

impl Hash for RunnerHandle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

#[derive(Debug)]
enum Phase {
    NotStarted,
    Running(SpeedModel),
    Finished { race_length: f64 },
}

/// Runner contains the statemachine of a single runner. All transitions are triggered by
/// received commands, a runner never acts on its own.
///
/// Possible statemachine states:
/// * `NotStarted` -> initial state, position polls are answered with 0 without changing anything
/// * `Running` -> every position poll advances the speed model by one tick
/// * `Finished` -> reached as soon as the position equals the race length, the state is frozen and
/// every position poll is answered with the race length
#[derive(Debug)]
pub struct Runner<R: RandomSource> {
    id: RunnerId,
    random: R,
    phase: Phase,
}

impl<R: RandomSource> Runner<R> {
    pub fn new(id: RunnerId, random: R) -> Runner<R> {
        Runner {
            id,
            random,
            phase: Phase::NotStarted,
        }
    }

    pub fn get_id(&self) -> RunnerId {
        self.id
    }

    pub fn get_position(&self) -> f64 {
        match &self.phase {
            Phase::NotStarted => 0.0,
            Phase::Running(model) => model.get_position(),
            Phase::Finished { race_length } => *race_length,
        }
    }

    /// get_speed returns the current speed, which is only defined while running.
    pub fn get_speed(&self) -> Option<f64> {
        match &self.phase {
            Phase::Running(model) => Some(model.get_speed()),
            _ => None,
        }
    }

    /// get_max_speed returns the maximum speed, which is only defined while running.
    pub fn get_max_speed(&self) -> Option<f64> {
        match &self.phase {
            Phase::Running(model) => Some(model.get_max_speed()),
            _ => None,
        }
    }

    pub fn is_started(&self) -> bool {
        !matches!(self.phase, Phase::NotStarted)
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.phase, Phase::Finished { .. })
    }

    /// handle_command processes a single command. An error is returned if a reply could not be
    /// delivered because the coordinator is gone.
    pub fn handle_command(
        &mut self,
        command: RunnerCommand,
    ) -> Result<(), SendError<CoordinatorCommand>> {
        match command {
            RunnerCommand::Begin { race_length } => {
                self.begin(race_length);
                Ok(())
            }
            RunnerCommand::ReportPosition { reply_to } => {
                let (position, just_finished) = self.report_position();

                reply_to.send(CoordinatorCommand::PositionUpdate {
                    runner: self.id,
                    position,
                })?;

                if just_finished {
                    reply_to.send(CoordinatorCommand::RunnerFinished { runner: self.id })?;
                }
                Ok(())
            }
        }
    }

    fn begin(&mut self, race_length: f64) {
        if self.is_started() {
            debug!(runner = %self.id, "ignoring repeated start signal");
            return;
        }

        let speed_adjustment_factor = self.random.next_speed_adjustment_factor();
        let model = SpeedModel::new(race_length, speed_adjustment_factor);

        debug!(
            runner = %self.id,
            speed_adjustment_factor,
            max_speed = model.get_max_speed(),
            "runner started"
        );
        self.phase = Phase::Running(model);
    }

    /// report_position returns the position to be reported and whether the runner finished within
    /// this tick.
    fn report_position(&mut self) -> (f64, bool) {
        let id = self.id;

        let (position, finished) = match &mut self.phase {
            Phase::NotStarted => return (0.0, false),
            Phase::Finished { race_length } => return (*race_length, false),
            Phase::Running(model) => {
                let u = self.random.next_unit();
                let position = model.advance(u);
                trace!(runner = %id, position, speed = model.get_speed(), "runner moved");
                (position, model.is_finished())
            }
        };

        if finished {
            self.phase = Phase::Finished {
                race_length: position,
            };
        }

        (position, finished)
    }

    /// run processes the inbox in order of arrival until all handles are dropped or the
    /// coordinator stops accepting replies.
    pub fn run(mut self, rx: Receiver<RunnerCommand>) {
        while let Ok(command) = rx.recv() {
            if self.handle_command(command).is_err() {
                debug!(runner = %self.id, "coordinator is gone, stopping runner");
                break;
            }
        }
    }
}

/// spawn_runner creates a runner in its own thread and returns the handle to reach it together
/// with the thread's join handle.
pub fn spawn_runner<R: RandomSource + 'static>(
    id: RunnerId,
    random: R,
) -> anyhow::Result<(RunnerHandle, JoinHandle<()>)> {
    let (tx, rx) = flume::unbounded();
    let runner = Runner::new(id, random);

    let thread = thread::Builder::new()
        .name(format!("runner-{}", id))
        .spawn(move || runner.run(rx))
        .context(format!("Failed to spawn thread for runner {}!", id))?;

    Ok((RunnerHandle::new(id, tx), thread))
}
