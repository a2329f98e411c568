use crate::core::runner::RunnerId;

#[derive(Debug, Clone, PartialEq)]
pub struct RunnerFrame {
    pub runner: RunnerId,
    pub position: f64,
}

/// RaceFrame is the snapshot of the coordinator's position table that is handed to the display.
/// Positions are always within [0, race_length].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RaceFrame {
    pub racetime: f64,
    pub race_length: f64,
    pub runner_frames: Vec<RunnerFrame>,
}

impl RaceFrame {
    pub fn new<'a, I>(racetime: f64, race_length: f64, positions: I) -> RaceFrame
    where
        I: IntoIterator<Item = (&'a RunnerId, &'a f64)>,
    {
        RaceFrame {
            racetime,
            race_length,
            runner_frames: positions
                .into_iter()
                .map(|(&runner, &position)| RunnerFrame {
                    runner,
                    position: position.max(0.0).min(race_length),
                })
                .collect(),
        }
    }

    pub fn get_position(&self, runner: RunnerId) -> Option<f64> {
        self.runner_frames
            .iter()
            .find(|runner_frame| runner_frame.runner == runner)
            .map(|runner_frame| runner_frame.position)
    }
}
