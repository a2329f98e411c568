use footrace::core::handle_race::handle_race;
use footrace::core::race::RaceConfig;
use footrace::core::runner::RunnerId;
use footrace::interfaces::display::RaceDisplay;
use footrace::interfaces::race_frame::RaceFrame;
use footrace::post::race_result::RaceResult;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
struct Recording {
    frames: Vec<RaceFrame>,
    results: Vec<RaceResult>,
}

#[derive(Debug, Clone, Default)]
struct RecordingDisplay {
    recording: Arc<Mutex<Recording>>,
}

impl RaceDisplay for RecordingDisplay {
    fn render(&mut self, frame: &RaceFrame) -> anyhow::Result<()> {
        self.recording.lock().unwrap().frames.push(frame.to_owned());
        Ok(())
    }

    fn render_results(&mut self, result: &RaceResult) -> anyhow::Result<()> {
        self.recording.lock().unwrap().results.push(result.to_owned());
        Ok(())
    }
}

// 1s of race time per poll at a real-time factor of 50 -> one tick every 20ms
fn run_fast_race(runner_count: u32, race_length: f64) -> (RaceResult, Recording) {
    let race_config = RaceConfig {
        runner_count,
        race_length,
        poll_interval: 1.0,
    };
    let display = RecordingDisplay::default();
    let recording = Arc::clone(&display.recording);

    let race_result = handle_race(&race_config, 50.0, display).unwrap();
    let recording = Arc::try_unwrap(recording).unwrap().into_inner().unwrap();

    (race_result, recording)
}

#[test]
fn test_race_terminates_after_all_runners_finished() {
    let (race_result, recording) = run_fast_race(5, 25.0);

    assert_eq!(race_result.finish_order.len(), 5);
    let runners: HashSet<RunnerId> = race_result.finish_order.iter().map(|e| e.runner).collect();
    assert_eq!(runners.len(), 5);

    assert!(race_result
        .finish_order
        .windows(2)
        .all(|pair| pair[0].racetime <= pair[1].racetime));
    assert!(race_result.finish_order.iter().all(|e| e.racetime > 0.0));

    // results are shown exactly once and match the returned result
    assert_eq!(recording.results.len(), 1);
    assert_eq!(recording.results[0], race_result);
}

#[test]
fn test_frames_are_consistent() {
    let (_, recording) = run_fast_race(4, 20.0);
    let frames = &recording.frames;

    assert!(frames.len() >= 2);

    // the first frame is rendered before any reply was processed
    assert!(frames[0].runner_frames.iter().all(|r| r.position == 0.0));

    // the last frame is rendered after all runners reported the finish
    let last_frame = frames.last().unwrap();
    assert_eq!(last_frame.runner_frames.len(), 4);
    assert!(last_frame.runner_frames.iter().all(|r| r.position == 20.0));

    for pair in frames.windows(2) {
        assert!(pair[0].racetime <= pair[1].racetime);

        for runner_frame in pair[1].runner_frames.iter() {
            let position_prev = pair[0].get_position(runner_frame.runner).unwrap();
            assert!(position_prev <= runner_frame.position);
            assert!(runner_frame.position <= 20.0);
        }
    }
}

#[test]
fn test_single_runner_race() {
    let (race_result, _) = run_fast_race(1, 5.0);

    assert_eq!(race_result.finish_order.len(), 1);
    assert_eq!(race_result.get_winner().unwrap().runner, RunnerId(0));
}
