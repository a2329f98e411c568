use crate::interfaces::race_frame::RaceFrame;
use crate::post::race_result::RaceResult;
use anyhow::Context;
use std::io::{self, Write};

pub const DEFAULT_DISPLAY_WIDTH: usize = 160;
const NO_CLEAR_LINES: usize = 50;

/// RaceDisplay is the output surface of the coordinator. Both methods only read the inserted data.
pub trait RaceDisplay {
    /// render shows the current race frame.
    fn render(&mut self, frame: &RaceFrame) -> anyhow::Result<()>;

    /// render_results shows the final standings once all runners finished.
    fn render_results(&mut self, result: &RaceResult) -> anyhow::Result<()>;
}

/// progress_bar returns a bar of `*` marks whose length is proportional to position / race_length
/// at the given total width. Positions outside [0, race_length] are clamped.
pub fn progress_bar(position: f64, race_length: f64, width: usize) -> String {
    let race_prog = (position / race_length).max(0.0).min(1.0);
    "*".repeat((race_prog * width as f64).floor() as usize)
}

/// ConsoleDisplay draws the race as text. The frame is preceded by empty lines such that the
/// previous frame scrolls out of sight.
#[derive(Debug)]
pub struct ConsoleDisplay<W: Write> {
    out: W,
    width: usize,
}

impl ConsoleDisplay<io::Stdout> {
    pub fn to_stdout() -> ConsoleDisplay<io::Stdout> {
        ConsoleDisplay::new(io::stdout(), DEFAULT_DISPLAY_WIDTH)
    }
}

impl<W: Write> ConsoleDisplay<W> {
    pub fn new(out: W, width: usize) -> ConsoleDisplay<W> {
        ConsoleDisplay { out, width }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_frame(&mut self, frame: &RaceFrame) -> io::Result<()> {
        for _ in 0..NO_CLEAR_LINES {
            writeln!(self.out)?;
        }

        writeln!(
            self.out,
            "Race has been running for {} seconds.",
            frame.racetime.max(0.0).floor() as u64
        )?;
        writeln!(self.out, "    {}", "=".repeat(self.width))?;

        for runner_frame in frame.runner_frames.iter() {
            writeln!(
                self.out,
                "{} : {}",
                runner_frame.runner,
                progress_bar(runner_frame.position, frame.race_length, self.width)
            )?;
        }

        self.out.flush()
    }
}

impl<W: Write> RaceDisplay for ConsoleDisplay<W> {
    fn render(&mut self, frame: &RaceFrame) -> anyhow::Result<()> {
        self.write_frame(frame)
            .context("Failed to write race frame to the console!")
    }

    fn render_results(&mut self, result: &RaceResult) -> anyhow::Result<()> {
        result
            .write_results(&mut self.out)
            .context("Failed to write race results to the console!")
    }
}

/// SilentDisplay discards everything, it is used for races that are only evaluated afterwards.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentDisplay;

impl RaceDisplay for SilentDisplay {
    fn render(&mut self, _frame: &RaceFrame) -> anyhow::Result<()> {
        Ok(())
    }

    fn render_results(&mut self, _result: &RaceResult) -> anyhow::Result<()> {
        Ok(())
    }
}
