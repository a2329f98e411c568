use anyhow::Context;
use flume::{RecvTimeoutError, Sender};
use std::collections::HashMap;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

pub type TimerKey = &'static str;

/// RepeatingTimer sends a message to the target channel at a fixed rate, i.e. the k-th message is
/// due at start + k * interval independent of how long previous sends took. The timer thread stops
/// when the timer is cancelled or dropped, or when the target channel is closed.
#[derive(Debug)]
pub struct RepeatingTimer {
    cancel_tx: Option<Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl RepeatingTimer {
    pub fn start<T, F>(
        key: TimerKey,
        interval: Duration,
        target: Sender<T>,
        make_message: F,
    ) -> anyhow::Result<RepeatingTimer>
    where
        T: Send + 'static,
        F: Fn() -> T + Send + 'static,
    {
        let (cancel_tx, cancel_rx) = flume::bounded::<()>(1);

        let thread = thread::Builder::new()
            .name(format!("timer-{}", key))
            .spawn(move || {
                let t_start = Instant::now();
                let mut no_ticks: u32 = 0;

                loop {
                    no_ticks = no_ticks.saturating_add(1);

                    match cancel_rx.recv_deadline(t_start + interval * no_ticks) {
                        Err(RecvTimeoutError::Timeout) => {
                            if target.send(make_message()).is_err() {
                                debug!(timer = key, "timer target is gone");
                                break;
                            }
                        }
                        // cancel signal received or cancel sender dropped
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
            })
            .context(format!("Failed to spawn thread for timer {}!", key))?;

        Ok(RepeatingTimer {
            cancel_tx: Some(cancel_tx),
            thread: Some(thread),
        })
    }

    pub fn is_active(&self) -> bool {
        self.cancel_tx.is_some()
    }

    /// cancel stops the timer and waits for its thread to exit. No message is sent after cancel
    /// returned. Returns false if the timer was already cancelled.
    pub fn cancel(&mut self) -> bool {
        let was_active = self.cancel_tx.take().is_some();

        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                warn!("timer thread panicked");
            }
        }

        was_active
    }
}

impl Drop for RepeatingTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Timers manages the repeating timers of a single owner, addressed by their keys.
#[derive(Debug, Default)]
pub struct Timers {
    timers: HashMap<TimerKey, RepeatingTimer>,
}

impl Timers {
    pub fn new() -> Timers {
        Timers::default()
    }

    /// start_timer_at_fixed_rate arms a repeating timer. An active timer with the same key is
    /// cancelled before.
    pub fn start_timer_at_fixed_rate<T, F>(
        &mut self,
        key: TimerKey,
        interval: Duration,
        target: Sender<T>,
        make_message: F,
    ) -> anyhow::Result<()>
    where
        T: Send + 'static,
        F: Fn() -> T + Send + 'static,
    {
        self.cancel(key);

        let timer = RepeatingTimer::start(key, interval, target, make_message)?;
        self.timers.insert(key, timer);

        debug!(
            timer = key,
            interval_ms = interval.as_millis() as u64,
            "timer armed"
        );
        Ok(())
    }

    pub fn is_timer_active(&self, key: TimerKey) -> bool {
        self.timers.get(key).map_or(false, |timer| timer.is_active())
    }

    /// cancel stops the timer with the given key. Cancelling an unknown or already cancelled timer
    /// is a no-op that returns false.
    pub fn cancel(&mut self, key: TimerKey) -> bool {
        match self.timers.remove(key) {
            Some(mut timer) => {
                let was_active = timer.cancel();
                debug!(timer = key, "timer cancelled");
                was_active
            }
            None => false,
        }
    }

    pub fn cancel_all(&mut self) {
        let keys: Vec<TimerKey> = self.timers.keys().copied().collect();

        for key in keys {
            self.cancel(key);
        }
    }
}
