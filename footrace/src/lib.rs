pub mod core {
    pub mod coordinator;
    pub mod handle_race;
    pub mod race;
    pub mod random_source;
    pub mod runner;
    pub mod speed_model;
    pub mod timer;
}

pub mod interfaces {
    pub mod display;
    pub mod race_frame;
}

pub mod post {
    pub mod race_result;
}

pub mod pre {
    pub mod check_sim_opts_pars;
    pub mod read_sim_pars;
    pub mod sim_opts;
}


#[cfg(test)]
mod speed_model_tests {
    use crate::core::speed_model::{SpeedModel, MIN_SPEED};
    use approx::{assert_relative_eq, assert_ulps_eq};

    fn model(cur_position: f64, cur_speed: f64) -> SpeedModel {
        SpeedModel {
            race_length: 100.0,
            max_speed: 48.2,
            cur_speed,
            cur_position,
        }
    }

    #[test]
    fn test_max_speed_range() {
        assert_ulps_eq!(SpeedModel::calc_max_speed(0), 48.2);
        assert_relative_eq!(SpeedModel::calc_max_speed(-10), 43.38, epsilon = 1e-9);
        assert_relative_eq!(SpeedModel::calc_max_speed(19), 57.358, epsilon = 1e-9);
    }
    #[test]
    fn test_early_phase_first_tick_hits_speed_floor() {
        let mut x = SpeedModel::new(100.0, 0);
        let position = x.advance(1.0);
        assert_ulps_eq!(x.get_speed(), 5.0);
        assert_ulps_eq!(position, 5.0 * 1000.0 / 3600.0);
        assert_relative_eq!(position, 1.39, epsilon = 0.01);
    }
    #[test]
    fn test_early_phase_accelerates_towards_max_speed() {
        let mut x = model(10.0, 20.0);
        x.determine_next_speed(0.5);
        assert_ulps_eq!(x.get_speed(), 20.0 + (48.2 - 20.0) / 10.0 * 0.5);
    }
    #[test]
    fn test_mid_phase_jitter() {
        let mut x = model(30.0, 20.0);
        x.determine_next_speed(0.75);
        assert_ulps_eq!(x.get_speed(), 25.0);

        let mut x = model(30.0, 20.0);
        x.determine_next_speed(0.0);
        assert_ulps_eq!(x.get_speed(), 10.0);
    }
    #[test]
    fn test_speed_clamped_to_max_speed() {
        let mut x = model(30.0, 48.0);
        x.determine_next_speed(0.9);
        assert_ulps_eq!(x.get_speed(), 48.2);
    }
    #[test]
    fn test_speed_clamped_to_min_speed() {
        let mut x = model(30.0, 6.0);
        x.determine_next_speed(0.0);
        assert_ulps_eq!(x.get_speed(), MIN_SPEED);
    }
    #[test]
    fn test_late_floor_for_any_draw() {
        for &u in [0.0, 0.25, 0.5, 0.99].iter() {
            let mut x = model(60.0, 10.0);
            x.determine_next_speed(u);
            assert_ulps_eq!(x.get_speed(), 24.1);
        }
    }
    #[test]
    fn test_late_floor_not_applied_at_half_distance() {
        let mut x = model(50.0, 10.0);
        x.determine_next_speed(0.5);
        assert_ulps_eq!(x.get_speed(), 10.0);
    }
    #[test]
    fn test_position_capped_and_frozen_at_race_length() {
        let mut x = model(99.9, 40.0);
        assert_ulps_eq!(x.advance(0.5), 100.0);
        assert!(x.is_finished());

        let speed = x.get_speed();
        assert_ulps_eq!(x.advance(0.99), 100.0);
        assert_ulps_eq!(x.get_speed(), speed);
    }
}


#[cfg(test)]
mod timer_tests {
    use crate::core::timer::{RepeatingTimer, Timers};
    use std::thread::sleep;
    use std::time::Duration;

    #[test]
    fn test_repeating_timer_fires_until_cancelled() {
        let (tx, rx) = flume::unbounded();
        let mut timer =
            RepeatingTimer::start("test", Duration::from_millis(10), tx, || 7u32).unwrap();

        for _ in 0..3 {
            assert_eq!(rx.recv_timeout(Duration::from_secs(2)).unwrap(), 7);
        }

        assert!(timer.is_active());
        assert!(timer.cancel());
        assert!(!timer.is_active());
        assert!(!timer.cancel());

        // no message is sent after cancel returned
        while rx.try_recv().is_ok() {}
        sleep(Duration::from_millis(50));
        assert!(rx.try_recv().is_err());
    }
    #[test]
    fn test_timers_cancel_is_idempotent() {
        let (tx, _rx) = flume::unbounded();
        let mut timers = Timers::new();

        timers
            .start_timer_at_fixed_rate("poll", Duration::from_secs(10), tx, || ())
            .unwrap();
        assert!(timers.is_timer_active("poll"));

        assert!(timers.cancel("poll"));
        assert!(!timers.is_timer_active("poll"));
        assert!(!timers.cancel("poll"));
        assert!(!timers.cancel("unknown"));
    }
    #[test]
    fn test_timers_restart_replaces_timer() {
        let (tx, rx) = flume::unbounded();
        let mut timers = Timers::new();

        timers
            .start_timer_at_fixed_rate("poll", Duration::from_secs(10), tx.clone(), || 1u32)
            .unwrap();
        timers
            .start_timer_at_fixed_rate("poll", Duration::from_millis(10), tx, || 2u32)
            .unwrap();

        assert_eq!(rx.recv_timeout(Duration::from_secs(2)).unwrap(), 2);
        timers.cancel_all();
        assert!(!timers.is_timer_active("poll"));
    }
}



#[cfg(test)]
mod display_tests {
    use crate::core::runner::RunnerId;
    use crate::interfaces::display::{progress_bar, ConsoleDisplay, RaceDisplay};
    use crate::interfaces::race_frame::RaceFrame;
    use std::collections::BTreeMap;

    #[test]
    fn test_progress_bar() {
        assert_eq!(progress_bar(0.0, 100.0, 160), "");
        assert_eq!(progress_bar(50.0, 100.0, 160).len(), 80);
        assert_eq!(progress_bar(100.0, 100.0, 10), "**********");
        assert_eq!(progress_bar(1.39, 100.0, 160).len(), 2);
        assert_eq!(progress_bar(130.0, 100.0, 10).len(), 10);
    }
    #[test]
    fn test_frame_clamps_positions() {
        let positions: BTreeMap<RunnerId, f64> =
            vec![(RunnerId(0), -1.0), (RunnerId(1), 120.0)].into_iter().collect();
        let frame = RaceFrame::new(0.0, 100.0, positions.iter());

        assert_eq!(frame.get_position(RunnerId(0)), Some(0.0));
        assert_eq!(frame.get_position(RunnerId(1)), Some(100.0));
        assert_eq!(frame.get_position(RunnerId(2)), None);
    }
    #[test]
    fn test_console_display_frame() {
        let positions: BTreeMap<RunnerId, f64> =
            vec![(RunnerId(0), 25.0), (RunnerId(1), 100.0)].into_iter().collect();
        let frame = RaceFrame::new(3.7, 100.0, positions.iter());

        let mut display = ConsoleDisplay::new(Vec::new(), 20);
        display.render(&frame).unwrap();
        let text = String::from_utf8(display.into_inner()).unwrap();
        let lines: Vec<&str> = text.lines().filter(|line| !line.is_empty()).collect();

        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "Race has been running for 3 seconds.");
        assert_eq!(lines[1], format!("    {}", "=".repeat(20)));
        assert_eq!(lines[2], "0 : *****");
        assert_eq!(lines[3], format!("1 : {}", "*".repeat(20)));
    }
}
