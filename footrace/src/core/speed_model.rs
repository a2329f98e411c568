/// (km/h) Average speed of a runner without any adjustment
pub const BASE_SPEED: f64 = 48.2;
/// (km/h) Speed floor that keeps every runner moving
pub const MIN_SPEED: f64 = 5.0;
/// (%) Range of the per-runner adjustment of the maximum speed (both inclusive)
pub const SPEED_ADJUSTMENT_FACTOR_MIN: i32 = -10;
pub const SPEED_ADJUSTMENT_FACTOR_MAX: i32 = 19;

/// SpeedModel contains the motion state of a single runner. Speeds are given in km/h, positions
/// in m, and every call of `advance` simulates one second of race time.
///
/// Speed evolution per tick:
/// * `early phase` (position < race_length / 4) -> accelerate towards the maximum speed by a random
/// fraction of a tenth of the remaining difference
/// * `mid/late phase` -> multiplicative random jitter in [0.5, 1.5)
///
/// Afterwards the speed is clamped to [MIN_SPEED, max_speed]. In the second half of the race the
/// speed is additionally kept at or above half the maximum speed.
#[derive(Debug, Clone)]
pub struct SpeedModel {
    pub(crate) race_length: f64,
    pub(crate) max_speed: f64,
    pub(crate) cur_speed: f64,
    pub(crate) cur_position: f64,
}

impl SpeedModel {
    pub fn new(race_length: f64, speed_adjustment_factor: i32) -> SpeedModel {
        SpeedModel {
            race_length,
            max_speed: SpeedModel::calc_max_speed(speed_adjustment_factor),
            cur_speed: 0.0,
            cur_position: 0.0,
        }
    }

    /// calc_max_speed returns the maximum speed for the given adjustment factor (in percent).
    pub fn calc_max_speed(speed_adjustment_factor: i32) -> f64 {
        BASE_SPEED * (1.0 + speed_adjustment_factor as f64 / 100.0)
    }

    pub fn get_max_speed(&self) -> f64 {
        self.max_speed
    }

    pub fn get_speed(&self) -> f64 {
        self.cur_speed
    }

    pub fn get_position(&self) -> f64 {
        self.cur_position
    }

    pub fn get_race_length(&self) -> f64 {
        self.race_length
    }

    pub fn is_finished(&self) -> bool {
        self.cur_position >= self.race_length
    }

    /// determine_next_speed updates the current speed based on the position at the beginning of
    /// the tick and the uniform random draw u in [0, 1).
    pub fn determine_next_speed(&mut self, u: f64) {
        if self.cur_position < self.race_length / 4.0 {
            self.cur_speed += (self.max_speed - self.cur_speed) / 10.0 * u;
        } else {
            self.cur_speed *= 0.5 + u;
        }

        self.cur_speed = self.cur_speed.min(self.max_speed).max(MIN_SPEED);

        // avoid stragglers in the second half of the race
        if self.cur_position > self.race_length / 2.0 && self.cur_speed < self.max_speed / 2.0 {
            self.cur_speed = self.max_speed / 2.0;
        }
    }

    /// get_distance_per_tick converts the current speed from km/h into the distance covered
    /// within one second.
    pub fn get_distance_per_tick(&self) -> f64 {
        self.cur_speed * 1000.0 / 3600.0
    }

    /// advance simulates one tick and returns the new position, which never exceeds the race
    /// length. A finished model is not changed anymore.
    pub fn advance(&mut self, u: f64) -> f64 {
        if self.is_finished() {
            return self.race_length;
        }

        self.determine_next_speed(u);
        self.cur_position = (self.cur_position + self.get_distance_per_tick()).min(self.race_length);
        self.cur_position
    }
}
