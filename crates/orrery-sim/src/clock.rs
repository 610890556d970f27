//! Simulation clock
//!
//! Absolute simulation time as a continuous fractional-day count (Julian
//! date), backed by a hifitime epoch. The engine converts to seconds
//! internally; the surrounding loop drives the clock at a configurable
//! rate.

use hifitime::{Duration, Epoch};
use orrery_core::constants::SEC_PER_DAY;

pub struct SimClock {
    current: Epoch,
    /// Simulated seconds per real second when ticked from wall time
    rate: f64,
    paused: bool,
}

impl SimClock {
    /// Clock at the J2000 epoch.
    pub fn new() -> Self {
        Self::at_epoch(Epoch::from_gregorian_utc(2000, 1, 1, 12, 0, 0, 0))
    }

    pub fn at_epoch(epoch: Epoch) -> Self {
        Self {
            current: epoch,
            rate: 1.0,
            paused: false,
        }
    }

    pub fn epoch(&self) -> Epoch {
        self.current
    }

    pub fn set_epoch(&mut self, epoch: Epoch) {
        self.current = epoch;
    }

    /// Continuous fractional-day count (Julian date).
    pub fn days(&self) -> f64 {
        self.current.to_jde_utc_days()
    }

    /// Absolute simulation time in seconds.
    pub fn seconds(&self) -> f64 {
        self.days() * SEC_PER_DAY
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Simulated seconds per real second; negative runs time backwards.
    pub fn set_rate(&mut self, rate: f64) {
        self.rate = rate;
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Advance by simulated seconds, unconditionally. The stepper calls
    /// this once per tick with its fixed dt.
    pub fn advance(&mut self, sim_dt_seconds: f64) {
        self.current += Duration::from_seconds(sim_dt_seconds);
    }

    /// Advance from a wall-clock delta, scaled by the rate. Returns the new
    /// epoch; a paused clock holds still.
    pub fn tick(&mut self, real_dt_seconds: f64) -> Epoch {
        if !self.paused {
            self.advance(real_dt_seconds * self.rate);
        }
        self.current
    }

    pub fn jump(&mut self, duration: Duration) {
        self.current += duration;
    }
}

impl Default for SimClock {
    fn default() -> Self {
        Self::new()
    }
}

/// Preset rates in simulated seconds per real second.
pub mod rates {
    pub const REALTIME: f64 = 1.0;
    pub const MINUTE_PER_SEC: f64 = 60.0;
    pub const HOUR_PER_SEC: f64 = 3600.0;
    pub const DAY_PER_SEC: f64 = 86400.0;
}
