use crate::error::{Error, Result};

/// Source of simulated time for the execution run.
pub trait SimulationClock: std::fmt::Debug {
    /// Current simulated time in seconds.
    fn now(&self) -> f64;

    /// Moves the clock forward to `time`. Moving backwards is an error.
    fn advance_to(&mut self, time: f64) -> Result<()>;
}

/// Monotonic clock driven by the next event time.
#[derive(Debug, Clone, Default)]
pub struct EventClock {
    time: f64,
    events: u64,
}

impl EventClock {
    pub fn new(start_time: f64) -> Self {
        Self { time: start_time, events: 0 }
    }

    /// Number of successful `advance_to` calls.
    pub fn events(&self) -> u64 {
        self.events
    }
}

impl SimulationClock for EventClock {
    fn now(&self) -> f64 {
        self.time
    }

    fn advance_to(&mut self, time: f64) -> Result<()> {
        if time < self.time || time.is_nan() {
            return Err(Error::ClockMovedBackwards { now: self.time, requested: time });
        }
        self.time = time;
        self.events += 1;
        Ok(())
    }
}
