//! Fixed-rate tick scheduling for the authoritative simulation loop.

/// Default simulation tick rate in Hz.
pub const TICK_RATE: u32 = 60;

// ---------------------------------------------------------------------------
// TickSchedule
// ---------------------------------------------------------------------------

/// Accumulates real elapsed time and yields discrete simulation ticks at a
/// fixed rate, so a slow frame produces catch-up ticks instead of a slower
/// simulation.
pub struct TickSchedule {
    accumulator_secs: f64,
    tick_duration_secs: f64,
    total_ticks: u64,
}

impl TickSchedule {
    /// Creates a schedule at the default [`TICK_RATE`].
    pub fn new() -> Self {
        Self::with_tick_rate(TICK_RATE)
    }

    /// Creates a schedule with a custom tick rate.
    pub fn with_tick_rate(hz: u32) -> Self {
        Self {
            accumulator_secs: 0.0,
            tick_duration_secs: 1.0 / hz as f64,
            total_ticks: 0,
        }
    }

    /// Accumulates elapsed time and returns the number of ticks to process.
    pub fn accumulate(&mut self, dt_secs: f64) -> u32 {
        self.accumulator_secs += dt_secs;
        let mut ticks = 0u32;
        while self.accumulator_secs >= self.tick_duration_secs {
            self.accumulator_secs -= self.tick_duration_secs;
            self.total_ticks += 1;
            ticks += 1;
        }
        ticks
    }

    /// Total ticks yielded since creation.
    pub fn total_ticks(&self) -> u64 {
        self.total_ticks
    }

    /// Duration of one tick in seconds.
    pub fn tick_duration_secs(&self) -> f64 {
        self.tick_duration_secs
    }
}

impl Default for TickSchedule {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
