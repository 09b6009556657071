//! Delta time source for driving `Timeline::tick`.
//!
//! Built on `instant::Instant` so the same code runs on native and wasm
//! targets. Tests usually skip the clock and feed `tick` explicit deltas.

use instant::Instant;

/// Measures elapsed milliseconds between successive calls.
#[derive(Debug, Clone)]
pub struct Clock {
    last: Instant,
}

impl Clock {
    pub fn new() -> Self {
        Self {
            last: Instant::now(),
        }
    }

    /// Milliseconds elapsed since the previous call (or construction), and
    /// restart the measurement.
    pub fn delta_ms(&mut self) -> f64 {
        let now = Instant::now();
        let delta = now.duration_since(self.last).as_secs_f64() * 1000.0;
        self.last = now;
        delta
    }

    /// Restart the measurement without reporting a delta.
    pub fn reset(&mut self) {
        self.last = Instant::now();
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    /// it should report non-negative, accumulating deltas
    #[test]
    fn deltas_accumulate() {
        let mut clock = Clock::new();
        thread::sleep(Duration::from_millis(5));
        let first = clock.delta_ms();
        assert!(first >= 4.0, "first delta was {first}");

        let immediate = clock.delta_ms();
        assert!(immediate >= 0.0);
        assert!(immediate < first);
    }

    /// it should discard elapsed time on reset
    #[test]
    fn reset_discards_elapsed() {
        let mut clock = Clock::new();
        thread::sleep(Duration::from_millis(5));
        clock.reset();
        assert!(clock.delta_ms() < 5.0);
    }
}
