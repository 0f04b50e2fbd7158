use std::time::{Duration, Instant};

/// Cadence of the round countdown
pub const COUNTDOWN_INTERVAL: Duration = Duration::from_secs(1);

/// A single cancellable repeating timer.
///
/// Nothing runs in the background: the owner polls it with the current
/// instant and receives the number of ticks that fell due since the last
/// poll. Starting while running replaces the pending tick.
#[derive(Debug, Clone)]
pub struct Countdown {
    interval: Duration,
    next_due: Option<Instant>,
}

impl Default for Countdown {
    fn default() -> Self {
        Self::every(COUNTDOWN_INTERVAL)
    }
}

impl Countdown {
    pub fn every(interval: Duration) -> Self {
        Self {
            interval,
            next_due: None,
        }
    }

    pub fn start(&mut self, now: Instant) {
        self.next_due = Some(now + self.interval);
    }

    /// Safe to call when not running
    pub fn cancel(&mut self) {
        self.next_due = None;
    }

    pub fn is_running(&self) -> bool {
        self.next_due.is_some()
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Consumes and returns the ticks due at `now`
    pub fn due_ticks(&mut self, now: Instant) -> u32 {
        let Some(mut due) = self.next_due else {
            return 0;
        };

        let mut ticks = 0;
        while due <= now {
            ticks += 1;
            due += self.interval;
        }
        self.next_due = Some(due);
        ticks
    }
}
