use std::time::{Duration, Instant};

/// Fixed-period ticker for the polling loop.
///
/// Deadlines sit at `start + k * interval` regardless of how long the work
/// between two `wait` calls took. If the caller overruns one or more
/// deadlines they collapse into a single immediate tick.
pub struct Ticker {
    interval: Duration,
    next: Instant,
}

impl Ticker {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next: Instant::now() + interval,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Block until the next tick. Returns how many ticks were dropped
    /// because the caller was late.
    pub fn wait(&mut self) -> u32 {
        let now = Instant::now();

        if now < self.next {
            std::thread::sleep(self.next - now);
            self.next += self.interval;
            return 0;
        }

        let behind = now - self.next;
        let missed = u32::try_from(behind.as_nanos() / self.interval.as_nanos().max(1))
            .unwrap_or(u32::MAX);
        self.next = self
            .interval
            .checked_mul(missed.saturating_add(1))
            .and_then(|skip| self.next.checked_add(skip))
            .unwrap_or(now + self.interval);
        missed
    }
}
