//! Exponential backoff for reconnection attempts.

use std::time::Duration;

use rand::Rng;

/// Exponential backoff with jitter.
///
/// Delays double from the initial value up to the cap, with up to 25%
/// random jitter added so a fleet of clients doesn't reconnect in
/// lockstep. `reset` is called after a successful connection so the next
/// outage starts from the initial delay again.
#[derive(Debug, Clone)]
pub struct Backoff {
    initial: Duration,
    max: Duration,
    current: Duration,
    attempt: u32,
    jitter: bool,
}

impl Backoff {
    pub fn new(initial: Duration, max: Duration) -> Self {
        Self {
            initial,
            max,
            current: initial,
            attempt: 0,
            jitter: true,
        }
    }

    /// Disable jitter for deterministic tests.
    pub fn without_jitter(mut self) -> Self {
        self.jitter = false;
        self
    }

    /// Number of delays handed out since the last reset.
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Next delay to sleep before retrying.
    pub fn next_delay(&mut self) -> Duration {
        let base = self.current;
        self.current = (self.current * 2).min(self.max);
        self.attempt += 1;

        if self.jitter {
            let jitter_max = base.as_millis() as u64 / 4;
            if jitter_max > 0 {
                let jitter = rand::thread_rng().gen_range(0..=jitter_max);
                return base + Duration::from_millis(jitter);
            }
        }
        base
    }

    /// Restart from the initial delay.
    pub fn reset(&mut self) {
        self.current = self.initial;
        self.attempt = 0;
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn doubles_up_to_cap() {
        let mut backoff =
            Backoff::new(Duration::from_secs(1), Duration::from_secs(30)).without_jitter();

        assert_eq!(backoff.next_delay(), Duration::from_secs(1));
        assert_eq!(backoff.next_delay(), Duration::from_secs(2));
        assert_eq!(backoff.next_delay(), Duration::from_secs(4));
        assert_eq!(backoff.next_delay(), Duration::from_secs(8));
        assert_eq!(backoff.next_delay(), Duration::from_secs(16));
        assert_eq!(backoff.next_delay(), Duration::from_secs(30));
        assert_eq!(backoff.next_delay(), Duration::from_secs(30));
        assert_eq!(backoff.attempt(), 7);
    }

    #[test]
    fn reset_restarts_sequence() {
        let mut backoff =
            Backoff::new(Duration::from_secs(1), Duration::from_secs(30)).without_jitter();
        backoff.next_delay();
        backoff.next_delay();
        backoff.reset();

        assert_eq!(backoff.attempt(), 0);
        assert_eq!(backoff.next_delay(), Duration::from_secs(1));
    }

    #[test]
    fn jitter_stays_within_bounds() {
        let mut backoff = Backoff::new(Duration::from_secs(4), Duration::from_secs(30));
        for _ in 0..100 {
            backoff.reset();
            let delay = backoff.next_delay();
            assert!(delay >= Duration::from_secs(4));
            assert!(delay <= Duration::from_secs(5));
        }
    }
}
