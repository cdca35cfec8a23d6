// Retry policy
// Attempt limits and fixed delays for the token refresher

use std::time::Duration;

/// How the attempts limit translates into real attempts per cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AttemptCounting {
    /// Exactly `attempts_limit` attempts per cycle
    #[default]
    Configured,
    /// `attempts_limit - 1` attempts per cycle, matching older deployments
    Legacy,
}

/// Fixed retry policy: linear delay, capped inner loop, unbounded outer loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    attempts_limit: u32,
    attempt_delay: Duration,
    refresh_interval: Duration,
    counting: AttemptCounting,
}

impl Default for RetryPolicy {
    /// Three attempts one second apart, refreshing every 30 seconds
    fn default() -> Self {
        Self {
            attempts_limit: 3,
            attempt_delay: Duration::from_secs(1),
            refresh_interval: Duration::from_secs(30),
            counting: AttemptCounting::Configured,
        }
    }
}

impl RetryPolicy {
    /// Constructs a new policy
    ///
    /// An `attempts_limit` of zero is raised to one so that every cycle makes
    /// at least one attempt.
    pub fn new(attempts_limit: u32, attempt_delay: Duration, refresh_interval: Duration) -> Self {
        Self {
            attempts_limit: attempts_limit.max(1),
            attempt_delay,
            refresh_interval,
            counting: AttemptCounting::Configured,
        }
    }

    /// Switch the attempt counting mode
    pub fn with_counting(mut self, counting: AttemptCounting) -> Self {
        self.counting = counting;
        self
    }

    pub fn attempts_limit(&self) -> u32 {
        self.attempts_limit
    }

    pub fn attempt_delay(&self) -> Duration {
        self.attempt_delay
    }

    pub fn refresh_interval(&self) -> Duration {
        self.refresh_interval
    }

    pub fn counting(&self) -> AttemptCounting {
        self.counting
    }

    /// Number of authentication calls actually made per cycle
    ///
    /// Never less than one, even in legacy mode with a limit of one.
    pub fn attempts_per_cycle(&self) -> u32 {
        match self.counting {
            AttemptCounting::Configured => self.attempts_limit,
            AttemptCounting::Legacy => self.attempts_limit.saturating_sub(1).max(1),
        }
    }
}
