use std::time::Duration;

use crate::response::HttpResponse;

const DEFAULT_BACKOFF_STEP: Duration = Duration::from_millis(250);
const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Maps the 1-based index of a rejected attempt to the pause before the next one.
pub trait RetryStrategy: Send + Sync {
    fn delay_for_attempt(&self, attempt: usize) -> Duration;
}

impl<F> RetryStrategy for F
where
    F: Fn(usize) -> Duration + Send + Sync,
{
    fn delay_for_attempt(&self, attempt: usize) -> Duration {
        self(attempt)
    }
}

/// Decides whether an attempt's outcome ends the retry loop.
pub trait ResponseChecker: Send + Sync {
    fn accepts(&self, response: &HttpResponse) -> bool;
}

impl<F> ResponseChecker for F
where
    F: Fn(&HttpResponse) -> bool + Send + Sync,
{
    fn accepts(&self, response: &HttpResponse) -> bool {
        self(response)
    }
}

/// Accepts every response that did not fail at the transport level.
#[derive(Clone, Copy, Debug, Default)]
pub struct TransportOk;

impl ResponseChecker for TransportOk {
    fn accepts(&self, response: &HttpResponse) -> bool {
        !response.has_failure()
    }
}

/// Accepts responses that completed and carry a status below 500.
#[derive(Clone, Copy, Debug, Default)]
pub struct RejectServerErrors;

impl ResponseChecker for RejectServerErrors {
    fn accepts(&self, response: &HttpResponse) -> bool {
        !response.has_failure() && (0..500).contains(&response.code())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum BackoffKind {
    Constant,
    Linear,
    Square,
}

/// Built-in strategies. `Backoff::default()` waits 250ms, 500ms, 750ms, ...
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Backoff {
    step: Duration,
    kind: BackoffKind,
}

impl Backoff {
    pub const fn constant(delay: Duration) -> Self {
        Self {
            step: delay,
            kind: BackoffKind::Constant,
        }
    }

    pub const fn linear(step: Duration) -> Self {
        Self {
            step,
            kind: BackoffKind::Linear,
        }
    }

    pub const fn square(step: Duration) -> Self {
        Self {
            step,
            kind: BackoffKind::Square,
        }
    }

    pub const fn none() -> Self {
        Self::constant(Duration::ZERO)
    }

    pub const fn step(&self) -> Duration {
        self.step
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::linear(DEFAULT_BACKOFF_STEP)
    }
}

impl RetryStrategy for Backoff {
    fn delay_for_attempt(&self, attempt: usize) -> Duration {
        let attempt = attempt as u128;
        match self.kind {
            BackoffKind::Constant => self.step,
            BackoffKind::Linear => scaled(self.step, attempt),
            BackoffKind::Square => scaled(self.step, attempt.saturating_mul(attempt)),
        }
    }
}

/// `step * factor`, saturating at `Duration::MAX`.
fn scaled(step: Duration, factor: u128) -> Duration {
    let Some(nanos) = step.as_nanos().checked_mul(factor) else {
        return Duration::MAX;
    };
    match u64::try_from(nanos / NANOS_PER_SEC) {
        Ok(secs) => Duration::new(secs, (nanos % NANOS_PER_SEC) as u32),
        Err(_) => Duration::MAX,
    }
}
