use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Repaint interval while a session is running
pub const TICK_RATE_MS: u64 = 100;

/// Source of monotonic time for a session
pub trait Clock {
    fn now(&self) -> Instant;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    origin: Instant,
    offset: Rc<Cell<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset: Rc::new(Cell::new(Duration::ZERO)),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.offset.set(self.offset.get() + by);
    }

    pub fn advance_secs(&self, secs: f64) {
        self.advance(Duration::from_secs_f64(secs));
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + self.offset.get()
    }
}

/// Proof that a tick belongs to the timer generation that issued it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerToken(u64);

/// Interval timer with explicit cancellation.
///
/// Every `arm` cancels the previous token first, so ticks scheduled for an
/// older generation are rejected by `accepts`.
#[derive(Debug)]
pub struct TickTimer {
    interval: Duration,
    generation: u64,
    active: Option<TimerToken>,
}

impl TickTimer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            generation: 0,
            active: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn arm(&mut self) -> TimerToken {
        self.cancel();
        self.generation += 1;
        let token = TimerToken(self.generation);
        self.active = Some(token);
        token
    }

    pub fn cancel(&mut self) {
        self.active = None;
    }

    pub fn token(&self) -> Option<TimerToken> {
        self.active
    }

    pub fn is_armed(&self) -> bool {
        self.active.is_some()
    }

    pub fn accepts(&self, token: TimerToken) -> bool {
        self.active == Some(token)
    }
}

impl Default for TickTimer {
    fn default() -> Self {
        Self::new(Duration::from_millis(TICK_RATE_MS))
    }
}
