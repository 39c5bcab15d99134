use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Zoom allows at most ten API requests per second.
pub const DIRECTORY_REQUESTS_PER_SECOND: usize = 10;

/// Source of time for pacing decisions.
pub trait Clock {
    fn now(&self) -> Instant;
    fn sleep(&self, duration: Duration);
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Instant {
        (**self).now()
    }

    fn sleep(&self, duration: Duration) {
        (**self).sleep(duration);
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Clock that only moves when told to. Sleeping advances it instantly.
#[derive(Debug)]
pub struct SimulatedClock {
    origin: Instant,
    offset: Mutex<Duration>,
}

impl Default for SimulatedClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset: Mutex::new(Duration::ZERO),
        }
    }

    pub fn advance(&self, duration: Duration) {
        let mut offset = self.offset.lock().expect("clock mutex poisoned");
        *offset += duration;
    }

    /// Time passed since the clock was created.
    pub fn elapsed(&self) -> Duration {
        *self.offset.lock().expect("clock mutex poisoned")
    }
}

impl Clock for SimulatedClock {
    fn now(&self) -> Instant {
        self.origin + self.elapsed()
    }

    fn sleep(&self, duration: Duration) {
        self.advance(duration);
    }
}

/// Ceiling on outbound calls: `max_requests` per `window`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimit {
    max_requests: usize,
    window: Duration,
}

impl Default for RateLimit {
    fn default() -> Self {
        Self::per_second(DIRECTORY_REQUESTS_PER_SECOND)
    }
}

impl RateLimit {
    /// `max_requests` below one is raised to one.
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            max_requests: max_requests.max(1),
            window,
        }
    }

    pub fn per_second(max_requests: usize) -> Self {
        Self::new(max_requests, Duration::from_secs(1))
    }

    pub fn max_requests(&self) -> usize {
        self.max_requests
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Rough wall-clock time for `requests` calls at this ceiling.
    pub fn estimate(&self, requests: usize) -> Duration {
        let windows = requests.div_ceil(self.max_requests);
        self.window * u32::try_from(windows).unwrap_or(u32::MAX)
    }
}

/// Sliding-window pacer: remembers when the last `max_requests` calls were
/// issued and holds the next call until the oldest one is a full window old.
///
/// For any `i`, call `i + max_requests` is issued at least one window after
/// call `i`, so no window-sized interval ever holds more than `max_requests`
/// calls.
#[derive(Debug)]
pub struct SlidingWindowPacer {
    limit: RateLimit,
    issued: VecDeque<Instant>,
}

impl SlidingWindowPacer {
    pub fn new(limit: RateLimit) -> Self {
        Self {
            limit,
            issued: VecDeque::with_capacity(limit.max_requests),
        }
    }

    /// Blocks until one more call fits under the ceiling and records it.
    /// Returns how long it waited, if it had to.
    pub fn acquire<C: Clock>(&mut self, clock: &C) -> Option<Duration> {
        let mut now = clock.now();
        self.evict(now);

        let mut waited = None;
        if self.issued.len() >= self.limit.max_requests {
            if let Some(&oldest) = self.issued.front() {
                let wait = (oldest + self.limit.window).saturating_duration_since(now);
                if !wait.is_zero() {
                    clock.sleep(wait);
                    waited = Some(wait);
                }
            }
            now = clock.now();
            self.evict(now);
        }

        self.issued.push_back(now);
        waited
    }

    fn evict(&mut self, now: Instant) {
        while let Some(&oldest) = self.issued.front() {
            if now.saturating_duration_since(oldest) >= self.limit.window {
                self.issued.pop_front();
            } else {
                break;
            }
        }
    }
}
