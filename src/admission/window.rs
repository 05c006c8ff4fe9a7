//! Defines the fixed counting window kept for each client.

use std::time::{Duration, Instant};

/// The maximum number of requests admitted for one client within [WINDOW_LENGTH].
pub const MAX_REQUESTS_PER_WINDOW: u32 = 3;

/// How long a window lasts, measured from its first request.
pub const WINDOW_LENGTH: Duration = Duration::from_millis(60_000);

/// The request count for one client since `window_start`.
///
/// A window is reset, not replaced, once [WINDOW_LENGTH] has elapsed, so the
/// first request after expiry starts a fresh budget of
/// [MAX_REQUESTS_PER_WINDOW] requests.
#[derive(Debug, Clone, PartialEq)]
pub struct RateWindow {
    window_start: Instant,
    count: u32,
    /// Set by the idle sweep when the window is removed from the gate.
    pub(super) evicted: bool,
}

impl RateWindow {
    /// Open a window for a request arriving at `now`.
    ///
    /// The opening request counts towards the limit.
    pub fn new(now: Instant) -> Self {
        Self {
            window_start: now,
            count: 1,
            evicted: false,
        }
    }

    /// Count a request arriving at `now` and report whether it fits in the window.
    pub fn observe(&mut self, now: Instant) -> bool {
        if self.is_expired(now) {
            self.window_start = now;
            self.count = 1;
            return true;
        }

        self.count = self.count.saturating_add(1);
        self.count <= MAX_REQUESTS_PER_WINDOW
    }

    /// Whether more than [WINDOW_LENGTH] has passed between the window start and `now`.
    pub fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.window_start) > WINDOW_LENGTH
    }

    /// The number of requests counted in the current window, including rejected ones.
    pub fn count(&self) -> u32 {
        self.count
    }

    /// When the current window started.
    pub fn window_start(&self) -> Instant {
        self.window_start
    }
}
