//! The admission gate: one [RateWindow] per client, shared by all request handlers.

use std::{
    fmt,
    sync::{Arc, Mutex, PoisonError, TryLockError},
    time::{Duration, Instant},
};

use dashmap::{DashMap, mapref::entry::Entry};

use crate::{ClientId, admission::window::RateWindow};

/// The outcome of asking the gate to let a request through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// The request fits within the client's window.
    Admitted,
    /// The client has used up its window; the request must not be processed.
    Rejected,
}

/// A per-client fixed-window rate limiter.
///
/// Cloning the gate is cheap and every clone shares the same windows, so one
/// gate can be created when the server starts and handed to the router.
///
/// The window map is sharded, so inserting a window for a new client never
/// takes a global lock. Each window has its own mutex and the check for one
/// client never waits on another client.
#[derive(Clone, Default)]
pub struct AdmissionGate {
    windows: Arc<DashMap<ClientId, Arc<Mutex<RateWindow>>>>,
}

impl fmt::Debug for AdmissionGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdmissionGate")
            .field("tracked_clients", &self.windows.len())
            .finish()
    }
}

impl AdmissionGate {
    /// Create a gate with no windows.
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a request for `client_id` arriving now.
    pub fn check(&self, client_id: ClientId) -> Admission {
        self.check_at(client_id, Instant::now())
    }

    /// Count a request for `client_id` arriving at `now`.
    pub fn check_at(&self, client_id: ClientId, now: Instant) -> Admission {
        loop {
            // The shard guard is dropped at the end of this match so the window
            // lock below is only ever held on its own.
            let window = match self.windows.entry(client_id) {
                Entry::Occupied(entry) => Arc::clone(entry.get()),
                Entry::Vacant(entry) => {
                    entry.insert(Arc::new(Mutex::new(RateWindow::new(now))));
                    return Admission::Admitted;
                }
            };

            let mut window = window.lock().unwrap_or_else(PoisonError::into_inner);

            // Lost a race with the sweep, look the client up again.
            if window.evicted {
                continue;
            }

            return if window.observe(now) {
                Admission::Admitted
            } else {
                Admission::Rejected
            };
        }
    }

    /// Remove the windows that have expired at `now` and return how many were removed.
    ///
    /// An expired window would be reset by the next request for its client, so
    /// removing it does not change any admission decision. Windows that are
    /// locked by a concurrent check are left for the next sweep.
    pub fn sweep_expired(&self, now: Instant) -> usize {
        let before = self.windows.len();

        self.windows.retain(|_, window| {
            let mut window = match window.try_lock() {
                Ok(window) => window,
                Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
                Err(TryLockError::WouldBlock) => return true,
            };

            if window.is_expired(now) {
                window.evicted = true;
                false
            } else {
                true
            }
        });

        before.saturating_sub(self.windows.len())
    }

    /// The number of clients that currently have a window.
    pub fn tracked_clients(&self) -> usize {
        self.windows.len()
    }
}

/// Periodically remove idle windows from `gate` so that clients that stop
/// sending requests do not hold on to memory for the life of the process.
pub async fn sweep_idle_windows(gate: AdmissionGate, period: Duration) {
    let mut interval = tokio::time::interval(period);

    tracing::debug!("Admission window sweep started (interval: {period:?})");

    loop {
        interval.tick().await;

        let removed = gate.sweep_expired(Instant::now());

        if removed > 0 {
            tracing::debug!(
                "Removed {removed} idle admission windows, {} remaining",
                gate.tracked_clients()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{Arc, Barrier},
        thread,
        time::{Duration, Instant},
    };

    use crate::admission::{
        Admission, AdmissionGate, MAX_REQUESTS_PER_WINDOW, WINDOW_LENGTH,
    };

    #[test]
    fn fourth_request_in_window_is_rejected() {
        let gate = AdmissionGate::new();
        let now = Instant::now();

        for _ in 0..3 {
            assert_eq!(gate.check_at(10, now), Admission::Admitted);
        }

        assert_eq!(gate.check_at(10, now), Admission::Rejected);
    }

    #[test]
    fn requests_after_window_expiry_get_fresh_budget() {
        let gate = AdmissionGate::new();
        let start = Instant::now();
        for _ in 0..5 {
            gate.check_at(7, start);
        }

        let later = start + WINDOW_LENGTH + Duration::from_millis(1);

        for _ in 0..3 {
            assert_eq!(gate.check_at(7, later), Admission::Admitted);
        }
        assert_eq!(gate.check_at(7, later), Admission::Rejected);
    }

    #[test]
    fn window_is_measured_from_first_request() {
        let gate = AdmissionGate::new();
        let start = Instant::now();

        gate.check_at(3, start);
        gate.check_at(3, start + Duration::from_secs(30));
        gate.check_at(3, start + Duration::from_secs(50));

        assert_eq!(
            gate.check_at(3, start + Duration::from_secs(59)),
            Admission::Rejected
        );
        assert_eq!(
            gate.check_at(3, start + Duration::from_secs(61)),
            Admission::Admitted
        );
    }

    #[test]
    fn clients_do_not_share_windows() {
        let gate = AdmissionGate::new();
        let now = Instant::now();

        for _ in 0..3 {
            gate.check_at(1, now);
        }

        assert_eq!(gate.check_at(1, now), Admission::Rejected);
        assert_eq!(gate.check_at(2, now), Admission::Admitted);
    }

    #[test]
    fn clones_share_windows() {
        let gate = AdmissionGate::new();
        let clone = gate.clone();
        let now = Instant::now();

        for _ in 0..3 {
            gate.check_at(1, now);
        }

        assert_eq!(clone.check_at(1, now), Admission::Rejected);
    }

    #[test]
    fn concurrent_requests_for_one_client_admit_exactly_the_limit() {
        let gate = AdmissionGate::new();
        let now = Instant::now();
        let thread_count = 32;
        let barrier = Arc::new(Barrier::new(thread_count));

        let handles: Vec<_> = (0..thread_count)
            .map(|_| {
                let gate = gate.clone();
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    gate.check_at(42, now)
                })
            })
            .collect();

        let admitted = handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .filter(|admission| *admission == Admission::Admitted)
            .count();

        assert_eq!(admitted, MAX_REQUESTS_PER_WINDOW as usize);
    }

    #[test]
    fn sweep_removes_only_expired_windows() {
        let gate = AdmissionGate::new();
        let start = Instant::now();
        gate.check_at(1, start);
        gate.check_at(2, start + Duration::from_secs(30));

        let removed = gate.sweep_expired(start + WINDOW_LENGTH + Duration::from_millis(1));

        assert_eq!(removed, 1);
        assert_eq!(gate.tracked_clients(), 1);
    }

    #[test]
    fn swept_client_starts_new_window() {
        let gate = AdmissionGate::new();
        let start = Instant::now();
        for _ in 0..4 {
            gate.check_at(1, start);
        }
        let later = start + WINDOW_LENGTH + Duration::from_secs(1);

        gate.sweep_expired(later);

        assert_eq!(gate.tracked_clients(), 0);
        assert_eq!(gate.check_at(1, later), Admission::Admitted);
        assert_eq!(gate.tracked_clients(), 1);
    }
}
