//! Per-client throttling of transaction creation.
//!
//! This module contains everything related to admission control:
//! - The [RateWindow] that counts requests for one client in a fixed window
//! - The [AdmissionGate] that owns one window per client
//! - The axum middleware that reads the client ID from a request body and
//!   rejects requests over the limit

mod gate;
mod middleware;
mod window;

pub use gate::{Admission, AdmissionGate, sweep_idle_windows};
pub use middleware::admission_guard;
pub use window::{MAX_REQUESTS_PER_WINDOW, RateWindow, WINDOW_LENGTH};
