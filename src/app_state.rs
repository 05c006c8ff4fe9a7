//! Implements a struct that holds the state of the REST server.

use std::sync::{Arc, Mutex};

use axum::{extract::FromRef, http::HeaderValue};
use rusqlite::Connection;

use crate::{Error, admission::AdmissionGate, db::initialize};

/// The browser origin allowed to call the API when none is configured.
pub const DEFAULT_ALLOWED_ORIGIN: &str = "http://localhost:5173";

/// The state of the REST server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The database connection
    pub db_connection: Arc<Mutex<Connection>>,

    /// The per-client throttle for transaction creation.
    pub admission_gate: AdmissionGate,

    /// The origin sent back in CORS responses.
    pub allowed_origin: HeaderValue,
}

impl AppState {
    /// Create a new [AppState] with a SQLite database connection.
    ///
    /// This function will initialize the database by adding the tables for the domain models.
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized.
    pub fn new(db_connection: Connection, admission_gate: AdmissionGate) -> Result<Self, Error> {
        initialize(&db_connection)?;

        Ok(Self {
            db_connection: Arc::new(Mutex::new(db_connection)),
            admission_gate,
            allowed_origin: HeaderValue::from_static(DEFAULT_ALLOWED_ORIGIN),
        })
    }

    /// Allow cross-origin requests from `origin` instead of [DEFAULT_ALLOWED_ORIGIN].
    pub fn with_allowed_origin(mut self, origin: HeaderValue) -> Self {
        self.allowed_origin = origin;
        self
    }
}

impl FromRef<AppState> for AdmissionGate {
    fn from_ref(state: &AppState) -> Self {
        state.admission_gate.clone()
    }
}

/// The state shared by the record handlers: just the database connection.
#[derive(Debug, Clone)]
pub struct DbState {
    /// The database connection for managing records.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl DbState {
    /// Run `query` against the database on Tokio's blocking thread pool.
    ///
    /// The connection lock is taken on the blocking thread, so a handler
    /// waiting on the database never stalls the async workers serving other
    /// requests.
    ///
    /// # Errors
    /// Returns [Error::DatabaseLockError] if the lock is poisoned,
    /// [Error::DatabaseTaskFailed] if the task panicked, or whatever error
    /// `query` returns.
    pub async fn run<T, F>(&self, query: F) -> Result<T, Error>
    where
        F: FnOnce(&Connection) -> Result<T, Error> + Send + 'static,
        T: Send + 'static,
    {
        let db_connection = self.db_connection.clone();

        tokio::task::spawn_blocking(move || {
            let connection = db_connection.lock().map_err(|error| {
                tracing::error!("could not acquire database lock: {error}");
                Error::DatabaseLockError
            })?;

            query(&connection)
        })
        .await
        .map_err(|error| {
            tracing::error!("database task failed: {error}");
            Error::DatabaseTaskFailed(error.to_string())
        })?
    }
}

impl FromRef<AppState> for DbState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}
