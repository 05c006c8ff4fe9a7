//! Client ledger is a record-keeping backend for clients, their employees, and
//! the employees' transactions.
//!
//! This library provides a JSON REST API. Transaction creation is throttled per
//! client by an [AdmissionGate] and guarded by the ownership and quota checks in
//! [create_transaction_for_client].

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::response::{IntoResponse, Response};
use axum_server::Handle;
use tokio::signal;

mod admission;
mod app_state;
mod client;
mod database_id;
mod db;
mod employee;
mod endpoints;
mod json;
mod logging;
mod problem_detail;
mod routing;
mod transaction;

#[cfg(test)]
mod test_utils;

pub use admission::{
    Admission, AdmissionGate, MAX_REQUESTS_PER_WINDOW, RateWindow, WINDOW_LENGTH,
    admission_guard, sweep_idle_windows,
};
pub use app_state::{AppState, DEFAULT_ALLOWED_ORIGIN};
pub use client::{Client, NewClient, create_client};
pub use database_id::{ClientId, DatabaseId, EmployeeId, TransactionId};
pub use db::initialize as initialize_db;
pub use employee::{Employee, NewEmployee, create_employee};
pub use json::JsonBody;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use routing::build_router;
pub use transaction::{
    MAX_TRANSACTIONS_PER_CLIENT, Transaction, TransactionBuilder, create_transaction_for_client,
    update_transaction,
};

use crate::problem_detail::ProblemDetail;

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The requested record was not found.
    ///
    /// The string names the kind of record, e.g. "Employee", so that the
    /// message reads "Employee not found".
    #[error("{0} not found")]
    NotFound(&'static str),

    /// The employee named in a new transaction belongs to a different client
    /// than the one named in the request.
    #[error("Employee does not belong to the client")]
    OwnershipViolation,

    /// The client already owns [MAX_TRANSACTIONS_PER_CLIENT] transactions.
    #[error("Client has reached the maximum of {MAX_TRANSACTIONS_PER_CLIENT} transactions")]
    QuotaExceeded,

    /// One or more request fields are missing or invalid.
    ///
    /// The string lists each offending field as "field: message", separated by
    /// commas.
    #[error("{0}")]
    Validation(String),

    /// The RUT of a client or employee is already used by another record.
    #[error("the RUT \"{0}\" already exists in the database")]
    DuplicateRut(String),

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// The blocking task running a database query panicked or was cancelled.
    #[error("the database task did not finish: {0}")]
    DatabaseTaskFailed(String),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound("Record"),
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound(_) | Error::OwnershipViolation | Error::QuotaExceeded => {
                ProblemDetail::business_logic(self.to_string()).into_response()
            }
            Error::Validation(detail) => ProblemDetail::validation(detail).into_response(),
            Error::DuplicateRut(_) => ProblemDetail::integrity(
                "Duplicate record detected or unique constraint violation".to_owned(),
            )
            .into_response(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                ProblemDetail::server_error().into_response()
            }
        }
    }
}

/// Collects "field: message" pairs for request bodies that fail validation.
#[derive(Debug, Default)]
pub(crate) struct FieldErrors(Vec<String>);

impl FieldErrors {
    pub(crate) fn push(&mut self, field: &str, message: &str) {
        self.0.push(format!("{field}: {message}"));
    }

    /// Check that `value` is present and return it, recording `message` otherwise.
    pub(crate) fn require<T>(&mut self, field: &str, value: Option<T>, message: &str) -> Option<T> {
        if value.is_none() {
            self.push(field, message);
        }

        value
    }

    /// Check that `value` is present and not blank, recording `message` otherwise.
    pub(crate) fn require_text(
        &mut self,
        field: &str,
        value: Option<String>,
        message: &str,
    ) -> Option<String> {
        match value {
            Some(text) if !text.trim().is_empty() => Some(text),
            _ => {
                self.push(field, message);
                None
            }
        }
    }

    pub(crate) fn into_result(self) -> Result<(), Error> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation(self.0.join(", ")))
        }
    }
}

/// Map a unique constraint failure on a `rut` column to [Error::DuplicateRut].
pub(crate) fn map_duplicate_rut(error: rusqlite::Error, rut: &str) -> Error {
    match error {
        // Code 2067 occurs when a UNIQUE constraint failed.
        rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
            if sql_error.extended_code == 2067 && desc.ends_with(".rut") =>
        {
            Error::DuplicateRut(rut.to_owned())
        }
        error => error.into(),
    }
}
