//! Defines the endpoint for creating a new transaction.

use axum::{Json, extract::State, http::StatusCode};
use time::OffsetDateTime;

use crate::{
    Error, JsonBody,
    app_state::DbState,
    transaction::{Transaction, TransactionRequest, create_transaction_for_client},
};

/// A route handler for creating a new transaction.
///
/// Requests reach this handler only once the admission gate has let them
/// through. The request fields are checked first, then the ownership and quota
/// checks run in [create_transaction_for_client].
pub async fn create_transaction_endpoint(
    State(state): State<DbState>,
    JsonBody(request): JsonBody<TransactionRequest>,
) -> Result<(StatusCode, Json<Transaction>), Error> {
    let (client_id, builder) = request.validate(OffsetDateTime::now_utc())?;

    let transaction = state
        .run(move |connection| create_transaction_for_client(client_id, builder, connection))
        .await
        .inspect_err(|error| tracing::info!("could not create transaction: {error}"))?;

    tracing::info!(
        "Created transaction {} for employee {} of client {client_id}",
        transaction.id,
        transaction.employee_id
    );

    Ok((StatusCode::CREATED, Json(transaction)))
}
