//! Route handlers for reading, replacing and deleting transactions.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use time::OffsetDateTime;

use crate::{
    ClientId, Error, JsonBody, TransactionId,
    app_state::DbState,
    transaction::{
        Transaction, TransactionRequest, delete_transaction, get_all_transactions,
        get_transaction, get_transactions_for_client, update_transaction,
    },
};

/// A route handler for listing all transactions.
pub async fn list_transactions_endpoint(
    State(state): State<DbState>,
) -> Result<Json<Vec<Transaction>>, Error> {
    state.run(get_all_transactions).await.map(Json)
}

/// A route handler for listing the transactions of one client's employees.
pub async fn list_client_transactions_endpoint(
    State(state): State<DbState>,
    Path(client_id): Path<ClientId>,
) -> Result<Json<Vec<Transaction>>, Error> {
    state
        .run(move |connection| get_transactions_for_client(client_id, connection))
        .await
        .map(Json)
}

/// A route handler for getting a transaction by its ID.
pub async fn get_transaction_endpoint(
    State(state): State<DbState>,
    Path(transaction_id): Path<TransactionId>,
) -> Result<Json<Transaction>, Error> {
    state
        .run(move |connection| get_transaction(transaction_id, connection))
        .await
        .map(Json)
}

/// A route handler for replacing a transaction's fields.
///
/// The request must pass the same field checks as a new transaction, but the
/// employee is not checked against the client.
pub async fn update_transaction_endpoint(
    State(state): State<DbState>,
    Path(transaction_id): Path<TransactionId>,
    JsonBody(request): JsonBody<TransactionRequest>,
) -> Result<Json<Transaction>, Error> {
    let (_, builder) = request.validate(OffsetDateTime::now_utc())?;

    state
        .run(move |connection| update_transaction(transaction_id, builder, connection))
        .await
        .map(Json)
}

/// A route handler for deleting a transaction.
pub async fn delete_transaction_endpoint(
    State(state): State<DbState>,
    Path(transaction_id): Path<TransactionId>,
) -> Result<StatusCode, Error> {
    state
        .run(move |connection| delete_transaction(transaction_id, connection))
        .await?;

    tracing::info!("Deleted transaction {transaction_id}");

    Ok(StatusCode::NO_CONTENT)
}
