//! Route handlers for clients.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    ClientId, Error, JsonBody,
    app_state::DbState,
    client::{
        Client, NewClient, create_client, delete_client, get_all_clients, get_client,
        update_client,
    },
};

/// A route handler for creating a new client.
pub async fn create_client_endpoint(
    State(state): State<DbState>,
    JsonBody(new_client): JsonBody<NewClient>,
) -> Result<(StatusCode, Json<Client>), Error> {
    let client = state
        .run(move |connection| create_client(new_client, connection))
        .await?;

    tracing::info!("Created client {}", client.id);

    Ok((StatusCode::CREATED, Json(client)))
}

/// A route handler for listing all clients.
pub async fn list_clients_endpoint(
    State(state): State<DbState>,
) -> Result<Json<Vec<Client>>, Error> {
    state.run(get_all_clients).await.map(Json)
}

/// A route handler for getting a client by its ID.
pub async fn get_client_endpoint(
    State(state): State<DbState>,
    Path(client_id): Path<ClientId>,
) -> Result<Json<Client>, Error> {
    state
        .run(move |connection| get_client(client_id, connection))
        .await
        .map(Json)
}

/// A route handler for replacing a client's name and RUT.
pub async fn update_client_endpoint(
    State(state): State<DbState>,
    Path(client_id): Path<ClientId>,
    JsonBody(new_client): JsonBody<NewClient>,
) -> Result<Json<Client>, Error> {
    state
        .run(move |connection| update_client(client_id, new_client, connection))
        .await
        .map(Json)
}

/// A route handler for deleting a client and everything it owns.
pub async fn delete_client_endpoint(
    State(state): State<DbState>,
    Path(client_id): Path<ClientId>,
) -> Result<StatusCode, Error> {
    state
        .run(move |connection| delete_client(client_id, connection))
        .await?;

    tracing::info!("Deleted client {client_id}");

    Ok(StatusCode::NO_CONTENT)
}
