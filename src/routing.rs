//! Application router configuration.

use axum::{
    Json, Router, middleware,
    routing::{get, post},
};
use serde_json::{Value, json};
use time::{OffsetDateTime, format_description::well_known::Rfc3339};
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};

use crate::{
    AppState,
    admission::admission_guard,
    client::{
        create_client_endpoint, delete_client_endpoint, get_client_endpoint,
        list_clients_endpoint, update_client_endpoint,
    },
    employee::{
        create_employee_endpoint, delete_employee_endpoint, get_employee_endpoint,
        list_employees_endpoint, update_employee_endpoint,
    },
    endpoints,
    transaction::{
        create_transaction_endpoint, delete_transaction_endpoint, get_transaction_endpoint,
        list_client_transactions_endpoint, list_transactions_endpoint,
        update_transaction_endpoint,
    },
};

/// Return a router with all the app's routes.
///
/// Only `POST` [endpoints::TRANSACTIONS] passes through the admission gate.
/// Every route answers CORS requests from [AppState::allowed_origin].
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(state.allowed_origin.clone())
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request());

    let create_transaction = post(create_transaction_endpoint).route_layer(
        middleware::from_fn_with_state(state.admission_gate.clone(), admission_guard),
    );

    Router::new()
        .route(endpoints::HEALTH, get(get_health))
        .route(
            endpoints::CLIENTS,
            post(create_client_endpoint).get(list_clients_endpoint),
        )
        .route(
            endpoints::CLIENT,
            get(get_client_endpoint)
                .put(update_client_endpoint)
                .delete(delete_client_endpoint),
        )
        .route(
            endpoints::EMPLOYEES,
            post(create_employee_endpoint).get(list_employees_endpoint),
        )
        .route(
            endpoints::EMPLOYEE,
            get(get_employee_endpoint)
                .put(update_employee_endpoint)
                .delete(delete_employee_endpoint),
        )
        .route(
            endpoints::TRANSACTIONS,
            create_transaction.get(list_transactions_endpoint),
        )
        .route(
            endpoints::CLIENT_TRANSACTIONS,
            get(list_client_transactions_endpoint),
        )
        .route(
            endpoints::TRANSACTION,
            get(get_transaction_endpoint)
                .put(update_transaction_endpoint)
                .delete(delete_transaction_endpoint),
        )
        .layer(cors)
        .with_state(state)
}

async fn get_health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": OffsetDateTime::now_utc().format(&Rfc3339).ok(),
    }))
}
