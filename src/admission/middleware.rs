//! Middleware that runs the admission gate in front of transaction creation.

use axum::{
    Json,
    body::{Body, Bytes},
    extract::{FromRequest, Request, State},
    http::{Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};

use crate::{
    ClientId,
    admission::{Admission, AdmissionGate, MAX_REQUESTS_PER_WINDOW},
};

/// Throttle `POST` requests per client using the client ID in the JSON body.
///
/// The client ID is read from the `client_id` field, or `clientId` if that is
/// absent. Requests with no usable client ID, or a body that is not JSON, are
/// passed on untouched so the handler can report what is wrong with them.
/// Bodies over axum's default limit of 2 MiB are refused with
/// `413 Payload Too Large` before the gate counts them.
///
/// Rejected requests get a `429 Too Many Requests` response and never reach
/// the handler.
pub async fn admission_guard(
    State(gate): State<AdmissionGate>,
    request: Request,
    next: Next,
) -> Response {
    if request.method() != Method::POST {
        return next.run(request).await;
    }

    let (parts, body) = request.into_parts();
    // Reads at most axum's default body limit and answers with 413 when the
    // body is larger, or 400 when it cannot be read.
    let body = match Bytes::from_request(Request::new(body), &()).await {
        Ok(body) => body,
        Err(rejection) => {
            tracing::debug!("Could not read request body: {rejection}");
            return rejection.into_response();
        }
    };

    let client_id = extract_client_id(&body);
    let request = Request::from_parts(parts, Body::from(body));

    let Some(client_id) = client_id else {
        return next.run(request).await;
    };

    match gate.check(client_id) {
        Admission::Admitted => next.run(request).await,
        Admission::Rejected => {
            tracing::warn!("Rate limit exceeded for client {client_id}");
            too_many_requests(client_id)
        }
    }
}

/// Find the client ID in a JSON request body.
fn extract_client_id(body: &Bytes) -> Option<ClientId> {
    let value: Value = serde_json::from_slice(body).ok()?;
    let object = value.as_object()?;
    let field = object.get("client_id").or_else(|| object.get("clientId"))?;

    match field {
        Value::Number(number) => number.as_i64(),
        // Request bodies accept IDs as strings of digits too.
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

fn too_many_requests(client_id: ClientId) -> Response {
    (
        StatusCode::TOO_MANY_REQUESTS,
        Json(json!({
            "message": format!(
                "Too many requests - Rate limit is {MAX_REQUESTS_PER_WINDOW} per minute for client {client_id}"
            )
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use axum::{
        Router,
        body::Bytes,
        http::StatusCode,
        middleware,
        routing::{get, post},
    };
    use axum_test::TestServer;
    use serde_json::json;

    use crate::admission::{AdmissionGate, middleware::extract_client_id};

    use super::admission_guard;

    async fn echo(body: Bytes) -> Bytes {
        body
    }

    fn get_test_server(gate: AdmissionGate) -> TestServer {
        let app = Router::new()
            .route("/guarded", post(echo).get(|| async { "ok" }))
            .route_layer(middleware::from_fn_with_state(gate, admission_guard));

        TestServer::try_new(app).expect("Could not create test server.")
    }

    #[test]
    fn extracts_snake_case_client_id() {
        let body = Bytes::from(json!({ "client_id": 10 }).to_string());

        assert_eq!(extract_client_id(&body), Some(10));
    }

    #[test]
    fn extracts_camel_case_client_id() {
        let body = Bytes::from(json!({ "clientId": 11 }).to_string());

        assert_eq!(extract_client_id(&body), Some(11));
    }

    #[test]
    fn snake_case_takes_precedence() {
        let body = Bytes::from(json!({ "client_id": 1, "clientId": 2 }).to_string());

        assert_eq!(extract_client_id(&body), Some(1));
    }

    #[test]
    fn accepts_numeric_strings() {
        let body = Bytes::from(json!({ "client_id": "12" }).to_string());

        assert_eq!(extract_client_id(&body), Some(12));
    }

    #[test]
    fn ignores_unusable_bodies() {
        for body in [
            "not json",
            "[1, 2, 3]",
            r#"{"employee_id": 1}"#,
            r#"{"client_id": null}"#,
            r#"{"client_id": 1.5}"#,
            r#"{"client_id": "abc"}"#,
        ] {
            assert_eq!(
                extract_client_id(&Bytes::from(body)),
                None,
                "want no client ID for body {body:?}"
            );
        }
    }

    #[tokio::test]
    async fn rejects_fourth_request_with_message() {
        let server = get_test_server(AdmissionGate::new());
        let body = json!({ "client_id": 10, "amount": 100 });

        for _ in 0..3 {
            server.post("/guarded").json(&body).await.assert_status_ok();
        }

        let response = server.post("/guarded").json(&body).await;

        response.assert_status(StatusCode::TOO_MANY_REQUESTS);
        response.assert_json(&json!({
            "message": "Too many requests - Rate limit is 3 per minute for client 10"
        }));
    }

    #[tokio::test]
    async fn forwards_body_to_handler() {
        let server = get_test_server(AdmissionGate::new());
        let body = json!({ "client_id": 10, "merchant_or_business": "Starbucks" });

        let response = server.post("/guarded").json(&body).await;

        response.assert_status_ok();
        response.assert_json(&body);
    }

    #[tokio::test]
    async fn other_clients_are_admitted() {
        let server = get_test_server(AdmissionGate::new());

        for _ in 0..3 {
            server
                .post("/guarded")
                .json(&json!({ "client_id": 1 }))
                .await
                .assert_status_ok();
        }

        server
            .post("/guarded")
            .json(&json!({ "client_id": 2 }))
            .await
            .assert_status_ok();
    }

    #[tokio::test]
    async fn requests_without_client_id_are_never_rejected() {
        let server = get_test_server(AdmissionGate::new());

        for _ in 0..10 {
            server
                .post("/guarded")
                .json(&json!({ "employee_id": 1 }))
                .await
                .assert_status_ok();
            server
                .post("/guarded")
                .text("definitely not json")
                .await
                .assert_status_ok();
        }
    }

    #[tokio::test]
    async fn non_post_requests_are_not_counted() {
        let gate = AdmissionGate::new();
        let server = get_test_server(gate.clone());

        for _ in 0..10 {
            server.get("/guarded").await.assert_status_ok();
        }

        assert_eq!(gate.tracked_clients(), 0);
    }

    #[tokio::test]
    async fn oversized_body_is_refused_without_counting() {
        let gate = AdmissionGate::new();
        let server = get_test_server(gate.clone());
        let body = json!({ "client_id": 1, "padding": "x".repeat(3 * 1024 * 1024) });

        let response = server.post("/guarded").json(&body).await;

        response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(gate.tracked_clients(), 0);
    }
}
