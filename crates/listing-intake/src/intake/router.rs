use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use chrono::Utc;
use serde_json::{json, Value};

use super::repository::{CredentialStore, ListingRepository, WorkspaceDirectory};
use super::response::{self, ErrorCode};
use super::service::{IntakeError, ListingIntakeService};

const API_KEY_HEADER: &str = "x-api-key";
const API_SECRET_HEADER: &str = "x-api-secret";
const REQUEST_ID_HEADER: &str = "x-request-id";

/// Router exposing the partner-facing listing creation endpoint.
pub fn intake_router<C, D, L>(service: Arc<ListingIntakeService<C, D, L>>) -> Router
where
    C: CredentialStore + 'static,
    D: WorkspaceDirectory + 'static,
    L: ListingRepository + 'static,
{
    Router::new()
        .route("/api/open/v1/listings", post(create_listing_handler::<C, D, L>))
        .with_state(service)
}

/// The body is read raw and parsed by hand so malformed JSON still produces
/// the uniform error envelope instead of axum's default rejection.
pub(crate) async fn create_listing_handler<C, D, L>(
    State(service): State<Arc<ListingIntakeService<C, D, L>>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response
where
    C: CredentialStore + 'static,
    D: WorkspaceDirectory + 'static,
    L: ListingRepository + 'static,
{
    let request_id = response::request_id(header_text(&headers, REQUEST_ID_HEADER));

    let key_id = header_text(&headers, API_KEY_HEADER);
    let secret = header_text(&headers, API_SECRET_HEADER);
    let (Some(key_id), Some(secret)) = (key_id, secret) else {
        let body = response::failure(
            ErrorCode::InvalidCredentials,
            "X-API-Key and X-API-Secret headers are required",
            json!({}),
            &request_id,
        );
        return (StatusCode::UNAUTHORIZED, Json(body)).into_response();
    };

    let payload: Value = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(_) => {
            let body = response::failure(
                ErrorCode::ValidationError,
                "request body must be valid JSON",
                json!({ "issues": [{ "field": "body", "message": "unparseable JSON" }] }),
                &request_id,
            );
            return (StatusCode::UNPROCESSABLE_ENTITY, Json(body)).into_response();
        }
    };

    match service.ingest(key_id, secret, &payload, Utc::now()) {
        Ok(receipt) => {
            let mut meta = json!({});
            if !receipt.warnings.is_empty() {
                meta["warnings"] = json!(receipt.warnings);
            }
            if !receipt.unrecognized_keys.is_empty() {
                meta["ignored_keys"] = json!(receipt.unrecognized_keys);
            }
            let body = response::success(
                json!({
                    "id": receipt.id.0,
                    "reference": receipt.reference,
                    "status": receipt.status.label(),
                }),
                meta,
                receipt.workspace_id,
                &request_id,
            );
            (StatusCode::CREATED, Json(body)).into_response()
        }
        Err(error) => error_response(error, &request_id),
    }
}

fn error_response(error: IntakeError, request_id: &str) -> Response {
    let code = ErrorCode::from(&error);

    let (message, details) = match &error {
        IntakeError::Validation(issues) => (
            "payload failed validation".to_string(),
            json!({ "issues": issues }),
        ),
        IntakeError::RateLimited(exceeded) => (
            "rate limit exceeded".to_string(),
            json!({ "retry_after": exceeded.retry_after_secs }),
        ),
        // Internal detail stays in the logs, never in the body.
        IntakeError::Unavailable(detail) => {
            tracing::error!(detail, "intake pipeline store failure");
            ("internal error".to_string(), json!({}))
        }
        other => (other.to_string(), json!({})),
    };

    let body = response::failure(code, &message, details, request_id);

    if let IntakeError::RateLimited(exceeded) = &error {
        let headers = [(header::RETRY_AFTER, exceeded.retry_after_secs.to_string())];
        return (code.status(), headers, Json(body)).into_response();
    }

    (code.status(), Json(body)).into_response()
}

fn header_text<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}
