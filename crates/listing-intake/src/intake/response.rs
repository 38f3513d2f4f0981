//! Uniform response envelopes for the Open API surface.
//!
//! Success: `{"success": true, "data": ..., "meta": ..., "request_id": ...}`.
//! Failure: `{"success": false, "code": ..., "error": ..., "request_id": ...,
//! "details": ...}`. The request id echoes the caller's `X-Request-Id` when
//! present so partners can correlate retries; otherwise one is minted.

use axum::http::StatusCode;
use serde_json::{json, Value};
use uuid::Uuid;

use super::domain::WorkspaceId;
use super::service::IntakeError;

/// Wire error codes and their HTTP status mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    InvalidCredentials,
    CredentialInactive,
    CredentialRevoked,
    CredentialExpired,
    InsufficientScope,
    DuplicateReference,
    ValidationError,
    RateLimited,
    InternalError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidCredentials => "invalid_credentials",
            Self::CredentialInactive => "credential_inactive",
            Self::CredentialRevoked => "credential_revoked",
            Self::CredentialExpired => "credential_expired",
            Self::InsufficientScope => "insufficient_scope",
            Self::DuplicateReference => "duplicate_reference",
            Self::ValidationError => "validation_error",
            Self::RateLimited => "rate_limited",
            Self::InternalError => "internal_error",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::CredentialInactive
            | Self::CredentialRevoked
            | Self::CredentialExpired
            | Self::InsufficientScope => StatusCode::FORBIDDEN,
            Self::DuplicateReference => StatusCode::CONFLICT,
            Self::ValidationError => StatusCode::UNPROCESSABLE_ENTITY,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<&IntakeError> for ErrorCode {
    fn from(value: &IntakeError) -> Self {
        use super::auth::AuthError;
        match value {
            IntakeError::Auth(AuthError::InvalidCredentials) => Self::InvalidCredentials,
            IntakeError::Auth(AuthError::Inactive) => Self::CredentialInactive,
            IntakeError::Auth(AuthError::Revoked) => Self::CredentialRevoked,
            IntakeError::Auth(AuthError::Expired) => Self::CredentialExpired,
            IntakeError::Auth(AuthError::InsufficientScope) => Self::InsufficientScope,
            IntakeError::Auth(AuthError::Store(_)) => Self::InternalError,
            IntakeError::RateLimited(_) => Self::RateLimited,
            IntakeError::Validation(_) => Self::ValidationError,
            IntakeError::DuplicateReference => Self::DuplicateReference,
            IntakeError::Unavailable(_) => Self::InternalError,
        }
    }
}

/// Echo the caller-supplied trace id when usable, else mint one.
pub fn request_id(supplied: Option<&str>) -> String {
    supplied
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .unwrap_or_else(mint_request_id)
}

pub fn mint_request_id() -> String {
    Uuid::new_v4().to_string()
}

/// Success envelope. `meta.workspace_id` is always present so callers can
/// confirm which workspace the credential resolved to.
pub fn success(data: Value, meta: Value, workspace_id: WorkspaceId, request_id: &str) -> Value {
    let mut meta = meta;
    if let Some(meta) = meta.as_object_mut() {
        meta.insert("workspace_id".to_string(), json!(workspace_id.0));
    }
    json!({
        "success": true,
        "data": data,
        "meta": meta,
        "request_id": request_id,
    })
}

/// Failure envelope shared by every non-2xx response.
pub fn failure(code: ErrorCode, message: &str, details: Value, request_id: &str) -> Value {
    json!({
        "success": false,
        "code": code.as_str(),
        "error": message,
        "request_id": request_id,
        "details": details,
    })
}
