use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::info;

use super::aliases;
use super::auth::{AuthError, CredentialAuthenticator};
use super::domain::{ListingId, ListingStatus, WorkspaceId};
use super::rate_limit::{FixedWindowLimiter, RateLimitExceeded};
use super::repository::{
    CredentialStore, ListingRepository, ListingStoreError, StoreError, WorkspaceDirectory,
};
use super::validate::{self, FieldIssue, ValidationError};

/// Orchestrates the intake pipeline: authenticate, rate-limit, resolve,
/// validate, default, persist. Each stage fails closed; the first failure
/// becomes the request's only error.
pub struct ListingIntakeService<C, D, L> {
    authenticator: CredentialAuthenticator<C>,
    limiter: FixedWindowLimiter,
    directory: Arc<D>,
    listings: Arc<L>,
}

/// What a successful run hands back to the response layer.
#[derive(Debug, Clone)]
pub struct IntakeReceipt {
    pub id: ListingId,
    pub reference: String,
    pub status: ListingStatus,
    pub workspace_id: WorkspaceId,
    pub warnings: Vec<FieldIssue>,
    pub unrecognized_keys: Vec<String>,
}

/// Pipeline failure taxonomy; maps 1:1 onto the wire error codes.
#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    #[error(transparent)]
    Auth(AuthError),
    #[error("rate limit exceeded")]
    RateLimited(RateLimitExceeded),
    #[error("payload failed validation")]
    Validation(Vec<FieldIssue>),
    #[error("reference already exists in this workspace")]
    DuplicateReference,
    #[error("collaborating store unavailable: {0}")]
    Unavailable(String),
}

impl From<AuthError> for IntakeError {
    fn from(value: AuthError) -> Self {
        match value {
            AuthError::Store(StoreError::Unavailable(detail)) => Self::Unavailable(detail),
            other => Self::Auth(other),
        }
    }
}

impl From<ValidationError> for IntakeError {
    fn from(value: ValidationError) -> Self {
        match value {
            ValidationError::Invalid(issues) => Self::Validation(issues),
            ValidationError::Store(StoreError::Unavailable(detail)) => Self::Unavailable(detail),
        }
    }
}

impl From<ListingStoreError> for IntakeError {
    fn from(value: ListingStoreError) -> Self {
        match value {
            ListingStoreError::DuplicateReference => Self::DuplicateReference,
            ListingStoreError::Unavailable(detail) => Self::Unavailable(detail),
        }
    }
}

impl From<StoreError> for IntakeError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Unavailable(detail) => Self::Unavailable(detail),
        }
    }
}

impl<C, D, L> ListingIntakeService<C, D, L>
where
    C: CredentialStore + 'static,
    D: WorkspaceDirectory + 'static,
    L: ListingRepository + 'static,
{
    pub fn new(credentials: Arc<C>, directory: Arc<D>, listings: Arc<L>) -> Self {
        Self {
            authenticator: CredentialAuthenticator::new(credentials),
            limiter: FixedWindowLimiter::new(),
            directory,
            listings,
        }
    }

    /// Runs one request through the full pipeline.
    pub fn ingest(
        &self,
        key_id: &str,
        secret: &str,
        body: &Value,
        now: DateTime<Utc>,
    ) -> Result<IntakeReceipt, IntakeError> {
        let auth = self.authenticator.authenticate(key_id, secret, now)?;

        self.limiter
            .check(
                auth.credential.id,
                auth.credential.rate_limit_per_min,
                now,
            )
            .map_err(IntakeError::RateLimited)?;

        let Some(input) = body.as_object() else {
            return Err(IntakeError::Validation(vec![FieldIssue {
                field: "body".to_string(),
                message: "payload must be a JSON object".to_string(),
            }]));
        };

        let resolved = aliases::resolve(input);
        let validated = validate::validate(&resolved, auth.workspace_id, self.directory.as_ref())?;

        let mut listing = validated.listing;
        if listing.assigned_agent.is_none() {
            listing.assigned_agent = self.directory.default_agent(auth.workspace_id)?;
        }

        let record = self.listings.insert(listing)?;

        info!(
            workspace_id = auth.workspace_id.0,
            listing_id = record.id.0,
            reference = %record.listing.reference,
            "draft listing ingested"
        );

        Ok(IntakeReceipt {
            id: record.id,
            reference: record.listing.reference,
            status: record.status,
            workspace_id: auth.workspace_id,
            warnings: validated.warnings,
            unrecognized_keys: resolved.unrecognized,
        })
    }
}
