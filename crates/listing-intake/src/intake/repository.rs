use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{Credential, DraftListing, ListingId, ListingStatus, UserId, WorkspaceId};

/// Persisted listing row returned by the repository after a successful insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingRecord {
    pub id: ListingId,
    pub status: ListingStatus,
    pub created_at: DateTime<Utc>,
    pub listing: DraftListing,
}

/// Read-only credential lookup keyed by the public key identifier, plus a
/// usage timestamp hook. Lookup exposes the stored secret for comparison; it
/// must never travel further than the authenticator.
pub trait CredentialStore: Send + Sync {
    fn lookup(&self, key_id: &str) -> Result<Option<Credential>, StoreError>;
    fn touch(&self, key_id: &str, used_at: DateTime<Utc>) -> Result<(), StoreError>;
}

/// Workspace membership and defaulting oracle.
pub trait WorkspaceDirectory: Send + Sync {
    fn is_member(&self, workspace_id: WorkspaceId, user_id: UserId) -> Result<bool, StoreError>;
    fn default_agent(&self, workspace_id: WorkspaceId) -> Result<Option<String>, StoreError>;
}

/// Listing persistence. `insert` must be atomic with the uniqueness check on
/// `(workspace_id, reference)` so concurrent same-reference requests observe
/// exactly one success.
pub trait ListingRepository: Send + Sync {
    fn insert(&self, listing: DraftListing) -> Result<ListingRecord, ListingStoreError>;
}

/// Failures from credential and workspace lookups.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Failures from listing persistence.
#[derive(Debug, thiserror::Error)]
pub enum ListingStoreError {
    #[error("reference already exists in this workspace")]
    DuplicateReference,
    #[error("listing store unavailable: {0}")]
    Unavailable(String),
}
