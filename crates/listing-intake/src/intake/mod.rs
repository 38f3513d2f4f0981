//! Open API listing intake pipeline.
//!
//! Control flow for `POST /api/open/v1/listings`: credential authentication,
//! per-credential rate limiting, alias resolution into the canonical field
//! set, validation, defaulting, and atomic draft persistence. Every component
//! downstream of the resolver operates only on canonical field names.

pub mod aliases;
pub mod auth;
pub mod domain;
pub mod rate_limit;
pub mod repository;
pub mod response;
pub mod router;
pub mod service;
pub mod validate;

#[cfg(test)]
mod tests;

pub use aliases::{resolve, ResolvedPayload};
pub use auth::{AuthContext, AuthError, CredentialAuthenticator, LISTINGS_CREATE_SCOPE};
pub use domain::{
    Category, Credential, CredentialId, CredentialStatus, DraftListing, ListingId, ListingStatus,
    OfferingType, RentFrequency, UserId, WorkspaceId,
};
pub use rate_limit::{FixedWindowLimiter, RateLimitExceeded};
pub use repository::{
    CredentialStore, ListingRecord, ListingRepository, ListingStoreError, StoreError,
    WorkspaceDirectory,
};
pub use response::ErrorCode;
pub use router::intake_router;
pub use service::{IntakeError, IntakeReceipt, ListingIntakeService};
pub use validate::{FieldIssue, ValidatedListing, ValidationError};
