use std::sync::Arc;

use chrono::{DateTime, Utc};
use subtle::ConstantTimeEq;
use tracing::{debug, warn};

use super::domain::{Credential, CredentialStatus, WorkspaceId};
use super::repository::{CredentialStore, StoreError};

/// Scope every caller of the listing creation endpoint must carry.
pub const LISTINGS_CREATE_SCOPE: &str = "listings:create";

/// A credential resolved and authorized for this request; the workspace id
/// implicitly scopes every subsequent lookup in the pipeline.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub credential: Credential,
    pub workspace_id: WorkspaceId,
}

/// Authentication outcomes other than success. Key-not-found and secret
/// mismatch are deliberately indistinguishable here; the split exists only in
/// audit logs.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("API key or secret is not valid")]
    InvalidCredentials,
    #[error("credential is inactive")]
    Inactive,
    #[error("credential has been revoked")]
    Revoked,
    #[error("credential has expired")]
    Expired,
    #[error("credential does not carry the {LISTINGS_CREATE_SCOPE} scope")]
    InsufficientScope,
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Resolves an `X-API-Key`/`X-API-Secret` pair to a workspace-bound
/// credential.
pub struct CredentialAuthenticator<C> {
    store: Arc<C>,
}

impl<C> CredentialAuthenticator<C>
where
    C: CredentialStore,
{
    pub fn new(store: Arc<C>) -> Self {
        Self { store }
    }

    pub fn authenticate(
        &self,
        key_id: &str,
        secret: &str,
        now: DateTime<Utc>,
    ) -> Result<AuthContext, AuthError> {
        let Some(credential) = self.store.lookup(key_id)? else {
            warn!(key_id, reason = "key_not_found", "open api auth rejected");
            return Err(AuthError::InvalidCredentials);
        };

        if !secret_matches(&credential.secret, secret) {
            warn!(key_id, reason = "secret_mismatch", "open api auth rejected");
            return Err(AuthError::InvalidCredentials);
        }

        match credential.effective_status(now) {
            CredentialStatus::Inactive => Err(AuthError::Inactive),
            CredentialStatus::Revoked => Err(AuthError::Revoked),
            CredentialStatus::Expired => Err(AuthError::Expired),
            CredentialStatus::Active => {
                if !credential
                    .scopes
                    .iter()
                    .any(|scope| scope == LISTINGS_CREATE_SCOPE)
                {
                    return Err(AuthError::InsufficientScope);
                }

                // Usage bookkeeping must not fail the request.
                if let Err(err) = self.store.touch(key_id, now) {
                    debug!(key_id, error = %err, "failed to record credential usage");
                }

                Ok(AuthContext {
                    workspace_id: credential.workspace_id,
                    credential,
                })
            }
        }
    }
}

/// Constant-time comparison so response timing cannot narrow down the secret.
fn secret_matches(stored: &str, supplied: &str) -> bool {
    stored.as_bytes().ct_eq(supplied.as_bytes()).into()
}
