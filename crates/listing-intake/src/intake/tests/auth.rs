use std::collections::BTreeSet;
use std::sync::Arc;

use super::common::{credential, now, MemoryCredentials, DEMO_KEY, DEMO_SECRET, DEMO_WORKSPACE};
use crate::intake::auth::{AuthError, CredentialAuthenticator};
use crate::intake::domain::CredentialStatus;

fn authenticator(credentials: Vec<crate::intake::domain::Credential>) -> (
    CredentialAuthenticator<MemoryCredentials>,
    Arc<MemoryCredentials>,
) {
    let store = Arc::new(MemoryCredentials::with(credentials));
    (CredentialAuthenticator::new(store.clone()), store)
}

#[test]
fn unknown_key_maps_to_invalid_credentials() {
    let (auth, _) = authenticator(vec![credential()]);
    let result = auth.authenticate("pk_unknown", DEMO_SECRET, now());
    assert!(matches!(result, Err(AuthError::InvalidCredentials)));
}

#[test]
fn secret_mismatch_is_indistinguishable_from_unknown_key() {
    let (auth, _) = authenticator(vec![credential()]);
    let result = auth.authenticate(DEMO_KEY, "sk_wrong", now());
    assert!(matches!(result, Err(AuthError::InvalidCredentials)));
}

#[test]
fn non_active_statuses_map_to_their_specific_errors() {
    let cases = [
        (CredentialStatus::Inactive, "inactive"),
        (CredentialStatus::Revoked, "revoked"),
        (CredentialStatus::Expired, "expired"),
    ];

    for (status, label) in cases {
        let mut stored = credential();
        stored.status = status;
        let (auth, _) = authenticator(vec![stored]);
        let error = auth
            .authenticate(DEMO_KEY, DEMO_SECRET, now())
            .expect_err("non-active credential rejected");
        match (status, &error) {
            (CredentialStatus::Inactive, AuthError::Inactive)
            | (CredentialStatus::Revoked, AuthError::Revoked)
            | (CredentialStatus::Expired, AuthError::Expired) => {}
            _ => panic!("status {label} produced unexpected error {error:?}"),
        }
    }
}

#[test]
fn computed_expiry_rejects_as_expired() {
    let mut stored = credential();
    stored.expires_at = Some(now() - chrono::Duration::minutes(1));
    let (auth, _) = authenticator(vec![stored]);
    let result = auth.authenticate(DEMO_KEY, DEMO_SECRET, now());
    assert!(matches!(result, Err(AuthError::Expired)));
}

#[test]
fn missing_scope_is_rejected_after_status_checks() {
    let mut stored = credential();
    stored.scopes = BTreeSet::from(["listings:read".to_string()]);
    let (auth, _) = authenticator(vec![stored]);
    let result = auth.authenticate(DEMO_KEY, DEMO_SECRET, now());
    assert!(matches!(result, Err(AuthError::InsufficientScope)));
}

#[test]
fn success_binds_the_workspace_and_records_usage() {
    let (auth, store) = authenticator(vec![credential()]);
    let context = auth
        .authenticate(DEMO_KEY, DEMO_SECRET, now())
        .expect("active credential authenticates");

    assert_eq!(context.workspace_id, DEMO_WORKSPACE);
    assert_eq!(context.credential.key_id, DEMO_KEY);

    let touches = store.touches.lock().expect("touch mutex poisoned");
    assert_eq!(touches.as_slice(), &[(DEMO_KEY.to_string(), now())]);
}
