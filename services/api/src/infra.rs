use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use listing_intake::error::AppError;
use listing_intake::intake::{
    Credential, CredentialId, CredentialStatus, CredentialStore, DraftListing, ListingId,
    ListingRecord, ListingRepository, ListingStatus, ListingStoreError, StoreError, UserId,
    WorkspaceDirectory, WorkspaceId, LISTINGS_CREATE_SCOPE,
};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Deserialize;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default)]
pub(crate) struct InMemoryCredentialStore {
    by_key: Mutex<HashMap<String, Credential>>,
}

impl InMemoryCredentialStore {
    pub(crate) fn insert(&self, credential: Credential) {
        let mut guard = self.by_key.lock().expect("credential mutex poisoned");
        guard.insert(credential.key_id.clone(), credential);
    }
}

impl CredentialStore for InMemoryCredentialStore {
    fn lookup(&self, key_id: &str) -> Result<Option<Credential>, StoreError> {
        let guard = self.by_key.lock().expect("credential mutex poisoned");
        Ok(guard.get(key_id).cloned())
    }

    fn touch(&self, key_id: &str, used_at: DateTime<Utc>) -> Result<(), StoreError> {
        let mut guard = self.by_key.lock().expect("credential mutex poisoned");
        if let Some(credential) = guard.get_mut(key_id) {
            credential.last_used_at = Some(used_at);
        }
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct InMemoryWorkspaceDirectory {
    members: Mutex<HashMap<WorkspaceId, HashSet<UserId>>>,
    default_agents: Mutex<HashMap<WorkspaceId, String>>,
}

impl InMemoryWorkspaceDirectory {
    pub(crate) fn add_member(&self, workspace_id: WorkspaceId, user_id: UserId) {
        let mut guard = self.members.lock().expect("member mutex poisoned");
        guard.entry(workspace_id).or_default().insert(user_id);
    }

    pub(crate) fn set_default_agent(&self, workspace_id: WorkspaceId, email: String) {
        let mut guard = self.default_agents.lock().expect("agent mutex poisoned");
        guard.insert(workspace_id, email);
    }
}

impl WorkspaceDirectory for InMemoryWorkspaceDirectory {
    fn is_member(&self, workspace_id: WorkspaceId, user_id: UserId) -> Result<bool, StoreError> {
        let guard = self.members.lock().expect("member mutex poisoned");
        Ok(guard
            .get(&workspace_id)
            .is_some_and(|members| members.contains(&user_id)))
    }

    fn default_agent(&self, workspace_id: WorkspaceId) -> Result<Option<String>, StoreError> {
        let guard = self.default_agents.lock().expect("agent mutex poisoned");
        Ok(guard.get(&workspace_id).cloned())
    }
}

#[derive(Default)]
pub(crate) struct InMemoryListingRepository {
    state: Mutex<ListingState>,
}

#[derive(Default)]
struct ListingState {
    next_id: i64,
    by_reference: HashMap<(WorkspaceId, String), ListingRecord>,
}

impl ListingRepository for InMemoryListingRepository {
    fn insert(&self, listing: DraftListing) -> Result<ListingRecord, ListingStoreError> {
        // One lock spans the uniqueness check and the insert, standing in for
        // a database unique constraint on (workspace_id, reference).
        let mut guard = self.state.lock().expect("listing mutex poisoned");
        let key = (listing.workspace_id, listing.reference.clone());
        if guard.by_reference.contains_key(&key) {
            return Err(ListingStoreError::DuplicateReference);
        }
        guard.next_id += 1;
        let record = ListingRecord {
            id: ListingId(guard.next_id),
            status: ListingStatus::Draft,
            created_at: Utc::now(),
            listing,
        };
        guard.by_reference.insert(key, record.clone());
        Ok(record)
    }
}

/// Seed file shape: workspaces with members and default agents, plus the API
/// credentials bound to them. Secrets live only in this operator-provided
/// file; they are never echoed back out.
#[derive(Debug, Deserialize)]
pub(crate) struct SeedFile {
    #[serde(default)]
    pub(crate) workspaces: Vec<SeedWorkspace>,
    #[serde(default)]
    pub(crate) credentials: Vec<SeedCredential>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SeedWorkspace {
    pub(crate) id: i64,
    #[serde(default)]
    pub(crate) default_agent: Option<String>,
    #[serde(default)]
    pub(crate) members: Vec<i64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SeedCredential {
    pub(crate) id: i64,
    pub(crate) workspace_id: i64,
    #[serde(default)]
    pub(crate) name: String,
    pub(crate) key_id: String,
    pub(crate) secret: String,
    #[serde(default = "default_status")]
    pub(crate) status: CredentialStatus,
    #[serde(default = "default_scopes")]
    pub(crate) scopes: Vec<String>,
    #[serde(default = "default_rate_limit")]
    pub(crate) rate_limit_per_min: u32,
    #[serde(default)]
    pub(crate) expires_at: Option<DateTime<Utc>>,
}

fn default_status() -> CredentialStatus {
    CredentialStatus::Active
}

fn default_scopes() -> Vec<String> {
    vec![LISTINGS_CREATE_SCOPE.to_string()]
}

fn default_rate_limit() -> u32 {
    60
}

impl From<SeedCredential> for Credential {
    fn from(seed: SeedCredential) -> Self {
        Credential {
            id: CredentialId(seed.id),
            workspace_id: WorkspaceId(seed.workspace_id),
            name: seed.name,
            key_id: seed.key_id,
            secret: seed.secret,
            status: seed.status,
            scopes: BTreeSet::from_iter(seed.scopes),
            rate_limit_per_min: seed.rate_limit_per_min,
            expires_at: seed.expires_at,
            last_used_at: None,
        }
    }
}

pub(crate) fn load_seed_file(path: &str) -> Result<SeedFile, AppError> {
    let raw = std::fs::read_to_string(Path::new(path))?;
    serde_json::from_str(&raw)
        .map_err(|err| AppError::Seed(format!("{path}: {err}")))
}

pub(crate) fn apply_seed(
    seed: SeedFile,
    credentials: &InMemoryCredentialStore,
    directory: &InMemoryWorkspaceDirectory,
) {
    for workspace in seed.workspaces {
        let workspace_id = WorkspaceId(workspace.id);
        if let Some(agent) = workspace.default_agent {
            directory.set_default_agent(workspace_id, agent);
        }
        for member in workspace.members {
            directory.add_member(workspace_id, UserId(member));
        }
    }
    for credential in seed.credentials {
        credentials.insert(credential.into());
    }
}
