use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, TimeZone, Utc};
use serde_json::{json, Value};

use crate::intake::domain::{
    Credential, CredentialId, CredentialStatus, DraftListing, ListingId, ListingStatus, UserId,
    WorkspaceId,
};
use crate::intake::repository::{
    CredentialStore, ListingRecord, ListingRepository, ListingStoreError, StoreError,
    WorkspaceDirectory,
};
use crate::intake::service::ListingIntakeService;

pub(super) const DEMO_KEY: &str = "pk_live_demo";
pub(super) const DEMO_SECRET: &str = "sk_live_demo_secret";
pub(super) const DEMO_WORKSPACE: WorkspaceId = WorkspaceId(42);

pub(super) fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 30).unwrap()
}

pub(super) fn credential() -> Credential {
    Credential {
        id: CredentialId(1),
        workspace_id: DEMO_WORKSPACE,
        name: "partner feed".to_string(),
        key_id: DEMO_KEY.to_string(),
        secret: DEMO_SECRET.to_string(),
        status: CredentialStatus::Active,
        scopes: BTreeSet::from(["listings:create".to_string()]),
        rate_limit_per_min: 60,
        expires_at: None,
        last_used_at: None,
    }
}

#[derive(Default)]
pub(super) struct MemoryCredentials {
    by_key: Mutex<HashMap<String, Credential>>,
    pub(super) touches: Mutex<Vec<(String, DateTime<Utc>)>>,
}

impl MemoryCredentials {
    pub(super) fn with(credentials: Vec<Credential>) -> Self {
        let store = Self::default();
        {
            let mut guard = store.by_key.lock().expect("credential mutex poisoned");
            for credential in credentials {
                guard.insert(credential.key_id.clone(), credential);
            }
        }
        store
    }
}

impl CredentialStore for MemoryCredentials {
    fn lookup(&self, key_id: &str) -> Result<Option<Credential>, StoreError> {
        let guard = self.by_key.lock().expect("credential mutex poisoned");
        Ok(guard.get(key_id).cloned())
    }

    fn touch(&self, key_id: &str, used_at: DateTime<Utc>) -> Result<(), StoreError> {
        let mut guard = self.touches.lock().expect("touch mutex poisoned");
        guard.push((key_id.to_string(), used_at));
        Ok(())
    }
}

#[derive(Default)]
pub(super) struct MemoryDirectory {
    members: Mutex<HashMap<WorkspaceId, HashSet<UserId>>>,
    default_agents: Mutex<HashMap<WorkspaceId, String>>,
}

impl MemoryDirectory {
    pub(super) fn add_member(&self, workspace_id: WorkspaceId, user_id: UserId) {
        let mut guard = self.members.lock().expect("member mutex poisoned");
        guard.entry(workspace_id).or_default().insert(user_id);
    }

    pub(super) fn set_default_agent(&self, workspace_id: WorkspaceId, email: &str) {
        let mut guard = self
            .default_agents
            .lock()
            .expect("agent mutex poisoned");
        guard.insert(workspace_id, email.to_string());
    }
}

impl WorkspaceDirectory for MemoryDirectory {
    fn is_member(&self, workspace_id: WorkspaceId, user_id: UserId) -> Result<bool, StoreError> {
        let guard = self.members.lock().expect("member mutex poisoned");
        Ok(guard
            .get(&workspace_id)
            .is_some_and(|members| members.contains(&user_id)))
    }

    fn default_agent(&self, workspace_id: WorkspaceId) -> Result<Option<String>, StoreError> {
        let guard = self
            .default_agents
            .lock()
            .expect("agent mutex poisoned");
        Ok(guard.get(&workspace_id).cloned())
    }
}

#[derive(Default)]
pub(super) struct MemoryListings {
    state: Mutex<ListingState>,
}

#[derive(Default)]
struct ListingState {
    next_id: i64,
    by_reference: HashMap<(WorkspaceId, String), ListingRecord>,
}

impl MemoryListings {
    pub(super) fn records(&self) -> Vec<ListingRecord> {
        let guard = self.state.lock().expect("listing mutex poisoned");
        guard.by_reference.values().cloned().collect()
    }

    pub(super) fn find(
        &self,
        workspace_id: WorkspaceId,
        reference: &str,
    ) -> Option<ListingRecord> {
        let guard = self.state.lock().expect("listing mutex poisoned");
        guard
            .by_reference
            .get(&(workspace_id, reference.to_string()))
            .cloned()
    }
}

impl ListingRepository for MemoryListings {
    fn insert(&self, listing: DraftListing) -> Result<ListingRecord, ListingStoreError> {
        // Uniqueness check and insert happen under one lock, mirroring a
        // storage-layer unique constraint.
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

pub(super) type TestService = ListingIntakeService<MemoryCredentials, MemoryDirectory, MemoryListings>;

pub(super) struct TestHarness {
    pub(super) service: Arc<TestService>,
    pub(super) credentials: Arc<MemoryCredentials>,
    pub(super) directory: Arc<MemoryDirectory>,
    pub(super) listings: Arc<MemoryListings>,
}

pub(super) fn harness() -> TestHarness {
    harness_with(vec![credential()])
}

pub(super) fn harness_with(credentials: Vec<Credential>) -> TestHarness {
    let credentials = Arc::new(MemoryCredentials::with(credentials));
    let directory = Arc::new(MemoryDirectory::default());
    let listings = Arc::new(MemoryListings::default());
    let service = Arc::new(ListingIntakeService::new(
        credentials.clone(),
        directory.clone(),
        listings.clone(),
    ));
    TestHarness {
        service,
        credentials,
        directory,
        listings,
    }
}

/// Minimal canonical payload satisfying every required field.
pub(super) fn canonical_payload(reference: &str) -> Value {
    json!({
        "reference": reference,
        "offering_type": "sale",
        "property_type": "apartment",
        "category": "residential",
        "price": 1_250_000,
        "title_en": "Two-bed with marina view",
    })
}

/// The same listing expressed in the nested PF shape.
pub(super) fn pf_payload(reference: &str) -> Value {
    json!({
        "reference": reference,
        "type": "apartment",
        "category": "residential",
        "uaeEmirate": "dubai",
        "price": { "type": "sale", "amounts": { "sale": 1_250_000 } },
        "title": { "en": "Two-bed with marina view" },
        "assignedTo": { "id": 88 },
        "media": {
            "images": ["https://cdn.example.com/a.jpg"],
            "videos": [
                { "type": "default", "url": "https://cdn.example.com/tour.mp4" },
                { "type": "view360", "url": "https://cdn.example.com/sphere.mp4" }
            ]
        }
    })
}
