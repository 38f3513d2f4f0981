use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for tenant workspaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkspaceId(pub i64);

/// Identifier wrapper for workspace users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub i64);

/// Identifier wrapper for API credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CredentialId(pub i64);

/// Identifier wrapper for persisted listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ListingId(pub i64);

/// Lifecycle states for an API credential as stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialStatus {
    Active,
    Inactive,
    Revoked,
    Expired,
}

/// Workspace-bound key/secret pair authorizing Open API calls.
///
/// The secret is opaque and write-once; it never appears in logs or response
/// payloads after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credential {
    pub id: CredentialId,
    pub workspace_id: WorkspaceId,
    pub name: String,
    pub key_id: String,
    pub secret: String,
    pub status: CredentialStatus,
    pub scopes: BTreeSet<String>,
    pub rate_limit_per_min: u32,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_used_at: Option<DateTime<Utc>>,
}

impl Credential {
    /// Status at lookup time. A stored `active` credential whose expiry date
    /// has passed reads as `expired`.
    pub fn effective_status(&self, now: DateTime<Utc>) -> CredentialStatus {
        match self.status {
            CredentialStatus::Active => match self.expires_at {
                Some(expires_at) if expires_at <= now => CredentialStatus::Expired,
                _ => CredentialStatus::Active,
            },
            other => other,
        }
    }
}

/// Whether a listing is offered for sale or for rent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OfferingType {
    Sale,
    Rent,
}

impl OfferingType {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "sale" => Some(Self::Sale),
            "rent" => Some(Self::Rent),
            _ => None,
        }
    }
}

/// Broad market segment of a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Residential,
    Commercial,
}

impl Category {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "residential" => Some(Self::Residential),
            "commercial" => Some(Self::Commercial),
            _ => None,
        }
    }
}

/// Billing cadence for rental listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RentFrequency {
    Yearly,
    Monthly,
    Weekly,
    Daily,
}

impl RentFrequency {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "yearly" => Some(Self::Yearly),
            "monthly" => Some(Self::Monthly),
            "weekly" => Some(Self::Weekly),
            "daily" => Some(Self::Daily),
            _ => None,
        }
    }
}

/// Publication state assigned at intake. The pipeline only ever creates
/// drafts; the rest of the listing lifecycle lives outside this service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingStatus {
    Draft,
}

impl ListingStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
        }
    }
}

/// Fully validated listing ready for persistence. Carries no status field;
/// the repository assigns `draft` on insert regardless of caller input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftListing {
    pub workspace_id: WorkspaceId,
    pub reference: String,
    pub offering_type: OfferingType,
    pub property_type: String,
    pub category: Category,
    pub price: f64,
    pub title_en: Option<String>,
    pub title_ar: Option<String>,

    // Specification
    pub bedrooms: Option<f64>,
    pub bathrooms: Option<f64>,
    pub size: Option<f64>,
    pub furnishing_type: Option<String>,
    pub project_status: Option<String>,
    pub parking_slots: Option<f64>,
    pub floor_number: Option<f64>,
    pub unit_number: Option<String>,

    // Location
    pub emirate: Option<String>,
    pub city: Option<String>,
    pub location: Option<String>,
    pub location_id: Option<i64>,

    // Pricing
    pub downpayment: Option<f64>,
    pub rent_frequency: Option<RentFrequency>,

    // Content
    pub description_en: Option<String>,
    pub description_ar: Option<String>,
    pub amenities: Vec<String>,

    // Media
    pub images: Vec<String>,
    pub video_tour: Option<String>,
    pub video_360: Option<String>,

    // Assignment & provenance
    pub assigned_agent: Option<String>,
    pub assigned_to_id: Option<UserId>,
    pub owner_id: Option<String>,
    pub owner_name: Option<String>,
    pub developer: Option<String>,
    pub permit_number: Option<String>,
    pub available_from: Option<String>,
}
