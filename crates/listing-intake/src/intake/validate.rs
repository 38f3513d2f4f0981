//! Canonical payload validation and coercion.
//!
//! All failures for a payload are aggregated into one error so partner
//! integrations receive the full correction list in a single round trip.
//! Nothing is partially applied: either a fully typed [`DraftListing`] comes
//! back, or an error and no listing at all.

use serde::Serialize;
use serde_json::Value;

use super::aliases::ResolvedPayload;
use super::domain::{Category, DraftListing, OfferingType, RentFrequency, UserId, WorkspaceId};
use super::repository::{StoreError, WorkspaceDirectory};

/// One problem with one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldIssue {
    pub field: String,
    pub message: String,
}

impl FieldIssue {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Validation outcome: the typed listing plus non-fatal warnings (optional
/// fields dropped during coercion).
#[derive(Debug, Clone)]
pub struct ValidatedListing {
    pub listing: DraftListing,
    pub warnings: Vec<FieldIssue>,
}

/// Validator failures. `Invalid` carries every field problem found;
/// `Store` covers membership-oracle outages, which are not the caller's
/// fault and surface as internal errors upstream.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("payload failed validation")]
    Invalid(Vec<FieldIssue>),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Validates the resolved canonical mapping against the bound workspace.
pub fn validate(
    payload: &ResolvedPayload,
    workspace_id: WorkspaceId,
    directory: &dyn WorkspaceDirectory,
) -> Result<ValidatedListing, ValidationError> {
    let mut issues = Vec::new();
    let mut warnings = Vec::new();

    let reference = require_text(payload, "reference", &mut issues);
    let property_type = require_text(payload, "property_type", &mut issues);

    let offering_type = match require_text(payload, "offering_type", &mut issues) {
        Some(raw) => match OfferingType::parse(&raw) {
            Some(parsed) => Some(parsed),
            None => {
                issues.push(FieldIssue::new(
                    "offering_type",
                    format!("'{raw}' is not one of: sale, rent"),
                ));
                None
            }
        },
        None => None,
    };

    let category = match require_text(payload, "category", &mut issues) {
        Some(raw) => match Category::parse(&raw) {
            Some(parsed) => Some(parsed),
            None => {
                issues.push(FieldIssue::new(
                    "category",
                    format!("'{raw}' is not one of: residential, commercial"),
                ));
                None
            }
        },
        None => None,
    };

    let price = match payload.get("price") {
        Some(value) => match as_number(value) {
            Some(number) => Some(number),
            None => {
                issues.push(FieldIssue::new("price", "must be a number"));
                None
            }
        },
        None => {
            issues.push(FieldIssue::new("price", "is required"));
            None
        }
    };

    let title_en = optional_text(payload, "title_en");
    let title_ar = optional_text(payload, "title_ar");
    if title_en.is_none() && title_ar.is_none() {
        issues.push(FieldIssue::new(
            "title",
            "at least one of title_en or title_ar is required",
        ));
    }

    // Rent frequency only exists for rentals; on sale listings a supplied
    // value is dropped rather than rejected.
    let rent_frequency = match offering_type {
        Some(OfferingType::Rent) => match optional_text(payload, "rent_frequency") {
            Some(raw) => match RentFrequency::parse(&raw) {
                Some(parsed) => Some(parsed),
                None => {
                    issues.push(FieldIssue::new(
                        "rent_frequency",
                        format!("'{raw}' is not one of: yearly, monthly, weekly, daily"),
                    ));
                    None
                }
            },
            None => {
                issues.push(FieldIssue::new(
                    "rent_frequency",
                    "is required when offering_type is rent",
                ));
                None
            }
        },
        Some(OfferingType::Sale) => {
            if payload.get("rent_frequency").is_some() {
                warnings.push(FieldIssue::new(
                    "rent_frequency",
                    "ignored for sale listings",
                ));
            }
            None
        }
        None => None,
    };

    let bedrooms = optional_number(payload, "bedrooms", &mut warnings);
    let bathrooms = optional_number(payload, "bathrooms", &mut warnings);
    let size = optional_number(payload, "size", &mut warnings);
    let parking_slots = optional_number(payload, "parking_slots", &mut warnings);
    let floor_number = optional_number(payload, "floor_number", &mut warnings);
    let downpayment = optional_number(payload, "downpayment", &mut warnings);

    let location_id = match payload.get("location_id").map(as_integer) {
        Some(Some(id)) => Some(id),
        Some(None) => {
            warnings.push(FieldIssue::new(
                "location_id",
                "dropped: not a valid integer id",
            ));
            None
        }
        None => None,
    };

    let assigned_to_id = match payload.get("assigned_to_id").map(as_integer) {
        Some(Some(id)) => {
            let user_id = UserId(id);
            if directory.is_member(workspace_id, user_id)? {
                Some(user_id)
            } else {
                issues.push(FieldIssue::new(
                    "assigned_to_id",
                    "must reference a member of this workspace",
                ));
                None
            }
        }
        Some(None) => {
            issues.push(FieldIssue::new(
                "assigned_to_id",
                "must be an integer user id",
            ));
            None
        }
        None => None,
    };

    if !issues.is_empty() {
        return Err(ValidationError::Invalid(issues));
    }

    // Required fields are all Some past this point.
    let listing = DraftListing {
        workspace_id,
        reference: reference.unwrap_or_default(),
        offering_type: offering_type.unwrap_or(OfferingType::Sale),
        property_type: property_type.unwrap_or_default(),
        category: category.unwrap_or(Category::Residential),
        price: price.unwrap_or_default(),
        title_en,
        title_ar,
        bedrooms,
        bathrooms,
        size,
        furnishing_type: optional_text(payload, "furnishing_type"),
        project_status: optional_text(payload, "project_status"),
        parking_slots,
        floor_number,
        unit_number: optional_text(payload, "unit_number"),
        emirate: optional_text(payload, "emirate"),
        city: optional_text(payload, "city"),
        location: optional_text(payload, "location"),
        location_id,
        downpayment,
        rent_frequency,
        description_en: optional_text(payload, "description_en"),
        description_ar: optional_text(payload, "description_ar"),
        amenities: string_list(payload.get("amenities")),
        images: string_list(payload.get("images")),
        video_tour: optional_text(payload, "video_tour"),
        video_360: optional_text(payload, "video_360"),
        assigned_agent: optional_text(payload, "assigned_agent"),
        assigned_to_id,
        owner_id: optional_text(payload, "owner_id"),
        owner_name: optional_text(payload, "owner_name"),
        developer: optional_text(payload, "developer"),
        permit_number: optional_text(payload, "permit_number"),
        available_from: optional_text(payload, "available_from"),
    };

    Ok(ValidatedListing { listing, warnings })
}

/// Non-empty text for a required field; absence or emptiness records an
/// issue so the aggregated error lists every missing field at once.
fn require_text(
    payload: &ResolvedPayload,
    field: &str,
    issues: &mut Vec<FieldIssue>,
) -> Option<String> {
    match optional_text(payload, field) {
        Some(text) => Some(text),
        None => {
            issues.push(FieldIssue::new(field, "is required"));
            None
        }
    }
}

/// Text for an optional field; numbers are stringified because partners send
/// ids and references in either shape.
fn optional_text(payload: &ResolvedPayload, field: &str) -> Option<String> {
    match payload.get(field)? {
        Value::String(text) => {
            let trimmed = text.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

/// Numeric value for an optional field; a value that will not coerce is
/// dropped with a warning instead of failing the payload.
fn optional_number(
    payload: &ResolvedPayload,
    field: &str,
    warnings: &mut Vec<FieldIssue>,
) -> Option<f64> {
    let value = payload.get(field)?;
    match as_number(value) {
        Some(number) => Some(number),
        None => {
            warnings.push(FieldIssue::new(field, "dropped: not a valid number"));
            None
        }
    }
}

/// Accepts JSON numbers and numeric-looking strings.
fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn as_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number.as_i64(),
        Value::String(text) => text.trim().parse::<i64>().ok(),
        _ => None,
    }
}

/// Lists arrive as arrays of strings or a single comma-separated string.
fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(entries)) => entries
            .iter()
            .filter_map(Value::as_str)
            .map(|entry| entry.trim().to_string())
            .filter(|entry| !entry.is_empty())
            .collect(),
        Some(Value::String(joined)) => joined
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}
