use serde_json::{json, Value};

use super::common::{MemoryDirectory, DEMO_WORKSPACE};
use crate::intake::aliases::resolve;
use crate::intake::domain::{Category, OfferingType, RentFrequency, UserId};
use crate::intake::validate::{validate, ValidationError};

fn run(payload: Value, directory: &MemoryDirectory) -> Result<crate::intake::validate::ValidatedListing, ValidationError> {
    let resolved = resolve(payload.as_object().expect("object payload"));
    validate(&resolved, DEMO_WORKSPACE, directory)
}

fn issue_fields(error: ValidationError) -> Vec<String> {
    match error {
        ValidationError::Invalid(issues) => {
            let mut fields: Vec<String> = issues.into_iter().map(|issue| issue.field).collect();
            fields.sort();
            fields
        }
        other => panic!("expected invalid payload, got {other:?}"),
    }
}

#[test]
fn empty_payload_reports_every_missing_field_at_once() {
    let directory = MemoryDirectory::default();
    let error = run(json!({}), &directory).expect_err("empty payload is invalid");

    assert_eq!(
        issue_fields(error),
        vec![
            "category",
            "offering_type",
            "price",
            "property_type",
            "reference",
            "title",
        ]
    );
}

#[test]
fn valid_sale_payload_produces_typed_listing() {
    let directory = MemoryDirectory::default();
    let validated = run(
        json!({
            "reference": "REF-9",
            "offering_type": "sale",
            "property_type": "villa",
            "category": "commercial",
            "price": "950000.5",
            "title_ar": "فيلا",
            "bedrooms": "3",
            "size": 2400,
        }),
        &directory,
    )
    .expect("payload is valid");

    let listing = validated.listing;
    assert_eq!(listing.reference, "REF-9");
    assert_eq!(listing.offering_type, OfferingType::Sale);
    assert_eq!(listing.category, Category::Commercial);
    assert_eq!(listing.price, 950000.5);
    assert_eq!(listing.bedrooms, Some(3.0));
    assert_eq!(listing.size, Some(2400.0));
    assert!(listing.title_en.is_none());
    assert_eq!(listing.title_ar.as_deref(), Some("فيلا"));
    assert!(validated.warnings.is_empty());
}

#[test]
fn enum_membership_is_enforced() {
    let directory = MemoryDirectory::default();
    let error = run(
        json!({
            "reference": "REF-9",
            "offering_type": "lease",
            "property_type": "villa",
            "category": "industrial",
            "price": 100,
            "title_en": "t",
        }),
        &directory,
    )
    .expect_err("bad enums rejected");

    assert_eq!(issue_fields(error), vec!["category", "offering_type"]);
}

#[test]
fn rent_requires_a_frequency() {
    let directory = MemoryDirectory::default();
    let error = run(
        json!({
            "reference": "REF-9",
            "offering_type": "rent",
            "property_type": "apartment",
            "category": "residential",
            "price": 80_000,
            "title_en": "t",
        }),
        &directory,
    )
    .expect_err("rental without frequency rejected");

    assert_eq!(issue_fields(error), vec!["rent_frequency"]);
}

#[test]
fn rent_frequency_parses_for_rentals() {
    let directory = MemoryDirectory::default();
    let validated = run(
        json!({
            "reference": "REF-9",
            "offering_type": "rent",
            "property_type": "apartment",
            "category": "residential",
            "price": 80_000,
            "rent_frequency": "yearly",
            "title_en": "t",
        }),
        &directory,
    )
    .expect("valid rental");

    assert_eq!(validated.listing.rent_frequency, Some(RentFrequency::Yearly));
}

#[test]
fn rent_frequency_on_sale_is_dropped_with_warning() {
    let directory = MemoryDirectory::default();
    let validated = run(
        json!({
            "reference": "REF-9",
            "offering_type": "sale",
            "property_type": "apartment",
            "category": "residential",
            "price": 80_000,
            "rent_frequency": "yearly",
            "title_en": "t",
        }),
        &directory,
    )
    .expect("sale stays valid");

    assert!(validated.listing.rent_frequency.is_none());
    assert_eq!(validated.warnings.len(), 1);
    assert_eq!(validated.warnings[0].field, "rent_frequency");
}

#[test]
fn required_numeric_coercion_failure_is_an_error() {
    let directory = MemoryDirectory::default();
    let error = run(
        json!({
            "reference": "REF-9",
            "offering_type": "sale",
            "property_type": "villa",
            "category": "residential",
            "price": "one million",
            "title_en": "t",
        }),
        &directory,
    )
    .expect_err("non-numeric price rejected");

    assert_eq!(issue_fields(error), vec!["price"]);
}

#[test]
fn optional_numeric_coercion_failure_drops_with_warning() {
    let directory = MemoryDirectory::default();
    let validated = run(
        json!({
            "reference": "REF-9",
            "offering_type": "sale",
            "property_type": "villa",
            "category": "residential",
            "price": 100,
            "title_en": "t",
            "bedrooms": "many",
        }),
        &directory,
    )
    .expect("payload stays valid");

    assert!(validated.listing.bedrooms.is_none());
    assert_eq!(validated.warnings.len(), 1);
    assert_eq!(validated.warnings[0].field, "bedrooms");
}

#[test]
fn assigned_to_id_must_be_a_workspace_member() {
    let directory = MemoryDirectory::default();
    directory.add_member(DEMO_WORKSPACE, UserId(5));

    let error = run(
        json!({
            "reference": "REF-9",
            "offering_type": "sale",
            "property_type": "villa",
            "category": "residential",
            "price": 100,
            "title_en": "t",
            "assigned_to_id": 6,
        }),
        &directory,
    )
    .expect_err("non-member rejected");
    assert_eq!(issue_fields(error), vec!["assigned_to_id"]);

    let validated = run(
        json!({
            "reference": "REF-9",
            "offering_type": "sale",
            "property_type": "villa",
            "category": "residential",
            "price": 100,
            "title_en": "t",
            "assigned_to_id": 5,
        }),
        &directory,
    )
    .expect("member accepted");
    assert_eq!(validated.listing.assigned_to_id, Some(UserId(5)));
}

#[test]
fn amenities_accept_list_or_comma_string() {
    let directory = MemoryDirectory::default();
    let base = json!({
        "reference": "REF-9",
        "offering_type": "sale",
        "property_type": "villa",
        "category": "residential",
        "price": 100,
        "title_en": "t",
    });

    let mut with_list = base.clone();
    with_list["amenities"] = json!(["pool", "gym"]);
    let validated = run(with_list, &directory).expect("list form valid");
    assert_eq!(validated.listing.amenities, vec!["pool", "gym"]);

    let mut with_string = base;
    with_string["amenities"] = json!("pool, gym");
    let validated = run(with_string, &directory).expect("string form valid");
    assert_eq!(validated.listing.amenities, vec!["pool", "gym"]);
}
