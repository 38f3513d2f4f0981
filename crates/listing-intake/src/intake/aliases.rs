//! Alias resolution for third-party CRM payloads.
//!
//! Partners submit listings in several shapes: canonical snake_case fields,
//! camelCase aliases, and the nested "PF-style" structure (`title.en`,
//! `price.amounts`, `media.images`, `assignedTo.id`, ...). The resolver maps
//! every shape onto one flat canonical mapping. Rules evaluate in a fixed
//! order and a canonical field, once present, is never overwritten by an
//! alias. Unrecognized keys are collected and ignored rather than rejected.

use std::collections::{BTreeMap, HashSet};
use std::sync::OnceLock;

use serde_json::{Map, Value};

/// Flat canonical mapping plus the input keys nothing claimed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedPayload {
    pub fields: BTreeMap<String, Value>,
    pub unrecognized: Vec<String>,
}

impl ResolvedPayload {
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.fields.get(field).and_then(Value::as_str)
    }
}

/// Every canonical field name the downstream pipeline understands.
const CANONICAL_FIELDS: &[&str] = &[
    "reference",
    "emirate",
    "city",
    "location",
    "location_id",
    "category",
    "offering_type",
    "property_type",
    "bedrooms",
    "bathrooms",
    "size",
    "furnishing_type",
    "project_status",
    "parking_slots",
    "floor_number",
    "unit_number",
    "price",
    "downpayment",
    "rent_frequency",
    "title_en",
    "title_ar",
    "description_en",
    "description_ar",
    "images",
    "video_tour",
    "video_360",
    "amenities",
    "assigned_agent",
    "assigned_to_id",
    "owner_id",
    "owner_name",
    "developer",
    "permit_number",
    "available_from",
];

/// camelCase renames: alias key to canonical field, value copied verbatim.
const FLAT_ALIASES: &[(&str, &str)] = &[
    ("uaeEmirate", "emirate"),
    ("type", "property_type"),
    ("furnishingType", "furnishing_type"),
    ("projectStatus", "project_status"),
    ("parkingSlots", "parking_slots"),
    ("floorNumber", "floor_number"),
    ("unitNumber", "unit_number"),
    ("ownerName", "owner_name"),
    ("ownerId", "owner_id"),
    ("availableFrom", "available_from"),
    ("locationId", "location_id"),
    ("downPayment", "downpayment"),
];

/// Dotted-path extractions: a nested scalar lifted into a canonical field.
/// Path segments are matched case-sensitively.
const PATH_ALIASES: &[(&[&str], &str)] = &[
    (&["title", "en"], "title_en"),
    (&["title", "ar"], "title_ar"),
    (&["description", "en"], "description_en"),
    (&["description", "ar"], "description_ar"),
    (&["assignedTo", "id"], "assigned_agent"),
    (&["location", "id"], "location_id"),
    (
        &["compliance", "listingAdvertisementNumber"],
        "permit_number",
    ),
];

/// Structured decompositions: one source object feeding several targets.
const EXPANDERS: &[(&str, fn(&Value, &mut BTreeMap<String, Value>))] =
    &[("media", expand_media), ("price", expand_price)];

static RECOGNIZED_KEYS: OnceLock<HashSet<&'static str>> = OnceLock::new();

fn recognized_keys() -> &'static HashSet<&'static str> {
    RECOGNIZED_KEYS.get_or_init(|| {
        let mut keys: HashSet<&'static str> = CANONICAL_FIELDS.iter().copied().collect();
        keys.extend(FLAT_ALIASES.iter().map(|(alias, _)| *alias));
        keys.extend(PATH_ALIASES.iter().map(|(path, _)| path[0]));
        keys.extend(EXPANDERS.iter().map(|(key, _)| *key));
        // Accepted but discarded; the ingestor always persists `draft`.
        keys.insert("status");
        keys
    })
}

/// Resolves an arbitrary input object into the canonical mapping.
pub fn resolve(input: &Map<String, Value>) -> ResolvedPayload {
    let mut fields = BTreeMap::new();

    // Canonical passthrough first so no alias can shadow an explicit field.
    for (key, value) in input {
        if key == "status" || value.is_null() {
            continue;
        }
        if CANONICAL_FIELDS.contains(&key.as_str()) {
            // A PF-style `price` object is handled by its expander below.
            if key == "price" && value.is_object() {
                continue;
            }
            fields.insert(key.clone(), value.clone());
        }
    }

    for (alias, target) in FLAT_ALIASES {
        if let Some(value) = input.get(*alias) {
            fill(&mut fields, target, value.clone());
        }
    }

    for (path, target) in PATH_ALIASES {
        if let Some(value) = lookup_path(input, path) {
            fill(&mut fields, target, value.clone());
        }
    }

    for (key, expand) in EXPANDERS {
        if let Some(value) = input.get(*key) {
            expand(value, &mut fields);
        }
    }

    let unrecognized = input
        .keys()
        .filter(|key| !recognized_keys().contains(key.as_str()))
        .cloned()
        .collect();

    ResolvedPayload {
        fields,
        unrecognized,
    }
}

/// Inserts only when the target is still absent: canonical values win and the
/// first matching rule per target wins.
fn fill(fields: &mut BTreeMap<String, Value>, target: &str, value: Value) {
    if value.is_null() {
        return;
    }
    fields.entry(target.to_string()).or_insert(value);
}

fn lookup_path<'a>(input: &'a Map<String, Value>, path: &[&str]) -> Option<&'a Value> {
    let mut current = input.get(path[0])?;
    for segment in &path[1..] {
        current = current.as_object()?.get(*segment)?;
    }
    Some(current)
}

/// `media.images` and `media.videos` decomposition.
///
/// Images accept plain URL strings or the PF object form
/// `{"medium": {"url": ...}, "original": {"url": ...}}`. Videos accept a list
/// of entries discriminated by `type` (`default`/`tour` vs `view360`/`360`)
/// or the PF object form keyed `default`/`view360`.
fn expand_media(media: &Value, fields: &mut BTreeMap<String, Value>) {
    let Some(media) = media.as_object() else {
        return;
    };

    if let Some(images) = media.get("images").and_then(Value::as_array) {
        let urls: Vec<Value> = images.iter().filter_map(image_url).collect();
        if !urls.is_empty() {
            fill(fields, "images", Value::Array(urls));
        }
    }

    match media.get("videos") {
        Some(Value::Array(entries)) => {
            for entry in entries {
                let Some(entry) = entry.as_object() else {
                    continue;
                };
                let Some(url) = entry.get("url").and_then(Value::as_str) else {
                    continue;
                };
                match entry.get("type").and_then(Value::as_str) {
                    Some("view360") | Some("360") => {
                        fill(fields, "video_360", Value::String(url.to_string()));
                    }
                    Some("default") | Some("tour") | None => {
                        fill(fields, "video_tour", Value::String(url.to_string()));
                    }
                    Some(_) => {}
                }
            }
        }
        Some(Value::Object(videos)) => {
            if let Some(url) = videos.get("default").and_then(Value::as_str) {
                fill(fields, "video_tour", Value::String(url.to_string()));
            }
            if let Some(url) = videos.get("view360").and_then(Value::as_str) {
                fill(fields, "video_360", Value::String(url.to_string()));
            }
        }
        _ => {}
    }
}

fn image_url(entry: &Value) -> Option<Value> {
    match entry {
        Value::String(url) if !url.trim().is_empty() => Some(Value::String(url.clone())),
        Value::Object(image) => {
            let url = image
                .get("medium")
                .and_then(|size| size.get("url"))
                .or_else(|| image.get("original").and_then(|size| size.get("url")))
                .or_else(|| image.get("url"))
                .and_then(Value::as_str)?;
            Some(Value::String(url.to_string()))
        }
        _ => None,
    }
}

/// PF-style `price` object decomposition: `type` + `amounts` derive
/// `offering_type`, `rent_frequency` (rentals only), and the numeric `price`.
/// Amount selection follows the upstream contract: the amount keyed by the
/// price type, else `sale`, else `yearly`.
fn expand_price(price: &Value, fields: &mut BTreeMap<String, Value>) {
    let Some(price) = price.as_object() else {
        return;
    };

    let price_type = price.get("type").and_then(Value::as_str);

    if let Some(amounts) = price.get("amounts").and_then(Value::as_object) {
        let amount = price_type
            .and_then(|kind| amounts.get(kind))
            .or_else(|| amounts.get("sale"))
            .or_else(|| amounts.get("yearly"));
        if let Some(amount) = amount {
            fill(fields, "price", amount.clone());
        }
    }

    if let Some(kind) = price_type {
        let offering = if kind == "sale" { "sale" } else { "rent" };
        fill(
            fields,
            "offering_type",
            Value::String(offering.to_string()),
        );
        if matches!(kind, "yearly" | "monthly" | "weekly" | "daily") {
            fill(fields, "rent_frequency", Value::String(kind.to_string()));
        }
    }

    let downpayment = price.get("downpayment").or_else(|| price.get("downPayment"));
    if let Some(downpayment) = downpayment {
        fill(fields, "downpayment", downpayment.clone());
    }
}
