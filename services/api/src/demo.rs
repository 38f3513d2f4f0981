use std::sync::Arc;

use chrono::Utc;
use clap::Args;
use listing_intake::error::AppError;
use listing_intake::intake::response::{self, ErrorCode};
use listing_intake::intake::{
    Credential, CredentialId, CredentialStatus, ListingIntakeService, UserId, WorkspaceId,
    LISTINGS_CREATE_SCOPE,
};
use serde_json::json;

use crate::infra::{
    InMemoryCredentialStore, InMemoryListingRepository, InMemoryWorkspaceDirectory,
};

const DEMO_KEY: &str = "pk_live_demo";
const DEMO_SECRET: &str = "sk_live_demo_secret";
const DEMO_WORKSPACE: WorkspaceId = WorkspaceId(42);

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Also replay the first payload to demonstrate duplicate_reference
    #[arg(long)]
    pub(crate) show_duplicate: bool,
}

/// Runs the full intake pipeline in-process against seeded stores: one
/// canonical payload, one nested PF-style payload, and optionally a retry
/// that trips the duplicate-reference guard.
pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let credentials = Arc::new(InMemoryCredentialStore::default());
    let directory = Arc::new(InMemoryWorkspaceDirectory::default());
    let listings = Arc::new(InMemoryListingRepository::default());

    credentials.insert(Credential {
        id: CredentialId(1),
        workspace_id: DEMO_WORKSPACE,
        name: "demo partner feed".to_string(),
        key_id: DEMO_KEY.to_string(),
        secret: DEMO_SECRET.to_string(),
        status: CredentialStatus::Active,
        scopes: [LISTINGS_CREATE_SCOPE.to_string()].into_iter().collect(),
        rate_limit_per_min: 60,
        expires_at: None,
        last_used_at: None,
    });
    directory.set_default_agent(DEMO_WORKSPACE, "agents@demo.example".to_string());
    directory.add_member(DEMO_WORKSPACE, UserId(5));

    let service = Arc::new(ListingIntakeService::new(credentials, directory, listings));

    let canonical = json!({
        "reference": "DEMO-001",
        "offering_type": "sale",
        "property_type": "apartment",
        "category": "residential",
        "price": 1_250_000,
        "title_en": "Two-bed with marina view",
        "status": "published"
    });

    let pf_style = json!({
        "reference": "DEMO-002",
        "type": "villa",
        "category": "residential",
        "uaeEmirate": "dubai",
        "price": { "type": "yearly", "amounts": { "yearly": 240_000 } },
        "title": { "en": "Palm villa with private pool" },
        "assignedTo": { "id": 5 },
        "media": {
            "images": ["https://cdn.example.com/villa.jpg"],
            "videos": [{ "type": "default", "url": "https://cdn.example.com/tour.mp4" }]
        }
    });

    println!("== canonical payload ==");
    print_outcome(&service, &canonical);

    println!("\n== PF-style payload ==");
    print_outcome(&service, &pf_style);

    if args.show_duplicate {
        println!("\n== duplicate retry ==");
        print_outcome(&service, &canonical);
    }

    Ok(())
}

fn print_outcome(
    service: &ListingIntakeService<
        InMemoryCredentialStore,
        InMemoryWorkspaceDirectory,
        InMemoryListingRepository,
    >,
    payload: &serde_json::Value,
) {
    let request_id = response::mint_request_id();
    let envelope = match service.ingest(DEMO_KEY, DEMO_SECRET, payload, Utc::now()) {
        Ok(receipt) => response::success(
            json!({
                "id": receipt.id.0,
                "reference": receipt.reference,
                "status": receipt.status.label(),
            }),
            json!({}),
            receipt.workspace_id,
            &request_id,
        ),
        Err(error) => {
            let code = ErrorCode::from(&error);
            response::failure(code, &error.to_string(), json!({}), &request_id)
        }
    };

    match serde_json::to_string_pretty(&envelope) {
        Ok(rendered) => println!("{rendered}"),
        Err(err) => println!("failed to render envelope: {err}"),
    }
}
