use crate::cli::ServeArgs;
use crate::infra::{
    apply_seed, load_seed_file, AppState, InMemoryCredentialStore, InMemoryListingRepository,
    InMemoryWorkspaceDirectory,
};
use crate::routes::with_intake_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use listing_intake::config::AppConfig;
use listing_intake::error::AppError;
use listing_intake::intake::ListingIntakeService;
use listing_intake::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(config.environment, &config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let credentials = Arc::new(InMemoryCredentialStore::default());
    let directory = Arc::new(InMemoryWorkspaceDirectory::default());
    let listings = Arc::new(InMemoryListingRepository::default());

    match &config.seed_file {
        Some(path) => {
            let seed = load_seed_file(path)?;
            apply_seed(seed, &credentials, &directory);
            info!(path, "seeded workspaces and credentials");
        }
        None => {
            warn!("no APP_SEED_FILE configured; every request will fail authentication");
        }
    }

    let intake_service = Arc::new(ListingIntakeService::new(
        credentials,
        directory,
        listings,
    ));

    let app = with_intake_routes(intake_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "listing intake service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
