use crate::cli::ServeArgs;
use crate::infra::{demo_cases, demo_partners, AppState, InMemoryCaseRepository, InMemoryPartnerDirectory};
use crate::routes::with_recovery_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use chrono::Utc;
use recovery_ai::config::AppConfig;
use recovery_ai::error::AppError;
use recovery_ai::telemetry;
use recovery_ai::workflows::recovery::RecoveryService;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let cases = if args.seed_demo {
        let seeded = demo_cases(Utc::now())?;
        info!(cases = seeded.len(), "seeded demo portfolio");
        InMemoryCaseRepository::with_cases(seeded)
    } else {
        InMemoryCaseRepository::default()
    };
    let partners = InMemoryPartnerDirectory::new(demo_partners());
    let service = Arc::new(RecoveryService::new(
        Arc::new(cases),
        Arc::new(partners),
        config.allocation,
    ));

    let app = with_recovery_routes(service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "recovery operations engine ready");

    axum::serve(listener, app).await?;
    Ok(())
}
