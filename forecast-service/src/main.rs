use common::http_client::HttpClient;
use common::tracing::init_tracing;
use forecast_service::api_client::WeatherApiClient;
use forecast_service::cache::ForecastCache;
use forecast_service::clock::{Clock, SystemClock};
use forecast_service::config::Config;
use forecast_service::dashboard::{Dashboard, DashboardSettings};
use forecast_service::handlers::{AppState, create_router};
use forecast_service::preferences::{FilePreferences, PreferencesStore};
use forecast_service::refresh::RefreshHandle;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env();
    init_tracing(config.log_format);

    if config.weather_api_key.is_empty() {
        warn!("WEATHER_API_KEY is not set, forecast requests will be rejected upstream");
    }

    let cancellation_token = CancellationToken::new();
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let cache = Arc::new(ForecastCache::with_ttl(config.cache_ttl_seconds));
    info!(ttl_secs = cache.ttl().num_seconds(), "Forecast cache ready");
    let http_client = HttpClient::new(config.http_timeout())?;
    let api_client = Arc::new(WeatherApiClient::new(
        http_client,
        cache,
        config.weather_api_url.clone(),
        config.weather_api_key.clone(),
        config.forecast_days,
    ));

    let store: Arc<dyn PreferencesStore> =
        Arc::new(FilePreferences::new(config.preferences_path.clone()));
    let dashboard = Arc::new(Dashboard::new(
        api_client,
        store,
        clock,
        DashboardSettings {
            default_cities: config.default_cities.clone(),
            max_tracked: config.max_tracked_cities,
        },
    )?);

    // Initial load goes through the cache like any other non-forced fetch
    info!("Loading tracked cities...");
    let summary = dashboard.refresh_all(false).await;
    if summary.failed > 0 {
        warn!(failed = summary.failed, "Some cities failed to load on startup");
    }

    let refresh = RefreshHandle::spawn(
        dashboard.clone(),
        config.refresh_interval(),
        cancellation_token.clone(),
    );

    let app = create_router(AppState { dashboard });

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Forecast service starting on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cancellation_token))
        .await?;

    refresh.shutdown().await;
    info!("Forecast service stopped");
    Ok(())
}

async fn shutdown_signal(cancellation_token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT, starting graceful shutdown...");
        },
        _ = terminate => {
            info!("Received SIGTERM, starting graceful shutdown...");
        },
    }

    // Stops the refresh loop; requests already in flight are left to finish
    cancellation_token.cancel();
    warn!("Refresh loop cancelled, shutting down gracefully...");
}
