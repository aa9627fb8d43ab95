use axum::{
    Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{delete, get, post, put},
};
use common::errors::AppError;
use common::models::{
    CityCard, CityDetail, CitySuggestion, DashboardView, FavoritesResponse, ForecastPayload,
    RefreshSummary, UnitRequest,
};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::dashboard::Dashboard;
use crate::openapi;

#[derive(Clone)]
pub struct AppState {
    pub dashboard: Arc<Dashboard>,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/forecast/{city}", get(get_forecast))
        .route("/api/dashboard", get(get_dashboard))
        .route("/api/dashboard/refresh", post(refresh_dashboard))
        .route("/api/dashboard/{city}", get(get_city_detail))
        .route("/api/search", get(search_suggestions).post(search_city))
        .route("/api/favorites/{city}", post(toggle_favorite))
        .route("/api/unit", put(set_unit))
        .route("/api/cache", delete(clear_cache))
        .merge(openapi::swagger_ui())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service health check")
    )
)]
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok", "service": "forecast-service" }))
}

#[derive(Debug, Deserialize)]
pub struct ForecastQuery {
    #[serde(default)]
    pub refresh: bool,
}

#[utoipa::path(
    get,
    path = "/api/forecast/{city}",
    params(
        ("city" = String, Path, description = "City name or identifier"),
        ("refresh" = Option<bool>, Query, description = "Bypass the cache")
    ),
    responses(
        (status = 200, description = "Forecast for the city", body = ForecastPayload),
        (status = 400, description = "Blank city"),
        (status = 404, description = "Unknown city"),
        (status = 502, description = "Weather API failure"),
        (status = 504, description = "Weather API timed out")
    ),
    tag = "forecast"
)]
pub async fn get_forecast(
    State(state): State<AppState>,
    Path(city): Path<String>,
    Query(params): Query<ForecastQuery>,
) -> Result<Json<ForecastPayload>, AppError> {
    info!(city = %city, refresh = params.refresh, "Forecast request received");

    let payload = state.dashboard.forecast(&city, params.refresh).await?;

    Ok(Json(payload))
}

#[utoipa::path(
    get,
    path = "/api/dashboard",
    responses(
        (status = 200, description = "Cards for every city with data", body = DashboardView)
    ),
    tag = "dashboard"
)]
pub async fn get_dashboard(State(state): State<AppState>) -> Json<DashboardView> {
    Json(state.dashboard.view())
}

#[utoipa::path(
    get,
    path = "/api/dashboard/{city}",
    params(
        ("city" = String, Path, description = "City name or identifier")
    ),
    responses(
        (status = 200, description = "Card with daily and hourly series", body = CityDetail),
        (status = 404, description = "Unknown city"),
        (status = 502, description = "Weather API failure")
    ),
    tag = "dashboard"
)]
pub async fn get_city_detail(
    State(state): State<AppState>,
    Path(city): Path<String>,
) -> Result<Json<CityDetail>, AppError> {
    Ok(Json(state.dashboard.detail(&city).await?))
}

#[utoipa::path(
    post,
    path = "/api/dashboard/refresh",
    responses(
        (status = 200, description = "Forced refresh of every tracked city", body = RefreshSummary)
    ),
    tag = "dashboard"
)]
pub async fn refresh_dashboard(State(state): State<AppState>) -> Json<RefreshSummary> {
    info!("Manual refresh requested");
    Json(state.dashboard.refresh_all(true).await)
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

#[utoipa::path(
    get,
    path = "/api/search",
    params(
        ("q" = String, Query, description = "Partial city name")
    ),
    responses(
        (status = 200, description = "Matching cities, empty on lookup failure", body = Vec<CitySuggestion>)
    ),
    tag = "search"
)]
pub async fn search_suggestions(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> Json<Vec<CitySuggestion>> {
    Json(state.dashboard.suggestions(&params.q).await)
}

#[utoipa::path(
    post,
    path = "/api/search",
    params(
        ("q" = String, Query, description = "City to add to the dashboard")
    ),
    responses(
        (status = 200, description = "Card for the city", body = CityCard),
        (status = 400, description = "Empty query"),
        (status = 404, description = "Unknown city"),
        (status = 502, description = "Weather API failure")
    ),
    tag = "search"
)]
pub async fn search_city(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> Result<Json<CityCard>, AppError> {
    info!(query = %params.q, "City search received");
    Ok(Json(state.dashboard.search(&params.q).await?))
}

#[utoipa::path(
    post,
    path = "/api/favorites/{city}",
    params(
        ("city" = String, Path, description = "City to add or remove")
    ),
    responses(
        (status = 200, description = "Favorites after the toggle", body = FavoritesResponse),
        (status = 500, description = "Preferences could not be saved")
    ),
    tag = "preferences"
)]
pub async fn toggle_favorite(
    State(state): State<AppState>,
    Path(city): Path<String>,
) -> Result<Json<FavoritesResponse>, AppError> {
    let favorites = state.dashboard.toggle_favorite(&city).await?;
    Ok(Json(FavoritesResponse { favorites }))
}

#[utoipa::path(
    put,
    path = "/api/unit",
    request_body = UnitRequest,
    responses(
        (status = 200, description = "Unit saved", body = UnitRequest),
        (status = 422, description = "Unit is not C or F")
    ),
    tag = "preferences"
)]
pub async fn set_unit(
    State(state): State<AppState>,
    Json(request): Json<UnitRequest>,
) -> Result<Json<UnitRequest>, AppError> {
    state.dashboard.set_unit(request.unit)?;
    Ok(Json(request))
}

#[utoipa::path(
    delete,
    path = "/api/cache",
    responses(
        (status = 204, description = "Forecast cache emptied")
    ),
    tag = "forecast"
)]
pub async fn clear_cache(State(state): State<AppState>) -> StatusCode {
    state.dashboard.clear_cache();
    StatusCode::NO_CONTENT
}
