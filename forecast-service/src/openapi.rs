use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::handlers;
use common::models::{
    CityCard, CityDetail, CitySuggestion, DashboardView, FavoritesResponse, ForecastPayload,
    RefreshSummary, UnitRequest,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health,
        handlers::get_forecast,
        handlers::get_dashboard,
        handlers::get_city_detail,
        handlers::refresh_dashboard,
        handlers::search_suggestions,
        handlers::search_city,
        handlers::toggle_favorite,
        handlers::set_unit,
        handlers::clear_cache,
    ),
    components(schemas(
        ForecastPayload,
        common::models::Location,
        common::models::CurrentConditions,
        common::models::Condition,
        common::models::Forecast,
        common::models::ForecastDay,
        common::models::DaySummary,
        common::models::HourForecast,
        common::models::TemperatureUnit,
        common::models::DailyPoint,
        common::models::HourlyPoint,
        CityCard,
        CityDetail,
        CitySuggestion,
        DashboardView,
        FavoritesResponse,
        RefreshSummary,
        UnitRequest,
    )),
    tags(
        (name = "forecast", description = "Cached forecast lookups"),
        (name = "dashboard", description = "Dashboard views and refresh"),
        (name = "search", description = "City search"),
        (name = "preferences", description = "Favorites and display unit"),
    ),
)]
pub struct ApiDoc;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi())
}
