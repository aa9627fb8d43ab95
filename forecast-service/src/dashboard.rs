use crate::api_client::WeatherApiClient;
use crate::clock::Clock;
use crate::preferences::{Preferences, PreferencesStore};
use crate::views;
use chrono::{DateTime, Utc};
use common::errors::AppError;
use common::models::{
    CityCard, CityDetail, CitySuggestion, DashboardView, ForecastPayload, RefreshSummary,
    TemperatureUnit,
};
use futures::future::join_all;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, info, instrument, warn};

/// Max forecast requests a refresh cycle keeps in flight.
const REFRESH_CONCURRENCY: usize = 8;

#[derive(Debug, Clone)]
pub struct DashboardSettings {
    pub default_cities: Vec<String>,
    pub max_tracked: usize,
}

#[derive(Default)]
struct DashboardState {
    favorites: Vec<String>,
    unit: TemperatureUnit,
    weather: HashMap<String, ForecastPayload>,
    /// Cities in the order their first result arrived
    seen: Vec<String>,
    last_update: Option<DateTime<Utc>>,
}

impl DashboardState {
    fn record(&mut self, city: &str, payload: ForecastPayload, at: DateTime<Utc>) {
        if self.weather.insert(city.to_string(), payload).is_none() {
            self.seen.push(city.to_string());
        }
        self.last_update = Some(at);
    }

    /// Drop the oldest results for untracked cities, keeping at most `keep`.
    fn forget_extras(&mut self, tracked: &[String], keep: usize) {
        let extras: Vec<String> = self
            .seen
            .iter()
            .filter(|city| !tracked.contains(city))
            .cloned()
            .collect();
        let excess = extras.len().saturating_sub(keep);
        if excess == 0 {
            return;
        }

        for city in &extras[..excess] {
            self.weather.remove(city);
        }
        self.seen.retain(|city| self.weather.contains_key(city));
        debug!(dropped = excess, "Forgot untracked cities");
    }
}

/// Favorites first, then the default cities, without repeats.
fn tracked_from(favorites: &[String], settings: &DashboardSettings) -> Vec<String> {
    let mut tracked: Vec<String> = Vec::with_capacity(settings.max_tracked);

    for city in favorites.iter().chain(settings.default_cities.iter()) {
        if tracked.len() == settings.max_tracked {
            break;
        }
        if !tracked.contains(city) {
            tracked.push(city.clone());
        }
    }

    tracked
}

/// Latest result per city plus the user's favorites and unit.
///
/// Every forecast goes through [`WeatherApiClient::fetch_forecast`]; a city
/// whose refresh fails keeps showing what it had before.
pub struct Dashboard {
    client: Arc<WeatherApiClient>,
    store: Arc<dyn PreferencesStore>,
    clock: Arc<dyn Clock>,
    settings: DashboardSettings,
    semaphore: Semaphore,
    state: RwLock<DashboardState>,
}

impl Dashboard {
    pub fn new(
        client: Arc<WeatherApiClient>,
        store: Arc<dyn PreferencesStore>,
        clock: Arc<dyn Clock>,
        settings: DashboardSettings,
    ) -> Result<Self, AppError> {
        let prefs = Preferences::load(store.as_ref())?;
        info!(
            favorites = prefs.favorites.len(),
            unit = %prefs.unit,
            "Loaded preferences"
        );

        Ok(Self {
            client,
            store,
            clock,
            settings,
            semaphore: Semaphore::new(REFRESH_CONCURRENCY),
            state: RwLock::new(DashboardState {
                favorites: prefs.favorites,
                unit: prefs.unit,
                ..Default::default()
            }),
        })
    }

    pub fn unit(&self) -> TemperatureUnit {
        self.state.read().unit
    }

    pub fn favorites(&self) -> Vec<String> {
        self.state.read().favorites.clone()
    }

    pub fn last_update(&self) -> Option<DateTime<Utc>> {
        self.state.read().last_update
    }

    pub fn tracked_cities(&self) -> Vec<String> {
        tracked_from(&self.state.read().favorites, &self.settings)
    }

    /// Raw forecast through the cache. The dashboard itself is not touched.
    pub async fn forecast(
        &self,
        city: &str,
        force_refresh: bool,
    ) -> Result<ForecastPayload, AppError> {
        let city = validate_city(city)?;
        Ok(self.client.fetch_forecast(city, force_refresh).await?)
    }

    /// Fetch one city and remember the result.
    ///
    /// Results for untracked cities (searches, detail lookups, removed
    /// favorites) are kept for at most `max_tracked` cities.
    #[instrument(skip(self), fields(city = %city))]
    pub async fn refresh_city(
        &self,
        city: &str,
        force_refresh: bool,
    ) -> Result<ForecastPayload, AppError> {
        let payload = self.client.fetch_forecast(city, force_refresh).await?;
        {
            let mut state = self.state.write();
            state.record(city, payload.clone(), self.clock.now());
            let tracked = tracked_from(&state.favorites, &self.settings);
            state.forget_extras(&tracked, self.settings.max_tracked);
        }
        Ok(payload)
    }

    #[instrument(skip(self))]
    pub async fn refresh_all(&self, force_refresh: bool) -> RefreshSummary {
        let cities = self.tracked_cities();
        info!(count = cities.len(), force_refresh, "Refreshing tracked cities");

        let results = join_all(cities.iter().map(|city| async move {
            let _permit = self.semaphore.acquire().await.ok();
            match self.refresh_city(city, force_refresh).await {
                Ok(_) => true,
                Err(e) => {
                    warn!(city = %city, error = %e, "Refresh failed, keeping previous data");
                    false
                }
            }
        }))
        .await;

        let successful = results.iter().filter(|ok| **ok).count();
        let summary = RefreshSummary {
            total: results.len(),
            successful,
            failed: results.len() - successful,
        };

        info!(
            total = summary.total,
            successful = summary.successful,
            failed = summary.failed,
            "Refresh completed"
        );
        summary
    }

    /// Add or remove a favorite. A newly added city is fetched right away;
    /// a failed fetch is logged and does not undo the toggle.
    #[instrument(skip(self), fields(city = %city))]
    pub async fn toggle_favorite(&self, city: &str) -> Result<Vec<String>, AppError> {
        let city = validate_city(city)?;

        // The store is written under the state lock so saves land in toggle order
        let (favorites, added) = {
            let mut state = self.state.write();
            let mut favorites = state.favorites.clone();
            let added = match favorites.iter().position(|f| f == city) {
                Some(index) => {
                    favorites.remove(index);
                    false
                }
                None => {
                    favorites.push(city.to_string());
                    true
                }
            };
            Preferences::save_favorites(self.store.as_ref(), &favorites)?;
            state.favorites = favorites.clone();
            (favorites, added)
        };
        info!(added, count = favorites.len(), "Favorites updated");

        if added && let Err(e) = self.refresh_city(city, false).await {
            warn!(error = %e, "Could not fetch new favorite");
        }

        Ok(favorites)
    }

    /// Switch the display unit. The forecast cache is left alone.
    pub fn set_unit(&self, unit: TemperatureUnit) -> Result<(), AppError> {
        {
            let mut state = self.state.write();
            Preferences::save_unit(self.store.as_ref(), unit)?;
            state.unit = unit;
        }
        info!(unit = %unit, "Unit updated");
        Ok(())
    }

    /// Look a city up and put it on the dashboard.
    #[instrument(skip(self), fields(query = %query))]
    pub async fn search(&self, query: &str) -> Result<CityCard, AppError> {
        let city = validate_city(query)?;
        let payload = self.refresh_city(city, false).await?;
        let state = self.state.read();
        Ok(views::city_card(
            city,
            &payload,
            state.unit,
            state.favorites.iter().any(|f| f == city),
        ))
    }

    pub async fn suggestions(&self, query: &str) -> Vec<CitySuggestion> {
        self.client.search_cities(query).await
    }

    pub fn view(&self) -> DashboardView {
        let tracked = self.tracked_cities();
        let state = self.state.read();

        let mut order: Vec<&String> = tracked.iter().collect();
        for city in &state.seen {
            if !order.contains(&city) {
                order.push(city);
            }
        }

        let cities = order
            .iter()
            .filter_map(|city| {
                state.weather.get(city.as_str()).map(|payload| {
                    views::city_card(
                        city,
                        payload,
                        state.unit,
                        state.favorites.contains(city),
                    )
                })
            })
            .take(self.settings.max_tracked)
            .collect();

        let pending = tracked
            .iter()
            .filter(|city| !state.weather.contains_key(city.as_str()))
            .cloned()
            .collect();

        DashboardView {
            unit: state.unit,
            favorites: state.favorites.clone(),
            last_update: state.last_update,
            cities,
            pending,
        }
    }

    /// Detail view for a city, fetching it first if the dashboard has no data.
    pub async fn detail(&self, city: &str) -> Result<CityDetail, AppError> {
        let city = validate_city(city)?;

        let known = self.state.read().weather.get(city).cloned();
        let payload = match known {
            Some(payload) => payload,
            None => self.refresh_city(city, false).await?,
        };

        let state = self.state.read();
        Ok(views::city_detail(
            city,
            &payload,
            state.unit,
            state.favorites.iter().any(|f| f == city),
        ))
    }

    pub fn clear_cache(&self) {
        let cache = self.client.cache();
        let dropped = cache.len();
        cache.clear();
        info!(dropped, "Forecast cache cleared");
    }
}

fn validate_city(city: &str) -> Result<&str, AppError> {
    let city = city.trim();
    if city.is_empty() {
        return Err(AppError::validation("City must not be empty"));
    }
    Ok(city)
}
