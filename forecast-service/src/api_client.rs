use crate::cache::ForecastCache;
use common::errors::FetchError;
use common::http_client::HttpClient;
use common::models::{CitySuggestion, ForecastPayload};
use std::sync::Arc;
use tracing::{info, instrument, warn};

const CACHE_KEY_PREFIX: &str = "weather_";

/// Cache key for a city. Case-sensitive, so callers must pass the same
/// spelling to hit the same entry.
pub fn cache_key_for(city: &str) -> String {
    format!("{}{}", CACHE_KEY_PREFIX, city)
}

/// Client for the weatherapi.com `forecast.json` and `search.json` endpoints.
///
/// Forecasts go through the shared [`ForecastCache`]. Concurrent fetches of
/// the same city are not merged; each one writes its own result and the last
/// response to arrive is what the cache ends up holding.
pub struct WeatherApiClient {
    http_client: HttpClient,
    cache: Arc<ForecastCache>,
    base_url: String,
    api_key: String,
    forecast_days: u8,
}

impl WeatherApiClient {
    pub fn new(
        http_client: HttpClient,
        cache: Arc<ForecastCache>,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        forecast_days: u8,
    ) -> Self {
        Self {
            http_client,
            cache,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            forecast_days,
        }
    }

    pub fn cache(&self) -> &Arc<ForecastCache> {
        &self.cache
    }

    #[instrument(skip(self), fields(city = %city))]
    pub async fn fetch_forecast(
        &self,
        city: &str,
        force_refresh: bool,
    ) -> Result<ForecastPayload, FetchError> {
        let key = cache_key_for(city);

        if !force_refresh
            && let Some(cached) = self.cache.get(&key)
        {
            info!("Cache hit");
            return Ok(cached);
        }

        info!(force_refresh, "Fetching forecast from API");

        let url = format!(
            "{}/forecast.json?key={}&q={}&days={}&aqi=yes",
            self.base_url,
            urlencoding::encode(&self.api_key),
            urlencoding::encode(city),
            self.forecast_days
        );

        let payload: ForecastPayload = self.http_client.get_json(&url).await.map_err(|e| {
            warn!(kind = e.kind(), error = %e, "Error fetching weather");
            e
        })?;

        self.cache.set(key, payload.clone());

        Ok(payload)
    }

    /// Autocomplete lookup. Failures are logged and come back as no matches.
    #[instrument(skip(self), fields(query = %query))]
    pub async fn search_cities(&self, query: &str) -> Vec<CitySuggestion> {
        let query = query.trim();
        if query.is_empty() {
            return Vec::new();
        }

        let url = format!(
            "{}/search.json?key={}&q={}",
            self.base_url,
            urlencoding::encode(&self.api_key),
            urlencoding::encode(query)
        );

        match self.http_client.get_json::<Vec<CitySuggestion>>(&url).await {
            Ok(results) => {
                info!(matches = results.len(), "City search completed");
                results
            }
            Err(e) => {
                warn!(kind = e.kind(), error = %e, "Error searching cities");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_key_is_prefixed_and_case_sensitive() {
        assert_eq!(cache_key_for("London"), "weather_London");
        assert_eq!(cache_key_for("New York"), "weather_New York");
        assert_ne!(cache_key_for("paris"), cache_key_for("Paris"));
    }
}
