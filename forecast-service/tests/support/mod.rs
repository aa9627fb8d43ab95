#![allow(dead_code)]

use common::http_client::HttpClient;
use forecast_service::api_client::WeatherApiClient;
use forecast_service::cache::ForecastCache;
use forecast_service::clock::ManualClock;
use forecast_service::dashboard::{Dashboard, DashboardSettings};
use forecast_service::preferences::{MemoryPreferences, PreferencesStore};
use serde_json::{Value, json};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use wiremock::{MockServer, Request, Respond, ResponseTemplate};

pub const API_KEY: &str = "test-key";
pub const TTL_MS: i64 = 60_000;

/// Minimal `forecast.json` body for a city.
pub fn forecast_body(city: &str, temp_c: f64) -> Value {
    json!({
        "location": { "name": city, "country": "Testland", "localtime": "2024-06-16 12:00" },
        "current": {
            "temp_c": temp_c,
            "feelslike_c": temp_c - 1.0,
            "condition": { "code": 1000, "text": "Sunny" },
            "humidity": 50,
            "wind_kph": 10.0,
            "wind_dir": "NW",
            "vis_km": 10.0,
            "pressure_mb": 1015.0
        },
        "forecast": {
            "forecastday": [{
                "date": "2024-06-16",
                "day": { "maxtemp_c": temp_c + 5.0, "mintemp_c": temp_c - 5.0 },
                "hour": [
                    { "time": "2024-06-16 00:00", "temp_c": temp_c - 2.0, "feelslike_c": temp_c - 3.0 },
                    { "time": "2024-06-16 01:00", "temp_c": temp_c - 2.5, "feelslike_c": temp_c - 3.5 }
                ]
            }]
        }
    })
}

/// Hands out the given responses in order, repeating the last one.
pub struct Sequence {
    calls: AtomicUsize,
    responses: Vec<ResponseTemplate>,
}

impl Sequence {
    pub fn new(responses: Vec<ResponseTemplate>) -> Self {
        assert!(!responses.is_empty());
        Self {
            calls: AtomicUsize::new(0),
            responses,
        }
    }
}

impl Respond for Sequence {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        self.responses[call.min(self.responses.len() - 1)].clone()
    }
}

/// Answers with a forecast for whatever city the `q` parameter names.
pub struct EchoCity {
    pub temp_c: f64,
}

impl Respond for EchoCity {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let city = request
            .url
            .query_pairs()
            .find(|(key, _)| key == "q")
            .map(|(_, value)| value.into_owned())
            .unwrap_or_default();
        ResponseTemplate::new(200).set_body_json(forecast_body(&city, self.temp_c))
    }
}

pub struct Harness {
    pub server: MockServer,
    pub clock: Arc<ManualClock>,
    pub cache: Arc<ForecastCache>,
    pub client: Arc<WeatherApiClient>,
}

impl Harness {
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        let clock = Arc::new(ManualClock::default());
        let cache = Arc::new(ForecastCache::new(
            chrono::Duration::milliseconds(TTL_MS),
            clock.clone(),
        ));
        let http_client = HttpClient::new(Duration::from_secs(5)).expect("client should build");
        let client = Arc::new(WeatherApiClient::new(
            http_client,
            cache.clone(),
            format!("{}/v1", server.uri()),
            API_KEY,
            7,
        ));

        Self {
            server,
            clock,
            cache,
            client,
        }
    }

    pub async fn request_count(&self) -> usize {
        self.server
            .received_requests()
            .await
            .map(|requests| requests.len())
            .unwrap_or(0)
    }

    pub fn dashboard(&self, defaults: &[&str], max_tracked: usize) -> Arc<Dashboard> {
        self.dashboard_with_store(Arc::new(MemoryPreferences::new()), defaults, max_tracked)
    }

    pub fn dashboard_with_store(
        &self,
        store: Arc<dyn PreferencesStore>,
        defaults: &[&str],
        max_tracked: usize,
    ) -> Arc<Dashboard> {
        Arc::new(
            Dashboard::new(
                self.client.clone(),
                store,
                self.clock.clone(),
                DashboardSettings {
                    default_cities: defaults.iter().map(|c| c.to_string()).collect(),
                    max_tracked,
                },
            )
            .expect("dashboard should build"),
        )
    }
}
