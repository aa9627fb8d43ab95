use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

/// Forecast document returned by the weather API's `forecast.json`.
///
/// Only the fields the dashboard reads are modelled; anything else in the
/// response body is ignored.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, ToSchema)]
pub struct ForecastPayload {
    pub location: Location,
    pub current: CurrentConditions,
    pub forecast: Forecast,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, ToSchema)]
pub struct Location {
    pub name: String,
    pub country: String,
    pub region: Option<String>,
    pub localtime: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, ToSchema)]
pub struct CurrentConditions {
    pub temp_c: f64,
    pub condition: Condition,
    pub humidity: f64,
    pub wind_kph: f64,
    pub wind_dir: String,
    pub vis_km: f64,
    pub pressure_mb: f64,
    pub feelslike_c: Option<f64>,
    pub uv: Option<f64>,
    pub last_updated: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, ToSchema)]
pub struct Condition {
    pub code: u32,
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, ToSchema)]
pub struct Forecast {
    pub forecastday: Vec<ForecastDay>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, ToSchema)]
pub struct ForecastDay {
    pub date: NaiveDate,
    pub day: DaySummary,
    pub hour: Vec<HourForecast>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, ToSchema)]
pub struct DaySummary {
    pub maxtemp_c: f64,
    pub mintemp_c: f64,
    pub avgtemp_c: Option<f64>,
    pub daily_chance_of_rain: Option<f64>,
    pub condition: Option<Condition>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, ToSchema)]
pub struct HourForecast {
    /// Local time as sent by the API, e.g. `2024-06-16 13:00`
    pub time: String,
    pub temp_c: f64,
    pub feelslike_c: f64,
    pub chance_of_rain: Option<f64>,
}

/// One entry of the weather API's `search.json` autocomplete
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, ToSchema)]
pub struct CitySuggestion {
    pub id: Option<u64>,
    pub name: String,
    pub region: Option<String>,
    pub country: String,
    pub lat: f64,
    pub lon: f64,
}

/// Temperature unit preference, stored as `"C"` or `"F"`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, ToSchema)]
pub enum TemperatureUnit {
    #[default]
    #[serde(rename = "C")]
    Celsius,
    #[serde(rename = "F")]
    Fahrenheit,
}

impl TemperatureUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Celsius => "C",
            Self::Fahrenheit => "F",
        }
    }

    /// Convert a Celsius reading into this unit, rounded to one decimal
    pub fn convert(&self, celsius: f64) -> f64 {
        let value = match self {
            Self::Celsius => celsius,
            Self::Fahrenheit => celsius * 9.0 / 5.0 + 32.0,
        };
        (value * 10.0).round() / 10.0
    }
}

impl fmt::Display for TemperatureUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TemperatureUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "C" => Ok(Self::Celsius),
            "F" => Ok(Self::Fahrenheit),
            other => Err(format!("unknown temperature unit '{}', expected C or F", other)),
        }
    }
}

/// Summary card for one city on the dashboard
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, ToSchema)]
pub struct CityCard {
    pub city: String,
    pub name: String,
    pub country: String,
    pub temperature: f64,
    pub feels_like: Option<f64>,
    pub condition: String,
    pub condition_code: u32,
    pub humidity: f64,
    pub wind_kph: f64,
    pub wind_dir: String,
    pub visibility_km: f64,
    pub pressure_mb: f64,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub unit: TemperatureUnit,
    pub is_favorite: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, ToSchema)]
pub struct DailyPoint {
    pub date: NaiveDate,
    pub high: f64,
    pub low: f64,
    pub chance_of_rain: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, ToSchema)]
pub struct HourlyPoint {
    pub time: String,
    pub temperature: f64,
    pub feels_like: f64,
}

/// Card plus the series the detail charts are drawn from
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, ToSchema)]
pub struct CityDetail {
    pub card: CityCard,
    pub daily: Vec<DailyPoint>,
    pub hourly: Vec<HourlyPoint>,
}

/// Whole-dashboard view
#[derive(Debug, Serialize, Deserialize, Clone, ToSchema)]
pub struct DashboardView {
    pub unit: TemperatureUnit,
    pub favorites: Vec<String>,
    pub last_update: Option<DateTime<Utc>>,
    pub cities: Vec<CityCard>,
    /// Tracked cities with no data yet
    pub pending: Vec<String>,
}

/// Outcome of a refresh cycle
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, ToSchema)]
pub struct RefreshSummary {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
}

#[derive(Debug, Serialize, Deserialize, Clone, ToSchema)]
pub struct UnitRequest {
    pub unit: TemperatureUnit,
}

#[derive(Debug, Serialize, Deserialize, Clone, ToSchema)]
pub struct FavoritesResponse {
    pub favorites: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> serde_json::Value {
        json!({
            "location": { "name": "London", "country": "United Kingdom", "tz_id": "Europe/London" },
            "current": {
                "temp_c": 10.0,
                "condition": { "code": 1003, "text": "Partly cloudy", "icon": "//cdn/116.png" },
                "humidity": 72,
                "wind_kph": 14.4,
                "wind_dir": "WSW",
                "vis_km": 10.0,
                "pressure_mb": 1016.0,
                "air_quality": { "pm2_5": 4.2 }
            },
            "forecast": {
                "forecastday": [{
                    "date": "2024-06-16",
                    "day": { "maxtemp_c": 15.1, "mintemp_c": 8.3 },
                    "hour": [{ "time": "2024-06-16 00:00", "temp_c": 9.0, "feelslike_c": 7.5 }]
                }]
            }
        })
    }

    #[test]
    fn payload_ignores_unknown_fields() {
        let payload: ForecastPayload = serde_json::from_value(sample()).expect("should parse");
        assert_eq!(payload.location.name, "London");
        assert_eq!(payload.current.humidity, 72.0);
        assert_eq!(payload.current.feelslike_c, None);
        assert_eq!(
            payload.forecast.forecastday[0].date,
            NaiveDate::from_ymd_opt(2024, 6, 16).expect("valid date")
        );
    }

    #[test]
    fn payload_missing_required_field_is_rejected() {
        let mut body = sample();
        body["current"]
            .as_object_mut()
            .expect("current is an object")
            .remove("temp_c");
        assert!(serde_json::from_value::<ForecastPayload>(body).is_err());
    }

    #[test]
    fn unit_round_trips_as_letter() {
        assert_eq!(
            serde_json::to_string(&TemperatureUnit::Fahrenheit).expect("serialize"),
            "\"F\""
        );
        assert_eq!("C".parse::<TemperatureUnit>(), Ok(TemperatureUnit::Celsius));
        assert!("K".parse::<TemperatureUnit>().is_err());
    }

    #[test]
    fn convert_to_fahrenheit() {
        assert_eq!(TemperatureUnit::Fahrenheit.convert(0.0), 32.0);
        assert_eq!(TemperatureUnit::Fahrenheit.convert(100.0), 212.0);
        assert_eq!(TemperatureUnit::Fahrenheit.convert(-40.0), -40.0);
        assert_eq!(TemperatureUnit::Celsius.convert(21.46), 21.5);
    }
}
