//! Render-ready views built from a forecast payload in the user's unit.

use common::models::{
    CityCard, CityDetail, DailyPoint, ForecastPayload, HourlyPoint, TemperatureUnit,
};

pub fn city_card(
    city: &str,
    payload: &ForecastPayload,
    unit: TemperatureUnit,
    is_favorite: bool,
) -> CityCard {
    let current = &payload.current;
    let today = payload.forecast.forecastday.first();

    CityCard {
        city: city.to_string(),
        name: payload.location.name.clone(),
        country: payload.location.country.clone(),
        temperature: unit.convert(current.temp_c),
        feels_like: current.feelslike_c.map(|t| unit.convert(t)),
        condition: current.condition.text.clone(),
        condition_code: current.condition.code,
        humidity: current.humidity,
        wind_kph: current.wind_kph,
        wind_dir: current.wind_dir.clone(),
        visibility_km: current.vis_km,
        pressure_mb: current.pressure_mb,
        high: today.map(|d| unit.convert(d.day.maxtemp_c)),
        low: today.map(|d| unit.convert(d.day.mintemp_c)),
        unit,
        is_favorite,
    }
}

/// Card, one point per forecast day, and today's hourly series.
pub fn city_detail(
    city: &str,
    payload: &ForecastPayload,
    unit: TemperatureUnit,
    is_favorite: bool,
) -> CityDetail {
    let daily = payload
        .forecast
        .forecastday
        .iter()
        .map(|d| DailyPoint {
            date: d.date,
            high: unit.convert(d.day.maxtemp_c),
            low: unit.convert(d.day.mintemp_c),
            chance_of_rain: d.day.daily_chance_of_rain,
        })
        .collect();

    let hourly = payload
        .forecast
        .forecastday
        .first()
        .map(|today| {
            today
                .hour
                .iter()
                .map(|h| HourlyPoint {
                    time: clock_time(&h.time).to_string(),
                    temperature: unit.convert(h.temp_c),
                    feels_like: unit.convert(h.feelslike_c),
                })
                .collect()
        })
        .unwrap_or_default();

    CityDetail {
        card: city_card(city, payload, unit, is_favorite),
        daily,
        hourly,
    }
}

/// `2024-06-16 13:00` -> `13:00`
fn clock_time(timestamp: &str) -> &str {
    timestamp
        .split_once(' ')
        .map(|(_, time)| time)
        .unwrap_or(timestamp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload() -> ForecastPayload {
        serde_json::from_value(json!({
            "location": { "name": "Tokyo", "country": "Japan" },
            "current": {
                "temp_c": 20.0,
                "feelslike_c": 19.0,
                "condition": { "code": 1000, "text": "Sunny" },
                "humidity": 40,
                "wind_kph": 7.2,
                "wind_dir": "N",
                "vis_km": 10.0,
                "pressure_mb": 1012.0
            },
            "forecast": {
                "forecastday": [
                    {
                        "date": "2024-06-16",
                        "day": { "maxtemp_c": 25.0, "mintemp_c": 15.0, "daily_chance_of_rain": 10 },
                        "hour": [
                            { "time": "2024-06-16 00:00", "temp_c": 16.0, "feelslike_c": 15.0 },
                            { "time": "2024-06-16 01:00", "temp_c": 15.5, "feelslike_c": 14.5 }
                        ]
                    },
                    {
                        "date": "2024-06-17",
                        "day": { "maxtemp_c": 27.0, "mintemp_c": 17.0 },
                        "hour": []
                    }
                ]
            }
        }))
        .expect("fixture should parse")
    }

    #[test]
    fn card_in_celsius_keeps_readings() {
        let card = city_card("Tokyo", &payload(), TemperatureUnit::Celsius, true);
        assert_eq!(card.name, "Tokyo");
        assert_eq!(card.temperature, 20.0);
        assert_eq!(card.feels_like, Some(19.0));
        assert_eq!(card.high, Some(25.0));
        assert_eq!(card.low, Some(15.0));
        assert_eq!(card.condition_code, 1000);
        assert!(card.is_favorite);
    }

    #[test]
    fn card_in_fahrenheit_converts_temperatures_only() {
        let card = city_card("Tokyo", &payload(), TemperatureUnit::Fahrenheit, false);
        assert_eq!(card.temperature, 68.0);
        assert_eq!(card.high, Some(77.0));
        assert_eq!(card.low, Some(59.0));
        assert_eq!(card.wind_kph, 7.2);
        assert_eq!(card.unit, TemperatureUnit::Fahrenheit);
    }

    #[test]
    fn detail_has_daily_and_todays_hours() {
        let detail = city_detail("Tokyo", &payload(), TemperatureUnit::Celsius, false);
        assert_eq!(detail.daily.len(), 2);
        assert_eq!(detail.daily[1].high, 27.0);
        assert_eq!(detail.daily[0].chance_of_rain, Some(10.0));
        assert_eq!(detail.hourly.len(), 2);
        assert_eq!(detail.hourly[1].time, "01:00");
        assert_eq!(detail.hourly[1].feels_like, 14.5);
    }

    #[test]
    fn clock_time_without_date_is_unchanged() {
        assert_eq!(clock_time("13:00"), "13:00");
    }
}
