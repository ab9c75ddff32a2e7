use super::{get_json, SnapshotSource};
use crate::config::{OpenWeatherMapConfig, WeatherApi, DEFAULT_LATITUDE, DEFAULT_LONGITUDE};
use crate::error::{FishcastError, Result};
use crate::models::{ConditionLabel, CurrentConditions, DailyForecast, WeatherSnapshot};
use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};

const API_BASE_URL: &str = "https://api.openweathermap.org/data";
const SOURCE: &str = "OpenWeatherMap";

pub struct OpenWeatherMapClient {
    client: reqwest::Client,
    config: OpenWeatherMapConfig,
    latitude: f64,
    longitude: f64,
}

// One Call 3.0 response structures
#[derive(Debug, Deserialize)]
struct OneCallResponse {
    current: OneCallCurrent,
    #[serde(default)]
    daily: Vec<OneCallDaily>,
}

#[derive(Debug, Deserialize)]
struct OneCallCurrent {
    temp: f64,
    feels_like: f64,
    humidity: f64,
    wind_speed: f64,
    #[serde(default)]
    weather: Vec<OwmWeather>,
}

#[derive(Debug, Deserialize)]
struct OneCallDaily {
    dt: i64,
    temp: OneCallDailyTemp,
    #[serde(default)]
    weather: Vec<OwmWeather>,
    #[serde(default)]
    pop: f64,
}

#[derive(Debug, Deserialize)]
struct OneCallDailyTemp {
    day: f64,
    min: f64,
    max: f64,
}

// 2.5 current weather and 5-day/3-hour forecast structures
#[derive(Debug, Deserialize)]
struct OwmCurrentResponse {
    main: OwmMain,
    wind: OwmWind,
    #[serde(default)]
    weather: Vec<OwmWeather>,
}

#[derive(Debug, Deserialize)]
struct OwmForecastResponse {
    list: Vec<OwmForecastItem>,
}

#[derive(Debug, Deserialize)]
struct OwmForecastItem {
    dt: i64,
    main: OwmMain,
    #[serde(default)]
    weather: Vec<OwmWeather>,
    #[serde(default)]
    pop: f64, // probability of precipitation
}

#[derive(Debug, Deserialize)]
struct OwmMain {
    temp: f64,
    feels_like: f64,
    humidity: f64,
}

#[derive(Debug, Deserialize)]
struct OwmWind {
    speed: f64,
}

#[derive(Debug, Clone, Deserialize)]
struct OwmWeather {
    main: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    icon: String,
}

impl OwmWeather {
    fn to_label(&self) -> ConditionLabel {
        ConditionLabel {
            main: self.main.clone(),
            description: self.description.clone(),
            icon: self.icon.clone(),
        }
    }
}

impl OpenWeatherMapClient {
    /// Falls back to the default spot when no coordinates are configured.
    pub fn new(config: OpenWeatherMapConfig, coordinates: Option<(f64, f64)>) -> Self {
        let (latitude, longitude) =
            coordinates.unwrap_or((DEFAULT_LATITUDE, DEFAULT_LONGITUDE));
        Self {
            client: reqwest::Client::new(),
            config,
            latitude,
            longitude,
        }
    }

    fn api_key(&self) -> Result<&str> {
        if self.config.api_key.trim().is_empty() {
            return Err(FishcastError::ConfigurationMissing(
                "OpenWeatherMap API key not configured".into(),
            ));
        }
        Ok(&self.config.api_key)
    }

    async fn fetch_onecall(&self) -> Result<WeatherSnapshot> {
        let url = format!(
            "{}/3.0/onecall?lat={}&lon={}&exclude=minutely,hourly,alerts&units=imperial&appid={}",
            API_BASE_URL,
            self.latitude,
            self.longitude,
            self.api_key()?
        );

        let response: OneCallResponse = get_json(&self.client, SOURCE, &url).await?;
        convert_onecall(response)
    }

    async fn fetch_forecast(&self) -> Result<WeatherSnapshot> {
        let api_key = self.api_key()?;
        let current_url = format!(
            "{}/2.5/weather?lat={}&lon={}&units=imperial&appid={}",
            API_BASE_URL, self.latitude, self.longitude, api_key
        );
        let forecast_url = format!(
            "{}/2.5/forecast?lat={}&lon={}&units=imperial&appid={}",
            API_BASE_URL, self.latitude, self.longitude, api_key
        );

        let current: OwmCurrentResponse = get_json(&self.client, SOURCE, &current_url).await?;
        let forecast: OwmForecastResponse = get_json(&self.client, SOURCE, &forecast_url).await?;

        convert_forecast(current, forecast, &Local)
    }
}

impl SnapshotSource for OpenWeatherMapClient {
    type Snapshot = WeatherSnapshot;

    fn name(&self) -> &'static str {
        SOURCE
    }

    async fn fetch(&self) -> Result<WeatherSnapshot> {
        match self.config.api {
            WeatherApi::OneCall => self.fetch_onecall().await,
            WeatherApi::Forecast => self.fetch_forecast().await,
        }
    }
}

fn labels(weather: &[OwmWeather]) -> Vec<ConditionLabel> {
    weather.iter().map(OwmWeather::to_label).collect()
}

fn current_conditions(
    temp_f: f64,
    feels_like_f: f64,
    humidity_percent: f64,
    wind_speed_mph: f64,
    weather: &[OwmWeather],
) -> Result<CurrentConditions> {
    if weather.is_empty() {
        return Err(FishcastError::UpstreamMalformed(
            "OpenWeatherMap: current conditions carry no weather label".into(),
        ));
    }

    Ok(CurrentConditions {
        temp_f,
        feels_like_f,
        humidity_percent,
        wind_speed_mph,
        conditions: labels(weather),
    })
}

fn convert_onecall(response: OneCallResponse) -> Result<WeatherSnapshot> {
    let current = &response.current;
    let current = current_conditions(
        current.temp,
        current.feels_like,
        current.humidity,
        current.wind_speed,
        &current.weather,
    )?;

    let daily = response
        .daily
        .iter()
        .map(|d| DailyForecast {
            dt: d.dt,
            temp_f: d.temp.day,
            min_temp_f: d.temp.min,
            max_temp_f: d.temp.max,
            conditions: labels(&d.weather),
            precipitation_prob: d.pop,
        })
        .collect();

    Ok(WeatherSnapshot {
        fetched_at: Utc::now(),
        current,
        daily,
    })
}

fn convert_forecast<Tz: TimeZone>(
    current: OwmCurrentResponse,
    forecast: OwmForecastResponse,
    tz: &Tz,
) -> Result<WeatherSnapshot> {
    let current = current_conditions(
        current.main.temp,
        current.main.feels_like,
        current.main.humidity,
        current.wind.speed,
        &current.weather,
    )?;

    Ok(WeatherSnapshot {
        fetched_at: Utc::now(),
        current,
        daily: aggregate_daily(&forecast.list, tz)?,
    })
}

/// Collapse 3-hour points into one forecast per calendar day in `tz`
fn aggregate_daily<Tz: TimeZone>(
    items: &[OwmForecastItem],
    tz: &Tz,
) -> Result<Vec<DailyForecast>> {
    let mut by_date: BTreeMap<NaiveDate, Vec<&OwmForecastItem>> = BTreeMap::new();
    for item in items {
        let timestamp = DateTime::from_timestamp(item.dt, 0).ok_or_else(|| {
            FishcastError::UpstreamMalformed(format!(
                "OpenWeatherMap: invalid forecast timestamp {}",
                item.dt
            ))
        })?;
        let date = timestamp.with_timezone(tz).date_naive();
        by_date.entry(date).or_default().push(item);
    }

    Ok(by_date
        .into_values()
        .map(|points| aggregate_day(&points))
        .collect())
}

fn aggregate_day(points: &[&OwmForecastItem]) -> DailyForecast {
    let temps: Vec<f64> = points.iter().map(|p| p.main.temp).collect();

    let temp_f = temps.iter().sum::<f64>() / temps.len().max(1) as f64;
    let min_temp_f = temps.iter().copied().fold(f64::INFINITY, f64::min);
    let max_temp_f = temps.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let precipitation_prob = points.iter().map(|p| p.pop).fold(0.0, f64::max);

    // Most frequent primary label wins, ties go to the earliest
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for point in points {
        if let Some(w) = point.weather.first() {
            *counts.entry(w.main.as_str()).or_insert(0) += 1;
        }
    }
    let mut dominant: Option<&OwmWeather> = None;
    let mut best = 0;
    for w in points.iter().filter_map(|p| p.weather.first()) {
        let count = counts[w.main.as_str()];
        if count > best {
            best = count;
            dominant = Some(w);
        }
    }

    DailyForecast {
        dt: points.first().map(|p| p.dt).unwrap_or_default(),
        temp_f,
        min_temp_f,
        max_temp_f,
        conditions: dominant
            .map(|w| vec![w.to_label()])
            .unwrap_or_default(),
        precipitation_prob,
    }
}
