pub mod noaa;
pub mod openweathermap;
pub mod worldtides;

pub use noaa::NoaaTidesClient;
pub use openweathermap::OpenWeatherMapClient;
pub use worldtides::WorldTidesClient;

use crate::config::{Config, TideApi};
use crate::error::{FishcastError, Result};
use crate::models::TideDay;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::future::Future;

/// An upstream that can be polled for a fresh snapshot
pub trait SnapshotSource: Send + Sync + 'static {
    type Snapshot: Clone + Send + Sync + 'static;

    /// Short label used in logs
    fn name(&self) -> &'static str;

    fn fetch(&self) -> impl Future<Output = Result<Self::Snapshot>> + Send;
}

/// The configured tide upstream. Both variants yield the same `TideDay` shape.
pub enum TideClient {
    WorldTides(WorldTidesClient),
    Noaa(NoaaTidesClient),
}

impl TideClient {
    pub fn from_config(config: &Config) -> Self {
        match config.tides.provider {
            TideApi::WorldTides => TideClient::WorldTides(WorldTidesClient::new(
                config.location.coordinates(),
                config.tides.worldtides_api_key.clone(),
                config.tides.lookahead_days,
            )),
            TideApi::Noaa => TideClient::Noaa(NoaaTidesClient::new(
                config.tides.noaa_station.clone(),
                config.tides.lookahead_days,
            )),
        }
    }
}

impl SnapshotSource for TideClient {
    type Snapshot = Vec<TideDay>;

    fn name(&self) -> &'static str {
        match self {
            TideClient::WorldTides(c) => c.name(),
            TideClient::Noaa(c) => c.name(),
        }
    }

    async fn fetch(&self) -> Result<Vec<TideDay>> {
        match self {
            TideClient::WorldTides(c) => c.fetch().await,
            TideClient::Noaa(c) => c.fetch().await,
        }
    }
}

/// GET a JSON document, mapping transport and status failures to
/// `UpstreamUnavailable` and undecodable bodies to `UpstreamMalformed`.
pub(crate) async fn get_json<T: DeserializeOwned>(
    client: &reqwest::Client,
    source: &str,
    url: &str,
) -> Result<T> {
    let response = client.get(url).send().await.map_err(|e| {
        FishcastError::UpstreamUnavailable(format!("{}: {}", source, e.without_url()))
    })?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(FishcastError::UpstreamUnavailable(format!(
            "{} returned {}: {}",
            source, status, body
        )));
    }

    response.json::<T>().await.map_err(|e| {
        FishcastError::UpstreamMalformed(format!(
            "Failed to parse {} response: {}",
            source,
            e.without_url()
        ))
    })
}

/// Tide heights arrive as JSON numbers from some services and strings from others
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum LooseNumber {
    Number(f64),
    Text(String),
}

impl LooseNumber {
    pub(crate) fn to_f64(&self, source: &str) -> Result<f64> {
        match self {
            LooseNumber::Number(n) => Ok(*n),
            LooseNumber::Text(s) => s.trim().parse::<f64>().map_err(|_| {
                FishcastError::UpstreamMalformed(format!("{}: invalid height {:?}", source, s))
            }),
        }
    }
}
