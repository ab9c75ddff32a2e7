use super::{get_json, LooseNumber, SnapshotSource};
use crate::error::{FishcastError, Result};
use crate::models::{group_by_date, TideDay, TideEvent, TideType};
use chrono::{DateTime, Local, TimeZone, Utc};
use serde::Deserialize;

const API_URL: &str = "https://www.worldtides.info/api/v3";
const SOURCE: &str = "WorldTides";
const FEET_PER_METER: f64 = 3.280_84;

/// Coordinate-based tide extremes
pub struct WorldTidesClient {
    client: reqwest::Client,
    coordinates: Option<(f64, f64)>,
    api_key: Option<String>,
    lookahead_days: u32,
}

#[derive(Debug, Deserialize)]
struct ExtremesResponse {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    extremes: Vec<Extreme>,
}

#[derive(Debug, Deserialize)]
struct Extreme {
    dt: i64,
    /// Meters above the station datum
    height: LooseNumber,
    #[serde(rename = "type")]
    kind: String,
}

impl WorldTidesClient {
    pub fn new(
        coordinates: Option<(f64, f64)>,
        api_key: Option<String>,
        lookahead_days: u32,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            coordinates,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            lookahead_days,
        }
    }

    fn url(&self, latitude: f64, longitude: f64, start: i64) -> String {
        let length = i64::from(self.lookahead_days) * 24 * 3600;
        let mut url = format!(
            "{}?extremes&lat={}&lon={}&start={}&length={}",
            API_URL, latitude, longitude, start, length
        );
        // The keyless free tier works with tighter limits
        if let Some(ref key) = self.api_key {
            url.push_str("&key=");
            url.push_str(key);
        }
        url
    }
}

impl SnapshotSource for WorldTidesClient {
    type Snapshot = Vec<TideDay>;

    fn name(&self) -> &'static str {
        SOURCE
    }

    async fn fetch(&self) -> Result<Vec<TideDay>> {
        let (latitude, longitude) = self.coordinates.ok_or_else(|| {
            FishcastError::ConfigurationMissing(
                "Latitude and longitude required for WorldTides API".into(),
            )
        })?;

        let url = self.url(latitude, longitude, Utc::now().timestamp());
        let response: ExtremesResponse = get_json(&self.client, SOURCE, &url).await?;
        convert_extremes(response, &Local)
    }
}

fn classify(kind: &str) -> Result<TideType> {
    match kind {
        "High" => Ok(TideType::High),
        "Low" => Ok(TideType::Low),
        other => Err(FishcastError::UpstreamMalformed(format!(
            "WorldTides: unknown extreme type {:?}",
            other
        ))),
    }
}

fn convert_extremes<Tz: TimeZone>(response: ExtremesResponse, tz: &Tz) -> Result<Vec<TideDay>>
where
    Tz::Offset: std::fmt::Display,
{
    if let Some(error) = response.error {
        return Err(FishcastError::UpstreamUnavailable(format!(
            "WorldTides: {}",
            error
        )));
    }

    let events = response
        .extremes
        .iter()
        .map(|extreme| {
            let at = DateTime::from_timestamp(extreme.dt, 0)
                .ok_or_else(|| {
                    FishcastError::UpstreamMalformed(format!(
                        "WorldTides: invalid timestamp {}",
                        extreme.dt
                    ))
                })?
                .with_timezone(tz);

            let event = TideEvent {
                time: at.format("%-I:%M %p").to_string(),
                tide_type: classify(&extreme.kind)?,
                height_ft: extreme.height.to_f64(SOURCE)? * FEET_PER_METER,
            };
            Ok((at.date_naive(), event))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(group_by_date(events))
}
