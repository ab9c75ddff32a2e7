use super::{get_json, LooseNumber, SnapshotSource};
use crate::error::{FishcastError, Result};
use crate::models::{group_by_date, TideDay, TideEvent, TideType};
use chrono::{Days, Local, NaiveDate, NaiveDateTime};
use serde::Deserialize;

const API_URL: &str = "https://api.tidesandcurrents.noaa.gov/api/prod/datagetter";
const SOURCE: &str = "NOAA";

/// NOAA CO-OPS high/low predictions for a single station
pub struct NoaaTidesClient {
    client: reqwest::Client,
    station: String,
    lookahead_days: u32,
}

#[derive(Debug, Deserialize)]
struct PredictionsResponse {
    #[serde(default)]
    predictions: Vec<Prediction>,
    #[serde(default)]
    error: Option<NoaaError>,
}

#[derive(Debug, Deserialize)]
struct NoaaError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct Prediction {
    /// Station local time, "yyyy-mm-dd HH:MM"
    t: String,
    /// Feet above MLLW
    v: LooseNumber,
    #[serde(rename = "type")]
    kind: String,
}

impl NoaaTidesClient {
    pub fn new(station: String, lookahead_days: u32) -> Self {
        Self {
            client: reqwest::Client::new(),
            station,
            lookahead_days,
        }
    }

    fn url(&self, begin: NaiveDate) -> Result<String> {
        let end = begin
            .checked_add_days(Days::new(u64::from(self.lookahead_days)))
            .ok_or_else(|| {
                FishcastError::Config(format!(
                    "tides.lookahead_days {} is out of range",
                    self.lookahead_days
                ))
            })?;
        Ok(format!(
            "{}?begin_date={}&end_date={}&station={}&product=predictions&datum=MLLW&time_zone=lst_ldt&interval=hilo&units=english&application=fishcast&format=json",
            API_URL,
            begin.format("%Y%m%d"),
            end.format("%Y%m%d"),
            self.station
        ))
    }
}

impl SnapshotSource for NoaaTidesClient {
    type Snapshot = Vec<TideDay>;

    fn name(&self) -> &'static str {
        SOURCE
    }

    async fn fetch(&self) -> Result<Vec<TideDay>> {
        if self.station.trim().is_empty() {
            return Err(FishcastError::ConfigurationMissing(
                "NOAA station id not configured".into(),
            ));
        }

        let url = self.url(Local::now().date_naive())?;
        let response: PredictionsResponse = get_json(&self.client, SOURCE, &url).await?;
        convert_predictions(response)
    }
}

fn classify(kind: &str) -> Result<TideType> {
    match kind {
        "H" => Ok(TideType::High),
        "L" => Ok(TideType::Low),
        other => Err(FishcastError::UpstreamMalformed(format!(
            "NOAA: unknown prediction type {:?}",
            other
        ))),
    }
}

fn convert_predictions(response: PredictionsResponse) -> Result<Vec<TideDay>> {
    if let Some(error) = response.error {
        return Err(FishcastError::UpstreamUnavailable(format!(
            "NOAA: {}",
            error.message
        )));
    }

    let events = response
        .predictions
        .iter()
        .map(|prediction| {
            // Already in station local time
            let at = NaiveDateTime::parse_from_str(prediction.t.trim(), "%Y-%m-%d %H:%M")
                .map_err(|_| {
                    FishcastError::UpstreamMalformed(format!(
                        "NOAA: invalid prediction time {:?}",
                        prediction.t
                    ))
                })?;

            let event = TideEvent {
                time: at.format("%-I:%M %p").to_string(),
                tide_type: classify(&prediction.kind)?,
                height_ft: prediction.v.to_f64(SOURCE)?,
            };
            Ok((at.date(), event))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(group_by_date(events))
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"{ "predictions" : [
        {"t":"2024-01-14 03:24", "v":"4.512", "type":"H"},
        {"t":"2024-01-14 09:41", "v":"-0.215", "type":"L"},
        {"t":"2024-01-14 15:58", "v":"4.103", "type":"H"},
        {"t":"2024-01-14 22:02", "v":"0.087", "type":"L"},
        {"t":"2024-01-15 04:11", "v":"4.620", "type":"H"}
    ]}"#;

    #[test]
    fn groups_predictions_by_date() {
        let response: PredictionsResponse = serde_json::from_str(FIXTURE).unwrap();
        let days = convert_predictions(response).unwrap();

        assert_eq!(days.len(), 2);
        assert_eq!(days[0].date, "2024-01-14");
        assert_eq!(days[0].tides.len(), 4);
        assert_eq!(days[0].tides[0].time, "3:24 AM");
        assert_eq!(days[0].tides[0].tide_type, TideType::High);
        assert_eq!(days[0].tides[0].height_ft, 4.512);
        assert_eq!(days[0].tides[1].tide_type, TideType::Low);
        assert_eq!(days[0].tides[1].height_ft, -0.215);
        assert_eq!(days[0].tides[3].time, "10:02 PM");
        assert_eq!(days[1].date, "2024-01-15");
    }

    #[test]
    fn keeps_upstream_order_within_a_day() {
        let response: PredictionsResponse = serde_json::from_str(
            r#"{"predictions": [
                {"t":"2024-01-14 15:58", "v":"4.1", "type":"H"},
                {"t":"2024-01-14 03:24", "v":"4.5", "type":"H"}
            ]}"#,
        )
        .unwrap();
        let days = convert_predictions(response).unwrap();
        assert_eq!(days[0].tides[0].time, "3:58 PM");
        assert_eq!(days[0].tides[1].time, "3:24 AM");
    }

    #[test]
    fn upstream_error_is_reported() {
        let response: PredictionsResponse = serde_json::from_str(
            r#"{"error": {"message": "No Predictions data was found. Please make sure the Datum input is valid."}}"#,
        )
        .unwrap();
        let err = convert_predictions(response).unwrap_err();
        assert!(matches!(err, FishcastError::UpstreamUnavailable(_)));
        assert!(err.to_string().contains("No Predictions data"));
    }

    #[test]
    fn bad_height_is_malformed() {
        let response: PredictionsResponse = serde_json::from_str(
            r#"{"predictions": [{"t":"2024-01-14 03:24", "v":"", "type":"H"}]}"#,
        )
        .unwrap();
        assert!(matches!(
            convert_predictions(response),
            Err(FishcastError::UpstreamMalformed(_))
        ));
    }

    #[test]
    fn bad_time_is_malformed() {
        let response: PredictionsResponse = serde_json::from_str(
            r#"{"predictions": [{"t":"14/01/2024 3:24", "v":"4.5", "type":"H"}]}"#,
        )
        .unwrap();
        assert!(matches!(
            convert_predictions(response),
            Err(FishcastError::UpstreamMalformed(_))
        ));
    }

    #[test]
    fn url_spans_lookahead_window() {
        let client = NoaaTidesClient::new("8518750".into(), 7);
        let url = client
            .url(NaiveDate::from_ymd_opt(2024, 1, 28).unwrap())
            .unwrap();
        assert!(url.contains("begin_date=20240128&end_date=20240204"));
        assert!(url.contains("station=8518750"));
        assert!(url.contains("interval=hilo"));
    }

    #[tokio::test]
    async fn oversized_lookahead_is_config_error() {
        let client = NoaaTidesClient::new("8518750".into(), u32::MAX);
        let err = client.fetch().await.unwrap_err();
        assert!(matches!(err, FishcastError::Config(_)));
        assert!(err.to_string().contains("lookahead_days"));
    }

    #[tokio::test]
    async fn blank_station_is_configuration_error() {
        let client = NoaaTidesClient::new("  ".into(), 7);
        let err = client.fetch().await.unwrap_err();
        assert!(matches!(err, FishcastError::ConfigurationMissing(_)));
    }
}
