use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Latest weather reading plus the multi-day outlook.
///
/// Built once per successful fetch and replaced wholesale on the next one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub fetched_at: DateTime<Utc>,
    pub current: CurrentConditions,
    pub daily: Vec<DailyForecast>,
}

impl WeatherSnapshot {
    /// Lowercased `main` of the first condition label, e.g. "clouds".
    /// Empty when there is no label.
    pub fn primary_condition(&self) -> String {
        self.current
            .primary()
            .map(|label| label.main.to_lowercase())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub temp_f: f64,
    pub feels_like_f: f64,
    pub humidity_percent: f64,
    pub wind_speed_mph: f64,
    /// The upstream parsers reject payloads without a label
    pub conditions: Vec<ConditionLabel>,
}

impl CurrentConditions {
    pub fn primary(&self) -> Option<&ConditionLabel> {
        self.conditions.first()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionLabel {
    pub main: String,
    pub description: String,
    pub icon: String,
}

/// One day of outlook
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecast {
    /// Epoch seconds
    pub dt: i64,
    pub temp_f: f64,
    pub min_temp_f: f64,
    pub max_temp_f: f64,
    pub conditions: Vec<ConditionLabel>,
    /// 0.0-1.0
    pub precipitation_prob: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label(main: &str) -> ConditionLabel {
        ConditionLabel {
            main: main.to_string(),
            description: String::new(),
            icon: String::new(),
        }
    }

    #[test]
    fn primary_condition_is_first_label_lowercased() {
        let snapshot = WeatherSnapshot {
            fetched_at: Utc::now(),
            current: CurrentConditions {
                temp_f: 60.0,
                feels_like_f: 58.0,
                humidity_percent: 70.0,
                wind_speed_mph: 4.0,
                conditions: vec![label("Clouds"), label("Rain")],
            },
            daily: Vec::new(),
        };
        assert_eq!(snapshot.primary_condition(), "clouds");
    }

    #[test]
    fn primary_condition_without_labels_is_empty() {
        let current = CurrentConditions {
            temp_f: 60.0,
            feels_like_f: 58.0,
            humidity_percent: 70.0,
            wind_speed_mph: 4.0,
            conditions: Vec::new(),
        };
        assert!(current.primary().is_none());

        let snapshot = WeatherSnapshot {
            fetched_at: Utc::now(),
            current,
            daily: Vec::new(),
        };
        assert_eq!(snapshot.primary_condition(), "");
    }
}
