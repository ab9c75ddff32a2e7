use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TideType {
    High,
    Low,
}

impl TideType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TideType::High => "high",
            TideType::Low => "low",
        }
    }
}

impl std::fmt::Display for TideType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single high or low tide
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TideEvent {
    /// Clock time, e.g. "3:42 PM"
    pub time: String,
    pub tide_type: TideType,
    pub height_ft: f64,
}

/// All tide events falling on one calendar date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TideDay {
    /// ISO `yyyy-mm-dd`
    pub date: String,
    pub tides: Vec<TideEvent>,
}

/// Groups dated events into one `TideDay` per distinct date.
///
/// Events keep the order they arrive in; dates appear in first-seen order.
pub fn group_by_date<I>(events: I) -> Vec<TideDay>
where
    I: IntoIterator<Item = (NaiveDate, TideEvent)>,
{
    let mut days: Vec<TideDay> = Vec::new();
    for (date, event) in events {
        let key = date.format("%Y-%m-%d").to_string();
        match days.iter_mut().find(|d| d.date == key) {
            Some(day) => day.tides.push(event),
            None => days.push(TideDay {
                date: key,
                tides: vec![event],
            }),
        }
    }
    days
}

/// Exact date-string lookup
pub fn find_day<'a>(days: &'a [TideDay], date: &str) -> Option<&'a TideDay> {
    days.iter().find(|d| d.date == date)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(time: &str, tide_type: TideType, height_ft: f64) -> TideEvent {
        TideEvent {
            time: time.to_string(),
            tide_type,
            height_ft,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn groups_one_day_per_date_preserving_order() {
        let days = group_by_date(vec![
            (date(2024, 1, 2), event("3:00 AM", TideType::High, 4.5)),
            (date(2024, 1, 2), event("9:10 AM", TideType::Low, 0.3)),
            (date(2024, 1, 3), event("3:50 AM", TideType::High, 4.4)),
            (date(2024, 1, 2), event("3:30 PM", TideType::High, 4.1)),
        ]);

        assert_eq!(days.len(), 2);
        assert_eq!(days[0].date, "2024-01-02");
        let times: Vec<&str> = days[0].tides.iter().map(|t| t.time.as_str()).collect();
        assert_eq!(times, vec!["3:00 AM", "9:10 AM", "3:30 PM"]);
        assert_eq!(days[1].date, "2024-01-03");
        assert_eq!(days[1].tides.len(), 1);
    }

    #[test]
    fn find_day_uses_exact_date() {
        let days = group_by_date(vec![(
            date(2024, 1, 2),
            event("3:00 AM", TideType::High, 4.5),
        )]);
        assert!(find_day(&days, "2024-01-02").is_some());
        assert!(find_day(&days, "2024-01-03").is_none());
    }

    #[test]
    fn tide_type_serializes_lowercase() {
        let json = serde_json::to_string(&TideType::High).unwrap();
        assert_eq!(json, "\"high\"");
    }
}
