use super::moon::{self, MoonPhase};
use crate::models::{
    find_day, ConditionFactors, FishingConditions, FishingRating, TideDay, WeatherSnapshot,
};
use chrono::{Local, NaiveDate};

const NO_DATA: &str = "No data";
const NO_TIDE_DATA: &str = "No tide data";

/// Fishing rating for today's local date
pub fn derive(weather: Option<&WeatherSnapshot>, tides: &[TideDay]) -> FishingConditions {
    derive_on(Local::now().date_naive(), weather, tides)
}

/// Fishing rating for a fixed date.
///
/// Scoring:
/// - Moon: new or full +25, first or last quarter +10
/// - Temperature: 50-75°F +20, 40-85°F +10
/// - Wind: under 5 mph +15, under 15 mph +10, otherwise -10
/// - Sky: clouds +15, rain +10, clear +5
/// - Barometer (estimated from sky): clouds +15, clear +10
/// - Tides: any tide change today +15
///
/// The total maps to a rating at 70 / 50 / 30.
pub fn derive_on(
    today: NaiveDate,
    weather: Option<&WeatherSnapshot>,
    tides: &[TideDay],
) -> FishingConditions {
    let mut score = 0;
    let mut factors = ConditionFactors::default();

    let phase = moon::estimate(today);
    score += moon_score(phase);
    factors.moon = phase.to_string();

    match weather {
        Some(snapshot) => {
            let (weather_score, weather_text) = weather_score(snapshot);
            score += weather_score;
            factors.weather = weather_text;

            let (barometer_score, barometer_text) =
                barometer_estimate(&snapshot.primary_condition());
            score += barometer_score;
            factors.barometer = barometer_text.to_string();
        }
        None => {
            factors.weather = NO_DATA.to_string();
            factors.barometer = NO_DATA.to_string();
        }
    }

    let today_key = today.format("%Y-%m-%d").to_string();
    match find_day(tides, &today_key).filter(|day| !day.tides.is_empty()) {
        Some(day) => {
            score += 15;
            factors.tides = format!("{} tide changes today", day.tides.len());
        }
        None => factors.tides = NO_TIDE_DATA.to_string(),
    }

    tracing::trace!(score, %phase, "fishing score computed");

    FishingConditions {
        rating: FishingRating::from_score(score),
        moon_phase: phase,
        factors,
    }
}

fn moon_score(phase: MoonPhase) -> i32 {
    match phase {
        MoonPhase::NewMoon | MoonPhase::FullMoon => 25,
        p if p.is_quarter() => 10,
        _ => 0,
    }
}

fn weather_score(snapshot: &WeatherSnapshot) -> (i32, String) {
    let temp = snapshot.current.temp_f;
    let wind = snapshot.current.wind_speed_mph;
    let mut score = 0;

    let mut text = if (50.0..=75.0).contains(&temp) {
        score += 20;
        "Ideal temperature".to_string()
    } else if (40.0..=85.0).contains(&temp) {
        score += 10;
        "Good temperature".to_string()
    } else {
        "Poor temperature".to_string()
    };

    if wind < 5.0 {
        score += 15;
    } else if wind < 15.0 {
        score += 10;
    } else {
        score -= 10;
        text.push_str(", windy");
    }

    score += match snapshot.primary_condition().as_str() {
        "clouds" => 15,
        "rain" => 10,
        "clear" => 5,
        _ => 0,
    };

    (score, text)
}

/// There is no pressure sensor; overcast skies stand in for a falling barometer.
fn barometer_estimate(primary_condition: &str) -> (i32, &'static str) {
    match primary_condition {
        "clear" => (10, "High and stable"),
        "clouds" => (15, "Falling (good!)"),
        _ => (0, "Low"),
    }
}
