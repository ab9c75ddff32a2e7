use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Reference new moon, 2000-01-06 (Julian day)
const REFERENCE_NEW_MOON_JD: f64 = 2_451_550.1;
/// Mean synodic month in days
const SYNODIC_MONTH: f64 = 29.530_588_67;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoonPhase {
    NewMoon,
    WaxingCrescent,
    FirstQuarter,
    WaxingGibbous,
    FullMoon,
    WaningGibbous,
    LastQuarter,
    WaningCrescent,
}

impl MoonPhase {
    /// Buckets a cycle fraction in [0, 1) into one of eight 1/8-wide phases.
    /// New Moon straddles the wrap-around.
    pub fn from_fraction(phase: f64) -> Self {
        if !(0.0625..0.9375).contains(&phase) {
            MoonPhase::NewMoon
        } else if phase < 0.1875 {
            MoonPhase::WaxingCrescent
        } else if phase < 0.3125 {
            MoonPhase::FirstQuarter
        } else if phase < 0.4375 {
            MoonPhase::WaxingGibbous
        } else if phase < 0.5625 {
            MoonPhase::FullMoon
        } else if phase < 0.6875 {
            MoonPhase::WaningGibbous
        } else if phase < 0.8125 {
            MoonPhase::LastQuarter
        } else {
            MoonPhase::WaningCrescent
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MoonPhase::NewMoon => "New Moon",
            MoonPhase::WaxingCrescent => "Waxing Crescent",
            MoonPhase::FirstQuarter => "First Quarter",
            MoonPhase::WaxingGibbous => "Waxing Gibbous",
            MoonPhase::FullMoon => "Full Moon",
            MoonPhase::WaningGibbous => "Waning Gibbous",
            MoonPhase::LastQuarter => "Last Quarter",
            MoonPhase::WaningCrescent => "Waning Crescent",
        }
    }

    pub fn is_quarter(&self) -> bool {
        matches!(self, MoonPhase::FirstQuarter | MoonPhase::LastQuarter)
    }
}

impl std::fmt::Display for MoonPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Approximate civil-to-Julian day number with the simplified century term.
fn approximate_julian_day(date: NaiveDate) -> f64 {
    let year = date.year();
    let month = date.month() as i32;
    let day = date.day() as i32;

    let century = (year - 2000).div_euclid(100);
    let e = (century * 3 + 3) as f64;

    let days =
        367 * year - (7 * (year + (month + 9) / 12)).div_euclid(4) + (275 * month) / 9 + day;
    days as f64 + 1_721_028.5 - e
}

/// Position in the synodic cycle, 0.0 = new, 0.5 = full.
pub fn phase_fraction(date: NaiveDate) -> f64 {
    let days_since_new =
        (approximate_julian_day(date) - REFERENCE_NEW_MOON_JD).rem_euclid(SYNODIC_MONTH);
    // rem_euclid can round up to the modulus itself for tiny negative inputs
    (days_since_new / SYNODIC_MONTH) % 1.0
}

/// Coarse moon phase for a calendar date; good to roughly a day.
pub fn estimate(date: NaiveDate) -> MoonPhase {
    MoonPhase::from_fraction(phase_fraction(date))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn bucket_boundaries() {
        assert_eq!(MoonPhase::from_fraction(0.0), MoonPhase::NewMoon);
        assert_eq!(MoonPhase::from_fraction(0.0624), MoonPhase::NewMoon);
        assert_eq!(MoonPhase::from_fraction(0.0625), MoonPhase::WaxingCrescent);
        assert_eq!(MoonPhase::from_fraction(0.1875), MoonPhase::FirstQuarter);
        assert_eq!(MoonPhase::from_fraction(0.3125), MoonPhase::WaxingGibbous);
        assert_eq!(MoonPhase::from_fraction(0.4375), MoonPhase::FullMoon);
        assert_eq!(MoonPhase::from_fraction(0.5625), MoonPhase::WaningGibbous);
        assert_eq!(MoonPhase::from_fraction(0.6875), MoonPhase::LastQuarter);
        assert_eq!(MoonPhase::from_fraction(0.8125), MoonPhase::WaningCrescent);
        assert_eq!(MoonPhase::from_fraction(0.9374), MoonPhase::WaningCrescent);
        assert_eq!(MoonPhase::from_fraction(0.9375), MoonPhase::NewMoon);
    }

    #[test]
    fn known_dates() {
        assert_eq!(estimate(date(2024, 1, 2)), MoonPhase::WaxingCrescent);
        assert_eq!(estimate(date(2024, 1, 8)), MoonPhase::FirstQuarter);
        assert_eq!(estimate(date(2024, 1, 12)), MoonPhase::WaxingGibbous);
        assert_eq!(estimate(date(2024, 1, 14)), MoonPhase::FullMoon);
        assert_eq!(estimate(date(2024, 1, 18)), MoonPhase::WaningGibbous);
        assert_eq!(estimate(date(2024, 1, 22)), MoonPhase::LastQuarter);
        assert_eq!(estimate(date(2024, 1, 25)), MoonPhase::WaningCrescent);
        assert_eq!(estimate(date(2024, 1, 29)), MoonPhase::NewMoon);
    }

    #[test]
    fn fraction_stays_in_unit_interval() {
        let mut d = date(1850, 1, 1);
        let end = date(2150, 1, 1);
        while d < end {
            let f = phase_fraction(d);
            assert!((0.0..1.0).contains(&f), "{} gave {}", d, f);
            d += chrono::Duration::days(37);
        }
    }

    #[test]
    fn deterministic() {
        let d = date(2031, 7, 19);
        assert_eq!(estimate(d), estimate(d));
        assert_eq!(phase_fraction(d), phase_fraction(d));
    }

    #[test]
    fn names() {
        assert_eq!(MoonPhase::FullMoon.to_string(), "Full Moon");
        assert!(MoonPhase::LastQuarter.is_quarter());
        assert!(!MoonPhase::WaxingGibbous.is_quarter());
    }
}
