use std::str::FromStr;

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Symbolic reporting window, resolved against "now" to a concrete start.
/// The window is `[start, now)`, inclusive of the start boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Day,
    Week,
    Fortnight,
    Month,
}

impl Period {
    /// Start timestamp for a window ending at `now`.
    pub fn start_from(&self, now: NaiveDateTime) -> NaiveDateTime {
        match self {
            Period::Day => now.date().and_hms_opt(0, 0, 0).unwrap_or(now),
            Period::Week => now - Duration::days(7),
            Period::Fortnight => now - Duration::days(15),
            Period::Month => now - Duration::days(30),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Day => "day",
            Period::Week => "week",
            Period::Fortnight => "fortnight",
            Period::Month => "month",
        }
    }
}

impl Default for Period {
    fn default() -> Self {
        Period::Month
    }
}

impl FromStr for Period {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "day" => Ok(Period::Day),
            "week" => Ok(Period::Week),
            "fortnight" => Ok(Period::Fortnight),
            "month" => Ok(Period::Month),
            _ => Err(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap()
    }

    #[test]
    fn day_starts_at_midnight() {
        let now = at(2026, 3, 10, 14, 30, 5);
        assert_eq!(Period::Day.start_from(now), at(2026, 3, 10, 0, 0, 0));
    }

    #[test]
    fn week_is_seven_days_back() {
        let now = at(2026, 3, 10, 14, 0, 0);
        assert_eq!(Period::Week.start_from(now), at(2026, 3, 3, 14, 0, 0));
    }

    #[test]
    fn fortnight_is_fifteen_days_back() {
        let now = at(2026, 3, 20, 8, 0, 0);
        assert_eq!(Period::Fortnight.start_from(now), at(2026, 3, 5, 8, 0, 0));
    }

    #[test]
    fn month_is_thirty_days_back() {
        let now = at(2026, 3, 31, 0, 0, 0);
        assert_eq!(Period::Month.start_from(now), at(2026, 3, 1, 0, 0, 0));
    }

    #[test]
    fn parses_known_periods_and_rejects_unknown() {
        assert_eq!("week".parse::<Period>().unwrap(), Period::Week);
        assert_eq!("fortnight".parse::<Period>().unwrap(), Period::Fortnight);
        assert!("quarter".parse::<Period>().is_err());
    }

    #[test]
    fn default_is_month() {
        assert_eq!(Period::default(), Period::Month);
    }
}
