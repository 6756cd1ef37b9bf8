use std::str::FromStr;

use chrono::{Datelike, Duration, Months, NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::error::ValidationError;

/// Named display range, selected by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Timeframe {
    #[serde(rename = "1D")]
    OneDay,
    #[serde(rename = "1W")]
    OneWeek,
    #[serde(rename = "1M")]
    OneMonth,
    #[serde(rename = "3M")]
    ThreeMonths,
    #[serde(rename = "YTD")]
    YearToDate,
    #[serde(rename = "1Y")]
    OneYear,
    #[serde(rename = "ALL")]
    All,
}

impl Timeframe {
    /// All timeframes, in the order the selector shows them.
    pub fn all() -> &'static [Timeframe] {
        &[
            Timeframe::OneDay,
            Timeframe::OneWeek,
            Timeframe::OneMonth,
            Timeframe::ThreeMonths,
            Timeframe::YearToDate,
            Timeframe::OneYear,
            Timeframe::All,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::OneDay => "1D",
            Timeframe::OneWeek => "1W",
            Timeframe::OneMonth => "1M",
            Timeframe::ThreeMonths => "3M",
            Timeframe::YearToDate => "YTD",
            Timeframe::OneYear => "1Y",
            Timeframe::All => "ALL",
        }
    }

    /// Caption shown under the portfolio value.
    pub fn caption(&self) -> &'static str {
        match self {
            Timeframe::OneDay => "Today",
            Timeframe::OneWeek => "Past Week",
            Timeframe::OneMonth => "Past Month",
            Timeframe::ThreeMonths => "Past 3 Months",
            Timeframe::YearToDate => "YTD",
            Timeframe::OneYear => "Past Year",
            Timeframe::All => "Historical Data",
        }
    }

    /// strftime pattern for the x-axis label of a point in this window.
    pub fn label_format(&self) -> &'static str {
        match self {
            Timeframe::OneDay => "%H:%M",
            Timeframe::OneWeek | Timeframe::OneMonth => "%b %-d %H:%M",
            _ => "%b %-d, %Y",
        }
    }

    /// First instant inside the window ending at `now`.
    ///
    /// Month arithmetic clamps to the end of shorter months, so the month
    /// before March 31 starts on the last day of February.
    pub fn start(&self, now: NaiveDateTime, display_start: NaiveDateTime) -> NaiveDateTime {
        let months_back = |months: u32| {
            now.checked_sub_months(Months::new(months))
                .unwrap_or(NaiveDateTime::MIN)
        };

        match self {
            Timeframe::OneDay => now - Duration::days(1),
            Timeframe::OneWeek => now - Duration::days(7),
            Timeframe::OneMonth => months_back(1),
            Timeframe::ThreeMonths => months_back(3),
            Timeframe::YearToDate => NaiveDate::from_ymd_opt(now.year(), 1, 1)
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .unwrap_or(NaiveDateTime::MIN),
            Timeframe::OneYear => months_back(12),
            Timeframe::All => display_start,
        }
    }

    pub fn next(&self) -> Timeframe {
        let all = Timeframe::all();
        let i = all.iter().position(|t| t == self).unwrap_or(0);
        all[(i + 1) % all.len()]
    }

    pub fn previous(&self) -> Timeframe {
        let all = Timeframe::all();
        let i = all.iter().position(|t| t == self).unwrap_or(0);
        all[(i + all.len() - 1) % all.len()]
    }
}

impl FromStr for Timeframe {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_uppercase();
        Timeframe::all()
            .iter()
            .copied()
            .find(|t| t.as_str() == wanted)
            .ok_or_else(|| ValidationError::UnknownTimeframe(s.to_string()))
    }
}

impl std::fmt::Display for Timeframe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_window_starts() {
        let now = at(2025, 4, 2, 0);
        let floor = at(2023, 6, 1, 0);

        assert_eq!(Timeframe::OneDay.start(now, floor), at(2025, 4, 1, 0));
        assert_eq!(Timeframe::OneWeek.start(now, floor), at(2025, 3, 26, 0));
        assert_eq!(Timeframe::OneMonth.start(now, floor), at(2025, 3, 2, 0));
        assert_eq!(Timeframe::ThreeMonths.start(now, floor), at(2025, 1, 2, 0));
        assert_eq!(Timeframe::YearToDate.start(now, floor), at(2025, 1, 1, 0));
        assert_eq!(Timeframe::OneYear.start(now, floor), at(2024, 4, 2, 0));
        assert_eq!(Timeframe::All.start(now, floor), floor);
    }

    #[test]
    fn test_month_end_clamps() {
        let now = at(2025, 3, 31, 12);
        assert_eq!(
            Timeframe::OneMonth.start(now, now),
            at(2025, 2, 28, 12)
        );
    }

    #[test]
    fn test_from_str_roundtrips_labels() {
        for tf in Timeframe::all() {
            assert_eq!(tf.as_str().parse::<Timeframe>().unwrap(), *tf);
        }
        assert_eq!("ytd".parse::<Timeframe>().unwrap(), Timeframe::YearToDate);
        assert!(matches!(
            "2W".parse::<Timeframe>(),
            Err(ValidationError::UnknownTimeframe(_))
        ));
    }

    #[test]
    fn test_next_previous_cycle() {
        assert_eq!(Timeframe::All.next(), Timeframe::OneDay);
        assert_eq!(Timeframe::OneDay.previous(), Timeframe::All);
        assert_eq!(Timeframe::OneWeek.next(), Timeframe::OneMonth);
    }
}
