use std::fmt;

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

/// 放送クール（季節）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Fall,
}

impl Season {
    /// 月（1〜12）からクールを求める。1〜3月が冬、以降3か月ごと。
    #[must_use]
    pub fn from_month(month: u32) -> Self {
        match month {
            4..=6 => Season::Spring,
            7..=9 => Season::Summer,
            10..=12 => Season::Fall,
            _ => Season::Winter,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Season::Winter => "winter",
            Season::Spring => "spring",
            Season::Summer => "summer",
            Season::Fall => "fall",
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 指定時刻の暦年とクール。
#[must_use]
pub fn season_of(now: DateTime<Utc>) -> (i32, Season) {
    (now.year(), Season::from_month(now.month()))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(1, Season::Winter)]
    #[case(3, Season::Winter)]
    #[case(4, Season::Spring)]
    #[case(6, Season::Spring)]
    #[case(7, Season::Summer)]
    #[case(9, Season::Summer)]
    #[case(10, Season::Fall)]
    #[case(12, Season::Fall)]
    fn month_maps_to_season(#[case] month: u32, #[case] expected: Season) {
        assert_eq!(Season::from_month(month), expected);
    }

    #[test]
    fn season_of_uses_calendar_year() {
        let now = Utc
            .with_ymd_and_hms(2026, 10, 19, 12, 0, 0)
            .single()
            .expect("valid timestamp");
        assert_eq!(season_of(now), (2026, Season::Fall));
    }
}
