//! Hourly measurements as read from a product file, and the per-year averages
//! derived from them.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// Speed value the DWD uses for "not measured".
pub const MISSING_SPEED: f64 = -999.0;

/// One hourly wind speed measurement.
///
/// The timestamp marks the *end* of the measured hour, which is why `hour` may be 24.
/// A negative `speed` means the value is unknown.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HourlySample {
    pub date: NaiveDate,
    pub hour: u8,
    /// Mean wind speed in m/s.
    pub speed: f64,
}

impl HourlySample {
    pub fn new(date: NaiveDate, hour: u8, speed: f64) -> Self {
        Self { date, hour, speed }
    }

    /// Calendar year of the sample's own timestamp.
    pub fn year(&self) -> i32 {
        self.date.year()
    }

    pub fn is_missing(&self) -> bool {
        self.speed < 0.0
    }

    pub fn end_of_hour(&self) -> NaiveDateTime {
        self.date.and_time(NaiveTime::MIN) + Duration::hours(i64::from(self.hour))
    }
}

/// Average wind speed for one station over one calendar year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnualStatistic {
    pub station_name: String,
    pub year: i32,
    /// Arithmetic mean of all known hourly speeds of the year, in m/s.
    pub speed: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hour_24_rolls_into_next_day() {
        let date = NaiveDate::from_ymd_opt(2010, 12, 31).unwrap();
        let sample = HourlySample::new(date, 24, 3.1);
        assert_eq!(sample.year(), 2010);
        assert_eq!(
            sample.end_of_hour(),
            NaiveDate::from_ymd_opt(2011, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
        );
    }

    #[test]
    fn negative_speeds_are_missing() {
        let date = NaiveDate::from_ymd_opt(2010, 1, 1).unwrap();
        assert!(HourlySample::new(date, 1, MISSING_SPEED).is_missing());
        assert!(HourlySample::new(date, 1, -0.1).is_missing());
        assert!(!HourlySample::new(date, 1, 0.0).is_missing());
    }
}
