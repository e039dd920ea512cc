//! Defines the data structures representing DWD weather stations as listed in the
//! station directory file, together with the geographic point type used throughout
//! the crate.

use serde::{Deserialize, Serialize};

/// Represents a geographical coordinate using latitude and longitude.
///
/// Latitude is the first element (index 0), and longitude is the second (index 1).
///
/// # Examples
///
/// ```
/// use windstat::LatLon;
///
/// let aachen = LatLon(50.7827, 6.0941);
/// assert_eq!(aachen.0, 50.7827); // Latitude
/// assert_eq!(aachen.1, 6.0941); // Longitude
/// assert!(aachen.is_valid());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLon(pub f64, pub f64);

impl LatLon {
    pub fn latitude(&self) -> f64 {
        self.0
    }

    pub fn longitude(&self) -> f64 {
        self.1
    }

    /// Both components are finite and inside the geographic range.
    pub fn is_valid(&self) -> bool {
        self.0.is_finite()
            && self.1.is_finite()
            && (-90.0..=90.0).contains(&self.0)
            && (-180.0..=180.0).contains(&self.1)
    }

    /// The geocoder answers `(0, 0)` when it has nothing better.
    pub fn is_null_island(&self) -> bool {
        self.0 == 0.0 && self.1 == 0.0
    }
}

/// Represents a single weather station from the DWD hourly wind station directory.
///
/// Stations are created from the directory file on first use and are never changed
/// or removed afterwards. The `name` is unique within a store.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Station {
    /// The DWD station identifier, zero padded (e.g. "00003").
    pub id: String,
    /// Display name. Multi-word names are joined with single spaces.
    pub name: String,
    /// The federal state the station belongs to (last directory column).
    pub region: String,
    /// Geographical position of the station.
    pub location: LatLon,
    /// Height above sea level in metres.
    pub elevation: i32,
    /// Year of the first measurement listed for the station.
    pub first_year: i32,
    /// Year of the last measurement listed for the station. Used as a coverage proxy.
    pub last_measured_year: i32,
}

impl Station {
    /// Whether this station may hold data within the last `years` years before
    /// `most_recent_year`.
    pub fn covers(&self, most_recent_year: i32, years: u32) -> bool {
        let years = i32::try_from(years).unwrap_or(i32::MAX);
        self.last_measured_year > most_recent_year.saturating_sub(years)
    }
}
