use crate::archive::error::ArchiveError;
use crate::geocode::error::GeocodeError;
use crate::http::HttpError;
use crate::stations::error::StationDirectoryError;
use crate::store::StoreError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WindStatError {
    #[error("{0}")]
    InvalidRequest(String),

    #[error("city not found, please, check city name")]
    CityNotFound { city: String },

    #[error("unfortunately, there is no statistics available for the nearest weather station for this period")]
    NoStatisticsInPeriod { city: String, years: u32 },

    #[error(transparent)]
    Geocode(GeocodeError),

    #[error(transparent)]
    Stations(#[from] StationDirectoryError),

    #[error(transparent)]
    Archive(#[from] ArchiveError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Http(#[from] HttpError),

    #[error("Failed to create cache directory '{0}'")]
    CacheDirCreation(PathBuf, #[source] std::io::Error),

    #[error("Failed to determine cache directory")]
    CacheDirResolution(#[source] std::io::Error),

    // Covers errors joining tokio blocking tasks
    #[error("Background task failed to complete")]
    TaskJoin(#[from] tokio::task::JoinError),
}

impl From<GeocodeError> for WindStatError {
    fn from(err: GeocodeError) -> Self {
        match err {
            GeocodeError::NotFound(city) => WindStatError::CityNotFound { city },
            GeocodeError::EmptyQuery => WindStatError::InvalidRequest(
                "city parameter not provided in query".to_string(),
            ),
            other => WindStatError::Geocode(other),
        }
    }
}

/// How a failure should be reported to whoever made the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request itself is malformed.
    Validation,
    /// The city or its statistics do not exist.
    NotFound,
    /// A collaborator (network, archive, store, runtime) failed.
    Upstream,
}

impl ErrorKind {
    pub fn status_code(self) -> u16 {
        match self {
            ErrorKind::Validation => 400,
            ErrorKind::NotFound => 404,
            ErrorKind::Upstream => 500,
        }
    }
}

impl WindStatError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            WindStatError::InvalidRequest(_) => ErrorKind::Validation,
            WindStatError::CityNotFound { .. } | WindStatError::NoStatisticsInPeriod { .. } => {
                ErrorKind::NotFound
            }
            _ => ErrorKind::Upstream,
        }
    }

    /// The station has no source file to build statistics from; the next candidate
    /// station should be tried.
    pub fn is_missing_source(&self) -> bool {
        matches!(self, WindStatError::Archive(e) if e.is_missing_source())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn geocoder_misses_become_not_found() {
        let err = WindStatError::from(GeocodeError::NotFound("Atlantis".to_string()));
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.to_string(), "city not found, please, check city name");

        let err = WindStatError::from(GeocodeError::EmptyQuery);
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn not_found_messages_are_distinct() {
        let city = WindStatError::CityNotFound {
            city: "x".to_string(),
        };
        let period = WindStatError::NoStatisticsInPeriod {
            city: "x".to_string(),
            years: 3,
        };
        assert_eq!(city.kind(), period.kind());
        assert_ne!(city.to_string(), period.to_string());
    }

    #[test]
    fn only_missing_archives_are_missing_sources() {
        let missing = WindStatError::from(ArchiveError::DataFileNotFound {
            station_id: "00003".to_string(),
        });
        assert!(missing.is_missing_source());
        assert_eq!(missing.kind(), ErrorKind::Upstream);

        let store = WindStatError::from(StoreError::NoStations);
        assert!(!store.is_missing_source());
        assert_eq!(ErrorKind::Upstream.status_code(), 500);
    }
}
