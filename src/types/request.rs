//! Request validation and the JSON shapes returned to callers.

use crate::error::{ErrorKind, WindStatError};
use crate::types::statistics::AnnualStatistic;
use serde::{Deserialize, Serialize};

/// A validated request for annual wind statistics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindRequest {
    pub city: String,
    /// Number of most recent years to return. Always at least 1.
    pub years: u32,
}

impl WindRequest {
    /// Builds a request from already typed values.
    ///
    /// # Errors
    ///
    /// Returns [`WindStatError::InvalidRequest`] for an empty city or `years == 0`.
    pub fn new(city: impl Into<String>, years: u32) -> Result<Self, WindStatError> {
        let city = city.into();
        let city = city.trim();
        if city.is_empty() {
            return Err(WindStatError::InvalidRequest(
                "city parameter not provided in query".to_string(),
            ));
        }
        if years < 1 {
            return Err(WindStatError::InvalidRequest(
                "years should be more than 0".to_string(),
            ));
        }
        Ok(Self {
            city: city.to_string(),
            years,
        })
    }

    /// Builds a request from raw query parameters, as received by an endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`WindStatError::InvalidRequest`] when a parameter is missing, empty
    /// or `years` is not a positive integer.
    pub fn from_params(city: Option<&str>, years: Option<&str>) -> Result<Self, WindStatError> {
        let city = city.unwrap_or_default();
        if city.trim().is_empty() {
            return Err(WindStatError::InvalidRequest(
                "city parameter not provided in query".to_string(),
            ));
        }

        let years = match years.map(str::trim) {
            None | Some("") => {
                return Err(WindStatError::InvalidRequest(
                    "years parameter not provided in query".to_string(),
                ))
            }
            Some(raw) => raw.parse::<i64>().map_err(|_| {
                WindStatError::InvalidRequest("invalid years parameter".to_string())
            })?,
        };
        if years < 1 {
            return Err(WindStatError::InvalidRequest(
                "years should be more than 0".to_string(),
            ));
        }
        let years = u32::try_from(years)
            .map_err(|_| WindStatError::InvalidRequest("invalid years parameter".to_string()))?;

        Self::new(city, years)
    }
}

/// One element of a successful response: `{"Year": 2020, "Speed": 3.4}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct YearSpeed {
    pub year: i32,
    pub speed: f64,
}

impl From<&AnnualStatistic> for YearSpeed {
    fn from(stat: &AnnualStatistic) -> Self {
        Self {
            year: stat.year,
            speed: stat.speed,
        }
    }
}

/// Error response body: `{"Code": 404, "Message": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ErrorBody {
    pub code: u16,
    pub message: String,
}

impl ErrorBody {
    const INTERNAL_MESSAGE: &'static str = "internal error while collecting wind statistics";

    /// Maps an error onto a status code and a message safe to show to the caller.
    /// Upstream failures get a generic message; their cause is left to the logs.
    pub fn from_error(err: &WindStatError) -> Self {
        let kind = err.kind();
        let message = match kind {
            ErrorKind::Validation | ErrorKind::NotFound => err.to_string(),
            ErrorKind::Upstream => Self::INTERNAL_MESSAGE.to_string(),
        };
        Self {
            code: kind.status_code(),
            message,
        }
    }
}
