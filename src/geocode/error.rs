use crate::http::HttpError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("City name must not be empty")]
    EmptyQuery,

    #[error("No coordinates found for '{0}'")]
    NotFound(String),

    #[error(transparent)]
    Http(#[from] HttpError),

    #[error("Failed to parse geocoder response")]
    JsonParse(#[from] serde_json::Error),
}
