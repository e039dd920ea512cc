use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("No station named '{0}'")]
    NoSuchStation(String),

    #[error("No stations stored")]
    NoStations,

    #[error("No wind statistics stored for station '{0}'")]
    NoWindData(String),

    #[error("Station '{0}' is already stored")]
    DuplicateStation(String),

    #[error("Statistic for station '{station_name}' and year {year} is already stored")]
    DuplicateStatistic { station_name: String, year: i32 },

    #[error("Only {written} of {expected} rows were written")]
    PartialInsert { expected: usize, written: usize },

    #[error("Failed to read store file '{0}'")]
    Read(PathBuf, #[source] std::io::Error),

    #[error("Failed to write store file '{0}'")]
    Write(PathBuf, #[source] std::io::Error),

    #[error("Failed to decode store data from '{0}'")]
    Decode(PathBuf, #[source] Box<bincode::error::DecodeError>),

    #[error("Failed to encode store data")]
    Encode(#[source] Box<bincode::error::EncodeError>),

    // Covers errors joining tokio blocking tasks
    #[error("Background task failed to complete")]
    TaskJoin(#[from] tokio::task::JoinError),
}

impl StoreError {
    /// The query matched nothing, as opposed to the storage failing.
    pub fn is_no_rows(&self) -> bool {
        matches!(
            self,
            StoreError::NoSuchStation(_) | StoreError::NoStations | StoreError::NoWindData(_)
        )
    }
}
