use crate::http::HttpError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("No data file for station {station_id} in the archive index")]
    DataFileNotFound { station_id: String },

    #[error("There is no product file in archive '{archive}'")]
    ProductFileNotFound { archive: String },

    #[error("Failed to tokenize archive index page")]
    IndexMarkup(#[source] quick_xml::Error),

    #[error("Invalid archive URL for '{file_name}'")]
    InvalidUrl {
        file_name: String,
        #[source]
        source: url::ParseError,
    },

    #[error(transparent)]
    Http(#[from] HttpError),

    #[error("Failed to open archive '{archive}'")]
    Zip {
        archive: String,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("Failed to read '{entry}' from archive '{archive}'")]
    EntryRead {
        archive: String,
        entry: String,
        #[source]
        source: std::io::Error,
    },

    // Covers errors joining tokio blocking tasks
    #[error("Background task failed to complete")]
    TaskJoin(#[from] tokio::task::JoinError),
}

impl ArchiveError {
    /// The station simply has no usable source file; another station may.
    pub fn is_missing_source(&self) -> bool {
        matches!(
            self,
            ArchiveError::DataFileNotFound { .. } | ArchiveError::ProductFileNotFound { .. }
        )
    }
}
