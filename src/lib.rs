mod archive;
mod config;
mod error;
mod geocode;
mod http;
mod measurements;
mod stations;
mod store;
mod types;
mod utils;
mod windstat;

pub use error::{ErrorKind, WindStatError};
pub use windstat::*;

pub use config::*;
pub use types::request::*;
pub use types::station::*;
pub use types::statistics::*;

pub use measurements::aggregator::aggregate;
pub use measurements::hourly_parser::{parse_hourly, parse_hourly_line, ParseLineError};
pub use stations::directory::{parse_station_directory, parse_station_line};
pub use stations::locate_station::{distance_km, most_recent_known_year, rank_by_distance};

pub use store::file::FileStore;
pub use store::memory::MemoryStore;
pub use store::{StatisticsStore, StoreError};

pub use archive::error::ArchiveError;
pub use geocode::error::GeocodeError;
pub use http::HttpError;
pub use stations::error::{StationDirectoryError, StationLineError};
