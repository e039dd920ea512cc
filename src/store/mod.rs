//! Persistence of stations and annual statistics.
//!
//! Once populated the store is the source of truth: statistics are computed once per
//! station and never updated.

pub mod error;
pub mod file;
pub mod memory;
mod tables;

pub use error::StoreError;

use crate::types::station::Station;
use crate::types::statistics::AnnualStatistic;
use std::future::Future;

/// Storage for stations and their annual statistics.
///
/// Queries that match nothing fail with one of the "no rows" errors
/// ([`StoreError::is_no_rows`]), which callers can tell apart from storage failures.
///
/// # Examples
///
/// ```
/// use windstat::{AnnualStatistic, MemoryStore, StatisticsStore};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), windstat::StoreError> {
/// let store = MemoryStore::new();
/// let written = store
///     .insert_statistics(vec![AnnualStatistic {
///         station_name: "Aachen".to_string(),
///         year: 2023,
///         speed: 3.4,
///     }])
///     .await?;
/// assert_eq!(written, 1);
/// assert!(store.statistics_exist("Aachen").await?);
///
/// let latest = store.statistics_for_station("Aachen", 5).await?;
/// assert_eq!(latest[0].year, 2023);
/// # Ok(())
/// # }
/// ```
pub trait StatisticsStore: Send + Sync + 'static {
    /// Stores the whole batch, or nothing if a station name is already taken.
    fn insert_stations(
        &self,
        stations: Vec<Station>,
    ) -> impl Future<Output = Result<usize, StoreError>> + Send;

    fn station_by_name(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<Station, StoreError>> + Send;

    /// All stations in insertion order. Fails with [`StoreError::NoStations`] when empty.
    fn list_stations(&self) -> impl Future<Output = Result<Vec<Station>, StoreError>> + Send;

    /// Stores the whole batch and returns the number of rows written, or stores nothing
    /// if a (station, year) pair already exists.
    fn insert_statistics(
        &self,
        statistics: Vec<AnnualStatistic>,
    ) -> impl Future<Output = Result<usize, StoreError>> + Send;

    /// The latest `years` records of a station, sorted by year descending.
    fn statistics_for_station(
        &self,
        name: &str,
        years: u32,
    ) -> impl Future<Output = Result<Vec<AnnualStatistic>, StoreError>> + Send;

    /// Whether any statistic is stored for the station.
    fn statistics_exist(&self, name: &str) -> impl Future<Output = Result<bool, StoreError>> + Send;
}
