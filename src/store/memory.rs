use crate::store::error::StoreError;
use crate::store::tables::Tables;
use crate::store::StatisticsStore;
use crate::types::station::Station;
use crate::types::statistics::AnnualStatistic;
use parking_lot::RwLock;

/// A store that lives only as long as the process. Useful for tests and short runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StatisticsStore for MemoryStore {
    async fn insert_stations(&self, stations: Vec<Station>) -> Result<usize, StoreError> {
        self.tables.write().insert_stations(stations)
    }

    async fn station_by_name(&self, name: &str) -> Result<Station, StoreError> {
        self.tables.read().station_by_name(name)
    }

    async fn list_stations(&self) -> Result<Vec<Station>, StoreError> {
        self.tables.read().list_stations()
    }

    async fn insert_statistics(
        &self,
        statistics: Vec<AnnualStatistic>,
    ) -> Result<usize, StoreError> {
        self.tables.write().insert_statistics(statistics)
    }

    async fn statistics_for_station(
        &self,
        name: &str,
        years: u32,
    ) -> Result<Vec<AnnualStatistic>, StoreError> {
        self.tables.read().statistics_for_station(name, years)
    }

    async fn statistics_exist(&self, name: &str) -> Result<bool, StoreError> {
        Ok(self.tables.read().statistics_exist(name))
    }
}
