use crate::store::error::StoreError;
use crate::types::station::Station;
use crate::types::statistics::AnnualStatistic;
use std::collections::HashSet;

/// The rows shared by every store implementation.
///
/// Inserts validate the whole batch before touching any row, so a rejected batch
/// leaves the tables unchanged.
#[derive(Debug, Clone, Default)]
pub(crate) struct Tables {
    pub(crate) stations: Vec<Station>,
    pub(crate) statistics: Vec<AnnualStatistic>,
}

impl Tables {
    pub(crate) fn insert_stations(&mut self, batch: Vec<Station>) -> Result<usize, StoreError> {
        let mut names: HashSet<&str> = self.stations.iter().map(|s| s.name.as_str()).collect();
        for station in &batch {
            if !names.insert(station.name.as_str()) {
                return Err(StoreError::DuplicateStation(station.name.clone()));
            }
        }
        let written = batch.len();
        self.stations.extend(batch);
        Ok(written)
    }

    pub(crate) fn station_by_name(&self, name: &str) -> Result<Station, StoreError> {
        self.stations
            .iter()
            .find(|s| s.name == name)
            .cloned()
            .ok_or_else(|| StoreError::NoSuchStation(name.to_string()))
    }

    pub(crate) fn list_stations(&self) -> Result<Vec<Station>, StoreError> {
        if self.stations.is_empty() {
            return Err(StoreError::NoStations);
        }
        Ok(self.stations.clone())
    }

    pub(crate) fn insert_statistics(
        &mut self,
        batch: Vec<AnnualStatistic>,
    ) -> Result<usize, StoreError> {
        let mut keys: HashSet<(&str, i32)> = self
            .statistics
            .iter()
            .map(|s| (s.station_name.as_str(), s.year))
            .collect();
        for statistic in &batch {
            if !keys.insert((statistic.station_name.as_str(), statistic.year)) {
                return Err(StoreError::DuplicateStatistic {
                    station_name: statistic.station_name.clone(),
                    year: statistic.year,
                });
            }
        }
        let written = batch.len();
        self.statistics.extend(batch);
        Ok(written)
    }

    /// Latest `years` records of the station, newest first.
    pub(crate) fn statistics_for_station(
        &self,
        name: &str,
        years: u32,
    ) -> Result<Vec<AnnualStatistic>, StoreError> {
        let mut rows: Vec<AnnualStatistic> = self
            .statistics
            .iter()
            .filter(|s| s.station_name == name)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.year.cmp(&a.year));
        rows.truncate(years as usize);
        if rows.is_empty() {
            return Err(StoreError::NoWindData(name.to_string()));
        }
        Ok(rows)
    }

    pub(crate) fn statistics_exist(&self, name: &str) -> bool {
        self.statistics.iter().any(|s| s.station_name == name)
    }
}
