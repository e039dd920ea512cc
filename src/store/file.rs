use crate::store::error::StoreError;
use crate::store::tables::Tables;
use crate::store::StatisticsStore;
use crate::types::station::Station;
use crate::types::statistics::AnnualStatistic;
use bincode::config::{Configuration, Fixint, LittleEndian};
use log::{debug, info};
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};

const STATIONS_FILE_NAME: &str = "stations.bin";
const STATISTICS_FILE_NAME: &str = "statistics.bin";
const BINCODE_CONFIG: Configuration<LittleEndian, Fixint> =
    bincode::config::standard().with_fixed_int_encoding();

/// A store kept as bincode snapshot files in a directory.
///
/// Both tables are loaded into memory on [`FileStore::open`]. Every insert rewrites the
/// affected snapshot before the in-memory tables change, so a failed write leaves the
/// store as it was. Writes from one process are serialized; separate processes sharing
/// a directory are not coordinated.
#[derive(Debug)]
pub struct FileStore {
    dir: PathBuf,
    tables: RwLock<Tables>,
    writer: tokio::sync::Mutex<()>,
}

impl FileStore {
    /// Opens the store in `dir`, creating the directory when needed.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| StoreError::Write(dir.clone(), e))?;

        let stations: Vec<Station> = load_snapshot(dir.join(STATIONS_FILE_NAME)).await?;
        let statistics: Vec<AnnualStatistic> =
            load_snapshot(dir.join(STATISTICS_FILE_NAME)).await?;
        info!(
            "Opened store at {} ({} stations, {} statistics)",
            dir.display(),
            stations.len(),
            statistics.len()
        );

        Ok(Self {
            dir,
            tables: RwLock::new(Tables {
                stations,
                statistics,
            }),
            writer: tokio::sync::Mutex::new(()),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

async fn load_snapshot<T>(path: PathBuf) -> Result<Vec<T>, StoreError>
where
    T: DeserializeOwned + Send + 'static,
{
    let exists = tokio::fs::try_exists(&path)
        .await
        .map_err(|e| StoreError::Read(path.clone(), e))?;
    if !exists {
        return Ok(vec![]);
    }
    tokio::task::spawn_blocking(move || read_snapshot(&path)).await?
}

fn read_snapshot<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, StoreError> {
    let bytes = std::fs::read(path).map_err(|e| StoreError::Read(path.to_path_buf(), e))?;
    let (rows, _) = bincode::serde::decode_from_slice::<Vec<T>, _>(&bytes, BINCODE_CONFIG)
        .map_err(|e| StoreError::Decode(path.to_path_buf(), Box::new(e)))?;
    Ok(rows)
}

async fn write_snapshot<T>(path: PathBuf, rows: Vec<T>) -> Result<(), StoreError>
where
    T: Serialize + Send + 'static,
{
    let bytes = tokio::task::spawn_blocking(move || {
        bincode::serde::encode_to_vec(&rows, BINCODE_CONFIG)
            .map_err(|e| StoreError::Encode(Box::new(e)))
    })
    .await??;

    // Replace the snapshot in one step so readers never see a half written file.
    let tmp = path.with_extension("bin.tmp");
    tokio::fs::write(&tmp, &bytes)
        .await
        .map_err(|e| StoreError::Write(tmp.clone(), e))?;
    tokio::fs::rename(&tmp, &path)
        .await
        .map_err(|e| StoreError::Write(path.clone(), e))?;
    debug!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}

impl StatisticsStore for FileStore {
    async fn insert_stations(&self, stations: Vec<Station>) -> Result<usize, StoreError> {
        let _guard = self.writer.lock().await;
        let mut next = self.tables.read().clone();
        let written = next.insert_stations(stations)?;
        write_snapshot(self.dir.join(STATIONS_FILE_NAME), next.stations.clone()).await?;
        *self.tables.write() = next;
        Ok(written)
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
        let _guard = self.writer.lock().await;
        let mut next = self.tables.read().clone();
        let written = next.insert_statistics(statistics)?;
        write_snapshot(self.dir.join(STATISTICS_FILE_NAME), next.statistics.clone()).await?;
        *self.tables.write() = next;
        Ok(written)
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
