//! This module provides the main entry point of the crate: resolving a city to the
//! nearest DWD station with wind data and returning that station's annual average
//! wind speeds, building and caching them on first use.

use crate::archive::fetcher::ArchiveClient;
use crate::archive::locator::locate_data_file;
use crate::config::SourceConfig;
use crate::error::{ErrorKind, WindStatError};
use crate::geocode::resolver::Geocoder;
use crate::http::build_client;
use crate::measurements::aggregator::aggregate;
use crate::measurements::hourly_parser::parse_hourly;
use crate::stations::directory::StationDirectorySource;
use crate::stations::locate_station::rank_by_distance;
use crate::store::file::FileStore;
use crate::store::{StatisticsStore, StoreError};
use crate::types::request::WindRequest;
use crate::types::station::{LatLon, Station};
use crate::types::statistics::AnnualStatistic;
use crate::utils::get_cache_dir;
use bon::bon;
use log::{debug, error, info, warn};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

/// Outcome of [`WindStat::ensure_statistics`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coverage {
    /// Statistics were already stored; nothing was downloaded.
    Cached,
    /// Statistics were built from the station's archive. `years` is the number of
    /// annual records written, which is zero when the archive held no usable speeds.
    Built { years: usize },
}

/// A station together with its distance to the point it was ranked against.
#[derive(Debug, Clone, PartialEq)]
pub struct StationDistance {
    pub station: Station,
    pub distance_km: f64,
}

/// The main client struct for annual wind statistics.
///
/// Statistics are read from the store when present. Otherwise the station's hourly
/// archive is downloaded, reduced to one average per calendar year and written to the
/// store before it is read back. Every upstream call is made at most once per request
/// and is never retried.
///
/// Create an instance using [`WindStat::new()`] for the default file store location,
/// [`WindStat::with_cache_folder()`] for a custom one, or [`WindStat::with_store()`]
/// for any [`StatisticsStore`].
///
/// # Examples
///
/// ```rust,no_run
/// # use windstat::{SourceConfig, WindStat, WindStatError};
/// # async fn run() -> Result<(), WindStatError> {
/// let client = WindStat::new(SourceConfig::default()).await?;
/// let statistics = client
///     .wind_statistics()
///     .city("Aachen")
///     .years(5)
///     .call()
///     .await?;
/// for statistic in &statistics {
///     println!("{}: {:.2} m/s", statistic.year, statistic.speed);
/// }
/// # Ok(())
/// # }
/// ```
pub struct WindStat<S: StatisticsStore = FileStore> {
    store: S,
    geocoder: Geocoder,
    directory: StationDirectorySource,
    archive: ArchiveClient,
    directory_lock: tokio::sync::Mutex<()>,
    station_locks: parking_lot::Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl WindStat<FileStore> {
    /// Creates a client backed by a [`FileStore`] in `cache_folder`.
    ///
    /// Use this if you need to control where stations and statistics are persisted.
    /// Stored data is loaded immediately; nothing is downloaded until the first request.
    ///
    /// # Arguments
    ///
    /// * `cache_folder` - Directory holding the store files. Created if missing.
    /// * `config` - Upstream endpoints, file-name patterns and the request timeout.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `WindStat` client on success, or a [`WindStatError`]
    /// if the directory or the store files are unusable.
    ///
    /// # Errors
    ///
    /// Returns [`WindStatError::CacheDirCreation`] if the directory cannot be created,
    /// [`WindStatError::Store`] if existing store files cannot be read.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// # use windstat::{SourceConfig, WindStat, WindStatError};
    /// # use std::path::PathBuf;
    /// # async fn run() -> Result<(), WindStatError> {
    /// let client =
    ///     WindStat::with_cache_folder(PathBuf::from("/tmp/windstat"), SourceConfig::default())
    ///         .await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn with_cache_folder(
        cache_folder: PathBuf,
        config: SourceConfig,
    ) -> Result<Self, WindStatError> {
        tokio::fs::create_dir_all(&cache_folder)
            .await
            .map_err(|e| WindStatError::CacheDirCreation(cache_folder.clone(), e))?;
        let store = FileStore::open(cache_folder).await?;
        Self::with_store(store, config)
    }

    /// Creates a client backed by a [`FileStore`] in the platform cache directory
    /// (e.g. `~/.cache/windstat` on Linux).
    ///
    /// # Arguments
    ///
    /// * `config` - Upstream endpoints, file-name patterns and the request timeout.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `WindStat` client on success, or a [`WindStatError`]
    /// if the default cache directory cannot be resolved, created or read.
    ///
    /// # Errors
    ///
    /// Returns [`WindStatError::CacheDirResolution`] if no cache directory is known for
    /// this platform, and the errors of [`WindStat::with_cache_folder`].
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// # use windstat::{SourceConfig, WindStat, WindStatError};
    /// # async fn run() -> Result<(), WindStatError> {
    /// let config = SourceConfig::builder()
    ///     .geocoder_access_key("my-positionstack-key")
    ///     .build();
    /// let client = WindStat::new(config).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn new(config: SourceConfig) -> Result<Self, WindStatError> {
        let cache_folder = get_cache_dir().map_err(WindStatError::CacheDirResolution)?;
        Self::with_cache_folder(cache_folder, config).await
    }
}

#[bon]
impl<S: StatisticsStore> WindStat<S> {
    /// Creates a client on top of an existing store. All upstream calls share one HTTP
    /// client bounded by `config.request_timeout`.
    ///
    /// # Arguments
    ///
    /// * `store` - Any [`StatisticsStore`], e.g. a [`MemoryStore`](crate::MemoryStore) for
    ///   short-lived processes.
    /// * `config` - Upstream endpoints, file-name patterns and the request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`WindStatError::Http`] if the HTTP client cannot be built.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use windstat::{MemoryStore, SourceConfig, WindStat, WindStatError};
    /// # fn run() -> Result<(), WindStatError> {
    /// let client = WindStat::with_store(MemoryStore::new(), SourceConfig::default())?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn with_store(store: S, config: SourceConfig) -> Result<Self, WindStatError> {
        let client = build_client(config.request_timeout)?;
        let patterns = Arc::new(config.patterns);
        Ok(Self {
            store,
            geocoder: Geocoder::new(
                client.clone(),
                config.geocoder_url,
                config.geocoder_access_key,
            ),
            directory: StationDirectorySource::new(client.clone(), config.station_directory_url),
            archive: ArchiveClient::new(client, config.archive_index_url, patterns),
            directory_lock: tokio::sync::Mutex::new(()),
            station_locks: parking_lot::Mutex::new(HashMap::new()),
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns the annual average wind speeds of the nearest station that has data in
    /// the last `years` years, newest first and at most `years` records.
    ///
    /// "The last years" are counted back from the most recent year any station has data
    /// for, not from today. Stations are tried closest first; a station whose archive
    /// is missing or holds no usable speeds is skipped in favour of the next one.
    ///
    /// This method uses a builder pattern.
    ///
    /// # Errors
    ///
    /// - [`WindStatError::InvalidRequest`] for an empty city or `years == 0`.
    /// - [`WindStatError::CityNotFound`] when the geocoder does not know the city.
    /// - [`WindStatError::NoStatisticsInPeriod`] when no candidate station yields data.
    /// - Any other variant when an upstream source or the store fails.
    #[builder]
    pub async fn wind_statistics(
        &self,
        #[builder(into)] city: String,
        years: u32,
    ) -> Result<Vec<AnnualStatistic>, WindStatError> {
        let request = WindRequest::new(city, years)?;
        let result = self.collect_statistics(&request).await;
        if let Err(e) = &result {
            if e.kind() == ErrorKind::Upstream {
                error!("Collecting statistics for '{}' failed: {}", request.city, e);
            }
        }
        result
    }

    /// Ranks stations by distance to a location, or to a city resolved through the
    /// geocoder when no location is given.
    ///
    /// The station directory is downloaded into the store on first use.
    ///
    /// This method uses a builder pattern.
    ///
    /// # Arguments
    ///
    /// * `.location(LatLon)` or `.city(&str)`: one of the two is required. A location
    ///   wins when both are given.
    /// * `.years(u32)`: Optional. Keep only stations with data in that many most recent
    ///   years. Defaults to no coverage filter.
    /// * `.station_limit(usize)`: Optional. Maximum number of stations returned.
    ///
    /// # Returns
    ///
    /// A `Result` containing the stations with their distance in kilometres, closest
    /// first. Stations at equal distance keep their directory order.
    ///
    /// # Errors
    ///
    /// [`WindStatError::InvalidRequest`] when neither location nor city is given, the
    /// geocoder errors for `city`, and station directory or store failures.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// # use windstat::{LatLon, MemoryStore, SourceConfig, WindStat, WindStatError};
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), WindStatError> {
    /// let client = WindStat::with_store(MemoryStore::new(), SourceConfig::default())?;
    /// let nearby = client
    ///     .find_stations()
    ///     .location(LatLon(50.7766, 6.0834))
    ///     .years(10)
    ///     .station_limit(3)
    ///     .call()
    ///     .await?;
    /// for candidate in &nearby {
    ///     println!("{} ({:.1} km)", candidate.station.name, candidate.distance_km);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    #[builder]
    pub async fn find_stations(
        &self,
        location: Option<LatLon>,
        #[builder(into)] city: Option<String>,
        years: Option<u32>,
        station_limit: Option<usize>,
    ) -> Result<Vec<StationDistance>, WindStatError> {
        let location = match (location, city) {
            (Some(location), _) => location,
            (None, Some(city)) => self.geocoder.resolve(&city).await?,
            (None, None) => {
                return Err(WindStatError::InvalidRequest(
                    "either a location or a city is required".to_string(),
                ))
            }
        };

        let stations = self.list_stations().await?;
        Ok(rank_by_distance(location, &stations, years.unwrap_or(u32::MAX))
            .into_iter()
            .take(station_limit.unwrap_or(usize::MAX))
            .map(|(station, distance_km)| StationDistance {
                station,
                distance_km,
            })
            .collect())
    }

    /// Returns all known stations, downloading the station directory into the store
    /// the first time.
    ///
    /// Concurrent first calls on one client download the directory once.
    pub async fn list_stations(&self) -> Result<Vec<Station>, WindStatError> {
        if let Some(stations) = self.stored_stations().await? {
            return Ok(stations);
        }

        let _guard = self.directory_lock.lock().await;
        if let Some(stations) = self.stored_stations().await? {
            return Ok(stations);
        }

        info!("Station cache is empty, loading station directory");
        let stations = self.directory.fetch().await?;
        let written = self.store.insert_stations(stations.clone()).await?;
        info!("Stored {} stations", written);
        Ok(stations)
    }

    async fn stored_stations(&self) -> Result<Option<Vec<Station>>, WindStatError> {
        match self.store.list_stations().await {
            Ok(stations) => Ok(Some(stations)),
            Err(StoreError::NoStations) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Makes sure statistics for `station` are stored, building them from the
    /// station's archive if there are none yet.
    ///
    /// Any stored record counts as cached; stored statistics are never refreshed.
    /// Concurrent calls for one station on one client build it once; the others wait
    /// and then see [`Coverage::Cached`].
    ///
    /// # Errors
    ///
    /// Errors for which [`WindStatError::is_missing_source`] is true mean the station
    /// has no archive or no measurement file in it. All other errors are failures of
    /// the sources or the store. Fewer records written than built is
    /// [`StoreError::PartialInsert`].
    pub async fn ensure_statistics(&self, station: &Station) -> Result<Coverage, WindStatError> {
        if self.store.statistics_exist(&station.name).await? {
            debug!("Statistics cache hit for station '{}'", station.name);
            return Ok(Coverage::Cached);
        }

        let lock = self.station_lock(&station.name);
        let coverage = {
            let _guard = lock.lock().await;
            self.build_if_missing(station).await
        };
        drop(lock);
        self.release_station_lock(&station.name);
        coverage
    }

    async fn build_if_missing(&self, station: &Station) -> Result<Coverage, WindStatError> {
        if self.store.statistics_exist(&station.name).await? {
            debug!("Statistics for station '{}' built while waiting", station.name);
            return Ok(Coverage::Cached);
        }

        info!("Statistics cache miss for station '{}'", station.name);
        let years = self.build_statistics(station).await?;
        Ok(Coverage::Built { years })
    }

    fn station_lock(&self, name: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.station_locks.lock();
        Arc::clone(locks.entry(name.to_string()).or_default())
    }

    /// Drops the lock entry of `name` unless another caller still holds or awaits it.
    fn release_station_lock(&self, name: &str) {
        let mut locks = self.station_locks.lock();
        if locks.get(name).is_some_and(|lock| Arc::strong_count(lock) == 1) {
            locks.remove(name);
        }
    }

    async fn build_statistics(&self, station: &Station) -> Result<usize, WindStatError> {
        let index = self.archive.fetch_index().await?;
        let file_name = locate_data_file(self.archive.patterns(), &station.id, &index)?;
        let product = self.archive.fetch_product(&file_name).await?;

        let station_name = station.name.clone();
        let statistics = tokio::task::spawn_blocking(move || {
            let samples = parse_hourly(product.reader());
            debug!("Parsed {} hourly samples from {}", samples.len(), product.name);
            aggregate(&station_name, &samples)
        })
        .await?;

        if statistics.is_empty() {
            warn!(
                "Archive '{}' of station '{}' holds no usable wind speeds",
                file_name, station.name
            );
            return Ok(0);
        }

        let expected = statistics.len();
        let written = self.store.insert_statistics(statistics).await?;
        if written != expected {
            return Err(StoreError::PartialInsert { expected, written }.into());
        }
        info!(
            "Stored {} annual statistics for station '{}'",
            written, station.name
        );
        Ok(written)
    }

    async fn collect_statistics(
        &self,
        request: &WindRequest,
    ) -> Result<Vec<AnnualStatistic>, WindStatError> {
        let location = self.geocoder.resolve(&request.city).await?;
        let stations = self.list_stations().await?;
        let candidates = rank_by_distance(location, &stations, request.years);
        debug!(
            "{} candidate stations for '{}' over {} years",
            candidates.len(),
            request.city,
            request.years
        );

        for (station, distance_km) in candidates {
            debug!(
                "Trying station '{}' ({:.1} km away)",
                station.name, distance_km
            );
            match self.ensure_statistics(&station).await {
                Ok(Coverage::Built { years: 0 }) => continue,
                Ok(_) => {}
                Err(e) if e.is_missing_source() => {
                    info!("Skipping station '{}': {}", station.name, e);
                    continue;
                }
                Err(e) => return Err(e),
            }

            match self
                .store
                .statistics_for_station(&station.name, request.years)
                .await
            {
                Ok(statistics) => {
                    info!(
                        "Returning {} years of station '{}' for '{}'",
                        statistics.len(),
                        station.name,
                        request.city
                    );
                    return Ok(statistics);
                }
                Err(StoreError::NoWindData(_)) => continue,
                Err(e) => return Err(e.into()),
            }
        }

        Err(WindStatError::NoStatisticsInPeriod {
            city: request.city.clone(),
            years: request.years,
        })
    }
}
