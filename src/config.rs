//! Upstream endpoints and file-name conventions.
//!
//! Both values are built once and shared read-only by the components that need them.

use bon::Builder;
use regex::Regex;
use std::time::Duration;

pub const DEFAULT_GEOCODER_URL: &str = "http://api.positionstack.com/v1/forward";
pub const DEFAULT_STATION_DIRECTORY_URL: &str = "https://opendata.dwd.de/climate_environment/CDC/observations_germany/climate/hourly/wind/historical/FF_Stundenwerte_Beschreibung_Stationen.txt";
pub const DEFAULT_ARCHIVE_INDEX_URL: &str =
    "https://opendata.dwd.de/climate_environment/CDC/observations_germany/climate/hourly/wind/historical/";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const DATA_FILE_PATTERN: &str = r"stundenwerte_FF_(?P<id>\d+)_";
const PRODUCT_FILE_PATTERN: &str = r"^produkt.*\.txt$";

/// Where the crate fetches its data from.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use windstat::SourceConfig;
///
/// let config = SourceConfig::builder()
///     .geocoder_access_key("secret")
///     .request_timeout(Duration::from_secs(5))
///     .build();
/// assert_eq!(config.request_timeout, Duration::from_secs(5));
/// ```
#[derive(Debug, Clone, Builder)]
pub struct SourceConfig {
    /// Forward geocoding endpoint, queried with `access_key` and `query`.
    #[builder(into, default = DEFAULT_GEOCODER_URL.to_string())]
    pub geocoder_url: String,
    #[builder(into)]
    pub geocoder_access_key: Option<String>,
    /// Fixed-width station directory text file (ISO-8859-15).
    #[builder(into, default = DEFAULT_STATION_DIRECTORY_URL.to_string())]
    pub station_directory_url: String,
    /// HTML index listing the per-station zip archives. Archive links are resolved
    /// relative to this URL.
    #[builder(into, default = DEFAULT_ARCHIVE_INDEX_URL.to_string())]
    pub archive_index_url: String,
    /// Upper bound for every single upstream request.
    #[builder(default = DEFAULT_TIMEOUT)]
    pub request_timeout: Duration,
    #[builder(default)]
    pub patterns: ArchivePatterns,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// File-name conventions of the wind archive.
///
/// `data_file` must contain a named group `id` capturing the station id embedded in
/// an archive name, `product_file` selects the measurement file inside the archive.
#[derive(Debug, Clone)]
pub struct ArchivePatterns {
    data_file: Regex,
    product_file: Regex,
}

impl ArchivePatterns {
    /// # Errors
    ///
    /// Fails if a pattern does not compile or `data_file` lacks an `id` group.
    pub fn new(data_file: &str, product_file: &str) -> Result<Self, regex::Error> {
        let data_file = Regex::new(data_file)?;
        if !data_file.capture_names().any(|name| name == Some("id")) {
            return Err(regex::Error::Syntax(
                "data file pattern needs a named group `id`".to_string(),
            ));
        }
        Ok(Self {
            data_file,
            product_file: Regex::new(product_file)?,
        })
    }

    /// Whether `name` is the archive of station `station_id`.
    pub fn is_data_file_of(&self, name: &str, station_id: &str) -> bool {
        self.data_file
            .captures_iter(name)
            .any(|caps| caps.name("id").is_some_and(|id| id.as_str() == station_id))
    }

    pub fn is_product_file(&self, name: &str) -> bool {
        self.product_file.is_match(name)
    }
}

impl Default for ArchivePatterns {
    fn default() -> Self {
        Self {
            data_file: Regex::new(DATA_FILE_PATTERN).expect("hardcoded pattern compiles"),
            product_file: Regex::new(PRODUCT_FILE_PATTERN).expect("hardcoded pattern compiles"),
        }
    }
}
