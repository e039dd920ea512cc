//! Downloads and parses the DWD station directory.
//!
//! The file is a fixed-width, ISO-8859-15 encoded table with two header lines:
//!
//! ```text
//! Stations_id von_datum bis_datum Stationshoehe geoBreite geoLaenge Stationsname Bundesland
//! ----------- --------- --------- ------------- --------- --------- ----------------- ----------
//! 00003 19370101 20110331            202     50.7827    6.0941 Aachen            Nordrhein-Westfalen
//! ```

use crate::http::download;
use crate::stations::error::{StationDirectoryError, StationLineError};
use crate::types::station::{LatLon, Station};
use chrono::{Datelike, NaiveDate};
use encoding_rs::ISO_8859_15;
use log::{info, warn};
use reqwest::Client;
use std::borrow::Cow;
use std::str::FromStr;

const HEADER_LINES: usize = 2;
const MIN_COLUMNS: usize = 8;

#[derive(Debug, Clone)]
pub struct StationDirectorySource {
    client: Client,
    url: String,
}

impl StationDirectorySource {
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    /// Downloads the directory and parses every usable line.
    pub async fn fetch(&self) -> Result<Vec<Station>, StationDirectoryError> {
        info!("Fetching station directory from {}", self.url);
        let raw = download(self.client.get(&self.url), &self.url).await?;

        let (stations, skipped) =
            tokio::task::spawn_blocking(move || parse_station_directory(&decode_directory(&raw)))
                .await?;
        if stations.is_empty() {
            return Err(StationDirectoryError::Empty { skipped });
        }
        info!(
            "Parsed {} stations from directory ({} lines skipped)",
            stations.len(),
            skipped
        );
        Ok(stations)
    }
}

/// Decodes the directory bytes. Umlauts in station names are ISO-8859-15.
pub fn decode_directory(raw: &[u8]) -> Cow<'_, str> {
    ISO_8859_15.decode_without_bom_handling(raw).0
}

/// Parses the decoded directory, returning the stations and the number of
/// malformed lines that were skipped.
pub fn parse_station_directory(text: &str) -> (Vec<Station>, usize) {
    let mut stations = Vec::new();
    let mut skipped = 0;
    for (index, line) in text.lines().enumerate().skip(HEADER_LINES) {
        if line.trim().is_empty() {
            continue;
        }
        match parse_station_line(line) {
            Ok(station) => stations.push(station),
            Err(e) => {
                warn!("Skipping station directory line {}: {}", index + 1, e);
                skipped += 1;
            }
        }
    }
    (stations, skipped)
}

/// Parses one directory line.
///
/// Station names may consist of several words, so everything between the longitude
/// column and the last column (the federal state) is the name.
pub fn parse_station_line(line: &str) -> Result<Station, StationLineError> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() < MIN_COLUMNS {
        return Err(StationLineError::TooFewColumns(parts.len()));
    }

    let region = parts[parts.len() - 1];
    let name = parts[6..parts.len() - 1].join(" ");

    Ok(Station {
        id: parts[0].to_string(),
        first_year: parse_year("von_datum", parts[1])?,
        last_measured_year: parse_year("bis_datum", parts[2])?,
        elevation: parse_column("Stationshoehe", parts[3])?,
        location: LatLon(
            parse_column("geoBreite", parts[4])?,
            parse_column("geoLaenge", parts[5])?,
        ),
        name,
        region: region.to_string(),
    })
}

fn parse_year(column: &'static str, value: &str) -> Result<i32, StationLineError> {
    NaiveDate::parse_from_str(value, "%Y%m%d")
        .map(|date| date.year())
        .map_err(|_| invalid(column, value))
}

fn parse_column<T: FromStr>(column: &'static str, value: &str) -> Result<T, StationLineError> {
    value.parse().map_err(|_| invalid(column, value))
}

fn invalid(column: &'static str, value: &str) -> StationLineError {
    StationLineError::InvalidValue {
        column,
        value: value.to_string(),
    }
}
