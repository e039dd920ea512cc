//! Parser for DWD hourly wind product files.
//!
//! ```text
//! STATIONS_ID;MESS_DATUM;QN_3;   F;   D;eor
//!           3;1937010101;    5;   3.0; 230;eor
//! ```
//!
//! `MESS_DATUM` is the end of the measured hour (`YYYYMMDDHH`), `F` the mean speed.

use crate::types::statistics::HourlySample;
use chrono::NaiveDate;
use log::warn;
use std::io::BufRead;
use std::num::ParseFloatError;
use thiserror::Error;

const DELIMITER: char = ';';
const TIMESTAMP_FIELD: usize = 1;
const SPEED_FIELD: usize = 3;

#[derive(Debug, Error, PartialEq)]
pub enum ParseLineError {
    #[error("expected at least {expected} fields, found {found}")]
    MissingField { expected: usize, found: usize },

    #[error("failed to parse end date value '{0}'")]
    Timestamp(String),

    #[error("failed to parse speed value '{value}'")]
    Speed {
        value: String,
        #[source]
        source: ParseFloatError,
    },

    #[error("failed to read line")]
    Read,
}

/// Reads every measurement line of a product file. The first line is the header.
///
/// Malformed lines are logged and skipped; the samples keep the file's order.
pub fn parse_hourly<R: BufRead>(reader: R) -> Vec<HourlySample> {
    let mut samples = Vec::new();
    let mut skipped = 0usize;

    for (index, line) in reader.split(b'\n').enumerate().skip(1) {
        let parsed = line
            .map_err(|_| ParseLineError::Read)
            .and_then(|raw| {
                let line = String::from_utf8_lossy(&raw);
                if line.trim().is_empty() {
                    return Ok(None);
                }
                parse_hourly_line(&line).map(Some)
            });
        match parsed {
            Ok(Some(sample)) => samples.push(sample),
            Ok(None) => {}
            Err(e) => {
                warn!("Skipping measurement line {}: {}", index + 1, e);
                skipped += 1;
            }
        }
    }

    if skipped > 0 {
        warn!("Skipped {} malformed measurement lines", skipped);
    }
    samples
}

/// Parses one `;`-separated measurement line. Whitespace anywhere in the line is ignored.
pub fn parse_hourly_line(line: &str) -> Result<HourlySample, ParseLineError> {
    let compact: String = line.chars().filter(|c| !c.is_whitespace()).collect();
    let parts: Vec<&str> = compact.split(DELIMITER).collect();
    if parts.len() <= SPEED_FIELD {
        return Err(ParseLineError::MissingField {
            expected: SPEED_FIELD + 1,
            found: parts.len(),
        });
    }

    let (date, hour) = parse_timestamp(parts[TIMESTAMP_FIELD])?;
    let speed = parts[SPEED_FIELD]
        .parse::<f64>()
        .map_err(|source| ParseLineError::Speed {
            value: parts[SPEED_FIELD].to_string(),
            source,
        })?;

    Ok(HourlySample::new(date, hour, speed))
}

/// `YYYYMMDDHH`, hour in `0..=24`.
fn parse_timestamp(value: &str) -> Result<(NaiveDate, u8), ParseLineError> {
    let invalid = || ParseLineError::Timestamp(value.to_string());
    if value.len() != 10 || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    let date = NaiveDate::parse_from_str(&value[..8], "%Y%m%d").map_err(|_| invalid())?;
    let hour: u8 = value[8..].parse().map_err(|_| invalid())?;
    if hour > 24 {
        return Err(invalid());
    }
    Ok((date, hour))
}
