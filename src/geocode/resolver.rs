//! Resolves a free-text city name to coordinates through a forward geocoding API.

use crate::geocode::error::GeocodeError;
use crate::http::download;
use crate::types::station::LatLon;
use log::{debug, info};
use reqwest::Client;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    #[serde(default)]
    data: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    latitude: Option<f64>,
    longitude: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct Geocoder {
    client: Client,
    url: String,
    access_key: Option<String>,
}

impl Geocoder {
    pub fn new(client: Client, url: impl Into<String>, access_key: Option<String>) -> Self {
        Self {
            client,
            url: url.into(),
            access_key,
        }
    }

    /// Looks up `city` and returns the coordinates of the best match.
    ///
    /// Only the first result is considered. An empty result list, a result without
    /// coordinates, `(0, 0)` or an out-of-range pair all count as "not found".
    pub async fn resolve(&self, city: &str) -> Result<LatLon, GeocodeError> {
        let city = city.trim();
        if city.is_empty() {
            return Err(GeocodeError::EmptyQuery);
        }

        let mut query = Vec::with_capacity(2);
        if let Some(key) = &self.access_key {
            query.push(("access_key", key.as_str()));
        }
        query.push(("query", city));

        let request = self.client.get(&self.url).query(&query);
        let body = download(request, &self.url).await?;
        let response: GeocodeResponse = serde_json::from_slice(&body)?;
        debug!("Geocoder returned {} candidates for '{}'", response.data.len(), city);

        let location = response
            .data
            .first()
            .and_then(|result| Some(LatLon(result.latitude?, result.longitude?)))
            .filter(|location| !location.is_null_island() && location.is_valid())
            .ok_or_else(|| GeocodeError::NotFound(city.to_string()))?;

        info!(
            "Resolved '{}' to ({}, {})",
            city,
            location.latitude(),
            location.longitude()
        );
        Ok(location)
    }
}
