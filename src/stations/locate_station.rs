use crate::types::station::{LatLon, Station};
use haversine::{distance, Location as HaversineLocation, Units};
use ordered_float::OrderedFloat;

/// Great-circle distance between two points in kilometres.
pub fn distance_km(from: LatLon, to: LatLon) -> f64 {
    distance(
        HaversineLocation {
            latitude: from.latitude(),
            longitude: from.longitude(),
        },
        HaversineLocation {
            latitude: to.latitude(),
            longitude: to.longitude(),
        },
        Units::Kilometers,
    )
}

/// The latest `last_measured_year` among `stations`, if there are any.
pub fn most_recent_known_year(stations: &[Station]) -> Option<i32> {
    stations.iter().map(|s| s.last_measured_year).max()
}

/// Orders `stations` by distance to `point`, closest first, keeping only those whose
/// record reaches into the last `required_years` years.
///
/// "Last years" is relative to the most recent year any station has data for, not to
/// the current date. Stations at equal distance keep their directory order.
pub fn rank_by_distance(
    point: LatLon,
    stations: &[Station],
    required_years: u32,
) -> Vec<(Station, f64)> {
    let Some(most_recent_year) = most_recent_known_year(stations) else {
        return vec![];
    };

    let mut candidates: Vec<(Station, f64)> = stations
        .iter()
        .filter(|station| station.covers(most_recent_year, required_years))
        .map(|station| (station.to_owned(), distance_km(point, station.location)))
        .collect();

    // Stable, so ties stay in insertion order.
    candidates.sort_by_key(|(_, dist)| OrderedFloat(*dist));
    candidates
}
