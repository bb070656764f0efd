//! Geospatial helpers: distance, bearing, and reverse geocoding.

use serde::{Deserialize, Serialize};
use tracing::debug;

const EARTH_RADIUS_M: f64 = 6_371_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub latitude: f64,
    pub longitude: f64,
}

impl LatLng {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl std::fmt::Display for LatLng {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.6},{:.6}", self.latitude, self.longitude)
    }
}

/// Great-circle distance in meters (haversine).
pub fn distance_meters(a: LatLng, b: LatLng) -> f64 {
    let phi1 = a.latitude.to_radians();
    let phi2 = b.latitude.to_radians();
    let dphi = (b.latitude - a.latitude).to_radians();
    let dlambda = (b.longitude - a.longitude).to_radians();

    let h = (dphi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.sqrt().asin()
}

/// Initial great-circle bearing from `a` to `b`, in degrees [0, 360).
pub fn bearing_degrees(a: LatLng, b: LatLng) -> f64 {
    let phi1 = a.latitude.to_radians();
    let phi2 = b.latitude.to_radians();
    let dlambda = (b.longitude - a.longitude).to_radians();

    let y = dlambda.sin() * phi2.cos();
    let x = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * dlambda.cos();
    (y.atan2(x).to_degrees() + 360.0) % 360.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompassDirection {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl CompassDirection {
    /// Bucket a bearing into one of eight 45-degree sectors centred on the
    /// cardinal and intercardinal points.
    pub fn from_bearing(degrees: f64) -> Self {
        let normalized = ((degrees % 360.0) + 360.0) % 360.0;
        let sector = ((normalized + 22.5) / 45.0).floor() as usize % 8;
        [
            CompassDirection::North,
            CompassDirection::NorthEast,
            CompassDirection::East,
            CompassDirection::SouthEast,
            CompassDirection::South,
            CompassDirection::SouthWest,
            CompassDirection::West,
            CompassDirection::NorthWest,
        ][sector]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CompassDirection::North => "N",
            CompassDirection::NorthEast => "NE",
            CompassDirection::East => "E",
            CompassDirection::SouthEast => "SE",
            CompassDirection::South => "S",
            CompassDirection::SouthWest => "SW",
            CompassDirection::West => "W",
            CompassDirection::NorthWest => "NW",
        }
    }
}

impl std::fmt::Display for CompassDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cardinal bearing from `a` to `b`.
pub fn cardinal_bearing(a: LatLng, b: LatLng) -> CompassDirection {
    CompassDirection::from_bearing(bearing_degrees(a, b))
}

#[derive(Debug, Deserialize)]
struct ReverseGeocodeResponse {
    display_name: Option<String>,
}

/// Best-effort reverse geocoder against a Nominatim-compatible endpoint.
/// Failures are logged and degrade to `None`; callers format the
/// notification without a place label.
#[derive(Clone)]
pub struct ReverseGeocoder {
    client: reqwest::Client,
    base_url: String,
}

impl ReverseGeocoder {
    pub fn new(client: reqwest::Client, base_url: String) -> Self {
        Self { client, base_url }
    }

    pub async fn reverse(&self, position: LatLng) -> Option<String> {
        let url = format!("{}/reverse", self.base_url);
        let result = self
            .client
            .get(&url)
            .query(&[
                ("format", "jsonv2".to_string()),
                ("lat", position.latitude.to_string()),
                ("lon", position.longitude.to_string()),
            ])
            .send()
            .await;

        match result {
            Ok(resp) if resp.status().is_success() => {
                match resp.json::<ReverseGeocodeResponse>().await {
                    Ok(body) => body.display_name,
                    Err(e) => {
                        debug!(error = %e, "reverse geocode parse failed");
                        None
                    }
                }
            }
            Ok(resp) => {
                debug!(status = %resp.status(), "reverse geocode returned error status");
                None
            }
            Err(e) => {
                debug!(error = %e, "reverse geocode request failed");
                None
            }
        }
    }
}
