use crate::{
    core::{config::GeocodeConfig, geo::LatLng},
    geocode::{address::AddressFields, GeocodeError, GeocodeService, Place},
};
use async_trait::async_trait;
use serde::Deserialize;

/// Client for the gateway's `/geo/reverse` and `/geo/search` routes, which
/// proxy Nominatim's `jsonv2` format.
#[derive(Clone)]
pub struct GatewayGeocoder {
    client: reqwest::Client,
    base_url: String,
}

/// Nominatim serializes coordinates as strings; some proxies re-encode them
/// as numbers.
#[derive(Deserialize)]
#[serde(untagged)]
enum Coord {
    Text(String),
    Number(f64),
}

impl Coord {
    fn value(&self) -> Option<f64> {
        match self {
            Coord::Text(text) => text.trim().parse().ok(),
            Coord::Number(n) => Some(*n),
        }
    }
}

#[derive(Deserialize)]
struct RawPlace {
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    lat: Option<Coord>,
    #[serde(default)]
    lon: Option<Coord>,
    #[serde(default)]
    address: Option<AddressFields>,
    /// Set by Nominatim when nothing is found ("Unable to geocode")
    #[serde(default)]
    error: Option<String>,
}

impl RawPlace {
    fn coordinate(&self) -> Option<LatLng> {
        let lat = self.lat.as_ref()?.value()?;
        let lng = self.lon.as_ref()?.value()?;
        LatLng::try_new(lat, lng).ok()
    }

    fn into_place(self, coordinate: LatLng) -> Place {
        let display_name = self.display_name.unwrap_or_default();
        let mut address = self.address.unwrap_or_default();
        if !display_name.is_empty() {
            address.display_name = Some(display_name.clone());
        }
        Place {
            display_name,
            coordinate,
            address,
        }
    }
}

impl GatewayGeocoder {
    pub fn new(config: &GeocodeConfig) -> Result<Self, GeocodeError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_text(&self, route: &str, query: &[(&str, String)]) -> Result<String, GeocodeError> {
        let url = format!("{}{route}", self.base_url);
        let response = self.client.get(&url).query(query).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GeocodeError::Status(status.as_u16()));
        }

        Ok(response.text().await?)
    }
}

#[async_trait]
impl GeocodeService for GatewayGeocoder {
    async fn reverse(&self, at: LatLng) -> Result<Place, GeocodeError> {
        log::debug!("reverse geocoding {at}");
        let body = self
            .get_text(
                "/geo/reverse",
                &[("lat", at.lat.to_string()), ("lon", at.lng.to_string())],
            )
            .await?;

        let raw: RawPlace = serde_json::from_str(&body)
            .map_err(|e| GeocodeError::Malformed(format!("reverse response: {e}")))?;

        if let Some(error) = &raw.error {
            log::debug!("gateway could not geocode {at}: {error}");
            return Err(GeocodeError::NotFound);
        }

        // Keep the picked coordinate, not the nearest OSM object's.
        Ok(raw.into_place(at))
    }

    async fn forward(&self, query: &str, limit: usize) -> Result<Vec<Place>, GeocodeError> {
        log::debug!("forward geocoding {query:?} (limit {limit})");
        let body = self
            .get_text(
                "/geo/search",
                &[("q", query.to_string()), ("limit", limit.to_string())],
            )
            .await?;

        let raw: Vec<RawPlace> = serde_json::from_str(&body)
            .map_err(|e| GeocodeError::Malformed(format!("search response: {e}")))?;

        let places = raw
            .into_iter()
            .filter_map(|entry| match entry.coordinate() {
                Some(coordinate) => Some(entry.into_place(coordinate)),
                None => {
                    log::debug!(
                        "skipping search result without usable coordinates: {:?}",
                        entry.display_name
                    );
                    None
                }
            })
            .take(limit)
            .collect();

        Ok(places)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinates_accept_strings_and_numbers() {
        let raw: RawPlace = serde_json::from_str(
            r#"{"display_name":"Delhi","lat":"28.6517178","lon":77.2219388}"#,
        )
        .unwrap();
        let c = raw.coordinate().unwrap();
        assert!((c.lat - 28.6517178).abs() < 1e-9);
        assert!((c.lng - 77.2219388).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_coordinates_rejected() {
        let raw: RawPlace =
            serde_json::from_str(r#"{"display_name":"Nowhere","lat":"abc","lon":"77"}"#).unwrap();
        assert!(raw.coordinate().is_none());

        let raw: RawPlace =
            serde_json::from_str(r#"{"display_name":"Nowhere","lat":"123","lon":"77"}"#).unwrap();
        assert!(raw.coordinate().is_none());
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let config = GeocodeConfig::default().with_base_url("http://localhost:8080/api/");
        let geocoder = GatewayGeocoder::new(&config).unwrap();
        assert_eq!(geocoder.base_url(), "http://localhost:8080/api");
    }
}
