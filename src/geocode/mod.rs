//! Geocoding collaborators: reverse lookups for map clicks and forward
//! search for the address boxes.

pub mod address;
pub mod gateway;

use crate::core::geo::LatLng;
use address::AddressFields;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A geocoded place
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub display_name: String,
    pub coordinate: LatLng,
    pub address: AddressFields,
}

impl Place {
    /// Address fields with the label folded in, or `None` when the lookup
    /// produced nothing usable
    pub fn address_fields(&self) -> Option<AddressFields> {
        let mut fields = self.address.clone();
        if !self.display_name.trim().is_empty() {
            fields.display_name = Some(self.display_name.clone());
        }
        (!fields.is_empty()).then_some(fields)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GeocodeError {
    #[error("geocode request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("gateway returned status {0}")]
    Status(u16),

    #[error("malformed geocode response: {0}")]
    Malformed(String),

    #[error("no place found")]
    NotFound,
}

/// A geocoding backend that resolves coordinates to addresses and queries
/// to candidate places.
#[async_trait]
pub trait GeocodeService: Send + Sync + 'static {
    /// Reverse geocode a coordinate.
    async fn reverse(&self, at: LatLng) -> Result<Place, GeocodeError>;

    /// Forward geocode a free-text query, returning at most `limit` places.
    async fn forward(&self, query: &str, limit: usize) -> Result<Vec<Place>, GeocodeError>;
}

/// Forward search that degrades to an empty list: blank queries never hit
/// the network and failures are logged and swallowed.
pub async fn forward_search(
    service: &dyn GeocodeService,
    query: &str,
    limit: usize,
) -> Vec<Place> {
    let query = query.trim();
    if query.is_empty() {
        return Vec::new();
    }

    match service.forward(query, limit).await {
        Ok(mut places) => {
            places.truncate(limit);
            places
        }
        Err(e) => {
            log::warn!("forward search for {query:?} failed: {e}");
            Vec::new()
        }
    }
}

/// Reverse lookup that folds failures and empty results into `None`
pub async fn reverse_lookup(service: &dyn GeocodeService, at: LatLng) -> Option<AddressFields> {
    match service.reverse(at).await {
        Ok(place) => place.address_fields(),
        Err(e) => {
            log::warn!("reverse geocode at {at} failed: {e}");
            None
        }
    }
}
