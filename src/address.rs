//! Parent-side address form state.
//!
//! The widget never touches this; the parent applies each
//! [`LocationUpdate`] it receives, whatever produced it (a click, a search
//! pick or the device position).

use crate::{core::geo::LatLng, geocode::address::AddressFields, widget::LocationUpdate};
use serde::{Deserialize, Serialize};

/// One address block of an order or driver form
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormAddress {
    pub name: String,
    pub phone: String,
    pub addr1: String,
    pub addr2: String,
    pub city: String,
    pub state: String,
    pub postal: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

impl FormAddress {
    /// Take the update's coordinate and refill the address lines from its
    /// fields. A missing address empties them. Contact fields are kept.
    pub fn apply(&mut self, update: &LocationUpdate) {
        let empty = AddressFields::default();
        let fields = update.address.as_ref().unwrap_or(&empty);

        self.lat = Some(update.coordinate.lat);
        self.lng = Some(update.coordinate.lng);
        self.addr1 = fields.line1();
        self.city = fields.locality().unwrap_or_default().to_string();
        self.state = fields.state().unwrap_or_default().to_string();
        self.postal = fields.postal_code().unwrap_or_default().to_string();
    }

    pub fn coordinate(&self) -> Option<LatLng> {
        match (self.lat, self.lng) {
            (Some(lat), Some(lng)) => Some(LatLng::new(lat, lng)),
            _ => None,
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_submittable(&self) -> bool {
        !self.addr1.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widget::TargetSlot;

    fn update(address: Option<AddressFields>) -> LocationUpdate {
        LocationUpdate {
            slot: TargetSlot::A,
            coordinate: LatLng::new(28.6315, 77.2167),
            address,
        }
    }

    #[test]
    fn test_apply_fills_fields() {
        let mut form = FormAddress {
            name: "Asha".into(),
            phone: "+91 98765 43210".into(),
            ..Default::default()
        };
        let fields = AddressFields {
            house_number: Some("12".into()),
            road: Some("Janpath".into()),
            town: Some("New Delhi".into()),
            state: Some("Delhi".into()),
            postcode: Some("110001".into()),
            ..Default::default()
        };
        form.apply(&update(Some(fields)));

        assert_eq!(form.addr1, "12 Janpath");
        assert_eq!(form.city, "New Delhi");
        assert_eq!(form.state, "Delhi");
        assert_eq!(form.postal, "110001");
        assert_eq!(form.name, "Asha");
        assert_eq!(form.coordinate(), Some(LatLng::new(28.6315, 77.2167)));
        assert!(form.is_submittable());
    }

    #[test]
    fn test_missing_address_empties_lines() {
        let mut form = FormAddress {
            addr1: "old".into(),
            city: "old".into(),
            ..Default::default()
        };
        form.apply(&update(None));

        assert!(form.addr1.is_empty());
        assert!(form.city.is_empty());
        assert!(form.coordinate().is_some());
        assert!(!form.is_submittable());
    }

    #[test]
    fn test_clear() {
        let mut form = FormAddress::default();
        form.apply(&update(None));
        form.clear();
        assert_eq!(form, FormAddress::default());
        assert!(form.coordinate().is_none());
    }
}
