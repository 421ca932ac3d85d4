use crate::{
    core::geo::{LatLng, LatLngBounds},
    layers::base::{LayerProperties, LayerTrait, LayerType},
};

pub struct Marker {
    properties: LayerProperties,
    position: LatLng,
    tooltip: Option<String>,
}

impl Marker {
    pub fn new(id: String, position: LatLng) -> Self {
        let properties = LayerProperties::new(id, "Marker".to_string(), LayerType::Marker);
        Self {
            properties,
            position,
            tooltip: None,
        }
    }

    pub fn with_tooltip(mut self, text: impl Into<String>) -> Self {
        self.tooltip = Some(text.into());
        self
    }

    pub fn position(&self) -> LatLng {
        self.position
    }

    pub fn set_position(&mut self, position: LatLng) {
        self.position = position;
    }

    pub fn tooltip(&self) -> Option<&str> {
        self.tooltip.as_deref()
    }
}

impl LayerTrait for Marker {
    crate::impl_layer_trait!(Marker, properties);

    fn options(&self) -> serde_json::Value {
        serde_json::json!({
            "position": {
                "lat": self.position.lat,
                "lng": self.position.lng
            },
            "tooltip": self.tooltip
        })
    }

    fn bounds(&self) -> Option<LatLngBounds> {
        Some(LatLngBounds::new(self.position, self.position))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_move_keeps_identity() {
        let mut marker = Marker::new("marker-a".to_string(), LatLng::new(28.61, 77.20))
            .with_tooltip("Pickup");
        marker.set_position(LatLng::new(28.70, 77.10));

        assert_eq!(marker.id(), "marker-a");
        assert_eq!(marker.position(), LatLng::new(28.70, 77.10));
        assert_eq!(marker.tooltip(), Some("Pickup"));
        assert_eq!(marker.options()["position"]["lat"], 28.70);
    }
}
