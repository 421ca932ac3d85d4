use crate::{
    core::geo::{LatLng, LatLngBounds},
    layers::base::{LayerProperties, LayerTrait, LayerType},
};

#[cfg(feature = "egui")]
use egui::Color32;

use serde::{Deserialize, Serialize};

/// Serializable color type that can convert to/from egui::Color32
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

#[cfg(feature = "egui")]
impl From<SerializableColor> for Color32 {
    fn from(color: SerializableColor) -> Self {
        Color32::from_rgba_unmultiplied(color.r, color.g, color.b, color.a)
    }
}

impl SerializableColor {
    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }
}

/// Style for line features
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineStyle {
    pub color: SerializableColor,
    pub width: f32,
    pub opacity: f32,
}

impl Default for LineStyle {
    fn default() -> Self {
        // Leaflet's default path color
        Self {
            color: SerializableColor::rgb(51, 136, 255),
            width: 3.0,
            opacity: 1.0,
        }
    }
}

/// Route-preview line between the two slot markers
pub struct Polyline {
    properties: LayerProperties,
    points: Vec<LatLng>,
    style: LineStyle,
}

impl Polyline {
    pub fn new(id: String, points: Vec<LatLng>) -> Self {
        let properties = LayerProperties::new(id, "Route".to_string(), LayerType::Polyline);
        Self {
            properties,
            points,
            style: LineStyle::default(),
        }
    }

    pub fn points(&self) -> &[LatLng] {
        &self.points
    }

    pub fn set_points(&mut self, points: Vec<LatLng>) {
        self.points = points;
    }

    pub fn style(&self) -> &LineStyle {
        &self.style
    }
}

impl LayerTrait for Polyline {
    crate::impl_layer_trait!(Polyline, properties);

    fn options(&self) -> serde_json::Value {
        serde_json::json!({
            "points": self.points,
            "style": self.style,
        })
    }

    fn bounds(&self) -> Option<LatLngBounds> {
        LatLngBounds::from_points(&self.points)
    }
}
