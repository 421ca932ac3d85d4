// LayerTrait is the shared LayerOperations trait
pub use crate::traits::LayerOperations as LayerTrait;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerType {
    Tile,
    Marker,
    Polyline,
}

impl std::fmt::Display for LayerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LayerType::Tile => write!(f, "tile"),
            LayerType::Marker => write!(f, "marker"),
            LayerType::Polyline => write!(f, "polyline"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LayerProperties {
    pub id: String,
    pub name: String,
    pub layer_type: LayerType,
    pub z_index: i32,
    pub opacity: f32,
    pub visible: bool,
}

impl LayerProperties {
    pub fn new(id: String, name: String, layer_type: LayerType) -> Self {
        // Overlays stack above the base tiles, markers above lines
        let z_index = match layer_type {
            LayerType::Tile => 0,
            LayerType::Polyline => 400,
            LayerType::Marker => 600,
        };
        Self {
            id,
            name,
            layer_type,
            z_index,
            opacity: 1.0,
            visible: true,
        }
    }
}
