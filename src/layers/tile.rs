use crate::{
    core::config::TileLayerOptions,
    layers::base::{LayerProperties, LayerTrait, LayerType},
};

/// Base raster layer. The engine only tracks its presence and attribution;
/// fetching and painting tiles is left to the host.
pub struct TileLayer {
    properties: LayerProperties,
    options: TileLayerOptions,
}

impl TileLayer {
    pub fn new(id: String, options: TileLayerOptions) -> Self {
        let properties = LayerProperties::new(id, "Base tiles".to_string(), LayerType::Tile);
        Self {
            properties,
            options,
        }
    }

    pub fn openstreetmap(id: String) -> Self {
        Self::new(id, TileLayerOptions::default())
    }

    pub fn attribution(&self) -> &str {
        &self.options.attribution
    }
}

impl LayerTrait for TileLayer {
    crate::impl_layer_trait!(TileLayer, properties);

    fn options(&self) -> serde_json::Value {
        serde_json::json!({
            "url_template": self.options.url_template,
            "max_zoom": self.options.max_zoom,
            "attribution": self.options.attribution,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_describe_the_base_layer() {
        let layer = TileLayer::openstreetmap("osm".to_string());
        let options = layer.options();
        assert_eq!(options["max_zoom"], 19.0);
        assert!(options["url_template"]
            .as_str()
            .unwrap()
            .contains("tile.openstreetmap.org"));
        assert!(layer.attribution().contains("OpenStreetMap"));
        assert_eq!(layer.layer_type(), LayerType::Tile);
    }
}
