use crate::{layers::base::LayerTrait, MapError, Result};

use crate::prelude::HashMap;

/// Owns the map's layers, keeping them ordered by z-index
pub struct LayerManager {
    /// All layers indexed by ID
    layers: HashMap<String, Box<dyn LayerTrait>>,
    /// Ordered list of layer IDs for drawing (sorted by z-index)
    render_order: Vec<String>,
}

impl LayerManager {
    pub fn new() -> Self {
        Self {
            layers: HashMap::default(),
            render_order: Vec::new(),
        }
    }

    /// Adds a layer to the manager. IDs are unique; re-adding an ID is an error.
    pub fn add_layer(&mut self, layer: Box<dyn LayerTrait>) -> Result<()> {
        let layer_id = layer.id().to_string();
        if self.layers.contains_key(&layer_id) {
            return Err(MapError::Layer(format!("duplicate layer id {layer_id}")).into());
        }
        let z_index = layer.z_index();

        self.layers.insert(layer_id.clone(), layer);

        // Insert in sorted order by z-index
        let insert_pos = self
            .render_order
            .iter()
            .position(|id| {
                self.layers
                    .get(id)
                    .map(|l| l.z_index() > z_index)
                    .unwrap_or(false)
            })
            .unwrap_or(self.render_order.len());

        self.render_order.insert(insert_pos, layer_id);
        Ok(())
    }

    /// Removes a layer from the manager
    pub fn remove_layer(&mut self, layer_id: &str) -> Option<Box<dyn LayerTrait>> {
        self.render_order.retain(|id| id != layer_id);
        self.layers.remove(layer_id)
    }

    /// Gets a reference to a layer by ID
    pub fn get_layer(&self, layer_id: &str) -> Option<&dyn LayerTrait> {
        self.layers.get(layer_id).map(|l| l.as_ref())
    }

    /// Gets a layer downcast to its concrete type
    pub fn get_as<T: 'static>(&self, layer_id: &str) -> Option<&T> {
        self.layers
            .get(layer_id)
            .and_then(|l| l.as_any().downcast_ref::<T>())
    }

    /// Applies a function to a layer downcast to its concrete type
    pub fn with_layer_as<T, F, R>(&mut self, layer_id: &str, f: F) -> Option<R>
    where
        T: 'static,
        F: FnOnce(&mut T) -> R,
    {
        self.layers
            .get_mut(layer_id)
            .and_then(|l| l.as_any_mut().downcast_mut::<T>())
            .map(f)
    }

    /// Gets all layers in render order
    pub fn layers(&self) -> Vec<&dyn LayerTrait> {
        self.render_order
            .iter()
            .filter_map(|id| self.layers.get(id).map(|l| l.as_ref()))
            .collect()
    }

    /// Drops every layer, returning the IDs that were released
    pub fn clear(&mut self) -> Vec<String> {
        self.layers.clear();
        std::mem::take(&mut self.render_order)
    }

    /// Gets the number of layers
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Checks if the manager is empty
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

impl Default for LayerManager {
    fn default() -> Self {
        Self::new()
    }
}
