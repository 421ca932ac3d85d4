//! Shared trait abstractions for common patterns

use crate::Result;

/// Trait for layer-like objects owned by the map engine
pub trait LayerOperations: Send + Sync {
    /// Get layer ID
    fn id(&self) -> &str;

    /// Get layer name
    fn name(&self) -> &str;

    /// Get layer type
    fn layer_type(&self) -> crate::layers::base::LayerType;

    /// Check if layer is visible
    fn is_visible(&self) -> bool;

    /// Get layer opacity (0.0 to 1.0)
    fn opacity(&self) -> f32;

    /// Get layer z-index for ordering
    fn z_index(&self) -> i32;

    /// Get layer bounds if applicable
    fn bounds(&self) -> Option<crate::core::geo::LatLngBounds> {
        None
    }

    /// Get layer options
    fn options(&self) -> serde_json::Value;

    /// Dynamic casting support
    fn as_any(&self) -> &dyn std::any::Any;
    fn as_any_mut(&mut self) -> &mut dyn std::any::Any;
}

/// Trait for configurable components
pub trait Configurable {
    type Config: Clone;

    /// Get the current configuration
    fn config(&self) -> &Self::Config;

    /// Set new configuration
    fn set_config(&mut self, config: Self::Config) -> Result<()>;

    /// Validate configuration
    fn validate_config(config: &Self::Config) -> Result<()> {
        let _ = config;
        Ok(())
    }

    /// Update configuration with a partial change
    fn update_config<F>(&mut self, updater: F) -> Result<()>
    where
        F: FnOnce(&mut Self::Config),
    {
        let mut config = self.config().clone();
        updater(&mut config);
        Self::validate_config(&config)?;
        self.set_config(config)
    }
}
