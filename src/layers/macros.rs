//! Macros to reduce boilerplate in layer implementations

/// Implements the property-backed `LayerTrait` accessors:
/// id/name/type, z-index, opacity, visibility and `as_any` casting.
///
/// Usage:
/// ```ignore
/// impl LayerTrait for MyLayer {
///     crate::impl_layer_trait!(MyLayer, properties);
///     // options() and bounds() are written by hand
/// }
/// ```
#[macro_export]
macro_rules! impl_layer_trait {
    ($layer_type:ty, $properties_field:ident) => {
        fn id(&self) -> &str {
            &self.$properties_field.id
        }

        fn name(&self) -> &str {
            &self.$properties_field.name
        }

        fn layer_type(&self) -> $crate::layers::base::LayerType {
            self.$properties_field.layer_type
        }

        fn z_index(&self) -> i32 {
            self.$properties_field.z_index
        }

        fn opacity(&self) -> f32 {
            self.$properties_field.opacity
        }

        fn is_visible(&self) -> bool {
            self.$properties_field.visible
        }

        fn as_any(&self) -> &dyn std::any::Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
            self
        }
    };
}
