use crate::core::geo::{LatLng, Point};
use serde::{Deserialize, Serialize};

/// Raw input delivered by a host (egui, a test, a browser bridge)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InputEvent {
    /// Single click/tap in container pixels
    Click {
        position: Point,
        button: MouseButton,
    },
    /// Drag in progress
    Drag { delta: Point },
    /// Viewport/window resize
    Resize { size: Point },
}

/// Map event types that can be emitted by the map
#[derive(Debug, Clone, PartialEq)]
pub enum MapEvent {
    /// Map view has changed (center or zoom)
    ViewChanged { center: LatLng, zoom: f64 },
    /// Click on the map, already converted to geographic coordinates
    Click { lat_lng: LatLng },
    /// Layer was added to the map
    LayerAdd { layer_id: String },
    /// Layer was removed from the map
    LayerRemove { layer_id: String },
}

/// Listener keys, one per `MapEvent` variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MapEventKind {
    ViewChanged,
    Click,
    LayerAdd,
    LayerRemove,
}

impl MapEvent {
    pub fn kind(&self) -> MapEventKind {
        match self {
            MapEvent::ViewChanged { .. } => MapEventKind::ViewChanged,
            MapEvent::Click { .. } => MapEventKind::Click,
            MapEvent::LayerAdd { .. } => MapEventKind::LayerAdd,
            MapEvent::LayerRemove { .. } => MapEventKind::LayerRemove,
        }
    }
}

/// Mouse button types
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Other(u16),
}

impl InputEvent {
    /// Gets the primary position associated with this event, if any
    pub fn position(&self) -> Option<Point> {
        match self {
            InputEvent::Click { position, .. } => Some(*position),
            _ => None,
        }
    }

    /// Primary-button clicks are the only ones that place markers
    pub fn is_primary_click(&self) -> bool {
        matches!(
            self,
            InputEvent::Click {
                button: MouseButton::Left,
                ..
            }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_event_position() {
        let click = InputEvent::Click {
            position: Point::new(100.0, 200.0),
            button: MouseButton::Left,
        };
        assert_eq!(click.position(), Some(Point::new(100.0, 200.0)));
        assert!(click.is_primary_click());

        let right = InputEvent::Click {
            position: Point::new(1.0, 1.0),
            button: MouseButton::Right,
        };
        assert!(!right.is_primary_click());

        let drag = InputEvent::Drag {
            delta: Point::new(5.0, 5.0),
        };
        assert_eq!(drag.position(), None);
    }

    #[test]
    fn test_event_kind() {
        let event = MapEvent::Click {
            lat_lng: LatLng::new(28.6, 77.2),
        };
        assert_eq!(event.kind(), MapEventKind::Click);
    }
}
