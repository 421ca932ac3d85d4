pub mod events;
pub mod handler;

// Re-export the essential types
pub use events::{InputEvent, MapEvent, MapEventKind, MouseButton};
pub use handler::{EventCallback, EventManager};
