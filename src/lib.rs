//! Immersive Analytics Interaction Core
//!
//! Hand-tracked direct manipulation of data visualisations: axis rescaling,
//! dimension scrolling, surface snapping and bimanual extrusion with cloning.
//! Rendering is left to the host through [`visualization::ChartRenderer`].

pub mod app;
pub mod config;
pub mod data;
pub mod error;
pub mod input;
pub mod prelude;
pub mod spatial;
pub mod visualization;

// Re-export main types for convenience
pub use app::{InteractionApp, InteractionEvent};
pub use config::InteractionConfig;
pub use error::{InteractionError, Result};
