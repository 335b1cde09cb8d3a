//! # Prelude
//!
//! Commonly used types, so hosts can get started with a single import.
//!
//! ```no_run
//! use immersive_analytics::prelude::*;
//! use std::sync::Arc;
//!
//! fn main() -> Result<()> {
//!     let data = InMemoryDataSource::new().with_numeric_column("mpg", &[18.0, 24.0, 31.0]);
//!     let mut app = InteractionApp::new(Arc::new(data), RecordedHandPoses::new());
//!     let id = app.create_random_2d(&Transform::identity())?;
//!     app.add_extrusion_handle(id, None)?;
//!     app.tick(1.0 / 60.0);
//!     for event in app.drain_events() {
//!         println!("{:?}", event);
//!     }
//!     Ok(())
//! }
//! ```

// Re-export core application types
pub use crate::app::{InteractionApp, InteractionEvent};
pub use crate::config::InteractionConfig;
pub use crate::error::{InteractionError, Result};

// Re-export data types
pub use crate::data::{DataSource, DataType, DataValue, InMemoryDataSource, UNDEFINED_ATTRIBUTE};

// Re-export input types
pub use crate::input::{
    GestureEvent, GestureTarget, HandPoseTracker, Handedness, JointPose, JointPoseProvider, RecordedHandPoses,
};

// Re-export spatial types
pub use crate::spatial::{AxisDimension, BoxCollider, Transform};

// Re-export visualization types
pub use crate::visualization::{
    ChartRenderer, ChartType, Colour, ExtrusionConfig, ExtrusionDirection, GeometryType, PropertyType, Surface,
    SurfaceId, VisualizationDescriptor, VisualizationObject,
};
