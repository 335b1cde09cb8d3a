//! # Input Module
//!
//! Hand tracking and the normalised gesture stream that drives every
//! interaction state machine.
//!
//! ## Key Components
//!
//! - [`HandPoseTracker`] - Finger-closed, pinch-count and open-palm signals
//! - [`JointPoseProvider`] - Seam to the headset's joint service
//! - [`GestureEvent`] - Press/drag/release and manipulation events in frame order

pub mod gesture;
pub mod hand_pose;

pub use gesture::{GestureEvent, GestureTarget};
pub use hand_pose::{
    Finger, HandJoint, HandPoseConfig, HandPoseTracker, Handedness, JointPose, JointPoseProvider,
    RecordedHandPoses,
};
