//! # Hand Pose Tracker
//!
//! Stateless gesture signals derived from per-frame hand-joint poses. The joint
//! data itself comes from a [`JointPoseProvider`], which is shared read-only by
//! every gesture consumer during a frame.

use cgmath::{Deg, InnerSpace, MetricSpace, Quaternion, Rotation, Vector3};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Which hand a joint or gesture belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Handedness {
    Left,
    Right,
}

impl Handedness {
    pub fn label(self) -> &'static str {
        match self {
            Handedness::Left => "left",
            Handedness::Right => "right",
        }
    }
}

/// Tracked joints the interaction core reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandJoint {
    Palm,
    ThumbTip,
    IndexKnuckle,
    IndexTip,
    MiddleKnuckle,
    MiddleTip,
    RingKnuckle,
    RingTip,
    PinkyKnuckle,
    PinkyTip,
}

/// Non-thumb fingers, in the order touching tests evaluate them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Finger {
    Index,
    Middle,
    Ring,
    Pinky,
}

impl Finger {
    pub const ALL: [Finger; 4] = [Finger::Index, Finger::Middle, Finger::Ring, Finger::Pinky];

    pub fn tip(self) -> HandJoint {
        match self {
            Finger::Index => HandJoint::IndexTip,
            Finger::Middle => HandJoint::MiddleTip,
            Finger::Ring => HandJoint::RingTip,
            Finger::Pinky => HandJoint::PinkyTip,
        }
    }

    pub fn knuckle(self) -> HandJoint {
        match self {
            Finger::Index => HandJoint::IndexKnuckle,
            Finger::Middle => HandJoint::MiddleKnuckle,
            Finger::Ring => HandJoint::RingKnuckle,
            Finger::Pinky => HandJoint::PinkyKnuckle,
        }
    }
}

/// World-space pose of a single joint
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointPose {
    pub position: Vector3<f32>,
    pub rotation: Quaternion<f32>,
}

impl JointPose {
    pub fn new(position: Vector3<f32>, rotation: Quaternion<f32>) -> Self {
        Self { position, rotation }
    }

    /// Pose with identity rotation
    pub fn at(position: Vector3<f32>) -> Self {
        Self::new(position, Quaternion::new(1.0, 0.0, 0.0, 0.0))
    }

    /// The joint's local +Y in world space
    pub fn up(&self) -> Vector3<f32> {
        self.rotation.rotate_vector(Vector3::unit_y())
    }
}

/// Source of hand-joint poses (headset runtime, recording, simulator)
pub trait JointPoseProvider {
    /// Whether the hand is currently tracked at all
    fn is_hand_tracked(&self, hand: Handedness) -> bool;

    /// Pose of a joint, or `None` when it is not available this frame
    fn joint_pose(&self, hand: Handedness, joint: HandJoint) -> Option<JointPose>;
}

/// Distance and angle thresholds for gesture signals
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HandPoseConfig {
    /// Tip-to-knuckle distance below which a finger counts as closed
    pub finger_closed_distance: f32,
    /// Thumb-to-fingertip distance below which a finger counts as touching
    pub touching_distance: f32,
    /// Maximum angle between palm up and the hand triangle normal for an open palm
    pub palm_open_angle_degrees: f32,
}

impl Default for HandPoseConfig {
    fn default() -> Self {
        Self {
            finger_closed_distance: 0.04,
            touching_distance: 0.03,
            palm_open_angle_degrees: 45.0,
        }
    }
}

/// Derives gesture signals from a joint provider
pub struct HandPoseTracker<P> {
    provider: P,
    config: HandPoseConfig,
}

impl<P: JointPoseProvider> HandPoseTracker<P> {
    /// Create a tracker with default thresholds
    pub fn new(provider: P) -> Self {
        Self::with_config(provider, HandPoseConfig::default())
    }

    /// Create a tracker with custom thresholds
    pub fn with_config(provider: P, config: HandPoseConfig) -> Self {
        Self { provider, config }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn provider_mut(&mut self) -> &mut P {
        &mut self.provider
    }

    pub fn config(&self) -> &HandPoseConfig {
        &self.config
    }

    /// Index fingertip pose of a tracked hand
    pub fn fingertip(&self, hand: Handedness) -> Option<JointPose> {
        if !self.provider.is_hand_tracked(hand) {
            return None;
        }
        self.provider.joint_pose(hand, HandJoint::IndexTip)
    }

    /// A finger is closed when its tip is close to its knuckle.
    ///
    /// Missing joints count as open.
    pub fn is_finger_closed(&self, hand: Handedness, finger: Finger) -> bool {
        self.joint_distance(hand, finger.tip(), finger.knuckle()) < self.config.finger_closed_distance
    }

    /// Count of fingers pinched against the thumb.
    ///
    /// Fingers are tested index, middle, ring, pinky and counting stops at the
    /// first one that is not touching. A touching index alone reports 2 rather
    /// than 1, so the possible results are 0, 2, 3, 4 and 5.
    pub fn touching_finger_count(&self, hand: Handedness) -> u8 {
        if !self.provider.is_hand_tracked(hand) {
            return 0;
        }

        let touching = |finger: Finger| {
            self.joint_distance(hand, HandJoint::ThumbTip, finger.tip()) <= self.config.touching_distance
        };

        if !touching(Finger::Index) {
            return 0;
        }
        if !touching(Finger::Middle) {
            return 2;
        }
        if !touching(Finger::Ring) {
            return 3;
        }
        if !touching(Finger::Pinky) {
            return 4;
        }
        5
    }

    /// Whether the palm faces along its own up vector with the fingers spread.
    ///
    /// The hand triangle normal is `(index - palm) x (ring - index)`, mirrored for
    /// the left hand. The palm is open when that normal is within the configured
    /// angle of the palm's up vector.
    pub fn is_palm_open(&self, hand: Handedness) -> bool {
        if !self.provider.is_hand_tracked(hand) {
            return false;
        }

        let (Some(palm), Some(index), Some(ring)) = (
            self.provider.joint_pose(hand, HandJoint::Palm),
            self.provider.joint_pose(hand, HandJoint::IndexTip),
            self.provider.joint_pose(hand, HandJoint::RingTip),
        ) else {
            return false;
        };

        let normal = (index.position - palm.position).cross(ring.position - index.position);
        if normal.magnitude2() <= f32::EPSILON {
            return false;
        }
        let mirror = match hand {
            Handedness::Right => 1.0,
            Handedness::Left => -1.0,
        };
        let normal = normal.normalize() * mirror;

        let angle: Deg<f32> = palm.up().angle(normal).into();
        angle.0 <= self.config.palm_open_angle_degrees
    }

    fn joint_distance(&self, hand: Handedness, a: HandJoint, b: HandJoint) -> f32 {
        match (self.provider.joint_pose(hand, a), self.provider.joint_pose(hand, b)) {
            (Some(a), Some(b)) => a.position.distance(b.position),
            _ => f32::INFINITY,
        }
    }
}

/// Joint poses held in memory, fed by a recording, simulator or test
#[derive(Debug, Clone, Default)]
pub struct RecordedHandPoses {
    joints: HashMap<(Handedness, HandJoint), JointPose>,
    tracked: HashSet<Handedness>,
}

impl RecordedHandPoses {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a joint pose and mark its hand as tracked
    pub fn set_joint(&mut self, hand: Handedness, joint: HandJoint, pose: JointPose) {
        self.tracked.insert(hand);
        self.joints.insert((hand, joint), pose);
    }

    /// Convenience for moving the index fingertip
    pub fn set_fingertip(&mut self, hand: Handedness, position: Vector3<f32>) {
        let rotation = self
            .joints
            .get(&(hand, HandJoint::IndexTip))
            .map(|p| p.rotation)
            .unwrap_or(Quaternion::new(1.0, 0.0, 0.0, 0.0));
        self.set_joint(hand, HandJoint::IndexTip, JointPose::new(position, rotation));
    }

    /// Forget a hand entirely (tracking lost)
    pub fn clear_hand(&mut self, hand: Handedness) {
        self.tracked.remove(&hand);
        self.joints.retain(|(h, _), _| *h != hand);
    }
}

impl JointPoseProvider for RecordedHandPoses {
    fn is_hand_tracked(&self, hand: Handedness) -> bool {
        self.tracked.contains(&hand)
    }

    fn joint_pose(&self, hand: Handedness, joint: HandJoint) -> Option<JointPose> {
        self.joints.get(&(hand, joint)).copied()
    }
}
