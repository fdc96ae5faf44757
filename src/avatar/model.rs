//! In-memory avatar model that records what the animator writes.

use glam::Quat;

use super::interface::{AvatarModel, BonePose, ExpressionChannel, HumanoidBone};

/// A model with no renderer behind it. Keeps the last pose and expression
/// weights so they can be inspected.
#[derive(Debug, Clone)]
pub struct HeadlessAvatar {
    name: String,
    pose: BonePose,
    expressions: [f32; ExpressionChannel::COUNT],
    present: [bool; HumanoidBone::COUNT],
    bone_writes: u64,
}

impl HeadlessAvatar {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pose: BonePose::identity(),
            expressions: [0.0; ExpressionChannel::COUNT],
            present: [true; HumanoidBone::COUNT],
            bone_writes: 0,
        }
    }

    /// Drop bones from the skeleton, as some rigs lack optional joints.
    pub fn without_bones(mut self, bones: impl IntoIterator<Item = HumanoidBone>) -> Self {
        for bone in bones {
            self.present[bone.index()] = false;
        }
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pose(&self) -> &BonePose {
        &self.pose
    }

    pub fn rotation(&self, bone: HumanoidBone) -> Quat {
        self.pose.get(bone)
    }

    pub fn expression(&self, channel: ExpressionChannel) -> f32 {
        self.expressions[channel.index()]
    }

    /// Number of individual bone rotations written so far.
    pub fn bone_writes(&self) -> u64 {
        self.bone_writes
    }
}

impl AvatarModel for HeadlessAvatar {
    fn has_bone(&self, bone: HumanoidBone) -> bool {
        self.present[bone.index()]
    }

    fn set_bone_rotation(&mut self, bone: HumanoidBone, rotation: Quat) {
        self.pose = self.pose.with(bone, rotation);
        self.bone_writes += 1;
    }

    fn set_expression_weight(&mut self, channel: ExpressionChannel, value: f32) {
        self.expressions[channel.index()] = value;
    }

    fn reset_pose(&mut self) {
        self.pose = BonePose::identity();
    }
}
