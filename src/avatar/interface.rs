use glam::Quat;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// ── Error Types ────────────────────────────────────────

#[derive(Debug, Error)]
pub enum AvatarError {
    #[error("Unknown emotion label: {0}")]
    UnknownEmotion(String),
    #[error("Invalid animator config: {0}")]
    InvalidConfig(String),
    #[error("Invalid gesture '{name}': {reason}")]
    InvalidGesture { name: String, reason: String },
    #[error("Config I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Config serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AvatarError>;

// ── Emotion ────────────────────────────────────────────

/// The six expressive states a reply can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Happy,
    Surprised,
    Shy,
    Sad,
    #[default]
    Neutral,
    Angry,
}

impl Emotion {
    pub const ALL: [Emotion; 6] = [
        Emotion::Happy,
        Emotion::Surprised,
        Emotion::Shy,
        Emotion::Sad,
        Emotion::Neutral,
        Emotion::Angry,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Emotion::Happy => "happy",
            Emotion::Surprised => "surprised",
            Emotion::Shy => "shy",
            Emotion::Sad => "sad",
            Emotion::Neutral => "neutral",
            Emotion::Angry => "angry",
        }
    }

    /// Parse a label coming from model output. Unknown labels become `Neutral`.
    pub fn parse_lenient(label: &str) -> Self {
        match label.parse() {
            Ok(emotion) => emotion,
            Err(_) => {
                tracing::debug!(label, "unknown emotion label, using neutral");
                Emotion::Neutral
            }
        }
    }
}

impl FromStr for Emotion {
    type Err = AvatarError;

    fn from_str(s: &str) -> Result<Self> {
        let label = s.trim().to_ascii_lowercase();
        Emotion::ALL
            .into_iter()
            .find(|e| e.as_str() == label)
            .ok_or_else(|| AvatarError::UnknownEmotion(s.to_string()))
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Humanoid Rig ───────────────────────────────────────

/// Bones driven by the animator. Names match the VRM humanoid bone names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HumanoidBone {
    Hips,
    Spine,
    Neck,
    Head,
    LeftShoulder,
    RightShoulder,
    LeftUpperArm,
    RightUpperArm,
    LeftLowerArm,
    RightLowerArm,
    LeftHand,
    RightHand,
}

impl HumanoidBone {
    pub const COUNT: usize = 12;

    pub const ALL: [HumanoidBone; Self::COUNT] = [
        HumanoidBone::Hips,
        HumanoidBone::Spine,
        HumanoidBone::Neck,
        HumanoidBone::Head,
        HumanoidBone::LeftShoulder,
        HumanoidBone::RightShoulder,
        HumanoidBone::LeftUpperArm,
        HumanoidBone::RightUpperArm,
        HumanoidBone::LeftLowerArm,
        HumanoidBone::RightLowerArm,
        HumanoidBone::LeftHand,
        HumanoidBone::RightHand,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            HumanoidBone::Hips => "hips",
            HumanoidBone::Spine => "spine",
            HumanoidBone::Neck => "neck",
            HumanoidBone::Head => "head",
            HumanoidBone::LeftShoulder => "leftShoulder",
            HumanoidBone::RightShoulder => "rightShoulder",
            HumanoidBone::LeftUpperArm => "leftUpperArm",
            HumanoidBone::RightUpperArm => "rightUpperArm",
            HumanoidBone::LeftLowerArm => "leftLowerArm",
            HumanoidBone::RightLowerArm => "rightLowerArm",
            HumanoidBone::LeftHand => "leftHand",
            HumanoidBone::RightHand => "rightHand",
        }
    }
}

/// A full set of bone rotations relative to the bind pose.
///
/// Built fresh every frame; the animator never edits a pose that has
/// already been handed to a model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BonePose {
    rotations: [Quat; HumanoidBone::COUNT],
}

impl BonePose {
    pub fn identity() -> Self {
        Self {
            rotations: [Quat::IDENTITY; HumanoidBone::COUNT],
        }
    }

    pub fn from_fn(mut f: impl FnMut(HumanoidBone) -> Quat) -> Self {
        let mut rotations = [Quat::IDENTITY; HumanoidBone::COUNT];
        for bone in HumanoidBone::ALL {
            rotations[bone.index()] = f(bone);
        }
        Self { rotations }
    }

    pub fn get(&self, bone: HumanoidBone) -> Quat {
        self.rotations[bone.index()]
    }

    /// Returns a copy with one bone replaced.
    pub fn with(mut self, bone: HumanoidBone, rotation: Quat) -> Self {
        self.rotations[bone.index()] = rotation;
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (HumanoidBone, Quat)> + '_ {
        HumanoidBone::ALL
            .into_iter()
            .map(move |bone| (bone, self.rotations[bone.index()]))
    }
}

impl Default for BonePose {
    fn default() -> Self {
        Self::identity()
    }
}

// ── Expression Channels ────────────────────────────────

/// Facial blend-shape weights, named after the VRM preset expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpressionChannel {
    Happy,
    Angry,
    Sad,
    Surprised,
    Relaxed,
    Blink,
    Aa,
    Oh,
}

impl ExpressionChannel {
    pub const COUNT: usize = 8;

    pub const ALL: [ExpressionChannel; Self::COUNT] = [
        ExpressionChannel::Happy,
        ExpressionChannel::Angry,
        ExpressionChannel::Sad,
        ExpressionChannel::Surprised,
        ExpressionChannel::Relaxed,
        ExpressionChannel::Blink,
        ExpressionChannel::Aa,
        ExpressionChannel::Oh,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            ExpressionChannel::Happy => "happy",
            ExpressionChannel::Angry => "angry",
            ExpressionChannel::Sad => "sad",
            ExpressionChannel::Surprised => "surprised",
            ExpressionChannel::Relaxed => "relaxed",
            ExpressionChannel::Blink => "blink",
            ExpressionChannel::Aa => "aa",
            ExpressionChannel::Oh => "oh",
        }
    }
}

// ── Model Sinks ────────────────────────────────────────

/// A loaded humanoid model the animator writes into.
///
/// Implementations wrap whatever the renderer uses for its skeleton and
/// blend shapes. Bones the skeleton lacks are reported through
/// `has_bone` and never written.
pub trait AvatarModel {
    fn has_bone(&self, bone: HumanoidBone) -> bool;

    fn set_bone_rotation(&mut self, bone: HumanoidBone, rotation: Quat);

    fn set_expression_weight(&mut self, channel: ExpressionChannel, value: f32);

    /// Restore every bone to the bind pose.
    fn reset_pose(&mut self);

    /// Write a full pose, skipping bones the skeleton does not have.
    fn set_pose(&mut self, pose: &BonePose) {
        for (bone, rotation) in pose.iter() {
            if self.has_bone(bone) {
                self.set_bone_rotation(bone, rotation);
            }
        }
    }

    fn reset_expressions(&mut self) {
        for channel in ExpressionChannel::ALL {
            self.set_expression_weight(channel, 0.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emotion_parse_is_case_insensitive() {
        assert_eq!("Happy".parse::<Emotion>().unwrap(), Emotion::Happy);
        assert_eq!(" sad ".parse::<Emotion>().unwrap(), Emotion::Sad);
    }

    #[test]
    fn strict_parse_rejects_unknown_label() {
        let err = "confused".parse::<Emotion>().unwrap_err();
        assert!(matches!(err, AvatarError::UnknownEmotion(ref l) if l == "confused"));
    }

    #[test]
    fn lenient_parse_falls_back_to_neutral() {
        assert_eq!(Emotion::parse_lenient("excited"), Emotion::Neutral);
        assert_eq!(Emotion::parse_lenient("angry"), Emotion::Angry);
    }

    #[test]
    fn emotion_serde_uses_lowercase_labels() {
        let json = serde_json::to_string(&Emotion::Surprised).unwrap();
        assert_eq!(json, "\"surprised\"");
        let back: Emotion = serde_json::from_str("\"shy\"").unwrap();
        assert_eq!(back, Emotion::Shy);
    }

    #[test]
    fn bone_indices_match_all_order() {
        for (i, bone) in HumanoidBone::ALL.iter().enumerate() {
            assert_eq!(bone.index(), i, "{} out of order", bone.name());
        }
    }

    #[test]
    fn pose_with_replaces_single_bone() {
        let q = Quat::from_rotation_x(0.3);
        let pose = BonePose::identity().with(HumanoidBone::Head, q);
        assert_eq!(pose.get(HumanoidBone::Head), q);
        assert_eq!(pose.get(HumanoidBone::Neck), Quat::IDENTITY);
        assert_eq!(pose.iter().count(), HumanoidBone::COUNT);
    }

    struct PartialRig {
        written: Vec<HumanoidBone>,
    }

    impl AvatarModel for PartialRig {
        fn has_bone(&self, bone: HumanoidBone) -> bool {
            !matches!(bone, HumanoidBone::LeftLowerArm | HumanoidBone::RightLowerArm)
        }
        fn set_bone_rotation(&mut self, bone: HumanoidBone, _rotation: Quat) {
            self.written.push(bone);
        }
        fn set_expression_weight(&mut self, _channel: ExpressionChannel, _value: f32) {}
        fn reset_pose(&mut self) {}
    }

    #[test]
    fn set_pose_skips_missing_bones() {
        let mut rig = PartialRig { written: Vec::new() };
        rig.set_pose(&BonePose::identity());
        assert_eq!(rig.written.len(), HumanoidBone::COUNT - 2);
        assert!(!rig.written.contains(&HumanoidBone::LeftLowerArm));
    }
}
