//! Gesture Library: hand-authored keyframed bone animations.
//!
//! Each gesture is a short sequence of partial poses over normalized time.
//! Keyframes at 0 and 1 are identity so a gesture leaves and returns to
//! the idle baseline without a visible jump. Which gestures an emotion may
//! trigger is an exhaustive table on `Emotion`.

use glam::Quat;
use once_cell::sync::Lazy;

use super::interface::{AvatarError, Emotion, HumanoidBone, Result};
use super::quat::{compose, quat_x, quat_y, quat_z, same_rotation};

use HumanoidBone::*;

/// An authored partial pose at a point in normalized gesture time.
#[derive(Debug, Clone)]
pub struct GestureKeyframe {
    pub time: f32,
    pub pose: Vec<(HumanoidBone, Quat)>,
}

impl GestureKeyframe {
    pub fn new(time: f32, pose: &[(HumanoidBone, Quat)]) -> Self {
        Self {
            time,
            pose: pose.to_vec(),
        }
    }

    /// Bones this keyframe leaves out are at bind pose.
    pub fn rotation(&self, bone: HumanoidBone) -> Quat {
        self.pose
            .iter()
            .find(|(b, _)| *b == bone)
            .map(|(_, q)| *q)
            .unwrap_or(Quat::IDENTITY)
    }
}

#[derive(Debug, Clone)]
pub struct GestureDefinition {
    pub name: &'static str,
    /// Playback length in seconds.
    pub duration: f32,
    pub keyframes: Vec<GestureKeyframe>,
    affects: [bool; HumanoidBone::COUNT],
}

impl GestureDefinition {
    pub fn new(name: &'static str, duration: f32, keyframes: Vec<GestureKeyframe>) -> Self {
        let mut affects = [false; HumanoidBone::COUNT];
        for kf in &keyframes {
            for (bone, _) in &kf.pose {
                affects[bone.index()] = true;
            }
        }
        Self {
            name,
            duration,
            keyframes,
            affects,
        }
    }

    /// Whether any keyframe of this gesture names `bone`.
    pub fn affects(&self, bone: HumanoidBone) -> bool {
        self.affects[bone.index()]
    }

    pub fn affected_bones(&self) -> impl Iterator<Item = HumanoidBone> + '_ {
        HumanoidBone::ALL.into_iter().filter(|b| self.affects(*b))
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: &str| AvatarError::InvalidGesture {
            name: self.name.to_string(),
            reason: reason.to_string(),
        };

        if !(self.duration > 0.0) {
            return Err(invalid("duration must be positive"));
        }
        let (first, last) = match (self.keyframes.first(), self.keyframes.last()) {
            (Some(f), Some(l)) if self.keyframes.len() >= 2 => (f, l),
            _ => return Err(invalid("needs at least two keyframes")),
        };
        if first.time != 0.0 || last.time != 1.0 {
            return Err(invalid("keyframes must span 0..1"));
        }
        if self.keyframes.windows(2).any(|w| w[1].time < w[0].time) {
            return Err(invalid("keyframe times must be non-decreasing"));
        }
        for kf in [first, last] {
            if kf.pose.iter().any(|(_, q)| !same_rotation(*q, Quat::IDENTITY, 1e-6)) {
                return Err(invalid("first and last keyframes must be identity"));
            }
        }
        Ok(())
    }
}

fn kf(time: f32, pose: &[(HumanoidBone, Quat)]) -> GestureKeyframe {
    GestureKeyframe::new(time, pose)
}

// ── Catalog ────────────────────────────────────────────

/// Every gesture the animator can play. Fixed at startup.
pub static GESTURE_CATALOG: Lazy<Vec<GestureDefinition>> = Lazy::new(|| {
    vec![
        GestureDefinition::new(
            "nod",
            1.2,
            vec![
                kf(0.0, &[]),
                kf(0.3, &[(Head, quat_x(12.0)), (Neck, quat_x(4.0))]),
                kf(0.55, &[(Head, quat_x(-3.0))]),
                kf(0.8, &[(Head, quat_x(8.0)), (Neck, quat_x(2.0))]),
                kf(1.0, &[]),
            ],
        ),
        GestureDefinition::new(
            "head_tilt",
            1.8,
            vec![
                kf(0.0, &[]),
                kf(
                    0.35,
                    &[(Head, compose(quat_z(10.0), quat_y(-4.0))), (Neck, quat_z(4.0))],
                ),
                kf(
                    0.7,
                    &[(Head, compose(quat_z(9.0), quat_y(-3.0))), (Neck, quat_z(3.0))],
                ),
                kf(1.0, &[]),
            ],
        ),
        GestureDefinition::new(
            "thinking",
            3.0,
            vec![
                kf(0.0, &[]),
                kf(
                    0.25,
                    &[
                        (Head, compose(quat_z(-8.0), quat_x(-5.0))),
                        (RightUpperArm, compose(quat_z(-55.0), quat_y(35.0))),
                        (RightLowerArm, quat_y(-110.0)),
                        (RightHand, quat_z(-15.0)),
                    ],
                ),
                kf(
                    0.75,
                    &[
                        (Head, compose(quat_z(-10.0), quat_x(-7.0))),
                        (RightUpperArm, compose(quat_z(-55.0), quat_y(35.0))),
                        (RightLowerArm, quat_y(-115.0)),
                        (RightHand, quat_z(-15.0)),
                    ],
                ),
                kf(1.0, &[]),
            ],
        ),
        GestureDefinition::new(
            "excited",
            1.6,
            vec![
                kf(0.0, &[]),
                kf(
                    0.25,
                    &[
                        (LeftUpperArm, quat_z(35.0)),
                        (RightUpperArm, quat_z(-35.0)),
                        (Spine, quat_x(-3.0)),
                        (Head, quat_x(-6.0)),
                    ],
                ),
                kf(
                    0.5,
                    &[
                        (LeftUpperArm, quat_z(50.0)),
                        (RightUpperArm, quat_z(-50.0)),
                        (Spine, quat_x(1.0)),
                        (Head, quat_x(2.0)),
                    ],
                ),
                kf(
                    0.75,
                    &[
                        (LeftUpperArm, quat_z(35.0)),
                        (RightUpperArm, quat_z(-35.0)),
                        (Spine, quat_x(-3.0)),
                        (Head, quat_x(-6.0)),
                    ],
                ),
                kf(1.0, &[]),
            ],
        ),
        GestureDefinition::new(
            "wave",
            2.2,
            vec![
                kf(0.0, &[]),
                kf(
                    0.2,
                    &[
                        (RightUpperArm, quat_z(60.0)),
                        (RightLowerArm, quat_z(30.0)),
                        (Head, quat_z(-4.0)),
                    ],
                ),
                kf(0.4, &[(RightUpperArm, quat_z(60.0)), (RightLowerArm, quat_z(60.0))]),
                kf(0.6, &[(RightUpperArm, quat_z(60.0)), (RightLowerArm, quat_z(30.0))]),
                kf(
                    0.8,
                    &[
                        (RightUpperArm, quat_z(60.0)),
                        (RightLowerArm, quat_z(60.0)),
                        (Head, quat_z(-4.0)),
                    ],
                ),
                kf(1.0, &[]),
            ],
        ),
        GestureDefinition::new(
            "shy",
            2.4,
            vec![
                kf(0.0, &[]),
                kf(
                    0.3,
                    &[
                        (Head, compose(compose(quat_x(14.0), quat_z(8.0)), quat_y(-10.0))),
                        (Spine, quat_x(5.0)),
                        (LeftShoulder, quat_z(6.0)),
                        (RightShoulder, quat_z(-6.0)),
                        (LeftUpperArm, quat_z(72.0)),
                        (RightUpperArm, quat_z(-72.0)),
                    ],
                ),
                kf(
                    0.7,
                    &[
                        (Head, compose(compose(quat_x(12.0), quat_z(10.0)), quat_y(-12.0))),
                        (Spine, quat_x(4.0)),
                        (LeftShoulder, quat_z(6.0)),
                        (RightShoulder, quat_z(-6.0)),
                        (LeftUpperArm, quat_z(72.0)),
                        (RightUpperArm, quat_z(-72.0)),
                    ],
                ),
                kf(1.0, &[]),
            ],
        ),
        GestureDefinition::new(
            "startle",
            1.0,
            vec![
                kf(0.0, &[]),
                kf(
                    0.15,
                    &[
                        (Head, quat_x(-10.0)),
                        (Spine, quat_x(-5.0)),
                        (LeftShoulder, quat_z(-8.0)),
                        (RightShoulder, quat_z(8.0)),
                        (LeftUpperArm, quat_z(55.0)),
                        (RightUpperArm, quat_z(-55.0)),
                    ],
                ),
                kf(
                    0.6,
                    &[
                        (Head, quat_x(-6.0)),
                        (Spine, quat_x(-3.0)),
                        (LeftShoulder, quat_z(-4.0)),
                        (RightShoulder, quat_z(4.0)),
                    ],
                ),
                kf(1.0, &[]),
            ],
        ),
        GestureDefinition::new(
            "droop",
            2.8,
            vec![
                kf(0.0, &[]),
                kf(
                    0.4,
                    &[
                        (Head, quat_x(16.0)),
                        (Neck, quat_x(6.0)),
                        (Spine, quat_x(8.0)),
                        (LeftShoulder, quat_z(3.0)),
                        (RightShoulder, quat_z(-3.0)),
                    ],
                ),
                kf(
                    0.75,
                    &[
                        (Head, quat_x(14.0)),
                        (Neck, quat_x(5.0)),
                        (Spine, quat_x(7.0)),
                    ],
                ),
                kf(1.0, &[]),
            ],
        ),
        GestureDefinition::new(
            "sigh",
            2.0,
            vec![
                kf(0.0, &[]),
                kf(
                    0.35,
                    &[
                        (Spine, quat_x(-4.0)),
                        (LeftShoulder, quat_z(-5.0)),
                        (RightShoulder, quat_z(5.0)),
                        (Head, quat_x(-4.0)),
                    ],
                ),
                kf(
                    0.7,
                    &[
                        (Spine, quat_x(6.0)),
                        (LeftShoulder, quat_z(3.0)),
                        (RightShoulder, quat_z(-3.0)),
                        (Head, quat_x(10.0)),
                    ],
                ),
                kf(1.0, &[]),
            ],
        ),
        GestureDefinition::new(
            "head_shake",
            1.4,
            vec![
                kf(0.0, &[]),
                kf(0.2, &[(Head, quat_y(10.0)), (Neck, quat_y(3.0))]),
                kf(0.4, &[(Head, quat_y(-10.0)), (Neck, quat_y(-3.0))]),
                kf(0.6, &[(Head, quat_y(8.0)), (Neck, quat_y(2.0))]),
                kf(0.8, &[(Head, quat_y(-6.0)), (Neck, quat_y(-2.0))]),
                kf(1.0, &[]),
            ],
        ),
        GestureDefinition::new(
            "huff",
            1.6,
            vec![
                kf(0.0, &[]),
                kf(
                    0.3,
                    &[
                        (Spine, quat_x(-4.0)),
                        (Head, compose(quat_y(15.0), quat_x(-6.0))),
                        (LeftShoulder, quat_z(-6.0)),
                        (RightShoulder, quat_z(6.0)),
                    ],
                ),
                kf(
                    0.7,
                    &[
                        (Spine, quat_x(-2.0)),
                        (Head, compose(quat_y(18.0), quat_x(-4.0))),
                    ],
                ),
                kf(1.0, &[]),
            ],
        ),
    ]
});

pub fn find_gesture(name: &str) -> Option<&'static GestureDefinition> {
    GESTURE_CATALOG.iter().find(|g| g.name == name)
}

impl Emotion {
    /// Gestures eligible as a reaction to (or idle fidget during) this emotion.
    pub fn gesture_candidates(self) -> &'static [&'static str] {
        match self {
            Emotion::Happy => &["nod", "excited", "wave"],
            Emotion::Surprised => &["startle", "head_tilt"],
            Emotion::Shy => &["shy", "head_tilt"],
            Emotion::Sad => &["droop", "sigh"],
            Emotion::Neutral => &["nod", "head_tilt", "thinking"],
            Emotion::Angry => &["head_shake", "huff"],
        }
    }
}
