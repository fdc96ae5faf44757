//! Idle Pose Generator: procedural breathing, sway and head drift.
//!
//! The pose is a pure function of elapsed time and three per-instance phase
//! offsets, so two avatars never move in lockstep and the same inputs always
//! give the same pose.

use rand::Rng;
use std::f64::consts::TAU;

use super::interface::{BonePose, HumanoidBone};
use super::quat::{compose, quat_x, quat_y, quat_z};

/// Arms hang this many degrees below the T-pose.
const ARM_REST_DEG: f64 = 65.0;
const LOWER_ARM_BEND_DEG: f64 = 15.0;
const SHOULDER_DROP_DEG: f32 = 3.0;
const BREATH_BASE_DEG: f64 = 2.0;

/// Random phase offsets drawn once per animator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IdlePhases {
    pub head: f64,
    pub sway: f64,
    pub arm: f64,
}

impl IdlePhases {
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            head: rng.gen_range(0.0..TAU),
            sway: rng.gen_range(0.0..TAU),
            arm: rng.gen_range(0.0..TAU),
        }
    }
}

fn wave(t: f64, rate: f64, phase: f64, amplitude_deg: f64) -> f64 {
    (t * rate + phase).sin() * amplitude_deg
}

/// Full-body idle pose at `t` seconds.
pub fn idle_pose(t: f64, phases: &IdlePhases) -> BonePose {
    // Arms: rest angle plus a slow wobble and a forward swing
    let arm_wobble = wave(t, 0.6, phases.arm, 1.5);
    let arm_forward = wave(t, 0.35, 0.0, 2.0) as f32;
    let arm_down = (ARM_REST_DEG + arm_wobble) as f32;
    let left_upper_arm = compose(quat_z(arm_down), quat_x(arm_forward));
    let right_upper_arm = compose(quat_z(-arm_down), quat_x(arm_forward));

    let lower_bend = (LOWER_ARM_BEND_DEG + wave(t, 0.4, 0.0, 2.0)) as f32;

    // Breathing
    let spine = quat_x((BREATH_BASE_DEG + wave(t, 1.8, 0.0, 0.8)) as f32);

    // Weight shift
    let sway = wave(t, 0.5, phases.sway, 0.8) as f32;
    let hip_forward = wave(t, 0.3, 0.0, 0.4) as f32;
    let hips = compose(quat_z(sway), quat_x(hip_forward));

    // Head drift: yaw, tilt, nod
    let head_yaw = wave(t, 0.4, phases.head, 4.0) as f32;
    let head_tilt = wave(t, 0.3, phases.head + 1.0, 2.0) as f32;
    let head_nod = wave(t, 0.5, 0.0, 1.5) as f32;
    let head = compose(compose(quat_y(head_yaw), quat_z(head_tilt)), quat_x(head_nod));
    let neck = quat_y(wave(t, 0.4, phases.head, 1.5) as f32);

    let left_hand = wave(t, 0.7, 0.0, 3.0) as f32;
    let right_hand = wave(t, 0.7, 1.0, -3.0) as f32;

    BonePose::from_fn(|bone| match bone {
        HumanoidBone::Hips => hips,
        HumanoidBone::Spine => spine,
        HumanoidBone::Neck => neck,
        HumanoidBone::Head => head,
        HumanoidBone::LeftShoulder => quat_z(SHOULDER_DROP_DEG),
        HumanoidBone::RightShoulder => quat_z(-SHOULDER_DROP_DEG),
        HumanoidBone::LeftUpperArm => left_upper_arm,
        HumanoidBone::RightUpperArm => right_upper_arm,
        HumanoidBone::LeftLowerArm => quat_z(lower_bend),
        HumanoidBone::RightLowerArm => quat_z(-lower_bend),
        HumanoidBone::LeftHand => quat_z(left_hand),
        HumanoidBone::RightHand => quat_z(right_hand),
    })
}
