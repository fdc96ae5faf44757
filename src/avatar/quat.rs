//! Quaternion helpers for bone rotations.
//!
//! Rotations are `glam::Quat` values (x, y, z, w). Every function here is
//! pure; callers own the clamping of interpolation factors.

use glam::{Quat, Vec4};

/// Above this cosine the two rotations are too close for the sine terms
/// of slerp to be stable, so a normalized lerp is used instead.
const SLERP_LINEAR_THRESHOLD: f32 = 0.9995;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

/// Half-angle construction of a rotation about one principal axis.
pub fn rotation_about_axis(axis: Axis, angle_deg: f32) -> Quat {
    let (s, c) = (angle_deg.to_radians() * 0.5).sin_cos();
    match axis {
        Axis::X => Quat::from_xyzw(s, 0.0, 0.0, c),
        Axis::Y => Quat::from_xyzw(0.0, s, 0.0, c),
        Axis::Z => Quat::from_xyzw(0.0, 0.0, s, c),
    }
}

pub fn quat_x(angle_deg: f32) -> Quat {
    rotation_about_axis(Axis::X, angle_deg)
}

pub fn quat_y(angle_deg: f32) -> Quat {
    rotation_about_axis(Axis::Y, angle_deg)
}

pub fn quat_z(angle_deg: f32) -> Quat {
    rotation_about_axis(Axis::Z, angle_deg)
}

/// Hamilton product `a * b`. Not commutative.
pub fn compose(a: Quat, b: Quat) -> Quat {
    a * b
}

/// Shortest-path spherical interpolation.
///
/// `t == 0.0` returns `a` untouched, which the blender relies on to leave
/// the idle pose bit-identical when no gesture is active.
pub fn slerp(a: Quat, b: Quat, t: f32) -> Quat {
    if t == 0.0 {
        return a;
    }

    let va = Vec4::from(a);
    let mut vb = Vec4::from(b);
    let mut cos = va.dot(vb);

    // q and -q are the same rotation; take the short arc
    if cos < 0.0 {
        vb = -vb;
        cos = -cos;
    }

    if cos > SLERP_LINEAR_THRESHOLD {
        return Quat::from_vec4(va.lerp(vb, t)).normalize();
    }

    let theta_0 = cos.acos();
    let theta = theta_0 * t;
    let sin_0 = theta_0.sin();
    let wa = (theta_0 - theta).sin() / sin_0;
    let wb = theta.sin() / sin_0;
    Quat::from_vec4(va * wa + vb * wb)
}

/// Whether two quaternions describe the same rotation within `tolerance`.
pub fn same_rotation(a: Quat, b: Quat, tolerance: f32) -> bool {
    a.dot(b).abs() >= 1.0 - tolerance
}
