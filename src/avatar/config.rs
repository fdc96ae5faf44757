//! Animator tuning: persisted to `animator_config.json`.

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::interface::{AvatarError, Result};

/// How the expression blend advances between emotion targets.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ExpressionTransition {
    /// Completes in `seconds` regardless of frame rate.
    Timed { seconds: f32 },
    /// Advances by `step` every tick. Speed depends on frame rate.
    FixedStep { step: f32 },
}

impl Default for ExpressionTransition {
    fn default() -> Self {
        // 20 ticks at 60 Hz
        ExpressionTransition::Timed { seconds: 0.33 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimatorConfig {
    // ── Gestures ──
    /// Shortest wait before a spontaneous gesture (seconds).
    #[serde(default = "default_gesture_interval_min")]
    pub gesture_interval_min_secs: f32,
    #[serde(default = "default_gesture_interval_max")]
    pub gesture_interval_max_secs: f32,
    /// Fraction of a gesture spent fading in.
    #[serde(default = "default_gesture_blend")]
    pub gesture_blend_in: f32,
    /// Fraction of a gesture spent fading out.
    #[serde(default = "default_gesture_blend")]
    pub gesture_blend_out: f32,

    // ── Blink ──
    #[serde(default = "default_blink_first_min")]
    pub blink_first_min_secs: f32,
    #[serde(default = "default_blink_first_max")]
    pub blink_first_max_secs: f32,
    #[serde(default = "default_blink_interval_min")]
    pub blink_interval_min_secs: f32,
    #[serde(default = "default_blink_interval_max")]
    pub blink_interval_max_secs: f32,
    #[serde(default = "default_blink_duration")]
    pub blink_duration_secs: f32,

    // ── Expression ──
    #[serde(default)]
    pub expression_transition: ExpressionTransition,

    // ── Lip sync ──
    /// Volume below this is silence (0-255 scale).
    #[serde(default = "default_lip_noise_floor")]
    pub lip_noise_floor: f32,
    /// Volume span above the floor that maps to a fully open mouth.
    #[serde(default = "default_lip_volume_range")]
    pub lip_volume_range: f32,
    #[serde(default = "default_lip_max_open")]
    pub lip_max_open: f32,
    /// Fraction of the remaining gap closed per reference tick.
    #[serde(default = "default_lip_smoothing")]
    pub lip_smoothing: f32,
    #[serde(default = "default_lip_reference_hz")]
    pub lip_reference_hz: f32,
    /// Mouth-open band in which the secondary "oh" shape is mixed in.
    #[serde(default = "default_lip_secondary_band")]
    pub lip_secondary_band: [f32; 2],
    #[serde(default = "default_lip_secondary_scale")]
    pub lip_secondary_scale: f32,
}

fn default_gesture_interval_min() -> f32 {
    4.0
}

fn default_gesture_interval_max() -> f32 {
    15.0
}

fn default_gesture_blend() -> f32 {
    0.2
}

fn default_blink_first_min() -> f32 {
    2.0
}

fn default_blink_first_max() -> f32 {
    6.0
}

fn default_blink_interval_min() -> f32 {
    2.0
}

fn default_blink_interval_max() -> f32 {
    7.0
}

fn default_blink_duration() -> f32 {
    0.15
}

fn default_lip_noise_floor() -> f32 {
    10.0
}

fn default_lip_volume_range() -> f32 {
    120.0
}

fn default_lip_max_open() -> f32 {
    0.8
}

fn default_lip_smoothing() -> f32 {
    0.3
}

fn default_lip_reference_hz() -> f32 {
    60.0
}

fn default_lip_secondary_band() -> [f32; 2] {
    [0.2, 0.6]
}

fn default_lip_secondary_scale() -> f32 {
    0.3
}

impl Default for AnimatorConfig {
    fn default() -> Self {
        Self {
            gesture_interval_min_secs: default_gesture_interval_min(),
            gesture_interval_max_secs: default_gesture_interval_max(),
            gesture_blend_in: default_gesture_blend(),
            gesture_blend_out: default_gesture_blend(),
            blink_first_min_secs: default_blink_first_min(),
            blink_first_max_secs: default_blink_first_max(),
            blink_interval_min_secs: default_blink_interval_min(),
            blink_interval_max_secs: default_blink_interval_max(),
            blink_duration_secs: default_blink_duration(),
            expression_transition: ExpressionTransition::default(),
            lip_noise_floor: default_lip_noise_floor(),
            lip_volume_range: default_lip_volume_range(),
            lip_max_open: default_lip_max_open(),
            lip_smoothing: default_lip_smoothing(),
            lip_reference_hz: default_lip_reference_hz(),
            lip_secondary_band: default_lip_secondary_band(),
            lip_secondary_scale: default_lip_secondary_scale(),
        }
    }
}

fn check(ok: bool, msg: &str) -> Result<()> {
    if ok {
        Ok(())
    } else {
        Err(AvatarError::InvalidConfig(msg.to_string()))
    }
}

impl AnimatorConfig {
    pub fn validate(&self) -> Result<()> {
        check(
            self.gesture_interval_min_secs > 0.0
                && self.gesture_interval_min_secs <= self.gesture_interval_max_secs,
            "gesture interval must satisfy 0 < min <= max",
        )?;
        check(
            self.gesture_blend_in >= 0.0
                && self.gesture_blend_out >= 0.0
                && self.gesture_blend_in + self.gesture_blend_out <= 1.0,
            "gesture blend fractions must be non-negative and sum to at most 1",
        )?;
        check(
            self.blink_first_min_secs >= 0.0
                && self.blink_first_min_secs <= self.blink_first_max_secs,
            "first blink range must satisfy 0 <= min <= max",
        )?;
        check(
            self.blink_interval_min_secs > 0.0
                && self.blink_interval_min_secs <= self.blink_interval_max_secs,
            "blink interval must satisfy 0 < min <= max",
        )?;
        check(self.blink_duration_secs > 0.0, "blink duration must be positive")?;
        match self.expression_transition {
            ExpressionTransition::Timed { seconds } => {
                check(seconds > 0.0, "expression transition time must be positive")?
            }
            ExpressionTransition::FixedStep { step } => check(
                step > 0.0 && step <= 1.0,
                "expression transition step must be in (0, 1]",
            )?,
        }
        check(self.lip_noise_floor >= 0.0, "lip noise floor must be non-negative")?;
        check(self.lip_volume_range > 0.0, "lip volume range must be positive")?;
        check(
            self.lip_max_open > 0.0 && self.lip_max_open <= 1.0,
            "lip max open must be in (0, 1]",
        )?;
        check(
            self.lip_smoothing > 0.0 && self.lip_smoothing <= 1.0,
            "lip smoothing must be in (0, 1]",
        )?;
        check(self.lip_reference_hz > 0.0, "lip reference rate must be positive")?;
        let [lo, hi] = self.lip_secondary_band;
        check(lo <= hi, "lip secondary band must satisfy low <= high")?;
        check(
            self.lip_secondary_scale >= 0.0 && self.lip_secondary_scale <= 1.0,
            "lip secondary scale must be in [0, 1]",
        )
    }
}

impl AnimatorConfig {
    /// `self` if it validates, otherwise the defaults. Keeps a bad config
    /// out of the per-frame path.
    pub fn or_default(self) -> Self {
        match self.validate() {
            Ok(()) => self,
            Err(e) => {
                tracing::warn!(error = %e, "rejecting animator config, using defaults");
                AnimatorConfig::default()
            }
        }
    }
}

/// Load and validate. Anything unusable falls back to defaults.
pub fn load_config(path: &Path) -> AnimatorConfig {
    let config: AnimatorConfig = crate::config::load_json_config(path, "Animator");
    config.or_default()
}

pub fn save_config(path: &Path, config: &AnimatorConfig) -> Result<()> {
    config.validate()?;
    crate::config::save_json_config(path, config, "Animator")
}
