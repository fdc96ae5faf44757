//! Lip-Sync Controller: audio volume to mouth articulation.

use super::config::AnimatorConfig;
use super::interface::{AvatarModel, ExpressionChannel};

#[derive(Debug, Clone)]
pub struct LipSync {
    current: f32,
    volume: f32,
    speaking: bool,
    noise_floor: f32,
    volume_range: f32,
    max_open: f32,
    smoothing: f32,
    reference_hz: f32,
    secondary_band: [f32; 2],
    secondary_scale: f32,
}

impl LipSync {
    pub fn new(config: &AnimatorConfig) -> Self {
        Self {
            current: 0.0,
            volume: 0.0,
            speaking: false,
            noise_floor: config.lip_noise_floor,
            volume_range: config.lip_volume_range,
            max_open: config.lip_max_open,
            smoothing: config.lip_smoothing,
            reference_hz: config.lip_reference_hz,
            secondary_band: config.lip_secondary_band,
            secondary_scale: config.lip_secondary_scale,
        }
    }

    /// Latest volume sample on the 0-255 RMS scale. Negative and NaN
    /// samples count as silence.
    pub fn set_volume(&mut self, sample: f32) {
        self.volume = if sample.is_nan() { 0.0 } else { sample.max(0.0) };
    }

    pub fn set_speaking(&mut self, speaking: bool) {
        self.speaking = speaking;
    }

    pub fn is_speaking(&self) -> bool {
        self.speaking
    }

    /// Smoothed mouth-open weight.
    pub fn mouth_open(&self) -> f32 {
        self.current
    }

    /// Mouth-open weight the smoothing is heading for.
    pub fn target(&self) -> f32 {
        if !self.speaking {
            return 0.0;
        }
        let normalized = ((self.volume - self.noise_floor) / self.volume_range).clamp(0.0, 1.0);
        normalized * self.max_open
    }

    /// Secondary "oh" weight for the current mouth opening.
    pub fn secondary(&self) -> f32 {
        let [lo, hi] = self.secondary_band;
        if self.current > lo && self.current < hi {
            self.current * self.secondary_scale
        } else {
            0.0
        }
    }

    pub fn update(&mut self, delta: f32) {
        let alpha = 1.0 - (1.0 - self.smoothing).powf(delta * self.reference_hz);
        let alpha = alpha.clamp(0.0, 1.0);
        self.current += (self.target() - self.current) * alpha;
    }

    pub fn write_to<M: AvatarModel + ?Sized>(&self, model: &mut M) {
        model.set_expression_weight(ExpressionChannel::Aa, self.current);
        model.set_expression_weight(ExpressionChannel::Oh, self.secondary());
    }
}
