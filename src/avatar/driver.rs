//! Frame driver: owns the active animator and feeds it once per frame.
//!
//! Network and audio producers never touch the animator directly. They
//! write into an [`InputCell`], a single last-writer-wins slot that the
//! driver samples at the start of every frame. Swapping models disposes the
//! old animator before the new one is bound, so a replacement avatar always
//! starts clean.

use rand::rngs::StdRng;
use std::sync::{Arc, Mutex};

use super::animator::AvatarAnimator;
use super::config::AnimatorConfig;
use super::interface::{AvatarModel, Emotion};
use super::reply::parse_reply;

/// Inputs produced outside the render loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AvatarInputs {
    pub emotion: Emotion,
    pub speaking: bool,
    pub volume: f32,
}

impl Default for AvatarInputs {
    fn default() -> Self {
        Self {
            emotion: Emotion::Neutral,
            speaking: false,
            volume: 0.0,
        }
    }
}

/// Shared handle producers write into. Cheap to clone.
#[derive(Debug, Clone, Default)]
pub struct InputCell {
    inner: Arc<Mutex<AvatarInputs>>,
}

impl InputCell {
    fn update(&self, f: impl FnOnce(&mut AvatarInputs)) {
        let mut inputs = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut inputs);
    }

    pub fn snapshot(&self) -> AvatarInputs {
        *self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn set_emotion(&self, emotion: Emotion) {
        self.update(|i| i.emotion = emotion);
    }

    pub fn set_speaking(&self, speaking: bool) {
        self.update(|i| i.speaking = speaking);
    }

    pub fn set_volume(&self, volume: f32) {
        self.update(|i| i.volume = volume);
    }

    /// Take the emotion from a tagged reply and return the text to display.
    pub fn apply_reply(&self, reply: &str) -> String {
        let tagged = parse_reply(reply);
        self.set_emotion(tagged.emotion);
        tagged.text
    }
}

pub struct FrameDriver<M: AvatarModel> {
    config: AnimatorConfig,
    inputs: InputCell,
    animator: Option<AvatarAnimator<M>>,
    frames: u64,
}

impl<M: AvatarModel> FrameDriver<M> {
    /// An invalid `config` is replaced by the defaults.
    pub fn new(config: AnimatorConfig) -> Self {
        Self {
            config: config.or_default(),
            inputs: InputCell::default(),
            animator: None,
            frames: 0,
        }
    }

    /// A handle producers can write to from any thread.
    pub fn inputs(&self) -> InputCell {
        self.inputs.clone()
    }

    pub fn config(&self) -> &AnimatorConfig {
        &self.config
    }

    pub fn animator(&self) -> Option<&AvatarAnimator<M>> {
        self.animator.as_ref()
    }

    pub fn is_loaded(&self) -> bool {
        self.animator.is_some()
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Make `model` the active avatar. The previous one, if any, is reset
    /// to bind pose and returned.
    pub fn load_model(&mut self, model: M) -> Option<M> {
        let previous = self.unload();
        self.animator = Some(AvatarAnimator::new(model, &self.config));
        previous
    }

    /// [`load_model`](Self::load_model) with a caller-supplied RNG.
    pub fn load_model_with_rng(&mut self, model: M, rng: StdRng) -> Option<M> {
        let previous = self.unload();
        self.animator = Some(AvatarAnimator::with_rng(model, &self.config, rng));
        previous
    }

    /// Dispose the active animator and hand back its model.
    pub fn unload(&mut self) -> Option<M> {
        self.animator.take().map(AvatarAnimator::dispose)
    }

    /// Run one frame. Inputs are sampled once, then the animator ticks.
    /// Does nothing while no model is loaded.
    pub fn frame(&mut self, delta: f32) {
        let Some(animator) = self.animator.as_mut() else {
            return;
        };
        let inputs = self.inputs.snapshot();
        animator.set_emotion(inputs.emotion);
        animator.set_speaking(inputs.speaking);
        animator.set_volume(inputs.volume);
        animator.tick(delta);
        self.frames += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::avatar::interface::{BonePose, ExpressionChannel};
    use crate::avatar::model::HeadlessAvatar;
    use rand::SeedableRng;
    use std::thread;

    const DT: f32 = 1.0 / 60.0;

    fn driver() -> FrameDriver<HeadlessAvatar> {
        FrameDriver::new(AnimatorConfig::default())
    }

    #[test]
    fn frame_without_model_is_a_no_op() {
        let mut d = driver();
        d.frame(DT);
        assert!(!d.is_loaded());
        assert_eq!(d.frames(), 0);
    }

    #[test]
    fn last_write_wins_between_frames() {
        let mut d = driver();
        d.load_model_with_rng(HeadlessAvatar::new("a"), StdRng::seed_from_u64(1));
        let inputs = d.inputs();
        inputs.set_emotion(Emotion::Angry);
        inputs.set_emotion(Emotion::Surprised);
        d.frame(DT);
        let animator = d.animator().unwrap();
        assert_eq!(animator.emotion(), Emotion::Surprised);
        // Surprised was the only emotion the animator ever saw
        let gesture = animator.active_gesture().unwrap();
        assert!(Emotion::Surprised.gesture_candidates().contains(&gesture));
    }

    #[test]
    fn invalid_config_is_replaced_at_construction() {
        let d: FrameDriver<HeadlessAvatar> = FrameDriver::new(AnimatorConfig {
            lip_smoothing: 0.0,
            ..AnimatorConfig::default()
        });
        assert_eq!(d.config(), &AnimatorConfig::default());
    }

    #[test]
    fn producers_on_other_threads_reach_the_animator() {
        let mut d = driver();
        d.load_model_with_rng(HeadlessAvatar::new("a"), StdRng::seed_from_u64(2));
        let inputs = d.inputs();
        thread::spawn(move || {
            inputs.set_speaking(true);
            inputs.set_volume(130.0);
        })
        .join()
        .unwrap();
        for _ in 0..60 {
            d.frame(DT);
        }
        let mouth = d.animator().unwrap().model().expression(ExpressionChannel::Aa);
        assert!((mouth - 0.8).abs() < 1e-3, "mouth open {}", mouth);
    }

    #[test]
    fn apply_reply_sets_emotion_and_returns_clean_text() {
        let d = driver();
        let text = d.inputs().apply_reply("[emotion: sad] I lost my keys.");
        assert_eq!(text, "I lost my keys.");
        assert_eq!(d.inputs().snapshot().emotion, Emotion::Sad);
    }

    #[test]
    fn swapping_models_resets_the_old_one() {
        let mut d = driver();
        assert!(d
            .load_model_with_rng(HeadlessAvatar::new("first"), StdRng::seed_from_u64(3))
            .is_none());
        d.inputs().set_emotion(Emotion::Happy);
        for _ in 0..30 {
            d.frame(DT);
        }

        let old = d
            .load_model_with_rng(HeadlessAvatar::new("second"), StdRng::seed_from_u64(4))
            .unwrap();
        assert_eq!(old.name(), "first");
        assert_eq!(old.pose(), &BonePose::identity());
        assert_eq!(old.expression(ExpressionChannel::Happy), 0.0);

        let animator = d.animator().unwrap();
        assert_eq!(animator.model().name(), "second");
        assert_eq!(animator.elapsed(), 0.0, "replacement starts from a fresh clock");
    }

    #[test]
    fn unload_returns_model() {
        let mut d = driver();
        d.load_model(HeadlessAvatar::new("solo"));
        d.frame(DT);
        let model = d.unload().unwrap();
        assert_eq!(model.name(), "solo");
        assert!(d.unload().is_none());
    }
}
