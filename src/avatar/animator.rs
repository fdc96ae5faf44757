//! Per-avatar animator: the one object the frame driver talks to.
//!
//! Owns the model it drives plus every piece of per-instance state: idle
//! phase offsets, gesture playback, expression blend, blink and lip sync.
//! Every method is a bounded, non-blocking computation and none of them
//! can fail; degradations are logged and handled in place.

use rand::rngs::StdRng;
use rand::SeedableRng;

use super::config::AnimatorConfig;
use super::expression::{ExpressionController, ExpressionWeights};
use super::gesture_player::{GesturePlayer, GestureState};
use super::idle::{idle_pose, IdlePhases};
use super::interface::{AvatarModel, BonePose, Emotion, HumanoidBone};
use super::lip_sync::LipSync;

pub struct AvatarAnimator<M: AvatarModel> {
    model: M,
    rng: StdRng,
    /// Seconds since creation. f64 so long sessions keep sub-frame precision.
    elapsed: f64,
    phases: IdlePhases,
    gestures: GesturePlayer,
    expression: ExpressionController,
    lip_sync: LipSync,
    pose: BonePose,
}

impl<M: AvatarModel> AvatarAnimator<M> {
    /// Bind to `model` with an entropy-seeded RNG.
    pub fn new(model: M, config: &AnimatorConfig) -> Self {
        Self::with_rng(model, config, StdRng::from_entropy())
    }

    /// Bind to `model` with a caller-supplied RNG. An invalid `config` is
    /// replaced by the defaults.
    pub fn with_rng(model: M, config: &AnimatorConfig, mut rng: StdRng) -> Self {
        let config = &config.clone().or_default();
        let phases = IdlePhases::random(&mut rng);
        let gestures = GesturePlayer::new(config, &mut rng);
        let expression = ExpressionController::new(config, &mut rng);

        let missing: Vec<&str> = HumanoidBone::ALL
            .into_iter()
            .filter(|b| !model.has_bone(*b))
            .map(HumanoidBone::name)
            .collect();
        tracing::debug!(
            head_phase = phases.head,
            sway_phase = phases.sway,
            arm_phase = phases.arm,
            ?missing,
            "animator bound to model"
        );

        Self {
            model,
            rng,
            elapsed: 0.0,
            phases,
            gestures,
            expression,
            lip_sync: LipSync::new(config),
            pose: BonePose::identity(),
        }
    }

    /// Advance everything by `delta` seconds and write the results to the
    /// model.
    pub fn tick(&mut self, delta: f32) {
        let delta = sanitize_delta(delta);
        self.elapsed += f64::from(delta);

        let idle = idle_pose(self.elapsed, &self.phases);
        self.gestures
            .advance(delta, self.expression.emotion(), &mut self.rng);
        self.pose = self.gestures.blend(&idle);
        self.model.set_pose(&self.pose);

        self.expression.update(delta, &mut self.rng);
        self.expression.write_to(&mut self.model);

        self.lip_sync.update(delta);
        self.lip_sync.write_to(&mut self.model);

        tracing::trace!(
            elapsed = self.elapsed,
            gesture = self.gestures.active_gesture(),
            weight = self.gestures.weight(),
            mouth = self.lip_sync.mouth_open(),
            "tick"
        );
    }

    /// Switch emotion. Re-sending the current emotion does nothing; a real
    /// change retargets the face and queues a reaction gesture.
    pub fn set_emotion(&mut self, emotion: Emotion) {
        if self.expression.set_emotion(emotion) {
            tracing::debug!(%emotion, "emotion changed");
            self.gestures.request_reaction();
        }
    }

    /// Like [`set_emotion`](Self::set_emotion) but from a raw label; unknown
    /// labels mean neutral.
    pub fn set_emotion_label(&mut self, label: &str) {
        self.set_emotion(Emotion::parse_lenient(label));
    }

    pub fn set_speaking(&mut self, speaking: bool) {
        self.lip_sync.set_speaking(speaking);
    }

    pub fn set_volume(&mut self, sample: f32) {
        self.lip_sync.set_volume(sample);
    }

    /// Put the model back in bind pose with every expression at zero and
    /// hand it back.
    pub fn dispose(mut self) -> M {
        self.model.reset_pose();
        self.model.reset_expressions();
        tracing::debug!(elapsed = self.elapsed, "animator disposed");
        self.model
    }

    // ── Accessors ──────────────────────────────────────

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn phases(&self) -> &IdlePhases {
        &self.phases
    }

    /// Pose written on the last tick.
    pub fn pose(&self) -> &BonePose {
        &self.pose
    }

    pub fn emotion(&self) -> Emotion {
        self.expression.emotion()
    }

    pub fn gesture_state(&self) -> GestureState {
        self.gestures.state()
    }

    pub fn active_gesture(&self) -> Option<&'static str> {
        self.gestures.active_gesture()
    }

    pub fn gesture_weight(&self) -> f32 {
        self.gestures.weight()
    }

    pub fn has_pending_reaction(&self) -> bool {
        self.gestures.has_pending_reaction()
    }

    pub fn expression_weights(&self) -> ExpressionWeights {
        self.expression.weights()
    }

    pub fn expression_progress(&self) -> f32 {
        self.expression.progress()
    }

    pub fn blink(&self) -> f32 {
        self.expression.blink()
    }

    pub fn mouth_open(&self) -> f32 {
        self.lip_sync.mouth_open()
    }
}

fn sanitize_delta(delta: f32) -> f32 {
    if delta.is_finite() && delta >= 0.0 {
        delta
    } else {
        tracing::warn!(delta, "ignoring invalid frame delta");
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::avatar::interface::ExpressionChannel;
    use crate::avatar::model::HeadlessAvatar;

    fn animator(seed: u64) -> AvatarAnimator<HeadlessAvatar> {
        AvatarAnimator::with_rng(
            HeadlessAvatar::new("test"),
            &AnimatorConfig::default(),
            StdRng::seed_from_u64(seed),
        )
    }

    #[test]
    fn tick_writes_idle_pose_to_model() {
        let mut a = animator(1);
        a.tick(1.0 / 60.0);
        assert_eq!(a.gesture_state(), GestureState::Idle);
        let expected = idle_pose(a.elapsed(), a.phases());
        assert_eq!(a.pose(), &expected, "idle frame must equal the idle pose exactly");
        assert_eq!(a.model().pose(), &expected);
    }

    #[test]
    fn invalid_deltas_do_not_advance_time() {
        let mut a = animator(2);
        a.tick(0.5);
        for bad in [-1.0, f32::NAN, f32::INFINITY] {
            a.tick(bad);
            assert_eq!(a.elapsed(), 0.5, "delta {} advanced the clock", bad);
        }
    }

    #[test]
    fn repeated_emotion_does_not_queue_reaction() {
        let mut a = animator(3);
        a.set_emotion(Emotion::Neutral);
        assert!(!a.has_pending_reaction());
        a.set_emotion(Emotion::Happy);
        assert!(a.has_pending_reaction());
    }

    #[test]
    fn unknown_label_means_neutral() {
        let mut a = animator(4);
        a.set_emotion(Emotion::Angry);
        a.set_emotion_label("bewildered");
        assert_eq!(a.emotion(), Emotion::Neutral);
    }

    #[test]
    fn expression_channels_reach_the_model() {
        let mut a = animator(5);
        a.set_emotion(Emotion::Happy);
        for _ in 0..60 {
            a.tick(1.0 / 60.0);
        }
        let model = a.model();
        assert!((model.expression(ExpressionChannel::Happy) - 1.0).abs() < 1e-6);
        assert!((model.expression(ExpressionChannel::Relaxed) - 0.2).abs() < 1e-6);
        assert_eq!(model.expression(ExpressionChannel::Sad), 0.0);
    }

    #[test]
    fn invalid_config_falls_back_to_defaults() {
        let config = AnimatorConfig {
            lip_volume_range: 0.0,
            ..AnimatorConfig::default()
        };
        let mut a = AvatarAnimator::with_rng(
            HeadlessAvatar::new("test"),
            &config,
            StdRng::seed_from_u64(7),
        );
        a.set_speaking(true);
        a.set_volume(10.0);
        a.tick(1.0 / 60.0);
        assert!(a.mouth_open().is_finite(), "mouth weight went {}", a.mouth_open());

        a.set_speaking(false);
        a.set_volume(0.0);
        for _ in 0..120 {
            a.tick(1.0 / 60.0);
        }
        assert!(a.mouth_open().is_finite());
        assert!(a.mouth_open() < 1e-3, "mouth still open: {}", a.mouth_open());
        assert!(a.model().expression(ExpressionChannel::Aa).is_finite());
    }

    #[test]
    fn dispose_returns_model_in_bind_pose() {
        let mut a = animator(6);
        a.set_emotion(Emotion::Sad);
        a.set_speaking(true);
        a.set_volume(200.0);
        for _ in 0..30 {
            a.tick(1.0 / 60.0);
        }
        assert!(a.model().expression(ExpressionChannel::Aa) > 0.0);

        let model = a.dispose();
        assert_eq!(model.pose(), &BonePose::identity());
        for channel in ExpressionChannel::ALL {
            assert_eq!(model.expression(channel), 0.0, "{} not cleared", channel.name());
        }
    }
}
