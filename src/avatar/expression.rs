//! Expression Controller: emotion blend shapes and eye blinks.
//!
//! Each emotion maps to a fixed weight vector over the five emotional
//! channels. Changing emotion eases from whatever is currently shown to the
//! new target with an ease-out-cubic curve. Blinking runs on its own timer
//! and only ever touches the blink channel.

use rand::Rng;

use super::config::{AnimatorConfig, ExpressionTransition};
use super::interface::{AvatarModel, Emotion, ExpressionChannel};

/// Weights for the emotional expression channels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ExpressionWeights {
    pub happy: f32,
    pub angry: f32,
    pub sad: f32,
    pub surprised: f32,
    pub relaxed: f32,
}

impl ExpressionWeights {
    const fn new(happy: f32, angry: f32, sad: f32, surprised: f32, relaxed: f32) -> Self {
        Self {
            happy,
            angry,
            sad,
            surprised,
            relaxed,
        }
    }

    pub fn for_emotion(emotion: Emotion) -> Self {
        match emotion {
            Emotion::Happy => Self::new(1.0, 0.0, 0.0, 0.0, 0.2),
            Emotion::Surprised => Self::new(0.0, 0.0, 0.0, 1.0, 0.0),
            Emotion::Shy => Self::new(0.3, 0.0, 0.0, 0.2, 0.7),
            Emotion::Sad => Self::new(0.0, 0.0, 1.0, 0.0, 0.0),
            Emotion::Neutral => Self::new(0.0, 0.0, 0.0, 0.0, 0.3),
            Emotion::Angry => Self::new(0.0, 0.8, 0.0, 0.0, 0.0),
        }
    }

    pub fn lerp(&self, other: &Self, t: f32) -> Self {
        let mix = |a: f32, b: f32| a + (b - a) * t;
        Self {
            happy: mix(self.happy, other.happy),
            angry: mix(self.angry, other.angry),
            sad: mix(self.sad, other.sad),
            surprised: mix(self.surprised, other.surprised),
            relaxed: mix(self.relaxed, other.relaxed),
        }
    }

    pub fn channels(&self) -> [(ExpressionChannel, f32); 5] {
        [
            (ExpressionChannel::Happy, self.happy),
            (ExpressionChannel::Angry, self.angry),
            (ExpressionChannel::Sad, self.sad),
            (ExpressionChannel::Surprised, self.surprised),
            (ExpressionChannel::Relaxed, self.relaxed),
        ]
    }
}

/// `1 - (1 - t)³`
pub fn ease_out_cubic(t: f32) -> f32 {
    1.0 - (1.0 - t).powi(3)
}

// ── Blink ──────────────────────────────────────────────

/// Periodic close-open eyelid pulse.
#[derive(Debug, Clone)]
pub struct Blinker {
    timer: f32,
    /// Seconds into the current blink, if one is running.
    progress: Option<f32>,
    duration: f32,
    interval_min: f32,
    interval_max: f32,
}

impl Blinker {
    pub fn new<R: Rng + ?Sized>(config: &AnimatorConfig, rng: &mut R) -> Self {
        Self {
            timer: draw(rng, config.blink_first_min_secs, config.blink_first_max_secs),
            progress: None,
            duration: config.blink_duration_secs,
            interval_min: config.blink_interval_min_secs,
            interval_max: config.blink_interval_max_secs,
        }
    }

    pub fn is_blinking(&self) -> bool {
        self.progress.is_some()
    }

    /// Advance and return the blink weight to show this frame.
    pub fn advance<R: Rng + ?Sized>(&mut self, delta: f32, rng: &mut R) -> f32 {
        let elapsed = match self.progress {
            Some(elapsed) => elapsed + delta,
            None => {
                self.timer -= delta;
                if self.timer > 0.0 {
                    return 0.0;
                }
                // Carry the overshoot so the blink stays on wall-clock time
                let overshoot = -self.timer;
                self.timer = draw(rng, self.interval_min, self.interval_max);
                overshoot
            }
        };

        let p = elapsed / self.duration;
        if p < 1.0 {
            self.progress = Some(elapsed);
            if p < 0.5 {
                p * 2.0
            } else {
                (1.0 - p) * 2.0
            }
        } else {
            self.progress = None;
            0.0
        }
    }
}

fn draw<R: Rng + ?Sized>(rng: &mut R, min: f32, max: f32) -> f32 {
    if max > min {
        rng.gen_range(min..=max)
    } else {
        min
    }
}

// ── Controller ─────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct ExpressionController {
    emotion: Emotion,
    from: ExpressionWeights,
    to: ExpressionWeights,
    /// Transition progress in `[0, 1]`.
    progress: f32,
    transition: ExpressionTransition,
    blinker: Blinker,
    blink: f32,
}

impl ExpressionController {
    pub fn new<R: Rng + ?Sized>(config: &AnimatorConfig, rng: &mut R) -> Self {
        let neutral = ExpressionWeights::for_emotion(Emotion::Neutral);
        Self {
            emotion: Emotion::Neutral,
            from: neutral,
            to: neutral,
            progress: 1.0,
            transition: config.expression_transition,
            blinker: Blinker::new(config, rng),
            blink: 0.0,
        }
    }

    pub fn emotion(&self) -> Emotion {
        self.emotion
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn target(&self) -> ExpressionWeights {
        self.to
    }

    /// Currently displayed emotional weights.
    pub fn weights(&self) -> ExpressionWeights {
        self.from.lerp(&self.to, ease_out_cubic(self.progress))
    }

    pub fn blink(&self) -> f32 {
        self.blink
    }

    /// Start easing toward `emotion`. Returns false if it is already the
    /// current emotion.
    pub fn set_emotion(&mut self, emotion: Emotion) -> bool {
        if emotion == self.emotion {
            return false;
        }
        // Start from what is on screen so a change mid-transition does not jump
        self.from = self.weights();
        self.to = ExpressionWeights::for_emotion(emotion);
        self.emotion = emotion;
        self.progress = 0.0;
        true
    }

    pub fn update<R: Rng + ?Sized>(&mut self, delta: f32, rng: &mut R) {
        if self.progress < 1.0 {
            let step = match self.transition {
                ExpressionTransition::Timed { seconds } => delta / seconds,
                ExpressionTransition::FixedStep { step } => step,
            };
            self.progress = (self.progress + step).min(1.0);
        }
        self.blink = self.blinker.advance(delta, rng);
    }

    pub fn write_to<M: AvatarModel + ?Sized>(&self, model: &mut M) {
        for (channel, value) in self.weights().channels() {
            model.set_expression_weight(channel, value);
        }
        model.set_expression_weight(ExpressionChannel::Blink, self.blink);
    }
}
