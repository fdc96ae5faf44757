//! Gesture Scheduler & Blender.
//!
//! Two states: Idle (no gesture) and Playing. A gesture starts when the
//! spontaneous countdown runs out or when a reaction was requested, plays
//! with a trapezoid weight (fade in, hold, fade out) and is blended bone by
//! bone over the idle pose.

use glam::Quat;
use rand::seq::SliceRandom;
use rand::Rng;

use super::config::AnimatorConfig;
use super::gestures::{find_gesture, GestureDefinition};
use super::interface::{BonePose, Emotion};
use super::quat::slerp;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureState {
    Idle,
    Playing,
}

/// `3t² - 2t³`
pub fn smoothstep(t: f32) -> f32 {
    t * t * (3.0 - 2.0 * t)
}

/// Trapezoid envelope over normalized gesture progress.
pub fn blend_weight(progress: f32, blend_in: f32, blend_out: f32) -> f32 {
    let fade_in = if blend_in > 0.0 {
        progress / blend_in
    } else {
        1.0
    };
    let fade_out = if blend_out > 0.0 {
        (1.0 - progress) / blend_out
    } else {
        1.0
    };
    fade_in.min(fade_out).clamp(0.0, 1.0)
}

/// Sample a gesture at normalized `progress`.
///
/// Bones the gesture does not touch come back as identity.
pub fn sample_gesture(gesture: &GestureDefinition, progress: f32) -> BonePose {
    let frames = &gesture.keyframes;
    if frames.len() < 2 {
        return BonePose::identity();
    }

    let p = progress.clamp(0.0, 1.0);
    let seg = frames
        .windows(2)
        .position(|w| p <= w[1].time)
        .unwrap_or(frames.len() - 2);
    let (from, to) = (&frames[seg], &frames[seg + 1]);

    let span = to.time - from.time;
    let local = if span > 0.0 {
        ((p - from.time) / span).clamp(0.0, 1.0)
    } else {
        1.0
    };
    let eased = smoothstep(local);

    BonePose::from_fn(|bone| {
        if gesture.affects(bone) {
            slerp(from.rotation(bone), to.rotation(bone), eased)
        } else {
            Quat::IDENTITY
        }
    })
}

/// Per-avatar gesture playback state.
#[derive(Debug, Clone)]
pub struct GesturePlayer {
    active: Option<&'static GestureDefinition>,
    elapsed: f32,
    countdown: f32,
    weight: f32,
    pending_reaction: bool,
    interval_min: f32,
    interval_max: f32,
    blend_in: f32,
    blend_out: f32,
}

impl GesturePlayer {
    pub fn new<R: Rng + ?Sized>(config: &AnimatorConfig, rng: &mut R) -> Self {
        let mut player = Self {
            active: None,
            elapsed: 0.0,
            countdown: 0.0,
            weight: 0.0,
            pending_reaction: false,
            interval_min: config.gesture_interval_min_secs,
            interval_max: config.gesture_interval_max_secs,
            blend_in: config.gesture_blend_in,
            blend_out: config.gesture_blend_out,
        };
        player.countdown = player.draw_interval(rng);
        player
    }

    fn draw_interval<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        if self.interval_max > self.interval_min {
            rng.gen_range(self.interval_min..=self.interval_max)
        } else {
            self.interval_min
        }
    }

    pub fn state(&self) -> GestureState {
        if self.active.is_some() {
            GestureState::Playing
        } else {
            GestureState::Idle
        }
    }

    pub fn active_gesture(&self) -> Option<&'static str> {
        self.active.map(|g| g.name)
    }

    /// Current blend weight in `[0, 1]`. Always 0 while Idle.
    pub fn weight(&self) -> f32 {
        self.weight
    }

    /// Seconds until the next spontaneous gesture.
    pub fn countdown(&self) -> f32 {
        self.countdown
    }

    pub fn progress(&self) -> f32 {
        match self.active {
            Some(g) => (self.elapsed / g.duration).clamp(0.0, 1.0),
            None => 0.0,
        }
    }

    pub fn has_pending_reaction(&self) -> bool {
        self.pending_reaction
    }

    /// Ask for a reaction gesture. Only one request is remembered; it is
    /// served on the first tick spent Idle.
    pub fn request_reaction(&mut self) {
        self.pending_reaction = true;
    }

    /// Advance playback by `delta` seconds. `emotion` is whatever is in
    /// effect now and picks the candidate list if a gesture starts.
    pub fn advance<R: Rng + ?Sized>(&mut self, delta: f32, emotion: Emotion, rng: &mut R) {
        match self.active {
            Some(gesture) => {
                self.elapsed += delta;
                let progress = self.progress();
                if progress >= 1.0 {
                    tracing::debug!(gesture = gesture.name, "gesture finished");
                    self.active = None;
                    self.elapsed = 0.0;
                    self.weight = 0.0;
                    self.countdown = self.draw_interval(rng);
                } else {
                    self.weight = blend_weight(progress, self.blend_in, self.blend_out);
                }
            }
            None => {
                self.countdown -= delta;
                if self.pending_reaction || self.countdown <= 0.0 {
                    let reaction = std::mem::take(&mut self.pending_reaction);
                    self.start(emotion, reaction, rng);
                }
            }
        }
    }

    fn start<R: Rng + ?Sized>(&mut self, emotion: Emotion, reaction: bool, rng: &mut R) {
        self.start_from(emotion.gesture_candidates(), emotion, reaction, rng);
    }

    /// Pick one of `candidates` and play it. A name missing from the
    /// catalog leaves the player Idle with a fresh countdown.
    fn start_from<R: Rng + ?Sized>(
        &mut self,
        candidates: &[&str],
        emotion: Emotion,
        reaction: bool,
        rng: &mut R,
    ) {
        let Some(name) = candidates.choose(rng).copied() else {
            self.countdown = self.draw_interval(rng);
            return;
        };

        match find_gesture(name) {
            Some(gesture) => {
                tracing::debug!(gesture = gesture.name, %emotion, reaction, "gesture started");
                self.active = Some(gesture);
                self.elapsed = 0.0;
                self.weight = 0.0;
            }
            None => {
                // Stay Idle and let the timer retry
                tracing::warn!(gesture = name, %emotion, "candidate gesture not in catalog");
                self.countdown = self.draw_interval(rng);
            }
        }
    }

    /// Blend the active gesture over `idle`. With no gesture, or at zero
    /// weight, the idle pose is returned unchanged.
    pub fn blend(&self, idle: &BonePose) -> BonePose {
        match self.active {
            Some(gesture) if self.weight > 0.0 => {
                let target = sample_gesture(gesture, self.progress());
                BonePose::from_fn(|bone| {
                    if gesture.affects(bone) {
                        slerp(idle.get(bone), target.get(bone), self.weight)
                    } else {
                        idle.get(bone)
                    }
                })
            }
            _ => *idle,
        }
    }
}
