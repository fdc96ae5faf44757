//! Realtime animation for a chat avatar: procedural idle motion, emotion
//! driven gestures, facial expressions, blinking and volume driven lip sync.

pub mod avatar;
pub mod config;

pub use avatar::{AnimatorConfig, AvatarAnimator, AvatarError, AvatarModel, Emotion, FrameDriver};
