pub mod animator;
pub mod config;
pub mod driver;
pub mod expression;
pub mod gesture_player;
pub mod gestures;
pub mod idle;
pub mod interface;
pub mod lip_sync;
pub mod model;
pub mod quat;
pub mod reply;
pub mod volume;

#[cfg(test)]
mod tests;

pub use animator::AvatarAnimator;
pub use config::{load_config, save_config, AnimatorConfig, ExpressionTransition};
pub use driver::{AvatarInputs, FrameDriver, InputCell};
pub use gesture_player::GestureState;
pub use interface::{
    AvatarError, AvatarModel, BonePose, Emotion, ExpressionChannel, HumanoidBone, Result,
};
pub use model::HeadlessAvatar;
pub use reply::{parse_reply, TaggedReply};
pub use volume::{rms_volume, rms_volume_i16};
