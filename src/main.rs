//! Headless demo: drives one avatar at 60 Hz through a short scripted
//! conversation and logs what the model receives.
//!
//! Usage: `avatar-animator-demo [animator_config.json]`

use anyhow::Context;
use std::f32::consts::TAU;
use std::path::Path;

use avatar_animator::avatar::{
    load_config, rms_volume, AnimatorConfig, ExpressionChannel, FrameDriver, HeadlessAvatar,
    HumanoidBone,
};

const FRAME_RATE: f32 = 60.0;
const DURATION_SECS: f32 = 8.0;
const SAMPLE_RATE: f32 = 16_000.0;

/// One frame's worth of a 220 Hz tone under a syllable-rate envelope.
fn synth_audio(t: f32) -> Vec<f32> {
    let len = (SAMPLE_RATE / FRAME_RATE) as usize;
    let envelope = (t * 4.0 * TAU).sin().abs() * 0.6;
    (0..len)
        .map(|i| {
            let s = t + i as f32 / SAMPLE_RATE;
            (s * 220.0 * TAU).sin() * envelope
        })
        .collect()
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => load_config(Path::new(&path)),
        None => AnimatorConfig::default(),
    };
    config.validate().context("animator config")?;

    let mut driver = FrameDriver::new(config);
    driver.load_model(HeadlessAvatar::new("demo"));
    let inputs = driver.inputs();

    let dt = 1.0 / FRAME_RATE;
    let frames = (DURATION_SECS * FRAME_RATE) as usize;
    for frame in 0..frames {
        let t = frame as f32 * dt;

        if frame == 0 {
            let text = inputs.apply_reply("[emotion: happy] Hi! It's so nice to see you again.");
            tracing::info!(%text, "reply");
        }
        if frame == (5.0 * FRAME_RATE) as usize {
            let text = inputs.apply_reply("[emotion: surprised] Wait, you did what?");
            tracing::info!(%text, "reply");
        }

        let speaking = (0.5..3.5).contains(&t) || (5.0..6.5).contains(&t);
        inputs.set_speaking(speaking);
        inputs.set_volume(if speaking { rms_volume(&synth_audio(t)) } else { 0.0 });

        driver.frame(dt);

        if frame % 30 == 0 {
            if let Some(animator) = driver.animator() {
                let model = animator.model();
                let (axis, angle) = model.rotation(HumanoidBone::Head).to_axis_angle();
                tracing::info!(
                    t = %format!("{:.2}", t),
                    emotion = %animator.emotion(),
                    gesture = animator.active_gesture().unwrap_or("-"),
                    weight = %format!("{:.2}", animator.gesture_weight()),
                    head_deg = %format!("{:.2}", angle.to_degrees()),
                    head_axis = ?axis,
                    mouth = %format!("{:.2}", model.expression(ExpressionChannel::Aa)),
                    blink = %format!("{:.2}", model.expression(ExpressionChannel::Blink)),
                    "frame"
                );
            }
        }
    }

    let model = driver.unload().context("no model was loaded")?;
    tracing::info!(model = model.name(), frames, "done");
    Ok(())
}
