//! Cross-component scenarios driven through the public animator API.

use glam::Vec4;
use rand::rngs::StdRng;
use rand::SeedableRng;

use super::animator::AvatarAnimator;
use super::config::AnimatorConfig;
use super::expression::ExpressionWeights;
use super::gesture_player::GestureState;
use super::idle::idle_pose;
use super::interface::{Emotion, ExpressionChannel, HumanoidBone};
use super::model::HeadlessAvatar;

const DT: f32 = 1.0 / 60.0;

fn seeded(seed: u64) -> AvatarAnimator<HeadlessAvatar> {
    AvatarAnimator::with_rng(
        HeadlessAvatar::new("scenario"),
        &AnimatorConfig::default(),
        StdRng::seed_from_u64(seed),
    )
}

fn tick_until(a: &mut AvatarAnimator<HeadlessAvatar>, state: GestureState) {
    for _ in 0..(30.0 / DT) as usize {
        a.tick(DT);
        if a.gesture_state() == state {
            return;
        }
    }
    panic!("never reached {:?}", state);
}

#[test]
fn emotion_change_during_gesture_reacts_with_latest_emotion() {
    let mut a = seeded(21);
    a.set_emotion(Emotion::Happy);
    a.tick(DT);
    assert_eq!(a.gesture_state(), GestureState::Playing);
    let first = a.active_gesture().unwrap();
    assert!(Emotion::Happy.gesture_candidates().contains(&first));

    // Both arrive mid-gesture; only the flag and the latest value survive
    a.set_emotion(Emotion::Angry);
    a.set_emotion(Emotion::Sad);
    assert!(a.has_pending_reaction());

    tick_until(&mut a, GestureState::Idle);
    assert_eq!(a.gesture_weight(), 0.0);
    assert!(a.has_pending_reaction(), "reaction is consumed on the next Idle tick");

    a.tick(DT);
    assert_eq!(a.gesture_state(), GestureState::Playing);
    let next = a.active_gesture().unwrap();
    assert!(
        Emotion::Sad.gesture_candidates().contains(&next),
        "{} is not a sad gesture",
        next
    );
    assert!(!a.has_pending_reaction());
}

#[test]
fn silence_closes_the_mouth_within_a_second() {
    let mut a = seeded(22);
    a.set_speaking(true);
    a.set_volume(180.0);
    for _ in 0..30 {
        a.tick(DT);
    }
    assert!(a.mouth_open() > 0.5);

    a.set_speaking(false);
    a.set_volume(0.0);
    for _ in 0..60 {
        a.tick(DT);
    }
    assert!(a.mouth_open() < 1e-3, "mouth still open: {}", a.mouth_open());
    assert!(a.model().expression(ExpressionChannel::Aa) < 1e-3);
    assert_eq!(a.model().expression(ExpressionChannel::Oh), 0.0);
}

#[test]
fn separate_instances_do_not_move_in_lockstep() {
    let a = seeded(1);
    let b = seeded(2);
    assert_ne!(a.phases(), b.phases());
    assert_ne!(idle_pose(5.0, a.phases()), idle_pose(5.0, b.phases()));

    let c = AvatarAnimator::new(HeadlessAvatar::new("c"), &AnimatorConfig::default());
    let d = AvatarAnimator::new(HeadlessAvatar::new("d"), &AnimatorConfig::default());
    assert_ne!(idle_pose(5.0, c.phases()), idle_pose(5.0, d.phases()));
}

#[test]
fn expression_weights_converge_on_the_model() {
    let mut a = seeded(23);
    a.set_emotion(Emotion::Shy);
    let mut last_progress = 0.0;
    for _ in 0..120 {
        a.tick(DT);
        assert!(a.expression_progress() >= last_progress);
        last_progress = a.expression_progress();
    }
    assert_eq!(a.expression_progress(), 1.0);

    let target = ExpressionWeights::for_emotion(Emotion::Shy);
    for (channel, value) in target.channels() {
        let shown = a.model().expression(channel);
        assert!((shown - value).abs() < 1e-5, "{} at {}, want {}", channel.name(), shown, value);
    }
}

#[test]
fn rigs_without_optional_bones_still_animate() {
    let model = HeadlessAvatar::new("partial")
        .without_bones([HumanoidBone::LeftLowerArm, HumanoidBone::RightLowerArm]);
    let mut a = AvatarAnimator::with_rng(
        model,
        &AnimatorConfig::default(),
        StdRng::seed_from_u64(24),
    );
    for _ in 0..120 {
        a.tick(DT);
    }
    let model = a.model();
    assert_eq!(model.rotation(HumanoidBone::LeftLowerArm), glam::Quat::IDENTITY);
    assert_eq!(model.rotation(HumanoidBone::Head), a.pose().get(HumanoidBone::Head));
    assert_eq!(model.bone_writes(), 120 * (HumanoidBone::COUNT as u64 - 2));
}

#[test]
fn long_session_keeps_every_invariant() {
    let mut a = seeded(25);
    let emotions = [Emotion::Happy, Emotion::Sad, Emotion::Shy, Emotion::Angry];
    let mut gestures_seen = 0;
    let mut was_playing = false;

    for step in 0..(40.0 / DT) as usize {
        if step % 300 == 0 {
            a.set_emotion(emotions[(step / 300) % emotions.len()]);
        }
        a.tick(DT);

        let weight = a.gesture_weight();
        assert!((0.0..=1.0).contains(&weight), "weight {}", weight);
        for (bone, q) in a.pose().iter() {
            let err = (Vec4::from(q).length_squared() - 1.0).abs();
            assert!(err < 1e-4, "{} drifted off unit length: {}", bone.name(), err);
        }

        let playing = a.gesture_state() == GestureState::Playing;
        if !playing {
            assert_eq!(weight, 0.0);
            assert_eq!(a.pose(), &idle_pose(a.elapsed(), a.phases()));
        }
        if playing && !was_playing {
            gestures_seen += 1;
        }
        was_playing = playing;

        let blink = a.blink();
        assert!((0.0..=1.0).contains(&blink));
    }
    assert!(gestures_seen >= 4, "only {} gestures in 40 seconds", gestures_seen);
}

#[test]
fn dispose_leaves_model_clean_for_reuse() {
    let mut a = seeded(26);
    a.set_emotion(Emotion::Surprised);
    a.set_speaking(true);
    a.set_volume(90.0);
    for _ in 0..45 {
        a.tick(DT);
    }
    let model = a.dispose();
    for bone in HumanoidBone::ALL {
        assert_eq!(model.rotation(bone), glam::Quat::IDENTITY, "{} not reset", bone.name());
    }
    for channel in ExpressionChannel::ALL {
        assert_eq!(model.expression(channel), 0.0, "{} not cleared", channel.name());
    }

    // The same model can be bound again
    let mut again = AvatarAnimator::with_rng(
        model,
        &AnimatorConfig::default(),
        StdRng::seed_from_u64(27),
    );
    again.tick(DT);
    assert_eq!(again.emotion(), Emotion::Neutral);
}
