//! Animation System Tests
//!
//! Tests for:
//! - Sampler construction and validation
//! - Linear, step and cubic-spline sampling, including clamping
//! - Player loop modes (Once, Loop, PingPong) and playback controls
//! - Animator tick: native pushes, overriding manual writes, stale targets

use std::f32::consts::FRAC_PI_2;
use std::sync::Arc;

use glam::{Quat, Vec3, Vec4};

use pge::animation::sampler::SampledValue;
use pge::animation::{
    Animation, AnimationOutput, AnimationPlayer, Animator, Channel, Interpolation, LoopMode, PlaybackState, Sampler,
    TargetPath,
};
use pge::errors::PgeError;
use pge::gateway::Gateway;
use pge::scene::{NodeGraph, NodeKey};

fn approx_vec3(a: Vec3, b: Vec3) -> bool {
    (a - b).length() < 1e-4
}

fn vec3_at(sampler: &Sampler, t: f32) -> Vec3 {
    match sampler.sample(t) {
        SampledValue::Vec3(v) => v,
        SampledValue::Quat(q) => panic!("expected a Vec3, got {q:?}"),
    }
}

fn ramp() -> Sampler {
    Sampler::linear_vec3(&[(0.0, Vec3::ZERO), (1.0, Vec3::new(10.0, 0.0, 0.0))]).unwrap()
}

/// One translation channel over `sampler`, targeting `node`.
fn translation_clip(name: &str, node: NodeKey, sampler: Sampler) -> Animation {
    Animation::new(name, vec![sampler], vec![Channel::new(0, node, TargetPath::Translation)]).unwrap()
}

fn player_for(duration: f32, loop_mode: LoopMode) -> AnimationPlayer {
    let mut g = NodeGraph::new(Gateway::headless().0);
    let node = g.create_node();
    let sampler = Sampler::linear_vec3(&[(0.0, Vec3::ZERO), (duration, Vec3::X)]).unwrap();
    let mut player = AnimationPlayer::new(Arc::new(translation_clip("clip", node, sampler))).with_loop_mode(loop_mode);
    player.play();
    player
}

// ============================================================================
// Sampler Validation
// ============================================================================

#[test]
fn empty_sampler_is_rejected() {
    let result = Sampler::new(vec![], AnimationOutput::Vec3(vec![]), Interpolation::Linear);
    assert!(matches!(result, Err(PgeError::InvalidSampler(_))));
}

#[test]
fn decreasing_times_are_rejected() {
    let result = Sampler::new(
        vec![0.0, 2.0, 1.0],
        AnimationOutput::Vec3(vec![Vec3::ZERO; 3]),
        Interpolation::Linear,
    );
    assert!(matches!(result, Err(PgeError::InvalidSampler(_))));
}

#[test]
fn non_finite_times_are_rejected() {
    let result = Sampler::new(
        vec![0.0, f32::NAN],
        AnimationOutput::Vec3(vec![Vec3::ZERO; 2]),
        Interpolation::Linear,
    );
    assert!(matches!(result, Err(PgeError::InvalidSampler(_))));
}

#[test]
fn output_length_must_match_interpolation() {
    let mismatched = Sampler::new(
        vec![0.0, 1.0],
        AnimationOutput::Vec3(vec![Vec3::ZERO; 3]),
        Interpolation::Linear,
    );
    assert!(matches!(mismatched, Err(PgeError::InvalidSampler(_))));

    let cubic_without_tangents = Sampler::new(
        vec![0.0, 1.0],
        AnimationOutput::Vec3(vec![Vec3::ZERO; 2]),
        Interpolation::CubicSpline,
    );
    assert!(matches!(cubic_without_tangents, Err(PgeError::InvalidSampler(_))));

    let cubic = Sampler::new(
        vec![0.0, 1.0],
        AnimationOutput::Vec3(vec![Vec3::ZERO; 6]),
        Interpolation::CubicSpline,
    );
    assert!(cubic.is_ok());
}

#[test]
fn channel_kind_must_match_target() {
    let mut g = NodeGraph::new(Gateway::headless().0);
    let node = g.create_node();

    let wrong_kind = Animation::new("bad", vec![ramp()], vec![Channel::new(0, node, TargetPath::Rotation)]);
    assert!(matches!(wrong_kind, Err(PgeError::InvalidSampler(_))));

    let out_of_range = Animation::new("bad", vec![ramp()], vec![Channel::new(1, node, TargetPath::Scale)]);
    assert!(matches!(out_of_range, Err(PgeError::InvalidSampler(_))));
}

// ============================================================================
// Sampling
// ============================================================================

#[test]
fn linear_interpolates_between_keys() {
    let s = ramp();
    assert!(approx_vec3(vec3_at(&s, 0.5), Vec3::new(5.0, 0.0, 0.0)));
    assert!(approx_vec3(vec3_at(&s, 0.25), Vec3::new(2.5, 0.0, 0.0)));
}

#[test]
fn sampling_clamps_outside_the_key_range() {
    let s = ramp();
    assert_eq!(vec3_at(&s, -1.0), Vec3::ZERO);
    assert_eq!(vec3_at(&s, 2.0), Vec3::new(10.0, 0.0, 0.0));
    assert_eq!(vec3_at(&s, 1.0), Vec3::new(10.0, 0.0, 0.0));
}

#[test]
fn single_keyframe_is_constant() {
    let s = Sampler::linear_vec3(&[(0.5, Vec3::splat(3.0))]).unwrap();
    for t in [-100.0, 0.0, 0.5, 1.0e6] {
        assert_eq!(vec3_at(&s, t), Vec3::splat(3.0));
    }
}

#[test]
fn step_holds_left_key() {
    let s = Sampler::new(
        vec![0.0, 1.0, 2.0],
        AnimationOutput::Vec3(vec![Vec3::ZERO, Vec3::ONE, Vec3::splat(2.0)]),
        Interpolation::Step,
    )
    .unwrap();
    assert_eq!(vec3_at(&s, 0.99), Vec3::ZERO);
    assert_eq!(vec3_at(&s, 1.0), Vec3::ONE);
    assert_eq!(vec3_at(&s, 1.5), Vec3::ONE);
}

#[test]
fn cubic_spline_with_zero_tangents_eases() {
    // [in, value, out] per key
    let s = Sampler::new(
        vec![0.0, 1.0],
        AnimationOutput::Vec3(vec![Vec3::ZERO, Vec3::ZERO, Vec3::ZERO, Vec3::ZERO, Vec3::X, Vec3::ZERO]),
        Interpolation::CubicSpline,
    )
    .unwrap();

    assert_eq!(vec3_at(&s, 0.0), Vec3::ZERO);
    assert!(approx_vec3(vec3_at(&s, 0.5), Vec3::new(0.5, 0.0, 0.0)));
    // Hermite with flat tangents: 3t^2 - 2t^3
    assert!(approx_vec3(vec3_at(&s, 0.25), Vec3::new(0.15625, 0.0, 0.0)));
    assert_eq!(vec3_at(&s, 1.0), Vec3::X);
}

#[test]
fn cubic_spline_scales_tangents_by_key_interval() {
    // Keys two seconds apart. Only key 0's out-tangent and key 1's
    // in-tangent shape the segment; the outer tangents are decoys.
    let s = Sampler::new(
        vec![0.0, 2.0],
        AnimationOutput::Vec3(vec![
            Vec3::splat(100.0),
            Vec3::ZERO,
            Vec3::X,
            Vec3::new(-3.0, 0.0, 0.0),
            Vec3::new(4.0, 0.0, 0.0),
            Vec3::splat(-100.0),
        ]),
        Interpolation::CubicSpline,
    )
    .unwrap();

    // p(t) = h00*v0 + h10*dt*m0 + h01*v1 + h11*dt*m1, dt = 2
    // t = 0.25: 0.140625*2*1 + 0.15625*4 + (-0.046875)*2*(-3) = 1.1875
    assert!(approx_vec3(vec3_at(&s, 0.5), Vec3::new(1.1875, 0.0, 0.0)));
    // t = 0.75: 0.046875*2*1 + 0.84375*4 + (-0.140625)*2*(-3) = 4.3125
    assert!(approx_vec3(vec3_at(&s, 1.5), Vec3::new(4.3125, 0.0, 0.0)));
    assert_eq!(vec3_at(&s, 0.0), Vec3::ZERO);
    assert_eq!(vec3_at(&s, 2.0), Vec3::new(4.0, 0.0, 0.0));
}

#[test]
fn cubic_spline_rotation_is_normalized() {
    let end = Quat::from_rotation_y(FRAC_PI_2);
    let out_tangent = Quat::from_xyzw(0.0, 0.4, 0.0, 0.0);
    let in_tangent = Quat::from_xyzw(0.0, 0.2, 0.0, 0.0);
    let s = Sampler::new(
        vec![0.0, 2.0],
        AnimationOutput::Quat(vec![
            Quat::from_xyzw(0.0, 0.0, 0.0, 0.0),
            Quat::IDENTITY,
            out_tangent,
            in_tangent,
            end,
            Quat::from_xyzw(0.0, 0.0, 0.0, 0.0),
        ]),
        Interpolation::CubicSpline,
    )
    .unwrap();

    let SampledValue::Quat(mid) = s.sample(1.0) else {
        panic!("expected a rotation");
    };
    // t = 0.5: h00 = h01 = 0.5, h10 = 0.125, h11 = -0.125, dt = 2
    let raw = Vec4::from(Quat::IDENTITY) * 0.5
        + Vec4::from(out_tangent) * 0.25
        + Vec4::from(end) * 0.5
        - Vec4::from(in_tangent) * 0.25;
    let expected = Quat::from_vec4(raw.normalize());

    assert!((mid.length() - 1.0).abs() < 1e-5);
    assert!(mid.abs_diff_eq(expected, 1e-4), "{mid:?} != {expected:?}");
}

#[test]
fn rotation_keys_use_slerp() {
    let end = Quat::from_rotation_y(FRAC_PI_2);
    let s = Sampler::linear_quat(&[(0.0, Quat::IDENTITY), (1.0, end)]).unwrap();
    let SampledValue::Quat(mid) = s.sample(0.5) else {
        panic!("expected a rotation");
    };
    let expected = Quat::from_rotation_y(FRAC_PI_2 / 2.0);
    assert!(mid.abs_diff_eq(expected, 1e-4) || mid.abs_diff_eq(-expected, 1e-4));
    assert!((mid.length() - 1.0).abs() < 1e-5);
}

#[test]
fn cursor_sampling_matches_binary_search() {
    let keys: Vec<(f32, Vec3)> = (0..20).map(|i| (i as f32 * 0.1, Vec3::splat(i as f32))).collect();
    let s = Sampler::linear_vec3(&keys).unwrap();
    let mut cursor = pge::animation::sampler::KeyframeCursor::default();

    let mut t = 0.0;
    while t < 2.5 {
        assert_eq!(s.sample_with_cursor(t, &mut cursor), s.sample(t), "t = {t}");
        t += 0.037;
    }
    // Jump backwards past the scan window
    assert_eq!(s.sample_with_cursor(0.05, &mut cursor), s.sample(0.05));
}

// ============================================================================
// Player
// ============================================================================

#[test]
fn loop_wraps_past_the_end() {
    let mut player = player_for(2.0, LoopMode::Loop);
    player.advance(3.0);
    assert!((player.time() - 1.0).abs() < 1e-5);
    assert_eq!(player.state(), PlaybackState::Playing);
}

#[test]
fn once_clamps_and_stops() {
    let mut player = player_for(2.0, LoopMode::Once);
    player.advance(1.5);
    assert!(player.is_playing());
    player.advance(1.5);
    assert_eq!(player.time(), 2.0);
    assert_eq!(player.state(), PlaybackState::Stopped);
}

#[test]
fn ping_pong_reverses_at_the_ends() {
    let mut player = player_for(2.0, LoopMode::PingPong);
    player.advance(3.0);
    assert!((player.time() - 1.0).abs() < 1e-5);
    player.advance(0.5);
    assert!((player.time() - 0.5).abs() < 1e-5);
    player.advance(1.0);
    assert!((player.time() - 0.5).abs() < 1e-5);
    assert!(player.is_playing());
}

#[test]
fn pause_freezes_and_stop_rewinds() {
    let mut player = player_for(2.0, LoopMode::Loop);
    player.advance(0.5);
    player.pause();
    player.advance(1.0);
    assert_eq!(player.time(), 0.5);
    assert_eq!(player.state(), PlaybackState::Paused);

    player.play();
    player.advance(0.25);
    assert!((player.time() - 0.75).abs() < 1e-5);

    player.stop();
    assert_eq!(player.time(), 0.0);
    assert_eq!(player.state(), PlaybackState::Stopped);
}

#[test]
fn seek_clamps_to_duration() {
    let mut player = player_for(2.0, LoopMode::Once);
    player.seek(5.0);
    assert_eq!(player.time(), 2.0);
    player.seek(-1.0);
    assert_eq!(player.time(), 0.0);
    player.seek(f32::NAN);
    assert_eq!(player.time(), 0.0);
}

#[test]
fn negative_time_scale_plays_backwards() {
    let mut player = player_for(2.0, LoopMode::Once);
    player.stop();
    player.time_scale = -1.0;
    player.play();
    assert_eq!(player.time(), 2.0);
    player.advance(0.5);
    assert!((player.time() - 1.5).abs() < 1e-5);
    player.advance(5.0);
    assert_eq!(player.time(), 0.0);
    assert_eq!(player.state(), PlaybackState::Stopped);
}

// ============================================================================
// Animator
// ============================================================================

#[test]
fn tick_pushes_sampled_pose_to_engine() {
    let (gateway, engine) = Gateway::headless();
    let mut graph = NodeGraph::new(gateway);
    let node = graph.create_node();
    let handle = graph.handle_of(node).unwrap();

    let mut animator = Animator::new();
    let clip = animator.add_animation(translation_clip("slide", node, ramp()));
    let player = animator.create_player(clip).unwrap();
    animator.play(player).unwrap();

    animator.tick(0.5, &mut graph).unwrap();

    let expected = Vec3::new(5.0, 0.0, 0.0);
    assert!(approx_vec3(graph.node(node).unwrap().translation(), expected));
    assert!(approx_vec3(engine.last_translation(handle).unwrap(), expected));
}

#[test]
fn animation_overrides_manual_write_in_same_tick() {
    let mut graph = NodeGraph::new(Gateway::headless().0);
    let node = graph.create_node();
    let mut animator = Animator::new();
    let clip = animator.add_animation(translation_clip("slide", node, ramp()));
    let player = animator.create_player(clip).unwrap();
    animator.play(player).unwrap();

    graph.set_translation(node, Vec3::new(0.0, 99.0, 0.0)).unwrap();
    animator.tick(0.25, &mut graph).unwrap();

    assert!(approx_vec3(graph.node(node).unwrap().translation(), Vec3::new(2.5, 0.0, 0.0)));
}

#[test]
fn finished_player_writes_final_pose_then_idles() {
    let (gateway, engine) = Gateway::headless();
    let mut graph = NodeGraph::new(gateway);
    let node = graph.create_node();
    let mut animator = Animator::new();
    let clip = animator.add_animation(translation_clip("slide", node, ramp()));
    let player = animator.create_player(clip).unwrap();
    animator.play(player).unwrap();

    animator.tick(5.0, &mut graph).unwrap();
    assert_eq!(graph.node(node).unwrap().translation(), Vec3::new(10.0, 0.0, 0.0));
    assert_eq!(animator.playing_count(), 0);

    engine.take_calls();
    animator.tick(0.1, &mut graph).unwrap();
    assert!(engine.calls().is_empty());
}

#[test]
fn destroyed_target_stops_player() {
    let mut graph = NodeGraph::new(Gateway::headless().0);
    let node = graph.create_node();
    let mut animator = Animator::new();
    let clip = animator.add_animation(translation_clip("slide", node, ramp()));
    let player = animator.create_player(clip).unwrap();
    animator.play(player).unwrap();

    graph.destroy_node(node).unwrap();
    assert!(matches!(animator.tick(0.1, &mut graph), Err(PgeError::StaleHandle(_))));
    assert_eq!(animator.player(player).unwrap().state(), PlaybackState::Stopped);
    assert!(animator.tick(0.1, &mut graph).is_ok());
}

#[test]
fn native_failure_is_reported_but_pose_kept() {
    let (gateway, engine) = Gateway::headless();
    let mut graph = NodeGraph::new(gateway);
    let node = graph.create_node();
    engine.fail_node(graph.handle_of(node).unwrap(), "node not found");

    let mut animator = Animator::new();
    let clip = animator.add_animation(translation_clip("slide", node, ramp()));
    let player = animator.create_player(clip).unwrap();
    animator.play(player).unwrap();

    let result = animator.tick(0.5, &mut graph);
    assert!(matches!(result, Err(PgeError::NativeCallFailed { .. })));
    assert!(approx_vec3(graph.node(node).unwrap().translation(), Vec3::new(5.0, 0.0, 0.0)));
    assert!(animator.player(player).unwrap().is_playing());
}

#[test]
fn animations_are_found_by_name() {
    let mut graph = NodeGraph::new(Gateway::headless().0);
    let node = graph.create_node();
    let mut animator = Animator::new();
    let clip = animator.add_animation(translation_clip("walk", node, ramp()));

    assert_eq!(animator.find_animation("walk"), Some(clip));
    assert_eq!(animator.animation(clip).unwrap().duration(), 1.0);
    assert!(animator.remove_animation(clip).is_some());
    assert!(animator.create_player(clip).is_err());
}
