use scrubline_core::{ListenerError, PlaybackState, TransitionKind};
use scrubline_test_fixtures::{drive, Reply, ScriptedListener, StepReply};

fn approx(a: f64, b: f64) {
    assert!((a - b).abs() <= 1e-9, "left={a} right={b}");
}

#[test]
fn deferred_start_commits_on_approval() {
    let (mut ctl, listener) = drive::controller(1_000.0);
    listener.queue_start(Reply::Defer);
    ctl.start(false);

    assert!(ctl.state().is_suspended());
    assert_eq!(ctl.state().state(), PlaybackState::Playing);
    assert!(ctl.frames().pending().is_empty());
    assert!(ctl.drain_events().is_empty());
    assert!(!ctl.poll_suspension().unwrap());

    assert!(listener.take_start_resolver().unwrap().resolve(true));
    assert!(ctl.poll_suspension().unwrap());
    assert!(!ctl.state().is_suspended());
    assert_eq!(ctl.frames().pending().len(), 1);

    let events = ctl.drain_events();
    assert_eq!(events[0].kind, TransitionKind::Start);
    assert_eq!(events[0].transition.from().state(), PlaybackState::Stopped);
    assert!(!events[0].transition.to().is_suspended());
}

#[test]
fn deferred_start_rejection_restores_snapshot() {
    let (mut ctl, listener) = drive::controller(1_000.0);
    ctl.move_to(0.7).unwrap();
    ctl.drain_events();
    let before = ctl.state();

    listener.queue_start(Reply::Defer);
    ctl.start(true);
    assert!(ctl.state().is_suspended());
    listener
        .take_start_resolver()
        .unwrap()
        .reject(ListenerError::rejected("asset failed to load"));
    assert!(ctl.poll_suspension().unwrap());
    assert_eq!(ctl.state(), before);
    assert!(ctl.drain_events().is_empty());
}

#[test]
fn deferred_start_refusal_restores_snapshot() {
    let (mut ctl, listener) = drive::controller(1_000.0);
    let before = ctl.state();
    listener.queue_start(Reply::Defer);
    ctl.start(false);
    listener.take_start_resolver().unwrap().resolve(false);
    ctl.poll_suspension().unwrap();
    assert_eq!(ctl.state(), before);
}

#[test]
fn stop_supersedes_pending_start() {
    let (mut ctl, listener) = drive::controller(1_000.0);
    listener.queue_start(Reply::Defer);
    ctl.start(false);
    ctl.stop();

    let resolver = listener.take_start_resolver().unwrap();
    assert!(resolver.is_cancelled());
    assert!(!resolver.resolve(true));
    assert!(!ctl.poll_suspension().unwrap());

    assert_eq!(ctl.state().state(), PlaybackState::Stopped);
    assert!(!ctl.state().is_suspended());
    let kinds: Vec<_> = ctl.drain_events().into_iter().map(|e| e.kind).collect();
    assert_eq!(kinds, [TransitionKind::Stop, TransitionKind::Change]);
}

#[test]
fn newer_move_supersedes_older_resolved_first() {
    let (mut ctl, listener) = drive::controller(1_000.0);
    listener.set_default_move(Reply::Defer);
    ctl.move_to(0.6).unwrap();
    ctl.move_to(0.3).unwrap();
    assert!(ctl.state().is_suspended());

    assert!(!listener.take_move_resolver(0.6).unwrap().resolve(true));
    assert!(!ctl.poll_suspension().unwrap());
    assert!(listener.take_move_resolver(0.3).unwrap().resolve(true));
    assert!(ctl.poll_suspension().unwrap());

    approx(ctl.state().fraction(), 0.3);
    let events = ctl.drain_events();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].kind, TransitionKind::JumpPaused);
    approx(events[0].transition.to().fraction(), 0.3);
}

#[test]
fn newer_move_supersedes_older_resolved_last() {
    let (mut ctl, listener) = drive::controller(1_000.0);
    listener.set_default_move(Reply::Defer);
    ctl.move_to(0.6).unwrap();
    ctl.move_to(0.3).unwrap();

    listener.take_move_resolver(0.3).unwrap().resolve(true);
    assert!(ctl.poll_suspension().unwrap());
    listener.take_move_resolver(0.6).unwrap().resolve(true);
    assert!(!ctl.poll_suspension().unwrap());

    approx(ctl.state().fraction(), 0.3);
    assert!(!ctl.state().is_suspended());
}

#[test]
fn rejected_move_pauses_at_previous_fraction() {
    let (mut ctl, listener) = drive::controller(1_000.0);
    ctl.move_to(0.4).unwrap();
    ctl.drain_events();

    listener.queue_move(Reply::Defer);
    ctl.move_to(0.8).unwrap();
    assert!(ctl.state().is_suspended());
    listener
        .take_move_resolver(0.8)
        .unwrap()
        .reject(ListenerError::rejected("seek failed"));
    assert!(ctl.poll_suspension().unwrap());

    assert_eq!(ctl.state().state(), PlaybackState::Paused);
    approx(ctl.state().fraction(), 0.4);
    assert!(!ctl.state().is_suspended());
    assert!(ctl.drain_events().is_empty());
}

#[test]
fn dropped_resolver_counts_as_refusal() {
    let (mut ctl, listener) = drive::controller(1_000.0);
    listener.queue_move(Reply::Defer);
    ctl.move_to(0.5).unwrap();
    drop(listener.take_move_resolver(0.5));
    assert!(ctl.poll_suspension().unwrap());
    assert_eq!(ctl.state().state(), PlaybackState::Stopped);
    assert!(!ctl.state().is_suspended());
}

#[test]
fn deferred_move_while_playing_resumes_clock() {
    let (mut ctl, listener) = drive::controller(1_000.0);
    ctl.start(false);
    drive::tick(&mut ctl, 0.0);
    drive::tick(&mut ctl, 300.0);
    ctl.drain_events();

    listener.queue_move(Reply::Defer);
    ctl.move_to(0.7).unwrap();
    assert!(ctl.frames().pending().is_empty());
    listener.take_move_resolver(0.7).unwrap().resolve(true);
    ctl.poll_suspension().unwrap();

    assert_eq!(ctl.state().state(), PlaybackState::Playing);
    approx(ctl.state().fraction(), 0.7);
    assert_eq!(ctl.frames().pending().len(), 1);
    assert_eq!(ctl.drain_events()[0].kind, TransitionKind::JumpPlaying);
}

#[test]
fn pause_cancels_pending_move() {
    let (mut ctl, listener) = drive::controller(1_000.0);
    ctl.move_to(0.5).unwrap();
    listener.queue_move(Reply::Defer);
    ctl.move_to(0.9).unwrap();
    ctl.pause();

    assert!(listener.take_move_resolver(0.9).unwrap().is_cancelled());
    assert_eq!(ctl.state().state(), PlaybackState::Paused);
    approx(ctl.state().fraction(), 0.5);
    assert!(!ctl.state().is_suspended());
}

fn stepping_controller() -> (drive::ManualController, scrubline_test_fixtures::ListenerHandle) {
    let (mut ctl, _) = drive::controller(1_000.0);
    let (listener, handle) = ScriptedListener::new();
    ctl.set_animation_listener(listener.with_step_hook().boxed());
    ctl.move_to(0.5).unwrap();
    ctl.drain_events();
    (ctl, handle)
}

#[test]
fn step_applies_listener_fraction() {
    let (mut ctl, listener) = stepping_controller();
    listener.queue_step(StepReply::To(0.6));
    ctl.step(0.5, false).unwrap();

    assert_eq!(ctl.state().state(), PlaybackState::Paused);
    approx(ctl.state().fraction(), 0.6);
    let kinds: Vec<_> = ctl.drain_events().into_iter().map(|e| e.kind).collect();
    assert_eq!(kinds, [TransitionKind::Step, TransitionKind::Change]);
}

#[test]
fn refused_step_changes_nothing() {
    let (mut ctl, listener) = stepping_controller();
    let before = ctl.state();
    listener.queue_step(StepReply::Refuse);
    ctl.step(0.5, true).unwrap();
    assert_eq!(ctl.state(), before);
    assert!(ctl.drain_events().is_empty());
}

#[test]
fn rejected_deferred_step_leaves_fraction_untouched() {
    let (mut ctl, listener) = stepping_controller();
    let before = ctl.state();
    listener.queue_step(StepReply::Defer);
    ctl.step(0.5, false).unwrap();
    assert!(ctl.state().is_suspended());

    listener
        .take_step_resolver()
        .unwrap()
        .reject(ListenerError::rejected("frame unavailable"));
    assert!(ctl.poll_suspension().unwrap());
    assert_eq!(ctl.state(), before);
    assert!(ctl.drain_events().is_empty());
}

#[test]
fn deferred_step_applies_on_resolution() {
    let (mut ctl, listener) = stepping_controller();
    listener.queue_step(StepReply::Defer);
    ctl.step(0.5, true).unwrap();
    listener.take_step_resolver().unwrap().resolve(Some(0.4));
    assert!(ctl.poll_suspension().unwrap());
    approx(ctl.state().fraction(), 0.4);
    assert!(!ctl.state().is_suspended());
}

#[test]
fn move_supersedes_pending_step() {
    let (mut ctl, listener) = stepping_controller();
    listener.queue_step(StepReply::Defer);
    ctl.step(0.5, false).unwrap();
    ctl.move_to(0.9).unwrap();

    let resolver = listener.take_step_resolver().unwrap();
    assert!(!resolver.resolve(Some(0.6)));
    assert!(!ctl.poll_suspension().unwrap());
    approx(ctl.state().fraction(), 0.9);
}

#[test]
fn refused_step_while_playing_keeps_clock_running() {
    let (mut ctl, listener) = stepping_controller();
    ctl.start(false);
    listener.queue_step(StepReply::Refuse);
    ctl.step(0.5, false).unwrap();
    assert_eq!(ctl.state().state(), PlaybackState::Playing);
    assert_eq!(ctl.frames().pending().len(), 1);
}

#[test]
fn step_without_hook_is_ignored() {
    let (mut ctl, _listener) = drive::controller(1_000.0);
    ctl.move_to(0.5).unwrap();
    ctl.drain_events();
    let before = ctl.state();
    ctl.step(0.5, false).unwrap();
    assert_eq!(ctl.state(), before);
    assert!(ctl.drain_events().is_empty());
}

#[test]
fn non_finite_step_is_rejected() {
    let (mut ctl, _listener) = stepping_controller();
    assert!(ctl.step(f64::NAN, false).is_err());
}

#[test]
fn listener_replacement_cancels_suspension() {
    let (mut ctl, listener) = drive::controller(1_000.0);
    listener.queue_start(Reply::Defer);
    ctl.start(false);
    let (next, _next_handle) = ScriptedListener::new();
    ctl.set_animation_listener(next.boxed());

    assert!(listener.take_start_resolver().unwrap().is_cancelled());
    assert!(!ctl.state().is_suspended());
    assert_eq!(ctl.state().state(), PlaybackState::Playing);
    assert_eq!(ctl.frames().pending().len(), 1);
}

#[test]
fn step_without_hook_leaves_deferred_start_outstanding() {
    let (mut ctl, listener) = drive::controller(1_000.0);
    listener.queue_start(Reply::Defer);
    ctl.start(false);
    ctl.step(0.0, false).unwrap();
    assert!(ctl.state().is_suspended());

    let resolver = listener.take_start_resolver().unwrap();
    assert!(!resolver.is_cancelled());
    assert!(resolver.resolve(true));
    assert!(ctl.poll_suspension().unwrap());
    assert_eq!(ctl.state().state(), PlaybackState::Playing);
    assert_eq!(ctl.frames().pending().len(), 1);
    assert_eq!(drive::run_until_idle(&mut ctl, 100.0, 3), 3);
}

#[test]
fn step_without_hook_leaves_deferred_frame_outstanding() {
    let (mut ctl, listener) = drive::controller(1_000.0);
    ctl.start(false);
    drive::tick(&mut ctl, 0.0);
    listener.queue_move(Reply::Defer);
    drive::tick(&mut ctl, 100.0);

    ctl.step(0.1, false).unwrap();
    assert!(ctl.state().is_suspended());
    listener.take_next_move_resolver().unwrap().resolve(true);
    assert!(ctl.poll_suspension().unwrap());
    approx(ctl.state().fraction(), 0.1);
    assert_eq!(ctl.state().state(), PlaybackState::Playing);
    assert_eq!(ctl.frames().pending().len(), 1);
}

#[test]
fn non_finite_step_answer_keeps_playback_running() {
    let (mut ctl, listener) = stepping_controller();
    ctl.start(false);
    listener.queue_step(StepReply::To(f64::NAN));
    assert!(ctl.step(0.5, false).is_err());
    assert_eq!(ctl.state().state(), PlaybackState::Playing);
    assert!(!ctl.state().is_suspended());
    approx(ctl.state().fraction(), 0.5);
    assert_eq!(ctl.frames().pending().len(), 1);

    listener.queue_step(StepReply::Defer);
    ctl.step(0.5, false).unwrap();
    listener.take_step_resolver().unwrap().resolve(Some(f64::INFINITY));
    assert!(ctl.poll_suspension().is_err());
    assert_eq!(ctl.state().state(), PlaybackState::Playing);
    assert!(!ctl.state().is_suspended());
    assert_eq!(ctl.frames().pending().len(), 1);
}
