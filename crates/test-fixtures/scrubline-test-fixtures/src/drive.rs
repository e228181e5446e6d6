//! Helpers driving a controller over a [`ManualFrameSource`].

use scrubline_core::{FrameSource, ManualFrameSource, PlaybackConfig, PlaybackController};

use crate::listener::{ListenerHandle, ScriptedListener};

pub type ManualController = PlaybackController<ManualFrameSource>;

/// Controller with the given duration and a scripted listener already attached.
pub fn controller(duration_millis: f64) -> (ManualController, ListenerHandle) {
    let cfg = PlaybackConfig::default()
        .with_duration_millis(duration_millis)
        .expect("fixture duration should be valid");
    let mut ctl = PlaybackController::new(cfg, ManualFrameSource::new());
    let (listener, handle) = ScriptedListener::new();
    ctl.set_animation_listener(listener.boxed());
    (ctl, handle)
}

/// Advance time, then deliver the oldest pending frame. Returns false if none was pending.
pub fn tick(ctl: &mut ManualController, advance_millis: f64) -> bool {
    ctl.frames_mut().advance(advance_millis);
    let Some(handle) = ctl.frames_mut().take_pending() else {
        return false;
    };
    let now = ctl.frames().now_millis();
    ctl.on_frame(handle, now)
        .expect("frame callbacks should not fail");
    true
}

/// Deliver frames every `frame_millis` until none is pending or `max_frames` ran.
pub fn run_until_idle(ctl: &mut ManualController, frame_millis: f64, max_frames: usize) -> usize {
    let mut frames = 0;
    while frames < max_frames && tick(ctl, frame_millis) {
        frames += 1;
    }
    frames
}
