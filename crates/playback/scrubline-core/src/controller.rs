//! Playback state machine.
//!
//! Every transition that depends on the animation is negotiated with the
//! registered [`AnimationListener`]. Answers may be immediate or deferred;
//! at most one deferred answer is outstanding at a time and any new
//! negotiated operation cancels the stale one before it proceeds.
//!
//! Host integration, once per display refresh:
//! - call [`PlaybackController::poll_suspension`] so settled listener answers are applied;
//! - deliver due frames with [`PlaybackController::on_frame`];
//! - forward [`PlaybackController::drain_events`] to observers.

use crate::clock::{FrameHandle, FrameSource, TimeBasedState};
use crate::config::PlaybackConfig;
use crate::deferred::Negotiation;
use crate::error::PlaybackError;
use crate::listener::AnimationListener;
use crate::notifier::{PlaybackEvent, TransitionKind, TransitionNotifier};
use crate::state::{ControlActivation, PlaybackState, PlaybackStateInfo};
use crate::suspension::{SuspensionControl, SuspensionPoll};
use crate::ticks::{Tick, TickLabels, TickRenderer};

/// The negotiation a deferred answer belongs to.
enum Suspension {
    Start {
        previous: PlaybackStateInfo,
        control: SuspensionControl<bool>,
    },
    Move {
        from: PlaybackStateInfo,
        candidate: f64,
        control: SuspensionControl<bool>,
    },
    Tick {
        candidate: f64,
        one_off: bool,
        waiting_since: f64,
        control: SuspensionControl<bool>,
    },
    Step {
        from: PlaybackStateInfo,
        control: SuspensionControl<Option<f64>>,
    },
}

/// Settled answer of a suspension. Rejections are already folded into refusals.
enum Answer {
    Approved(bool),
    Stepped(Option<f64>),
    Cancelled,
}

fn fold<T>(what: &str, poll: SuspensionPoll<T>, refused: T) -> Option<Result<T, ()>> {
    match poll {
        SuspensionPoll::Pending => None,
        SuspensionPoll::Resolved(value) => Some(Ok(value)),
        SuspensionPoll::Rejected(err) => {
            log::debug!("{what} negotiation failed: {err}");
            Some(Ok(refused))
        }
        SuspensionPoll::Cancelled => Some(Err(())),
    }
}

impl Suspension {
    fn name(&self) -> &'static str {
        match self {
            Self::Start { .. } => "start",
            Self::Move { .. } => "move",
            Self::Tick { .. } => "tick",
            Self::Step { .. } => "step",
        }
    }

    fn cancel(&mut self) -> bool {
        match self {
            Self::Start { control, .. } | Self::Move { control, .. } | Self::Tick { control, .. } => {
                control.cancel()
            }
            Self::Step { control, .. } => control.cancel(),
        }
    }

    fn poll(&mut self) -> Option<Answer> {
        let what = self.name();
        let settled = match self {
            Self::Start { control, .. } | Self::Move { control, .. } | Self::Tick { control, .. } => {
                fold(what, control.poll(), false)?.map(Answer::Approved)
            }
            Self::Step { control, .. } => fold(what, control.poll(), None)?.map(Answer::Stepped),
        };
        Some(settled.unwrap_or(Answer::Cancelled))
    }
}

/// Drives one completion-fraction timeline on behalf of an external animation.
pub struct PlaybackController<F: FrameSource> {
    config: PlaybackConfig,
    info: PlaybackStateInfo,
    listener: Option<Box<dyn AnimationListener>>,
    /// Present exactly while a listener is registered.
    clock: Option<TimeBasedState>,
    frames: F,
    suspension: Option<Suspension>,
    notifier: TransitionNotifier,
    ticks: Option<TickRenderer>,
    tick_display: Vec<Tick>,
}

impl<F: FrameSource> std::fmt::Debug for PlaybackController<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackController")
            .field("config", &self.config)
            .field("info", &self.info)
            .field("has_listener", &self.listener.is_some())
            .field("clock", &self.clock)
            .field("suspension", &self.suspension.as_ref().map(Suspension::name))
            .finish_non_exhaustive()
    }
}

impl<F: FrameSource> PlaybackController<F> {
    /// Create a stopped controller at fraction 0 with no listener.
    pub fn new(config: PlaybackConfig, frames: F) -> Self {
        Self {
            config,
            info: PlaybackStateInfo::default(),
            listener: None,
            clock: None,
            frames,
            suspension: None,
            notifier: TransitionNotifier::new(),
            ticks: None,
            tick_display: Vec::new(),
        }
    }

    // ----- accessors -----

    /// Snapshot of the current state; never aliases internal state.
    #[inline]
    pub fn state(&self) -> PlaybackStateInfo {
        self.info
    }

    #[inline]
    pub fn is_suspended(&self) -> bool {
        self.info.is_suspended()
    }

    #[inline]
    pub fn controls(&self) -> ControlActivation {
        ControlActivation::for_state(&self.info)
    }

    #[inline]
    pub fn config(&self) -> &PlaybackConfig {
        &self.config
    }

    #[inline]
    pub fn has_listener(&self) -> bool {
        self.listener.is_some()
    }

    /// Clock bookkeeping, present while a listener is registered.
    #[inline]
    pub fn clock(&self) -> Option<&TimeBasedState> {
        self.clock.as_ref()
    }

    #[inline]
    pub fn ticks(&self) -> &[Tick] {
        &self.tick_display
    }

    #[inline]
    pub fn frames(&self) -> &F {
        &self.frames
    }

    #[inline]
    pub fn frames_mut(&mut self) -> &mut F {
        &mut self.frames
    }

    /// Take all transition events recorded since the last call.
    pub fn drain_events(&mut self) -> Vec<PlaybackEvent> {
        self.notifier.drain()
    }

    // ----- configuration -----

    pub fn set_duration_millis(&mut self, millis: f64) -> Result<(), PlaybackError> {
        self.config.set_duration_millis(millis)?;
        let running = match self.clock.as_mut() {
            Some(clock) => {
                clock.set_duration_millis(millis);
                clock.timer().is_some() && !clock.is_one_off()
            }
            None => false,
        };
        if running && self.info.is_playing() {
            // re-anchor so the new duration applies from the current fraction
            self.start_clock(false);
        }
        Ok(())
    }

    pub fn set_max_ticks(&mut self, cap: Option<usize>) -> Result<(), PlaybackError> {
        self.config.set_max_ticks(cap)?;
        if let Some(renderer) = self.ticks.as_mut() {
            renderer.set_max_ticks(cap);
        }
        self.refresh_ticks();
        Ok(())
    }

    pub fn set_title(&mut self, title: Option<String>) {
        self.config.set_title(title);
    }

    pub fn set_tick_labels(&mut self, labels: Option<TickLabels>) {
        self.ticks = labels.map(|labels| TickRenderer::new(labels, self.config.max_ticks()));
        self.refresh_ticks();
    }

    /// Replace the listener; playback in progress continues under the new one.
    pub fn set_animation_listener(&mut self, listener: Option<Box<dyn AnimationListener>>) {
        self.cancel_suspension();
        self.halt_clock();
        self.clock = None;
        self.listener = listener;
        if self.listener.is_some() {
            self.clock = Some(TimeBasedState::new(self.config.duration_millis()));
            if self.info.is_playing() {
                self.start_clock(false);
            }
        }
    }

    // ----- negotiated operations -----

    /// Request playback in the given direction.
    pub fn start(&mut self, backwards: bool) {
        if self.listener.is_none() {
            log::debug!("start ignored: no animation listener");
            return;
        }
        let target = PlaybackState::playing(backwards);
        if self.info.state() == target {
            return;
        }
        self.cancel_suspension();
        self.halt_clock();

        let previous = self.info;
        self.info.set_state(target);
        let fraction = self.info.fraction();
        if backwards && fraction <= 0.0 {
            self.info.set_fraction(1.0);
        } else if !backwards && fraction >= 1.0 {
            self.info.set_fraction(0.0);
        }

        let fraction = self.info.fraction();
        let Some(listener) = self.listener.as_mut() else {
            return;
        };
        match listener.start(fraction, backwards) {
            Negotiation::Immediate(true) => self.commit_start(previous),
            Negotiation::Immediate(false) => self.abort_start(previous),
            Negotiation::Deferred(deferred) => {
                self.info.set_suspended(true);
                self.suspension = Some(Suspension::Start {
                    previous,
                    control: SuspensionControl::new(deferred),
                });
            }
        }
    }

    /// Jump to `fraction`, subject to the listener's approval.
    pub fn move_to(&mut self, fraction: f64) -> Result<(), PlaybackError> {
        if !fraction.is_finite() {
            return Err(PlaybackError::NonFiniteFraction { value: fraction });
        }
        self.cancel_suspension();
        let from = self.info;
        if self.listener.is_none() {
            log::debug!("move refused: no animation listener");
            self.abort_move(from.fraction());
            return Ok(());
        }
        self.halt_clock();

        let candidate = fraction.clamp(0.0, 1.0);
        let proposed = from.with_fraction(candidate);
        let Some(listener) = self.listener.as_mut() else {
            return Ok(());
        };
        match listener.move_to(&proposed) {
            Negotiation::Immediate(true) => self.commit_move(from, candidate),
            Negotiation::Immediate(false) => {
                self.abort_move(from.fraction());
                Ok(())
            }
            Negotiation::Deferred(deferred) => {
                self.info.set_suspended(true);
                self.suspension = Some(Suspension::Move {
                    from,
                    candidate,
                    control: SuspensionControl::new(deferred),
                });
                Ok(())
            }
        }
    }

    /// Ask the listener for the position one step away from `fraction`.
    ///
    /// Steps only reposition; a refused step leaves everything as it was.
    pub fn step(&mut self, fraction: f64, backwards: bool) -> Result<(), PlaybackError> {
        if !fraction.is_finite() {
            return Err(PlaybackError::NonFiniteFraction { value: fraction });
        }
        let Some(listener) = self.listener.as_mut() else {
            log::debug!("step ignored: no animation listener");
            return Ok(());
        };
        // without a hook nothing is touched, outstanding negotiations included
        let Some(answer) = listener.step(fraction, backwards) else {
            log::debug!("step ignored: listener has no step hook");
            return Ok(());
        };
        self.cancel_suspension();
        self.halt_clock();
        let from = self.info;
        match answer {
            Negotiation::Immediate(Some(next)) => self.commit_step(from, next),
            Negotiation::Immediate(None) => {
                self.abort_step();
                Ok(())
            }
            Negotiation::Deferred(deferred) => {
                self.info.set_suspended(true);
                self.suspension = Some(Suspension::Step {
                    from,
                    control: SuspensionControl::new(deferred),
                });
                Ok(())
            }
        }
    }

    // ----- unconditional operations -----

    /// Rest at fraction 0.
    pub fn stop(&mut self) {
        self.stop_with(false);
    }

    /// Rest at fraction 1.
    pub fn finish(&mut self) {
        self.finish_with(false);
    }

    /// Rest at the current fraction; degrades to stop/finish at the boundaries.
    pub fn pause(&mut self) {
        self.cancel_suspension();
        let from = self.info;
        let kind = self.pause_inner();
        self.notifier.emit(kind, from, self.info);
    }

    // ----- host callbacks -----

    /// Apply a listener answer that has settled since the last poll.
    ///
    /// Returns true if a suspension was resolved.
    pub fn poll_suspension(&mut self) -> Result<bool, PlaybackError> {
        let answer = match self.suspension.as_mut() {
            Some(suspension) => suspension.poll(),
            None => return Ok(false),
        };
        let Some(answer) = answer else {
            return Ok(false);
        };
        let Some(suspension) = self.suspension.take() else {
            return Ok(false);
        };
        self.resume(suspension, answer)?;
        Ok(true)
    }

    /// Frame callback requested through the [`FrameSource`].
    pub fn on_frame(&mut self, handle: FrameHandle, timestamp: f64) -> Result<(), PlaybackError> {
        let Some(clock) = self.clock.as_mut() else {
            log::trace!("frame {handle:?} ignored: no clock");
            return Ok(());
        };
        if !clock.accept(handle) {
            log::trace!("frame {handle:?} ignored: stale");
            return Ok(());
        }
        if self.suspension.is_some() {
            log::trace!("frame {handle:?} ignored: suspended");
            return Ok(());
        }

        let playing = self.info.is_playing();
        let one_off = clock.is_one_off() || !playing;
        let current = self.info.fraction();
        let candidate = if one_off {
            current
        } else {
            let backwards = self.info.state() == PlaybackState::PlayingBackwards;
            clock.advance(timestamp, current, backwards)
        };

        let proposed = self.info.with_fraction(candidate);
        let Some(listener) = self.listener.as_mut() else {
            return Ok(());
        };
        match listener.move_to(&proposed) {
            Negotiation::Immediate(approved) => self.finish_tick(candidate, one_off, approved),
            Negotiation::Deferred(deferred) => {
                self.info.set_suspended(true);
                self.suspension = Some(Suspension::Tick {
                    candidate,
                    one_off,
                    waiting_since: self.frames.now_millis(),
                    control: SuspensionControl::new(deferred),
                });
                Ok(())
            }
        }
    }

    // ----- commit / abort paths -----

    fn resume(&mut self, suspension: Suspension, answer: Answer) -> Result<(), PlaybackError> {
        match (suspension, answer) {
            (suspension, Answer::Cancelled) => {
                log::debug!("{} suspension cancelled; outcome ignored", suspension.name());
                Ok(())
            }
            (Suspension::Start { previous, .. }, Answer::Approved(approved)) => {
                if approved {
                    self.commit_start(previous);
                } else {
                    self.abort_start(previous);
                }
                Ok(())
            }
            (Suspension::Move { from, candidate, .. }, Answer::Approved(approved)) => {
                if approved {
                    self.commit_move(from, candidate)
                } else {
                    self.abort_move(from.fraction());
                    Ok(())
                }
            }
            (
                Suspension::Tick {
                    candidate,
                    one_off,
                    waiting_since,
                    ..
                },
                Answer::Approved(approved),
            ) => {
                self.info.set_suspended(false);
                if approved && !one_off {
                    let waited = self.frames.now_millis() - waiting_since;
                    if let Some(clock) = self.clock.as_mut() {
                        clock.shift_start(waited);
                    }
                }
                self.finish_tick(candidate, one_off, approved)
            }
            (Suspension::Step { from, .. }, Answer::Stepped(Some(next))) => {
                self.commit_step(from, next)
            }
            (Suspension::Step { .. }, Answer::Stepped(None)) => {
                self.abort_step();
                Ok(())
            }
            (suspension, _) => {
                log::debug!("{} suspension settled with a mismatched answer", suspension.name());
                self.info.set_suspended(false);
                Ok(())
            }
        }
    }

    fn commit_start(&mut self, previous: PlaybackStateInfo) {
        self.info.set_suspended(false);
        self.refresh_ticks();
        if self.clock.is_some() {
            self.start_clock(false);
        }
        let kind = match self.info.state() {
            PlaybackState::PlayingBackwards => TransitionKind::StartReverse,
            _ => TransitionKind::Start,
        };
        self.notifier.emit(kind, previous, self.info);
    }

    fn abort_start(&mut self, previous: PlaybackStateInfo) {
        log::debug!("start refused; restoring {}", previous.state().name());
        self.info = previous;
        self.info.set_suspended(false);
        if self.info.is_playing() && self.clock.is_some() {
            self.start_clock(false);
        }
    }

    fn commit_move(&mut self, from: PlaybackStateInfo, candidate: f64) -> Result<(), PlaybackError> {
        self.info.set_suspended(false);
        self.apply_fraction(candidate, false)?;
        let kind = if self.info.is_playing() {
            TransitionKind::JumpPlaying
        } else {
            TransitionKind::JumpPaused
        };
        self.notifier.emit(kind, from, self.info);
        Ok(())
    }

    fn abort_move(&mut self, previous_fraction: f64) {
        self.info.set_suspended(false);
        self.info.set_fraction(previous_fraction);
        self.pause_inner();
    }

    fn commit_step(&mut self, from: PlaybackStateInfo, next: f64) -> Result<(), PlaybackError> {
        if !next.is_finite() {
            self.abort_step();
            return Err(PlaybackError::NonFiniteFraction { value: next });
        }
        self.info.set_suspended(false);
        self.apply_fraction(next, false)?;
        self.notifier.emit(TransitionKind::Step, from, self.info);
        Ok(())
    }

    fn abort_step(&mut self) {
        log::debug!("step refused");
        self.info.set_suspended(false);
        if self.info.is_playing() && self.clock.is_some() {
            self.start_clock(false);
        }
    }

    fn finish_tick(&mut self, candidate: f64, one_off: bool, approved: bool) -> Result<(), PlaybackError> {
        if one_off {
            if !approved {
                log::debug!("corrective frame refused at {candidate:.3}");
            }
            return Ok(());
        }
        if !approved {
            log::debug!("frame refused at {candidate:.3}; pausing");
            self.pause_inner();
            return Ok(());
        }
        match self.info.state() {
            PlaybackState::Playing if candidate >= 1.0 => self.finish_with(true),
            PlaybackState::PlayingBackwards if candidate <= 0.0 => self.stop_with(true),
            _ => {
                self.commit_fraction(candidate, true);
                if self.info.is_playing() {
                    if let Some(clock) = self.clock.as_mut() {
                        clock.reschedule(&mut self.frames);
                    }
                }
            }
        }
        Ok(())
    }

    fn stop_with(&mut self, skip_timer: bool) {
        self.cancel_suspension();
        let from = self.info;
        self.settle(PlaybackState::Stopped, skip_timer);
        self.notifier.emit(TransitionKind::Stop, from, self.info);
    }

    fn finish_with(&mut self, skip_timer: bool) {
        self.cancel_suspension();
        let from = self.info;
        self.settle(PlaybackState::Finished, skip_timer);
        self.notifier.emit(TransitionKind::Finish, from, self.info);
    }

    /// Pause without emitting; reports which resting transition happened.
    fn pause_inner(&mut self) -> TransitionKind {
        let fraction = self.info.fraction();
        if fraction <= 0.0 {
            self.settle(PlaybackState::Stopped, false);
            TransitionKind::Stop
        } else if fraction >= 1.0 {
            self.settle(PlaybackState::Finished, false);
            TransitionKind::Finish
        } else {
            self.info.set_state(PlaybackState::Paused);
            self.halt_clock();
            self.notify_stopped();
            TransitionKind::Pause
        }
    }

    fn settle(&mut self, state: PlaybackState, skip_timer: bool) {
        self.info.set_state(state);
        let fraction = if state == PlaybackState::Finished { 1.0 } else { 0.0 };
        self.commit_fraction(fraction, skip_timer);
    }

    // ----- commit step -----

    /// Non-negotiated fraction application; non-finite input is caller misuse.
    fn apply_fraction(&mut self, fraction: f64, skip_timer: bool) -> Result<(), PlaybackError> {
        if !fraction.is_finite() {
            return Err(PlaybackError::NonFiniteFraction { value: fraction });
        }
        self.commit_fraction(fraction, skip_timer);
        Ok(())
    }

    fn commit_fraction(&mut self, fraction: f64, skip_timer: bool) {
        let fraction = fraction.clamp(0.0, 1.0);
        if !skip_timer {
            self.halt_clock();
        }

        let state = self.info.state();
        let comes_to_rest = state.is_resting()
            || (fraction <= 0.0 && state == PlaybackState::PlayingBackwards)
            || (fraction >= 1.0 && state == PlaybackState::Playing);
        self.info.set_fraction(fraction);
        if comes_to_rest {
            let resting = if fraction <= 0.0 {
                PlaybackState::Stopped
            } else if fraction >= 1.0 {
                PlaybackState::Finished
            } else {
                PlaybackState::Paused
            };
            self.info.set_state(resting);
        }
        self.refresh_ticks();
        if comes_to_rest {
            self.notify_stopped();
        }

        if !skip_timer && self.clock.is_some() {
            // one corrective frame only when resting
            self.start_clock(!self.info.is_playing());
        }
    }

    // ----- helpers -----

    fn cancel_suspension(&mut self) {
        if let Some(mut suspension) = self.suspension.take() {
            if suspension.cancel() {
                log::debug!("cancelled outstanding {} suspension", suspension.name());
            }
        }
        self.info.set_suspended(false);
    }

    fn start_clock(&mut self, one_off: bool) {
        if let Some(clock) = self.clock.as_mut() {
            clock.start(&mut self.frames, one_off);
        }
    }

    fn halt_clock(&mut self) {
        if let Some(clock) = self.clock.as_mut() {
            clock.cancel(&mut self.frames);
        }
    }

    /// Best-effort resting notification; hook failures never reach the state machine.
    fn notify_stopped(&mut self) {
        let snapshot = self.info;
        if let Some(listener) = self.listener.as_mut() {
            if let Err(err) = listener.stopped(&snapshot) {
                log::warn!("stopped hook failed: {err}");
            }
        }
    }

    fn refresh_ticks(&mut self) {
        self.tick_display = match &self.ticks {
            Some(renderer) => renderer.layout(self.info.fraction()),
            None => Vec::new(),
        };
    }
}
