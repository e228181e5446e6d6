//! Scripted animation listener recording every hook invocation.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use scrubline_core::{
    AnimationListener, Deferred, ListenerError, Negotiation, PlaybackState, PlaybackStateInfo,
    Resolver,
};

/// Answer for `start` and `move_to`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Reply {
    Approve,
    Refuse,
    /// Hand back a deferred; the test settles it through the handle.
    Defer,
}

/// Answer for `step`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum StepReply {
    To(f64),
    Refuse,
    Defer,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ListenerCall {
    Start { fraction: f64, backwards: bool },
    Move(PlaybackStateInfo),
    Stopped(PlaybackStateInfo),
    Step { fraction: f64, backwards: bool },
}

struct Script {
    calls: Vec<ListenerCall>,
    start_replies: VecDeque<Reply>,
    move_replies: VecDeque<Reply>,
    default_move: Reply,
    step_replies: VecDeque<StepReply>,
    fail_stopped: bool,
    start_resolvers: VecDeque<Resolver<bool>>,
    move_resolvers: Vec<(f64, Resolver<bool>)>,
    step_resolvers: VecDeque<Resolver<Option<f64>>>,
}

impl Default for Script {
    fn default() -> Self {
        Self {
            calls: Vec::new(),
            start_replies: VecDeque::new(),
            move_replies: VecDeque::new(),
            default_move: Reply::Approve,
            step_replies: VecDeque::new(),
            fail_stopped: false,
            start_resolvers: VecDeque::new(),
            move_resolvers: Vec::new(),
            step_resolvers: VecDeque::new(),
        }
    }
}

/// Listener whose answers are queued up front by the test.
///
/// Unqueued `start` calls approve, unqueued `move_to` calls use the default
/// move reply, unqueued `step` calls refuse.
pub struct ScriptedListener {
    script: Rc<RefCell<Script>>,
    step_hook: bool,
}

impl ScriptedListener {
    pub fn new() -> (Self, ListenerHandle) {
        let script = Rc::new(RefCell::new(Script::default()));
        let listener = Self {
            script: script.clone(),
            step_hook: false,
        };
        (listener, ListenerHandle(script))
    }

    /// Expose a `step` hook.
    pub fn with_step_hook(mut self) -> Self {
        self.step_hook = true;
        self
    }

    pub fn boxed(self) -> Option<Box<dyn AnimationListener>> {
        Some(Box::new(self))
    }
}

fn answer(reply: Reply, resolvers: impl FnOnce(Resolver<bool>)) -> Negotiation<bool> {
    match reply {
        Reply::Approve => Negotiation::Immediate(true),
        Reply::Refuse => Negotiation::Immediate(false),
        Reply::Defer => {
            let (resolver, deferred) = Deferred::channel();
            resolvers(resolver);
            Negotiation::Deferred(deferred)
        }
    }
}

impl AnimationListener for ScriptedListener {
    fn start(&mut self, fraction: f64, backwards: bool) -> Negotiation<bool> {
        let mut script = self.script.borrow_mut();
        script.calls.push(ListenerCall::Start {
            fraction,
            backwards,
        });
        let reply = script.start_replies.pop_front().unwrap_or(Reply::Approve);
        answer(reply, |r| script.start_resolvers.push_back(r))
    }

    fn move_to(&mut self, state: &PlaybackStateInfo) -> Negotiation<bool> {
        let mut script = self.script.borrow_mut();
        script.calls.push(ListenerCall::Move(*state));
        let reply = script
            .move_replies
            .pop_front()
            .unwrap_or(script.default_move);
        let fraction = state.fraction();
        answer(reply, |r| script.move_resolvers.push((fraction, r)))
    }

    fn stopped(&mut self, state: &PlaybackStateInfo) -> Result<(), ListenerError> {
        let mut script = self.script.borrow_mut();
        script.calls.push(ListenerCall::Stopped(*state));
        if script.fail_stopped {
            Err(ListenerError::hook("scripted failure"))
        } else {
            Ok(())
        }
    }

    fn step(&mut self, fraction: f64, backwards: bool) -> Option<Negotiation<Option<f64>>> {
        if !self.step_hook {
            return None;
        }
        let mut script = self.script.borrow_mut();
        script.calls.push(ListenerCall::Step {
            fraction,
            backwards,
        });
        let reply = script.step_replies.pop_front().unwrap_or(StepReply::Refuse);
        Some(match reply {
            StepReply::To(next) => Negotiation::Immediate(Some(next)),
            StepReply::Refuse => Negotiation::Immediate(None),
            StepReply::Defer => {
                let (resolver, deferred) = Deferred::channel();
                script.step_resolvers.push_back(resolver);
                Negotiation::Deferred(deferred)
            }
        })
    }
}

/// Test-side view of a [`ScriptedListener`].
#[derive(Clone)]
pub struct ListenerHandle(Rc<RefCell<Script>>);

impl ListenerHandle {
    pub fn queue_start(&self, reply: Reply) {
        self.0.borrow_mut().start_replies.push_back(reply);
    }

    pub fn queue_move(&self, reply: Reply) {
        self.0.borrow_mut().move_replies.push_back(reply);
    }

    pub fn set_default_move(&self, reply: Reply) {
        self.0.borrow_mut().default_move = reply;
    }

    pub fn queue_step(&self, reply: StepReply) {
        self.0.borrow_mut().step_replies.push_back(reply);
    }

    pub fn fail_stopped(&self, fail: bool) {
        self.0.borrow_mut().fail_stopped = fail;
    }

    pub fn calls(&self) -> Vec<ListenerCall> {
        self.0.borrow().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.0.borrow_mut().calls.clear();
    }

    /// Candidate fractions passed to `move_to`, in call order.
    pub fn move_fractions(&self) -> Vec<f64> {
        self.0
            .borrow()
            .calls
            .iter()
            .filter_map(|call| match call {
                ListenerCall::Move(state) => Some(state.fraction()),
                _ => None,
            })
            .collect()
    }

    /// States reported through `stopped`, in call order.
    pub fn stopped_states(&self) -> Vec<PlaybackState> {
        self.0
            .borrow()
            .calls
            .iter()
            .filter_map(|call| match call {
                ListenerCall::Stopped(state) => Some(state.state()),
                _ => None,
            })
            .collect()
    }

    pub fn take_start_resolver(&self) -> Option<Resolver<bool>> {
        self.0.borrow_mut().start_resolvers.pop_front()
    }

    /// Resolver of the oldest deferred move whose candidate was `fraction`.
    pub fn take_move_resolver(&self, fraction: f64) -> Option<Resolver<bool>> {
        let mut script = self.0.borrow_mut();
        let idx = script
            .move_resolvers
            .iter()
            .position(|(f, _)| (f - fraction).abs() < 1e-9)?;
        Some(script.move_resolvers.remove(idx).1)
    }

    /// Resolver of the oldest deferred move.
    pub fn take_next_move_resolver(&self) -> Option<Resolver<bool>> {
        let mut script = self.0.borrow_mut();
        if script.move_resolvers.is_empty() {
            None
        } else {
            Some(script.move_resolvers.remove(0).1)
        }
    }

    pub fn take_step_resolver(&self) -> Option<Resolver<Option<f64>>> {
        self.0.borrow_mut().step_resolvers.pop_front()
    }
}
