//! Listener answers that may arrive later.
//!
//! A hook answers with a [`Negotiation`]: either an immediate value or a
//! [`Deferred`] the controller keeps polling until it settles. Deferreds are
//! plain futures polled with a no-op waker, so the whole model stays on the
//! host's single event-loop thread.

use std::future::Future;
use std::task::{Context, Poll};

use futures::channel::oneshot;
use futures::future::{self, LocalBoxFuture};
use futures::task::noop_waker_ref;
use futures::FutureExt;

use crate::error::ListenerError;

/// Answer returned by a negotiation hook.
pub enum Negotiation<T> {
    Immediate(T),
    Deferred(Deferred<T>),
}

impl<T> From<T> for Negotiation<T> {
    fn from(value: T) -> Self {
        Negotiation::Immediate(value)
    }
}

/// A pending listener answer.
pub struct Deferred<T> {
    future: LocalBoxFuture<'static, Result<T, ListenerError>>,
}

impl<T: 'static> Deferred<T> {
    /// Wrap any future producing the listener's answer.
    pub fn new<Fut>(future: Fut) -> Self
    where
        Fut: Future<Output = Result<T, ListenerError>> + 'static,
    {
        Self {
            future: future.boxed_local(),
        }
    }

    /// A resolver/deferred pair; the listener keeps the resolver and answers later.
    pub fn channel() -> (Resolver<T>, Self) {
        let (tx, rx) = oneshot::channel();
        let deferred = Self::new(rx.map(|answer| answer.unwrap_or(Err(ListenerError::Dropped))));
        (Resolver { tx }, deferred)
    }

    pub fn ready(value: T) -> Self {
        Self::new(future::ready(Ok(value)))
    }

    pub fn rejected(err: ListenerError) -> Self {
        Self::new(future::ready(Err(err)))
    }
}

impl<T> Deferred<T> {
    /// Poll once without registering interest; the host re-polls on its own schedule.
    pub(crate) fn poll_once(&mut self) -> Poll<Result<T, ListenerError>> {
        let mut cx = Context::from_waker(noop_waker_ref());
        self.future.poll_unpin(&mut cx)
    }
}

impl<T> std::fmt::Debug for Deferred<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Deferred").finish_non_exhaustive()
    }
}

/// Listener-side handle that settles a [`Deferred`] created by [`Deferred::channel`].
#[derive(Debug)]
pub struct Resolver<T> {
    tx: oneshot::Sender<Result<T, ListenerError>>,
}

impl<T> Resolver<T> {
    /// Settle with a value. Returns false if the suspension was already cancelled.
    pub fn resolve(self, value: T) -> bool {
        self.tx.send(Ok(value)).is_ok()
    }

    /// Settle with a failure. Returns false if the suspension was already cancelled.
    pub fn reject(self, err: ListenerError) -> bool {
        self.tx.send(Err(err)).is_ok()
    }

    /// True once the controller has dropped the matching deferred.
    pub fn is_cancelled(&self) -> bool {
        self.tx.is_canceled()
    }
}
