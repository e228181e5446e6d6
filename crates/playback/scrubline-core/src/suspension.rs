//! Cancellable wrapper around one outstanding listener answer.

use std::task::Poll;

use crate::deferred::Deferred;
use crate::error::ListenerError;

/// Outcome of polling a suspension.
#[derive(Debug, Clone, PartialEq)]
pub enum SuspensionPoll<T> {
    Pending,
    Resolved(T),
    Rejected(ListenerError),
    /// The suspension was cancelled; whoever cancelled it owns the outcome.
    Cancelled,
}

/// Ties one deferred listener answer to a cancel switch.
///
/// Once settled or cancelled the wrapped future is dropped; every later poll
/// reports `Cancelled`.
#[derive(Debug)]
pub struct SuspensionControl<T> {
    deferred: Option<Deferred<T>>,
}

impl<T> SuspensionControl<T> {
    pub fn new(deferred: Deferred<T>) -> Self {
        Self {
            deferred: Some(deferred),
        }
    }

    #[inline]
    pub fn is_pending(&self) -> bool {
        self.deferred.is_some()
    }

    /// Drop the wrapped answer. Returns true if it was still pending.
    pub fn cancel(&mut self) -> bool {
        self.deferred.take().is_some()
    }

    pub fn poll(&mut self) -> SuspensionPoll<T> {
        let Some(deferred) = self.deferred.as_mut() else {
            return SuspensionPoll::Cancelled;
        };
        match deferred.poll_once() {
            Poll::Pending => SuspensionPoll::Pending,
            Poll::Ready(answer) => {
                self.deferred = None;
                match answer {
                    Ok(value) => SuspensionPoll::Resolved(value),
                    Err(err) => SuspensionPoll::Rejected(err),
                }
            }
        }
    }
}
