//! UI-thread marshalling for `uithread` and `dialog` actions.
//!
//! The registry never runs those handlers itself; it hands an [`Invocation`]
//! to the installed [`UiDispatcher`]. [`UiQueue`] is the stock dispatcher: a
//! crossbeam channel whose receiving end is drained by the UI thread, the way
//! a toolkit idle callback would be.

use std::time::{Duration, Instant};

use crossbeam::channel::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use tracing::{trace, warn};

use crate::controller::action_registry::Invocation;

/// Arranges for an invocation to run on the UI thread at some later point.
pub trait UiDispatcher: Send + Sync {
    fn dispatch(&self, invocation: Invocation);
}

impl<F> UiDispatcher for F
where
    F: Fn(Invocation) + Send + Sync,
{
    fn dispatch(&self, invocation: Invocation) {
        self(invocation);
    }
}

/// Sending half of a [`UiQueue`]; install it with
/// `ActionRegistry::set_dispatch_function`.
#[derive(Debug, Clone)]
pub struct UiQueueSender {
    tx: Sender<Invocation>,
}

impl UiDispatcher for UiQueueSender {
    fn dispatch(&self, invocation: Invocation) {
        if let Err(err) = self.tx.send(invocation) {
            // Nobody will ever run it, so give the action back.
            let invocation = err.into_inner();
            warn!(
                "UI queue closed, action '{}' released without running",
                invocation.action()
            );
            invocation.finish();
        }
    }
}

/// Receiving half, owned by the UI thread.
#[derive(Debug)]
pub struct UiQueue {
    rx: Receiver<Invocation>,
}

impl UiQueue {
    #[must_use]
    pub fn new() -> (Self, UiQueueSender) {
        let (tx, rx) = channel::unbounded();
        (Self { rx }, UiQueueSender { tx })
    }

    /// Number of invocations waiting to run.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.rx.len()
    }

    /// Run everything queued right now without waiting. Returns how many
    /// handlers ran.
    pub fn run_pending(&self) -> usize {
        let mut ran = 0;
        loop {
            match self.rx.try_recv() {
                Ok(invocation) => {
                    Self::run_one(&invocation);
                    ran += 1;
                }
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
            }
        }
        ran
    }

    /// Wait up to `timeout` for work, then drain the queue. Returns how many
    /// handlers ran; `None` once every sender is gone and the queue is empty.
    pub fn run_timeout(&self, timeout: Duration) -> Option<usize> {
        let deadline = Instant::now() + timeout;
        match self.rx.recv_deadline(deadline) {
            Ok(invocation) => {
                Self::run_one(&invocation);
                Some(1 + self.run_pending())
            }
            Err(RecvTimeoutError::Timeout) => Some(0),
            Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Run invocations until every sender has been dropped.
    pub fn run_blocking(&self) -> usize {
        let mut ran = 0;
        for invocation in &self.rx {
            Self::run_one(&invocation);
            ran += 1;
        }
        ran
    }

    fn run_one(invocation: &Invocation) {
        trace!("UI thread running '{}'", invocation.action());
        invocation.run();
    }
}
