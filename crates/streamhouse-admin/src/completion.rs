//! Completion Handles and the Future Bridge
//!
//! The RPC transport does not hand out Rust futures. Each call returns a
//! [`CompletionHandle`], a single-shot slot that is completed exactly once by
//! the transport (with a value or an error) and on which a continuation can be
//! registered with [`CompletionHandle::when_complete`].
//!
//! [`bridge`] turns a handle into a [`CompletionFuture`] by wiring the
//! continuation into a `tokio::sync::oneshot` channel. Nothing is polled: the
//! future wakes only when the transport completes the handle.
//!
//! ## Guarantees
//!
//! - The outcome is observed exactly once. `Completer::complete` consumes the
//!   completer, so a value and an error can never both be delivered.
//! - Errors are forwarded unchanged.
//! - No timeout is imposed here. A handle that is never completed never resolves;
//!   callers wrap the future in `tokio::time::timeout` if they need a bound.
//! - A completer dropped without completing delivers `TransportError::Closed`.
//!   This is how requests in flight fail when the transport shuts down.
//! - Dropping a `CompletionFuture` detaches from the RPC. The request itself is
//!   not revoked; its result is discarded when it arrives.
//!
//! ## Examples
//!
//! ```ignore
//! let (completer, handle) = CompletionHandle::pending();
//!
//! std::thread::spawn(move || completer.complete(Ok(42)));
//!
//! assert_eq!(bridge(handle).await?, 42);
//! ```

use std::fmt;
use std::future::{Future, IntoFuture};
use std::mem;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard};
use std::task::{Context, Poll};
use tokio::sync::oneshot;

use crate::error::{TransportError, TransportResult};

type Callback<T> = Box<dyn FnOnce(TransportResult<T>) + Send + 'static>;

enum State<T> {
    /// Neither completed nor observed yet
    Empty,
    /// A continuation is waiting for the outcome
    Registered(Callback<T>),
    /// Completed before anyone registered
    Completed(TransportResult<T>),
    /// Outcome handed to the continuation
    Delivered,
}

struct Slot<T> {
    state: Mutex<State<T>>,
}

impl<T> Slot<T> {
    fn lock(&self) -> MutexGuard<'_, State<T>> {
        // A panic inside a continuation can't leave the slot half-updated: the
        // state is swapped out before any callback runs.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Transport side of a pending RPC.
pub struct Completer<T> {
    slot: Option<Arc<Slot<T>>>,
}

impl<T> Completer<T> {
    /// Deliver the outcome. Runs the registered continuation inline, if any.
    pub fn complete(mut self, result: TransportResult<T>) {
        if let Some(slot) = self.slot.take() {
            deliver(&slot, result);
        }
    }
}

impl<T> Drop for Completer<T> {
    fn drop(&mut self) {
        if let Some(slot) = self.slot.take() {
            deliver(&slot, Err(TransportError::Closed));
        }
    }
}

fn deliver<T>(slot: &Slot<T>, result: TransportResult<T>) {
    let mut state = slot.lock();
    match mem::replace(&mut *state, State::Delivered) {
        State::Registered(callback) => {
            drop(state);
            callback(result);
        }
        State::Empty => *state = State::Completed(result),
        // Completer is consumed on delivery, so there is no second outcome.
        previous @ (State::Completed(_) | State::Delivered) => *state = previous,
    }
}

/// Caller side of a pending RPC: one eventual value or error.
pub struct CompletionHandle<T> {
    slot: Arc<Slot<T>>,
}

impl<T> CompletionHandle<T> {
    /// Create a handle together with the completer that will resolve it.
    pub fn pending() -> (Completer<T>, CompletionHandle<T>) {
        let slot = Arc::new(Slot {
            state: Mutex::new(State::Empty),
        });
        (
            Completer {
                slot: Some(Arc::clone(&slot)),
            },
            CompletionHandle { slot },
        )
    }

    /// A handle that is already resolved.
    pub fn ready(result: TransportResult<T>) -> Self {
        CompletionHandle {
            slot: Arc::new(Slot {
                state: Mutex::new(State::Completed(result)),
            }),
        }
    }

    /// Register the continuation. If the handle is already complete it runs
    /// immediately on the calling thread, otherwise on the completing thread.
    pub fn when_complete<F>(self, f: F)
    where
        F: FnOnce(TransportResult<T>) + Send + 'static,
    {
        let mut state = self.slot.lock();
        match mem::replace(&mut *state, State::Delivered) {
            State::Completed(result) => {
                drop(state);
                f(result);
            }
            State::Empty => *state = State::Registered(Box::new(f)),
            // The handle is consumed here, so nothing else can have registered.
            previous @ (State::Registered(_) | State::Delivered) => *state = previous,
        }
    }

    /// Whether the transport has already produced the outcome.
    pub fn is_complete(&self) -> bool {
        matches!(*self.slot.lock(), State::Completed(_))
    }
}

impl<T> fmt::Debug for CompletionHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletionHandle")
            .field("complete", &self.is_complete())
            .finish()
    }
}

/// Bridge a completion handle into a future.
///
/// The continuation is registered immediately, not on first poll.
pub fn bridge<T: Send + 'static>(handle: CompletionHandle<T>) -> CompletionFuture<T> {
    let (tx, rx) = oneshot::channel();
    handle.when_complete(move |result| {
        // Receiver gone means the caller stopped waiting.
        let _ = tx.send(result);
    });
    CompletionFuture { rx }
}

/// Future resolving to the outcome of a [`CompletionHandle`].
#[must_use = "futures do nothing unless awaited"]
pub struct CompletionFuture<T> {
    rx: oneshot::Receiver<TransportResult<T>>,
}

impl<T> Future for CompletionFuture<T> {
    type Output = TransportResult<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|received| received.unwrap_or(Err(TransportError::Closed)))
    }
}

impl<T: Send + 'static> IntoFuture for CompletionHandle<T> {
    type Output = TransportResult<T>;
    type IntoFuture = CompletionFuture<T>;

    fn into_future(self) -> Self::IntoFuture {
        bridge(self)
    }
}
