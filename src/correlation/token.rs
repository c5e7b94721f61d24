//! Explicit context tokens.
//!
//! A token is generated once per logical operation and made ambient for the
//! code that performs it. Synchronous code enters the token on the current
//! thread. Async code wraps its future in a scope that re-enters the token
//! on whichever thread polls it, so it follows the task across suspension
//! points and worker threads.
//!
//! Whatever was entered last on a thread wins: a scoped future polled inside
//! an outer `in_scope` sees its own token, not the outer one.

use std::cell::RefCell;
use std::fmt;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};

use uuid::Uuid;

use crate::correlation::key::CorrelationKey;

thread_local! {
    static THREAD_TOKENS: RefCell<Vec<(u64, ContextToken)>> = const { RefCell::new(Vec::new()) };
}

/// Guard ids only need uniqueness.
static NEXT_GUARD_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of one logical operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContextToken(Uuid);

impl ContextToken {
    /// Generate a fresh token.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Raw token id.
    pub fn id(&self) -> Uuid {
        self.0
    }

    /// The correlation key entries logged under this token carry.
    pub fn key(&self) -> CorrelationKey {
        CorrelationKey::from_token(self.0)
    }

    /// Make this token current on this thread until the guard drops.
    ///
    /// Nested guards shadow outer ones.
    pub fn enter(&self) -> TokenGuard {
        let id = NEXT_GUARD_ID.fetch_add(1, Ordering::Relaxed);
        THREAD_TOKENS.with(|stack| stack.borrow_mut().push((id, *self)));
        TokenGuard {
            id,
            _not_send: PhantomData,
        }
    }

    /// Run `f` with this token current on this thread.
    pub fn in_scope<R>(&self, f: impl FnOnce() -> R) -> R {
        let _guard = self.enter();
        f()
    }

    /// Run `fut` with this token current during every poll.
    pub fn scope<F: Future>(self, fut: F) -> impl Future<Output = F::Output> {
        async move {
            let mut fut = std::pin::pin!(fut);
            std::future::poll_fn(|cx| {
                let _guard = self.enter();
                fut.as_mut().poll(cx)
            })
            .await
        }
    }

    /// The innermost token entered on this thread.
    pub fn current() -> Option<Self> {
        THREAD_TOKENS
            .try_with(|stack| stack.borrow().last().map(|(_, token)| *token))
            .ok()
            .flatten()
    }
}

impl Default for ContextToken {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ContextToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ctx-{}", self.0)
    }
}

/// Keeps a token current on the thread that entered it.
///
/// Not `Send`: holding it across an `.await` would leak the token into
/// whatever else runs on the thread.
#[derive(Debug)]
pub struct TokenGuard {
    id: u64,
    _not_send: PhantomData<*const ()>,
}

impl Drop for TokenGuard {
    fn drop(&mut self) {
        let _ = THREAD_TOKENS.try_with(|stack| {
            let mut stack = stack.borrow_mut();
            if let Some(pos) = stack.iter().rposition(|(id, _)| *id == self.id) {
                stack.remove(pos);
            }
        });
    }
}
