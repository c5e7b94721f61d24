//! Call-site frames for stack-based correlation inference.
//!
//! `collect` records the location it was called from for as long as its
//! synchronous body runs on the current thread. The innermost recorded
//! location is the inferred identity of "this call". Code that runs on
//! another thread, or after the work has been suspended and resumed, sees no
//! frame and resolves to the absent key.

use std::cell::RefCell;
use std::marker::PhantomData;
use std::panic::Location;

thread_local! {
    static FRAMES: RefCell<Vec<&'static Location<'static>>> = const { RefCell::new(Vec::new()) };
}

/// Pops its frame when dropped.
#[derive(Debug)]
pub(crate) struct FrameGuard {
    depth: usize,
    _not_send: PhantomData<*const ()>,
}

/// Record `site` as the innermost collect frame on this thread.
pub(crate) fn enter_frame(site: &'static Location<'static>) -> FrameGuard {
    let depth = FRAMES.with(|frames| {
        let mut frames = frames.borrow_mut();
        frames.push(site);
        frames.len()
    });
    FrameGuard {
        depth,
        _not_send: PhantomData,
    }
}

/// Innermost collect frame on this thread, if any.
pub(crate) fn innermost() -> Option<&'static Location<'static>> {
    FRAMES
        .try_with(|frames| frames.borrow().last().copied())
        .ok()
        .flatten()
}

impl Drop for FrameGuard {
    fn drop(&mut self) {
        let _ = FRAMES.try_with(|frames| frames.borrow_mut().truncate(self.depth - 1));
    }
}
