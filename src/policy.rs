//! Head fallback policy.
//!
//! Decides what tag and code an error receives when its message has no head
//! (no colon, a leading colon, or a head containing a space):
//!
//! - [`HeadFallback::Empty`]: tag and code stay empty. This is the default.
//! - [`HeadFallback::CallSite`]: the tag becomes the enclosing function path
//!   and the code becomes the site code `<file name>@L<line>`.
//!
//! ```text
//! errorf!("failed due abc: #triggered")
//!
//! Empty:    "failed due abc: #triggered"
//! CallSite: "app::db::connect#pool.rs@L85: failed due abc: #triggered"
//! ```
//!
//! The policy never affects the identity, which is computed from the parsed
//! tag and code only.
//!
//! # Scope
//!
//! The policy is thread-local: each thread starts with `Empty` and changes made
//! on one thread are invisible to others.

use crate::Trace;
use std::cell::Cell;

/// What to use as tag and code when a message has no head.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HeadFallback {
    /// Leave tag and code empty.
    #[default]
    Empty,
    /// Use the call site: function path as tag, `file@Lline` as code.
    CallSite,
}

impl HeadFallback {
    /// Tag and code to apply to a headless message captured at `trace`.
    ///
    /// Returns `None` when nothing should be filled in.
    pub fn resolve(self, trace: &Trace) -> Option<(String, String)> {
        match self {
            Self::Empty => None,
            Self::CallSite if trace.is_empty() => None,
            Self::CallSite => Some((trace.function().to_owned(), trace.location_code())),
        }
    }
}

thread_local! {
    static HEAD_FALLBACK: Cell<HeadFallback> = const { Cell::new(HeadFallback::Empty) };
}

/// Set the policy for errors subsequently created on this thread.
#[inline]
pub fn set_head_fallback(policy: HeadFallback) {
    HEAD_FALLBACK.with(|v| v.set(policy));
}

/// Policy currently active on this thread.
#[inline]
pub fn head_fallback() -> HeadFallback {
    HEAD_FALLBACK.with(Cell::get)
}

/// Revert this thread to [`HeadFallback::Empty`].
#[inline]
pub fn reset_head_fallback() {
    set_head_fallback(HeadFallback::Empty);
}

/// Run `f` with `policy` active, restoring the previous policy afterwards,
/// including when `f` panics.
pub fn with_head_fallback<R>(policy: HeadFallback, f: impl FnOnce() -> R) -> R {
    struct Restore(HeadFallback);

    impl Drop for Restore {
        fn drop(&mut self) {
            set_head_fallback(self.0);
        }
    }

    let _restore = Restore(head_fallback());
    set_head_fallback(policy);
    f()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_empty() {
        reset_head_fallback();
        assert_eq!(head_fallback(), HeadFallback::Empty);
        assert_eq!(HeadFallback::default(), HeadFallback::Empty);
    }

    #[test]
    fn set_and_reset() {
        set_head_fallback(HeadFallback::CallSite);
        assert_eq!(head_fallback(), HeadFallback::CallSite);
        reset_head_fallback();
        assert_eq!(head_fallback(), HeadFallback::Empty);
    }

    #[test]
    fn scoped_override_restores_previous() {
        reset_head_fallback();
        let inside = with_head_fallback(HeadFallback::CallSite, head_fallback);
        assert_eq!(inside, HeadFallback::CallSite);
        assert_eq!(head_fallback(), HeadFallback::Empty);
    }

    #[test]
    fn scoped_override_restores_after_panic() {
        reset_head_fallback();
        let result = std::panic::catch_unwind(|| {
            with_head_fallback(HeadFallback::CallSite, || panic!("boom"))
        });
        assert!(result.is_err());
        assert_eq!(head_fallback(), HeadFallback::Empty);
    }

    #[test]
    fn policy_is_thread_local() {
        set_head_fallback(HeadFallback::CallSite);
        let other = std::thread::spawn(head_fallback).join().unwrap();
        assert_eq!(other, HeadFallback::Empty);
        reset_head_fallback();
    }

    #[test]
    fn resolve_call_site() {
        let trace = Trace::new("src/db/pool.rs", 85, "app::db::connect");
        assert_eq!(HeadFallback::Empty.resolve(&trace), None);
        assert_eq!(
            HeadFallback::CallSite.resolve(&trace),
            Some(("app::db::connect".to_owned(), "pool.rs@L85".to_owned()))
        );
        assert_eq!(HeadFallback::CallSite.resolve(&Trace::empty()), None);
    }
}
