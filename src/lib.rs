//! # Tagged Errors
//!
//! Errors built from a single `tag#code: message` template.
//!
//! ## Design Philosophy
//!
//! 1. **One string carries the classification**: `"email#h1: invalid hostname"`
//!    yields tag `email`, code `h1` and message `invalid hostname`
//! 2. **Every error knows where it was made**: file, line and function are
//!    recorded at construction
//! 3. **Identical errors share an identity**: a 32-bit fingerprint of the
//!    content, independent of the call site, for grouping and deduplication
//! 4. **Causes are owned, never flattened into strings**: `%w` moves the
//!    wrapped error into the new one, reachable through `source()`
//! 5. **Construction cannot fail**: malformed input degrades to empty fields
//!
//! ## Quick Start
//!
//! ```rust
//! use tagged_errors::{errorf, Result};
//!
//! fn validate(host: &str) -> Result<()> {
//!     if host.is_empty() {
//!         return Err(errorf!("email#h1: invalid hostname %s", host));
//!     }
//!     Ok(())
//! }
//!
//! let err = validate("").unwrap_err();
//! assert_eq!(err.tag(), "email");
//! assert_eq!(err.code(), "h1");
//! assert_eq!(err.message(), "invalid hostname");
//! assert_eq!(err.to_string(), "email#h1: invalid hostname");
//! assert!(err.file().ends_with(".rs"));
//! ```
//!
//! ## Wrapping
//!
//! ```rust
//! use tagged_errors::{chain, errorf};
//! use std::io;
//!
//! let io = io::Error::other("disk full");
//! let err = errorf!("store#s9: cannot persist %s: %w", "order-17", io);
//!
//! assert_eq!(err.message(), "cannot persist order-17: disk full");
//! assert_eq!(err.cause().map(|c| c.to_string()).as_deref(), Some("disk full"));
//! assert_eq!(chain::flatten(&err).len(), 2);
//! ```
//!
//! ## Template Language
//!
//! Templates are interpreted at runtime: `%` plus a letter consumes the next
//! argument, `%w` additionally marks it as the cause, `%%` is a literal
//! percent sign. See [`template`].
//!
//! ## Features
//!
//! - `serde` (default): JSON projection of [`Error`] through `serde::Serialize`

#![warn(missing_docs)]
#![warn(clippy::all)]

use std::error::Error as StdError;
use std::fmt;
use std::result;

pub mod chain;
pub mod convenience;
pub mod grammar;
pub mod identity;
pub mod logging;
pub mod policy;
pub mod template;
pub mod trace;

pub use chain::{Chain, flatten, first};
pub use logging::ChainLog;
pub use policy::HeadFallback;
pub use template::{Arg, BoxError};
pub use trace::Trace;

#[doc(hidden)]
pub mod __private {
    pub use crate::convenience::kind::{
        wrap, Adhoc, AdhocKind, Boxed, BoxedKind, RefKind, Trait, TraitKind, Wrap,
    };
}

/// Type alias for Results using our error type.
pub type Result<T, E = Error> = result::Result<T, E>;

/// Error with a tag, a code, a message, a call-site trace and an optional
/// cause.
///
/// # Key Properties
///
/// - Immutable once constructed; every field is read-only
/// - `Display` renders the canonical `tag#code: message` form
/// - `source()` returns the wrapped cause, so the standard chain machinery
///   (and [`chain::flatten`]) works across foreign error types
/// - Not `Clone`: the cause is owned by exactly one error
///
/// Create errors with [`errorf!`] (call site captured at compile time) or
/// [`tracef!`] (call site found by walking the stack).
#[must_use = "errors should be returned, logged or wrapped"]
pub struct Error {
    message: String,
    tag: String,
    code: String,
    id: u32,
    trace: Trace,
    cause: Option<BoxError>,
}

impl Error {
    /// Build an error from a template, its arguments and an already captured
    /// trace.
    ///
    /// This is what the macros expand to. Useful directly when the call site
    /// comes from elsewhere, e.g. a `#[track_caller]` location.
    pub fn with_trace(trace: Trace, template: &str, args: Vec<Arg>) -> Self {
        let template::Interpolated { text, cause } = template::interpolate(template, args);
        let parts = grammar::parse(&text);
        let id = identity::identity(parts.code(), parts.tag(), &text);

        let fallback = if parts.has_head() {
            None
        } else {
            policy::head_fallback().resolve(&trace)
        };
        let (tag, code) =
            fallback.unwrap_or_else(|| (parts.tag().to_owned(), parts.code().to_owned()));

        Self {
            message: parts.message().to_owned(),
            tag,
            code,
            id,
            trace,
            cause,
        }
    }

    /// Build an error, attributing it to the frame `depth` levels above this
    /// call.
    ///
    /// `1` is the function calling `traced`. A helper that creates errors on
    /// behalf of its caller passes `2`, and so on. If the stack cannot be
    /// inspected the trace is empty.
    #[inline(never)]
    pub fn traced(depth: usize, template: &str, args: Vec<Arg>) -> Self {
        Self::with_trace(Trace::capture(depth.saturating_add(1)), template, args)
    }

    /// Content fingerprint: FNV-1a 32 of code, tag and interpolated text.
    #[inline]
    pub const fn id(&self) -> u32 {
        self.id
    }

    /// Classification tag, empty when unset.
    #[inline]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Short code, empty when unset.
    #[inline]
    pub fn code(&self) -> &str {
        &self.code
    }

    /// The code as a positive number.
    ///
    /// `None` when the code is empty, not numeric, or zero.
    #[inline]
    pub fn code_number(&self) -> Option<u32> {
        self.code.parse::<u32>().ok().filter(|&n| n > 0)
    }

    /// Message without tag and code, trimmed.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Source file of the construction site, empty when unknown.
    #[inline]
    pub fn file(&self) -> &str {
        self.trace.file()
    }

    /// Line of the construction site, 0 when unknown.
    #[inline]
    pub const fn line(&self) -> u32 {
        self.trace.line()
    }

    /// Function that constructed the error, empty when unknown.
    #[inline]
    pub fn function(&self) -> &str {
        self.trace.function()
    }

    /// Full construction site.
    #[inline]
    pub const fn trace(&self) -> &Trace {
        &self.trace
    }

    /// The wrapped error, if one was given through `%w`.
    #[inline]
    pub fn cause(&self) -> Option<&(dyn StdError + 'static)> {
        self.cause.as_deref().map(|e| e as &(dyn StdError + 'static))
    }

    /// Take ownership of the wrapped error.
    #[inline]
    pub fn into_cause(self) -> Option<BoxError> {
        self.cause
    }

    /// Structured view of this error and all its causes.
    ///
    /// The view borrows from `self` and cannot outlive it.
    #[inline]
    pub fn chain_log(&self) -> ChainLog<'_> {
        ChainLog::new(self)
    }

    /// Callback form of [`Error::chain_log`].
    ///
    /// ```rust
    /// # use tagged_errors::errorf;
    /// let err = errorf!("cfg#7: missing key %s", "port");
    /// let line = err.with_chain_log(|log| log.to_string());
    /// assert!(line.contains("tag='cfg'"));
    /// ```
    #[inline]
    pub fn with_chain_log<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&ChainLog<'_>) -> R,
    {
        let log = self.chain_log();
        f(&log)
    }
}

impl fmt::Display for Error {
    /// Canonical form, see [`grammar::render`].
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        grammar::write_canonical(f, &self.tag, &self.code, &self.message)
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Error")
            .field("id", &format_args!("{:#010x}", self.id))
            .field("tag", &self.tag)
            .field("code", &self.code)
            .field("message", &self.message)
            .field("trace", &self.trace)
            .field("cause", &self.cause)
            .finish()
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.cause()
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Error {
    /// Flat JSON projection: `code`, `file`, `func`, `id`, `line`, `message`,
    /// `tag`. The cause is not included.
    fn serialize<S>(&self, serializer: S) -> result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;

        let mut s = serializer.serialize_struct("Error", 7)?;
        s.serialize_field("code", &self.code)?;
        s.serialize_field("file", self.trace.file())?;
        s.serialize_field("func", self.trace.function())?;
        s.serialize_field("id", &self.id)?;
        s.serialize_field("line", &self.trace.line())?;
        s.serialize_field("message", &self.message)?;
        s.serialize_field("tag", &self.tag)?;
        s.end()
    }
}

#[cfg(test)]
mod unit_tests {
    use super::*;
    use std::io;

    fn here() -> Trace {
        Trace::new("src/lib.rs", 1, "tagged_errors::unit_tests")
    }

    #[test]
    fn construction_parses_interpolated_text() {
        let err = Error::with_trace(
            here(),
            "%s#%s: invalid %s",
            vec![Arg::display("email"), Arg::display("h45"), Arg::display("username")],
        );
        assert_eq!(err.tag(), "email");
        assert_eq!(err.code(), "h45");
        assert_eq!(err.message(), "invalid username");
        assert_eq!(err.to_string(), "email#h45: invalid username");
    }

    #[test]
    fn wrap_marker_moves_cause() {
        let err = Error::with_trace(here(), "one then %w", vec![Arg::error(io::Error::other("two"))]);
        assert_eq!(err.message(), "one then two");
        let cause = err.cause().expect("cause");
        assert_eq!(cause.to_string(), "two");
        assert!(cause.downcast_ref::<io::Error>().is_some());
        assert!(err.source().is_some());
    }

    #[test]
    fn into_cause_returns_ownership() {
        let inner = Error::with_trace(here(), "inner#1: low", vec![]);
        let inner_id = inner.id();
        let outer = Error::with_trace(here(), "outer: %w", vec![Arg::error(inner)]);

        let cause = outer.into_cause().expect("cause");
        let inner = cause.downcast::<Error>().expect("our error");
        assert_eq!(inner.id(), inner_id);
    }

    #[test]
    fn identity_ignores_trace() {
        let a = Error::with_trace(Trace::new("a.rs", 1, "a"), "db#1: down", vec![]);
        let b = Error::with_trace(Trace::new("b.rs", 99, "b"), "db#1: down", vec![]);
        assert_eq!(a.id(), b.id());
        assert_ne!(a.trace(), b.trace());
        assert_eq!(a.id(), identity::identity("1", "db", "db#1: down"));
    }

    #[test]
    fn identity_differs_with_content() {
        let a = Error::with_trace(here(), "db#1: down", vec![]);
        let b = Error::with_trace(here(), "db#2: down", vec![]);
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn code_number_parsing() {
        let num = |t: &str| Error::with_trace(here(), t, vec![]).code_number();
        assert_eq!(num("#404: not found"), Some(404));
        assert_eq!(num("#h1: x"), None);
        assert_eq!(num("#0: zero"), None);
        assert_eq!(num("#-3: negative"), None);
        assert_eq!(num("plain"), None);
    }

    #[test]
    fn trace_accessors_forward() {
        let err = Error::with_trace(Trace::new("src/x.rs", 12, "app::x"), "x", vec![]);
        assert_eq!(err.file(), "src/x.rs");
        assert_eq!(err.line(), 12);
        assert_eq!(err.function(), "app::x");
    }

    #[test]
    fn call_site_fallback_only_for_headless_messages() {
        let trace = Trace::new("/app/src/db.rs", 85, "app::db::connect");
        policy::with_head_fallback(HeadFallback::CallSite, || {
            let headless = Error::with_trace(trace.clone(), "failed due abc: #triggered", vec![]);
            assert_eq!(headless.tag(), "app::db::connect");
            assert_eq!(headless.code(), "db.rs@L85");
            assert_eq!(headless.message(), "failed due abc: #triggered");
            assert_eq!(
                headless.to_string(),
                "app::db::connect#db.rs@L85: failed due abc: #triggered"
            );

            let tagged = Error::with_trace(trace.clone(), "test:", vec![]);
            assert_eq!(tagged.tag(), "test");
            assert_eq!(tagged.code(), "");
        });
    }

    #[test]
    fn fallback_does_not_change_identity() {
        let trace = Trace::new("/app/src/db.rs", 85, "app::db::connect");
        let plain = Error::with_trace(trace.clone(), "hi there", vec![]);
        let with_site = policy::with_head_fallback(HeadFallback::CallSite, || {
            Error::with_trace(trace.clone(), "hi there", vec![])
        });
        assert_eq!(plain.tag(), "");
        assert_eq!(with_site.tag(), "app::db::connect");
        assert_eq!(plain.id(), with_site.id());
    }

    #[test]
    fn traced_at_depth_one_reports_caller() {
        use std::backtrace::{Backtrace, BacktraceStatus};

        let err = Error::traced(1, "db: down", vec![]);
        assert_eq!(err.tag(), "db");
        if Backtrace::force_capture().status() == BacktraceStatus::Captured {
            assert!(!err.trace().is_empty(), "captured stack yielded no frame");
            assert!(
                err.function().ends_with("traced_at_depth_one_reports_caller"),
                "{}",
                err.function()
            );
            assert!(err.file().ends_with("lib.rs"), "{}", err.file());
        }
    }

    #[test]
    fn debug_shows_fields() {
        let err = Error::with_trace(here(), "db#1: down", vec![]);
        let debug = format!("{err:?}");
        assert!(debug.contains("tag: \"db\""));
        assert!(debug.contains("code: \"1\""));
        assert!(debug.contains("cause: None"));
    }

    #[test]
    fn error_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync + 'static>() {}
        assert_send_sync::<Error>();
    }

    #[cfg(feature = "serde")]
    #[test]
    fn json_projection_has_documented_keys() {
        let err = Error::with_trace(Trace::new("src/mail.rs", 7, "app::mail"), "email#h1: bad host", vec![]);
        let value = serde_json::to_value(&err).unwrap();
        let object = value.as_object().unwrap();

        let mut keys: Vec<&str> = object.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(keys, ["code", "file", "func", "id", "line", "message", "tag"]);

        assert_eq!(object["id"], serde_json::json!(err.id()));
        assert_eq!(object["tag"], "email");
        assert_eq!(object["code"], "h1");
        assert_eq!(object["message"], "bad host");
        assert_eq!(object["file"], "src/mail.rs");
        assert_eq!(object["line"], 7);
        assert_eq!(object["func"], "app::mail");
    }
}
