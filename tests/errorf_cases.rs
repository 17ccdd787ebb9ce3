//! Table-driven construction cases for errorf!
//!
//! Each case states the tag, code, message and canonical string expected from
//! one template. Integration tests run each `#[test]` on its own thread, so the
//! head fallback policy starts as `Empty` everywhere unless a test changes it.

use std::error::Error as StdError;
use std::io;
use tagged_errors::policy::{self, HeadFallback};
use tagged_errors::{chain, errorf, Error};

struct Case {
    description: &'static str,
    err: Error,
    tag: &'static str,
    code: &'static str,
    message: &'static str,
    string: &'static str,
}

fn check(cases: Vec<Case>) {
    for c in cases {
        assert_eq!(c.err.tag(), c.tag, "{}: tag", c.description);
        assert_eq!(c.err.code(), c.code, "{}: code", c.description);
        assert_eq!(c.err.message(), c.message, "{}: message", c.description);
        assert_eq!(c.err.to_string(), c.string, "{}: string", c.description);
    }
}

// ============================================================================
// GRAMMAR THROUGH CONSTRUCTION
// ============================================================================

#[test]
fn errorf_table() {
    check(vec![
        Case {
            description: "empty",
            err: errorf!(""),
            tag: "",
            code: "",
            message: "",
            string: "",
        },
        Case {
            description: "just message",
            err: errorf!("hi there"),
            tag: "",
            code: "",
            message: "hi there",
            string: "hi there",
        },
        Case {
            description: "message with arguments",
            err: errorf!("hi there %s", "man"),
            tag: "",
            code: "",
            message: "hi there man",
            string: "hi there man",
        },
        Case {
            description: "just tag",
            err: errorf!("test:"),
            tag: "test",
            code: "",
            message: "",
            string: "test:",
        },
        Case {
            description: "just code",
            err: errorf!("#h6b7:"),
            tag: "",
            code: "h6b7",
            message: "",
            string: "#h6b7:",
        },
        Case {
            description: "tag and message",
            err: errorf!("test:hi there"),
            tag: "test",
            code: "",
            message: "hi there",
            string: "test: hi there",
        },
        Case {
            description: "tag, code and message",
            err: errorf!("email#h1:     invalid hostname      "),
            tag: "email",
            code: "h1",
            message: "invalid hostname",
            string: "email#h1: invalid hostname",
        },
        Case {
            description: "tag, code and message from arguments",
            err: errorf!("%s#%s: invalid %s", "email", "h45", "username"),
            tag: "email",
            code: "h45",
            message: "invalid username",
            string: "email#h45: invalid username",
        },
        Case {
            description: "code and message",
            err: errorf!("#e87:failed"),
            tag: "",
            code: "e87",
            message: "failed",
            string: "#e87: failed",
        },
        Case {
            description: "separators in the wrong place",
            err: errorf!("failed due abc: #triggered"),
            tag: "",
            code: "",
            message: "failed due abc: #triggered",
            string: "failed due abc: #triggered",
        },
        Case {
            description: "leading colon",
            err: errorf!(":orphan"),
            tag: "",
            code: "",
            message: ":orphan",
            string: ":orphan",
        },
    ]);
}

#[test]
fn call_site_fallback_table() {
    policy::set_head_fallback(HeadFallback::CallSite);

    let line = line!() + 1;
    let headless = errorf!("failed due abc: #triggered");
    let site = format!("errorf_cases.rs@L{line}");
    let func = headless.function().to_owned();

    assert!(func.ends_with("call_site_fallback_table"), "{func}");
    assert_eq!(headless.tag(), func);
    assert_eq!(headless.code(), site);
    assert_eq!(headless.message(), "failed due abc: #triggered");
    assert_eq!(
        headless.to_string(),
        format!("{func}#{site}: failed due abc: #triggered")
    );

    // A recognised head is never replaced, even an empty-coded one.
    let tagged = errorf!("test:");
    assert_eq!(tagged.tag(), "test");
    assert_eq!(tagged.code(), "");
    assert_eq!(tagged.to_string(), "test:");

    policy::reset_head_fallback();
    let plain = errorf!("hi there");
    assert_eq!(plain.tag(), "");
}

// ============================================================================
// WRAPPING
// ============================================================================

#[test]
fn wrap_marker_keeps_cause() {
    let err = errorf!("one then %w", io::Error::other("two"));
    assert_eq!(err.message(), "one then two");
    assert_eq!(err.to_string(), "one then two");

    let cause = err.source().expect("cause");
    assert_eq!(cause.to_string(), "two");
    assert!(cause.downcast_ref::<io::Error>().is_some());
}

#[test]
fn formatted_placeholders_before_wrap_marker_keep_cause() {
    let err = errorf!("store#s1: %5d items: %w", 3, io::Error::other("disk"));
    assert_eq!(err.message(), "3 items: disk");
    assert_eq!(err.source().map(|c| c.to_string()).as_deref(), Some("disk"));

    let err = errorf!("load %.2f%% then %w", 99.5, io::Error::other("eof"));
    assert_eq!(err.message(), "load 99.50% then eof");
    assert!(err.source().is_some());
}

#[test]
fn borrowed_error_is_mentioned_not_wrapped() {
    let io = io::Error::other("disk");
    let err = errorf!("store#s2: saw %s", &io);
    assert_eq!(err.message(), "saw disk");
    assert!(err.source().is_none());

    let wrapped = errorf!("store#s3: %w", io);
    assert!(wrapped.source().is_some());
}

#[test]
fn only_first_wrap_marker_takes_cause() {
    let err = errorf!(
        "net#n2: %w and %w",
        io::Error::other("first"),
        io::Error::other("second")
    );
    assert_eq!(err.message(), "first and second");
    assert_eq!(err.cause().map(|c| c.to_string()).as_deref(), Some("first"));
    assert_eq!(chain::flatten(&err).len(), 2);
}

#[test]
fn wrap_marker_over_plain_value_has_no_cause() {
    let err = errorf!("cfg: %w", "not an error");
    assert_eq!(err.message(), "not an error");
    assert!(err.cause().is_none());
}

#[test]
fn missing_and_surplus_arguments() {
    let missing = errorf!("db#1: want %s and %d", "one");
    assert_eq!(missing.message(), "want one and %!d(MISSING)");

    let surplus = errorf!("db#1: only %s", "one", "two", 3);
    assert_eq!(surplus.message(), "only one");
}

#[test]
fn escaped_percent_is_literal() {
    let err = errorf!("disk#d1: %d%% used", 93);
    assert_eq!(err.message(), "93% used");
}

// ============================================================================
// CHAIN WALKING
// ============================================================================

#[test]
fn find_first_through_std_wrappers() {
    #[derive(Debug)]
    struct AppError(Error);

    impl std::fmt::Display for AppError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "app: {}", self.0)
        }
    }

    impl StdError for AppError {
        fn source(&self) -> Option<&(dyn StdError + 'static)> {
            Some(&self.0)
        }
    }

    let a = errorf!("eloszki");
    let a_id = a.id();
    let wrapped = AppError(a);

    let found = chain::first(&wrapped).expect("tagged error");
    assert_eq!(found.id(), a_id);
    assert_eq!(found.message(), "eloszki");
}

#[test]
fn flatten_mixed_chain() {
    let innermost = errorf!("#1");
    let x = errorf!("#4 %s %w %%nio %d", "elo", innermost, 13);

    let links = chain::flatten(&x);
    assert_eq!(links.len(), 2);
    assert_eq!(x.message(), "#4 elo #1 %nio 13");
    assert_eq!(links.leaf().to_string(), "#1");

    let log = x.chain_log().to_string();
    assert_eq!(log.lines().count(), 2);
}
