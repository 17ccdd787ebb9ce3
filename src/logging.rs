//! Structured chain report for logs.
//!
//! # Properties
//!
//! - Borrows the error chain with an explicit lifetime
//! - CANNOT outlive the error that created it
//! - Writes straight into any `fmt::Write` without building the whole report
//! - Bounds every field so a single huge message cannot flood a log line
//! - Escapes quotes, backslashes and control characters inside fields, so a
//!   message holding `\n` still takes exactly one line
//!
//! # Format
//!
//! One line per link, outermost first:
//!
//! ```text
//! [#0] id=2240305370 tag='api' code='' message='request failed: connection refused' at=src/api.rs:88 func=app::api::handle
//! [#1] id=93151140 tag='db' code='c1' message='connection refused' at=src/db.rs:12 func=app::db::connect
//! [#2] foreign message='connection refused'
//! ```

use crate::chain::Chain;
use crate::Error;
use std::error::Error as StdError;
use std::fmt::{self, Write as _};

/// Byte budget of one quoted field of a report line, after escaping.
pub const MAX_FIELD_OUTPUT_LEN: usize = 1024;

/// Written at the end of a field that ran over [`MAX_FIELD_OUTPUT_LEN`].
pub const TRUNCATION_INDICATOR: &str = "...[TRUNCATED]";

/// Structured view of an error chain.
///
/// # Example
///
/// ```rust
/// # use tagged_errors::errorf;
/// let err = errorf!("db#c1: connection refused");
/// let log = err.chain_log();
/// let mut line = String::new();
/// log.write_to(&mut line).unwrap();
/// assert!(line.starts_with("[#0] id="));
/// ```
#[derive(Debug, Clone)]
pub struct ChainLog<'a> {
    chain: Chain<'a>,
}

impl<'a> ChainLog<'a> {
    /// Report for `error` and all its sources.
    #[inline]
    pub fn new(error: &'a (dyn StdError + 'static)) -> Self {
        Self {
            chain: Chain::new(error),
        }
    }

    /// The underlying chain.
    #[inline]
    pub const fn chain(&self) -> &Chain<'a> {
        &self.chain
    }

    /// Number of lines the report writes.
    #[inline]
    pub fn len(&self) -> usize {
        self.chain.len()
    }

    /// Always `false`.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    /// Write the report, one line per link.
    ///
    /// Fields are escaped first. An escaped field longer than
    /// [`MAX_FIELD_OUTPUT_LEN`] is cut between characters, never inside an
    /// escape, and ends with [`TRUNCATION_INDICATOR`].
    pub fn write_to(&self, f: &mut impl fmt::Write) -> fmt::Result {
        for (depth, link) in self.chain.iter().enumerate() {
            if depth > 0 {
                f.write_char('\n')?;
            }
            match link.downcast_ref::<Error>() {
                Some(err) => write_tagged(f, depth, err)?,
                None => write!(
                    f,
                    "[#{depth}] foreign message='{}'",
                    Field(&link.to_string())
                )?,
            }
        }
        Ok(())
    }
}

impl fmt::Display for ChainLog<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_to(f)
    }
}

fn write_tagged(f: &mut impl fmt::Write, depth: usize, err: &Error) -> fmt::Result {
    write!(
        f,
        "[#{depth}] id={} tag='{}' code='{}' message='{}'",
        err.id(),
        Field(err.tag()),
        Field(err.code()),
        Field(err.message()),
    )?;

    let trace = err.trace();
    if !trace.is_empty() {
        write!(
            f,
            " at={}:{} func={}",
            Field(trace.file()),
            trace.line(),
            Field(trace.function()),
        )?;
    }
    Ok(())
}

/// A field value as written in a report: escaped, then bounded.
struct Field<'a>(&'a str);

impl Field<'_> {
    fn needs_escape(c: char) -> bool {
        c.is_control() || c == '\'' || c == '\\'
    }

    /// Output length of `c` in bytes.
    fn width(c: char) -> usize {
        if Self::needs_escape(c) {
            c.escape_default().len()
        } else {
            c.len_utf8()
        }
    }

    fn write_char(f: &mut fmt::Formatter<'_>, c: char) -> fmt::Result {
        if Self::needs_escape(c) {
            write!(f, "{}", c.escape_default())
        } else {
            f.write_char(c)
        }
    }
}

impl fmt::Display for Field<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total: usize = self.0.chars().map(Self::width).sum();
        if total <= MAX_FIELD_OUTPUT_LEN {
            return self.0.chars().try_for_each(|c| Self::write_char(f, c));
        }

        let budget = MAX_FIELD_OUTPUT_LEN - TRUNCATION_INDICATOR.len();
        let mut used = 0;
        for c in self.0.chars() {
            used += Self::width(c);
            if used > budget {
                break;
            }
            Self::write_char(f, c)?;
        }
        f.write_str(TRUNCATION_INDICATOR)
    }
}
