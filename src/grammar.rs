//! The `tag#code: message` mini-grammar.
//!
//! Every error message is parsed once, left to right:
//!
//! 1. The text before the first `:` is the *head*, unless there is no colon,
//!    the colon is the very first character, or the head contains a space.
//!    In those cases the whole (trimmed) text is the message.
//! 2. Inside the head, the first `#` separates the tag (before) from the
//!    code (after). Without `#` the whole head is the tag.
//! 3. The message is whatever follows the colon, trimmed.
//!
//! ```rust
//! use tagged_errors::grammar;
//!
//! let parts = grammar::parse("email#h1:     invalid hostname      ");
//! assert_eq!(parts.tag(), "email");
//! assert_eq!(parts.code(), "h1");
//! assert_eq!(parts.message(), "invalid hostname");
//! assert_eq!(parts.to_string(), "email#h1: invalid hostname");
//! ```
//!
//! Rendering is the inverse direction and produces the canonical form used by
//! [`Error`](crate::Error)'s `Display`.

use std::fmt;

/// Separates the head from the message.
pub const HEAD_SEPARATOR: char = ':';

/// Separates the tag from the code inside the head.
pub const CODE_SEPARATOR: char = '#';

/// Result of parsing a message, borrowing from the parsed text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Parts<'a> {
    tag: &'a str,
    code: &'a str,
    message: &'a str,
    head: bool,
}

impl<'a> Parts<'a> {
    /// Classification tag, empty when unset.
    #[inline]
    pub const fn tag(&self) -> &'a str {
        self.tag
    }

    /// Short code, empty when unset.
    #[inline]
    pub const fn code(&self) -> &'a str {
        self.code
    }

    /// Trimmed message.
    #[inline]
    pub const fn message(&self) -> &'a str {
        self.message
    }

    /// Whether a head was recognised, even an empty one such as `"#:"`.
    #[inline]
    pub const fn has_head(&self) -> bool {
        self.head
    }

    /// Neither tag nor code is set.
    #[inline]
    pub fn is_unclassified(&self) -> bool {
        self.tag.is_empty() && self.code.is_empty()
    }
}

impl fmt::Display for Parts<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_canonical(f, self.tag, self.code, self.message)
    }
}

/// Split `text` into tag, code and message.
///
/// Never fails: text that does not follow the grammar becomes a plain message.
pub fn parse(text: &str) -> Parts<'_> {
    let plain = Parts {
        message: text.trim(),
        ..Parts::default()
    };

    let Some(colon) = text.find(HEAD_SEPARATOR) else {
        return plain;
    };
    let head = &text[..colon];
    if colon == 0 || head.contains(' ') {
        return plain;
    }

    let (tag, code) = match head.find(CODE_SEPARATOR) {
        Some(hash) => (&head[..hash], &head[hash + CODE_SEPARATOR.len_utf8()..]),
        None => (head, ""),
    };

    Parts {
        tag,
        code,
        message: text[colon + HEAD_SEPARATOR.len_utf8()..].trim(),
        head: true,
    }
}

/// Canonical string form of a tag, code and message.
///
/// - tag and code: `tag#code: message`
/// - code only: `#code: message`
/// - tag only: `tag: message`
/// - neither: `message`
///
/// The result is trimmed, so an empty message leaves `tag:` or `#code:`.
pub fn render(tag: &str, code: &str, message: &str) -> String {
    let mut out = String::with_capacity(tag.len() + code.len() + message.len() + 3);
    // Writing into a String cannot fail.
    let _ = write_canonical(&mut out, tag, code, message);
    out
}

/// Parse then render: the canonical form of arbitrary text.
pub fn normalize(text: &str) -> String {
    parse(text).to_string()
}

/// Write the canonical form without allocating.
///
/// Equivalent to trimming `render`'s untrimmed output: leading whitespace can
/// only come from the first written piece, trailing whitespace only from the
/// last one.
pub fn write_canonical(
    f: &mut impl fmt::Write,
    tag: &str,
    code: &str,
    message: &str,
) -> fmt::Result {
    let message = message.trim();

    if tag.is_empty() && code.is_empty() {
        return f.write_str(message);
    }

    if tag.is_empty() {
        f.write_char(CODE_SEPARATOR)?;
    } else {
        f.write_str(tag.trim_start())?;
        if !code.is_empty() {
            f.write_char(CODE_SEPARATOR)?;
        }
    }
    f.write_str(code)?;
    f.write_char(HEAD_SEPARATOR)?;

    if !message.is_empty() {
        f.write_char(' ')?;
        f.write_str(message)?;
    }
    Ok(())
}
