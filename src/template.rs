//! Runtime message templates with a wrap marker.
//!
//! # Template Language
//!
//! - `%%` renders a literal `%` and consumes no argument
//! - `%[flags][width][.precision]verb` is a placeholder and consumes the next
//!   argument; `verb` is an ASCII letter and the argument is rendered with
//!   `Display`
//! - `%w` is the wrap marker: a placeholder whose argument, when it is an
//!   error value, becomes the cause of the constructed error
//! - `%` not followed by a complete placeholder is literal text
//!
//! Flags are `-` (pad on the right), `+` (sign numbers), `0` (pad numbers with
//! zeros) and `#` (radix prefix for `x`, `X`, `o`, `b`). A space ends the
//! placeholder, so `"50% done"` stays literal.
//!
//! | Placeholder | Argument | Output |
//! |---|---|---|
//! | `%5d` | `3` | `    3` |
//! | `%-4s\|` | `"ab"` | `ab  \|` |
//! | `%05d` | `-42` | `-0042` |
//! | `%.2f` | `1.5` | `1.50` |
//! | `%.3s` | `"abcdef"` | `abc` |
//! | `%#x` | `255` | `0xff` |
//!
//! Only the first `%w` designates a cause. Its argument index is the number
//! of placeholders (of any verb) that precede it.
//!
//! A placeholder with no argument left renders `%!<verb>(MISSING)`. Surplus
//! arguments are ignored.

use std::error::Error as StdError;
use std::fmt::{self, Write};

/// Boxed error accepted as a cause.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Verb of the wrap marker.
pub const WRAP_VERB: char = 'w';

/// Placeholder and escape character.
pub const VERB_PREFIX: char = '%';

/// One interpolation argument.
///
/// The construction macros build these automatically: values implementing
/// `std::error::Error` become [`Arg::Error`], everything else implementing
/// `Display` becomes [`Arg::Display`].
pub enum Arg {
    /// Plain value, already rendered.
    Display(String),
    /// Error value, eligible to become the cause.
    Error(BoxError),
}

impl Arg {
    /// Render a displayable value.
    #[inline]
    pub fn display(value: impl fmt::Display) -> Self {
        Self::Display(value.to_string())
    }

    /// Wrap an error value.
    #[inline]
    pub fn error(error: impl StdError + Send + Sync + 'static) -> Self {
        Self::Error(Box::new(error))
    }

    /// Whether this argument can become a cause.
    #[inline]
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

impl fmt::Display for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Display(s) => f.write_str(s),
            Self::Error(e) => fmt::Display::fmt(e, f),
        }
    }
}

impl fmt::Debug for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Display(s) => f.debug_tuple("Display").field(s).finish(),
            Self::Error(e) => f.debug_tuple("Error").field(e).finish(),
        }
    }
}

impl From<BoxError> for Arg {
    fn from(error: BoxError) -> Self {
        Self::Error(error)
    }
}

/// Upper bound for width and precision.
pub const MAX_WIDTH: usize = 4096;

/// Flags, width, precision and verb of one placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Directive {
    verb: char,
    left: bool,
    plus: bool,
    zero: bool,
    radix_prefix: bool,
    width: Option<usize>,
    precision: Option<usize>,
}

impl Directive {
    const fn plain(verb: char) -> Self {
        Self {
            verb,
            left: false,
            plus: false,
            zero: false,
            radix_prefix: false,
            width: None,
            precision: None,
        }
    }

    /// Parse what follows a `%`. Returns the directive and the bytes consumed.
    fn parse(s: &str) -> Option<(Self, usize)> {
        let bytes = s.as_bytes();
        let mut directive = Self::plain(' ');
        let mut i = 0;

        while let Some(&b) = bytes.get(i) {
            match b {
                b'-' => directive.left = true,
                b'+' => directive.plus = true,
                b'0' => directive.zero = true,
                b'#' => directive.radix_prefix = true,
                _ => break,
            }
            i += 1;
        }

        let (width, used) = number(&bytes[i..]);
        directive.width = width;
        i += used;

        if bytes.get(i) == Some(&b'.') {
            let (precision, used) = number(&bytes[i + 1..]);
            directive.precision = Some(precision.unwrap_or(0));
            i += 1 + used;
        }

        let verb = *bytes.get(i)?;
        if !verb.is_ascii_alphabetic() {
            return None;
        }
        directive.verb = char::from(verb);
        Some((directive, i + 1))
    }

    fn is_plain(&self) -> bool {
        *self == Self::plain(self.verb)
    }

    /// Render `value` into `out` following the flags.
    fn write(&self, out: &mut String, value: &dyn fmt::Display) -> fmt::Result {
        if self.is_plain() {
            return write!(out, "{value}");
        }

        let raw = value.to_string();
        let mut body = self.body(&raw);

        let numeric = raw.trim().parse::<f64>().is_ok();
        if self.plus && numeric && !body.starts_with('-') && !body.starts_with('+') {
            body.insert(0, '+');
        }

        let len = body.chars().count();
        let pad = self.width.unwrap_or(0).saturating_sub(len);
        if pad == 0 {
            return out.write_str(&body);
        }

        if self.left {
            out.write_str(&body)?;
            (0..pad).try_for_each(|_| out.write_char(' '))
        } else if self.zero && numeric {
            let sign_len = usize::from(body.starts_with(['-', '+']));
            let (sign, digits) = body.split_at(sign_len);
            out.write_str(sign)?;
            (0..pad).try_for_each(|_| out.write_char('0'))?;
            out.write_str(digits)
        } else {
            (0..pad).try_for_each(|_| out.write_char(' '))?;
            out.write_str(&body)
        }
    }

    /// Verb- and precision-specific rendering, before sign and padding.
    fn body(&self, raw: &str) -> String {
        match self.verb {
            'x' | 'X' | 'o' | 'b' => {
                if let Ok(n) = raw.trim().parse::<i128>() {
                    return self.radix(n);
                }
            }
            'f' | 'F' | 'e' | 'E' | 'g' | 'G' => {
                if let (Some(p), Ok(v)) = (self.precision, raw.trim().parse::<f64>()) {
                    return match self.verb {
                        'e' => format!("{v:.p$e}"),
                        'E' => format!("{v:.p$E}"),
                        _ => format!("{v:.p$}"),
                    };
                }
            }
            _ => {}
        }
        match self.precision {
            Some(p) => raw.chars().take(p).collect(),
            None => raw.to_owned(),
        }
    }

    fn radix(&self, n: i128) -> String {
        let magnitude = n.unsigned_abs();
        let sign = if n < 0 { "-" } else { "" };
        let (prefix, digits) = match self.verb {
            'x' => ("0x", format!("{magnitude:x}")),
            'X' => ("0X", format!("{magnitude:X}")),
            'o' => ("0", format!("{magnitude:o}")),
            _ => ("0b", format!("{magnitude:b}")),
        };
        let prefix = if self.radix_prefix { prefix } else { "" };
        format!("{sign}{prefix}{digits}")
    }
}

/// Leading decimal digits, clamped to [`MAX_WIDTH`].
fn number(bytes: &[u8]) -> (Option<usize>, usize) {
    let len = bytes.iter().take_while(|b| b.is_ascii_digit()).count();
    if len == 0 {
        return (None, 0);
    }
    let value = bytes[..len].iter().fold(0usize, |acc, b| {
        acc.saturating_mul(10).saturating_add(usize::from(b - b'0'))
    });
    (Some(value.min(MAX_WIDTH)), len)
}

/// A template token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token<'a> {
    Literal(&'a str),
    Percent,
    /// Placeholder with its directive and argument index.
    Placeholder(Directive, usize),
}

/// Single linear pass over the template.
struct Tokens<'a> {
    rest: &'a str,
    next_index: usize,
}

impl<'a> Tokens<'a> {
    fn new(template: &'a str) -> Self {
        Self {
            rest: template,
            next_index: 0,
        }
    }
}

impl<'a> Iterator for Tokens<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        if self.rest.is_empty() {
            return None;
        }

        let Some(pos) = self.rest.find(VERB_PREFIX) else {
            let literal = self.rest;
            self.rest = "";
            return Some(Token::Literal(literal));
        };

        if pos > 0 {
            let (literal, rest) = self.rest.split_at(pos);
            self.rest = rest;
            return Some(Token::Literal(literal));
        }

        // `rest` starts with '%'
        let after = &self.rest[1..];
        if after.starts_with(VERB_PREFIX) {
            self.rest = &after[1..];
            return Some(Token::Percent);
        }

        match Directive::parse(after) {
            // Everything consumed by the directive is ASCII.
            Some((directive, used)) => {
                let index = self.next_index;
                self.next_index += 1;
                self.rest = &after[used..];
                Some(Token::Placeholder(directive, index))
            }
            None => {
                let (literal, rest) = self.rest.split_at(1);
                self.rest = rest;
                Some(Token::Literal(literal))
            }
        }
    }
}

/// Argument index designated by the first wrap marker, if any.
///
/// ```rust
/// use tagged_errors::template::wrap_position;
///
/// assert_eq!(wrap_position("one then %w"), Some(0));
/// assert_eq!(wrap_position("#4 %s %w %%nio %d"), Some(1));
/// assert_eq!(wrap_position("100%% sure"), None);
/// ```
pub fn wrap_position(template: &str) -> Option<usize> {
    Tokens::new(template).find_map(|token| match token {
        Token::Placeholder(directive, index) if directive.verb == WRAP_VERB => Some(index),
        _ => None,
    })
}

/// Number of placeholders, wrap marker included.
pub fn placeholder_count(template: &str) -> usize {
    Tokens::new(template)
        .filter(|t| matches!(t, Token::Placeholder(..)))
        .count()
}

/// Output of [`interpolate`].
#[derive(Debug)]
pub struct Interpolated {
    /// Fully substituted text.
    pub text: String,
    /// Error taken from the wrap marker's argument.
    pub cause: Option<BoxError>,
}

/// Substitute `args` into `template`, extracting the cause.
pub fn interpolate(template: &str, args: Vec<Arg>) -> Interpolated {
    let mut args: Vec<Option<Arg>> = args.into_iter().map(Some).collect();

    let cause = wrap_position(template).and_then(|index| {
        let slot = args.get_mut(index)?;
        if !matches!(slot, Some(Arg::Error(_))) {
            return None;
        }
        match slot.take() {
            Some(Arg::Error(e)) => Some(e),
            _ => None,
        }
    });

    let mut text = String::with_capacity(template.len());
    for token in Tokens::new(template) {
        // Writing into a String cannot fail.
        let _ = match token {
            Token::Literal(s) => text.write_str(s),
            Token::Percent => text.write_char(VERB_PREFIX),
            Token::Placeholder(directive, index) => match args.get(index) {
                Some(Some(arg)) => directive.write(&mut text, arg),
                // The slot was emptied because it holds the cause.
                Some(None) => match &cause {
                    Some(e) => directive.write(&mut text, e),
                    None => Ok(()),
                },
                None => write!(text, "%!{}(MISSING)", directive.verb),
            },
        };
    }

    Interpolated { text, cause }
}
