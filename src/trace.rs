//! Call-site capture.
//!
//! A [`Trace`] records the source file, line and enclosing function of the
//! code that constructed an error. There are two ways to obtain one:
//!
//! - **Static**: [`errorf!`](crate::errorf) expands `file!()`, `line!()` and
//!   the enclosing function path right where it is written, then anchors the
//!   file at the crate's manifest directory ([`Trace::from_source`]). Always
//!   available.
//! - **Depth-based**: [`Trace::capture`] walks the current stack and reports
//!   the frame `depth` levels above itself. Helpers built on top of this crate
//!   use a larger depth to attribute *their* caller instead of themselves.
//!
//! Stack capture relies on `std::backtrace` and on debug symbols. When either
//! is missing, the returned trace is empty. Capture never fails.

use std::backtrace::{Backtrace, BacktraceStatus};
use std::borrow::Cow;
use std::fmt;
use std::path::{Component, Path, PathBuf};

/// Symbol of [`Trace::capture`] as printed in a backtrace. Frames are counted
/// from here.
const CAPTURE_SYMBOL: &str = concat!(module_path!(), "::Trace::capture");

/// Length of the `h` + 16 hex digits hash suffix of legacy mangled symbols.
const LEGACY_HASH_LEN: usize = 17;

/// Source location and function of an error's construction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Trace {
    file: Cow<'static, str>,
    line: u32,
    function: Cow<'static, str>,
}

impl Trace {
    /// Trace from compile-time values (what the macros use).
    #[inline]
    pub const fn new(file: &'static str, line: u32, function: &'static str) -> Self {
        Self {
            file: Cow::Borrowed(file),
            line,
            function: Cow::Borrowed(function),
        }
    }

    /// Trace from `file!()` output, made absolute against `manifest_dir`.
    ///
    /// `file!()` is relative to the workspace root, which may sit above the
    /// package's manifest directory: for a member at `/ws/member`, `file!()`
    /// reads `member/src/lib.rs`. The trailing components of `manifest_dir`
    /// that repeat at the front of `file` are joined only once.
    ///
    /// `file` is kept as is when it is already absolute or `manifest_dir` is
    /// unknown.
    pub fn from_source(
        manifest_dir: Option<&'static str>,
        file: &'static str,
        line: u32,
        function: &'static str,
    ) -> Self {
        let file = match manifest_dir {
            Some(dir) if !dir.is_empty() && !Path::new(file).is_absolute() => {
                Cow::Owned(anchor(Path::new(dir), Path::new(file)).to_string_lossy().into_owned())
            }
            _ => Cow::Borrowed(file),
        };
        Self {
            file,
            line,
            function: Cow::Borrowed(function),
        }
    }

    /// Trace with no location.
    #[inline]
    pub const fn empty() -> Self {
        Self::new("", 0, "")
    }

    /// Capture the frame `depth` levels above this call.
    ///
    /// `capture(1)` reports the function calling `capture`, `capture(2)` its
    /// caller, and so on. Returns an empty trace when the stack cannot be
    /// inspected or is shallower than `depth`.
    #[inline(never)]
    pub fn capture(depth: usize) -> Self {
        let backtrace = Backtrace::force_capture();
        if backtrace.status() != BacktraceStatus::Captured {
            return Self::empty();
        }
        // Alternate form keeps absolute paths.
        let rendered = format!("{backtrace:#}");
        let frames = parse_frames(&rendered);
        select_frame(&frames, depth)
            .map(Frame::into_trace)
            .unwrap_or_default()
    }

    /// Source file, empty when unknown.
    #[inline]
    pub fn file(&self) -> &str {
        &self.file
    }

    /// Line number, 0 when unknown.
    #[inline]
    pub const fn line(&self) -> u32 {
        self.line
    }

    /// Fully qualified function path, empty when unknown.
    #[inline]
    pub fn function(&self) -> &str {
        &self.function
    }

    /// No location information at all.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.file.is_empty() && self.line == 0 && self.function.is_empty()
    }

    /// Short site code `<file name>@L<line>`, e.g. `parser.rs@L42`.
    ///
    /// Empty when the file is unknown.
    pub fn location_code(&self) -> String {
        if self.file.is_empty() {
            return String::new();
        }
        let name = Path::new(self.file.as_ref())
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(self.file.as_ref());
        format!("{name}@L{}", self.line)
    }
}

impl fmt::Display for Trace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("<unknown>");
        }
        write!(f, "{}:{}", self.file, self.line)?;
        if !self.function.is_empty() {
            write!(f, " ({})", self.function)?;
        }
        Ok(())
    }
}

/// Join `file` onto `dir`, skipping the longest run of `dir`'s trailing
/// components that `file` starts with.
fn anchor(dir: &Path, file: &Path) -> PathBuf {
    let dir_parts: Vec<Component<'_>> = dir.components().collect();
    let file_parts: Vec<Component<'_>> = file.components().collect();
    let overlap = (1..=dir_parts.len().min(file_parts.len()))
        .rev()
        .find(|&k| dir_parts[dir_parts.len() - k..] == file_parts[..k])
        .unwrap_or(0);

    let mut path = dir.to_path_buf();
    path.extend(&file_parts[overlap..]);
    path
}

/// One symbol of a rendered backtrace plus its optional location.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Frame {
    function: String,
    file: Option<String>,
    line: Option<u32>,
}

impl Frame {
    fn new(symbol: &str) -> Self {
        Self {
            function: normalize_symbol(symbol),
            file: None,
            line: None,
        }
    }

    fn into_trace(self) -> Trace {
        Trace {
            file: self.file.map(Cow::Owned).unwrap_or_default(),
            line: self.line.unwrap_or(0),
            function: Cow::Owned(self.function),
        }
    }
}

/// Parse the alternate (`{:#}`) text form of a `std::backtrace::Backtrace`.
///
/// ```text
///    3:     0x55d1c0a1b2c3 - my_app[1a2b3c4d5e6f7a8b]::config::load
///                                at /src/my_app/src/config.rs:42:9
///                            <my_app[1a2b3c4d5e6f7a8b]::Loader>::read
///                                at /src/my_app/src/loader.rs:7:5
/// ```
///
/// Numbered lines open a physical frame. Unnumbered symbol lines that follow
/// are functions inlined into it and count as frames of their own, since each
/// is a distinct caller in source. `at` lines attach to the symbol above them.
fn parse_frames(rendered: &str) -> Vec<Frame> {
    let mut frames: Vec<Frame> = Vec::new();

    for raw in rendered.lines() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(location) = line.strip_prefix("at ") {
            if let Some(frame) = frames.last_mut() {
                let (file, line_no) = split_location(location);
                frame.file = Some(file.to_owned());
                frame.line = line_no;
            }
            continue;
        }

        match line.split_once(':') {
            Some((index, symbol))
                if !index.is_empty() && index.bytes().all(|b| b.is_ascii_digit()) =>
            {
                frames.push(Frame::new(symbol.trim()));
            }
            // Inlined symbol, only meaningful once a numbered frame was seen.
            _ if !frames.is_empty() => frames.push(Frame::new(line)),
            _ => {}
        }
    }

    frames
}

/// Frame `depth` levels above the capture frame.
fn select_frame(frames: &[Frame], depth: usize) -> Option<Frame> {
    let start = frames.iter().position(|f| f.function == CAPTURE_SYMBOL)?;
    frames.get(start.checked_add(depth)?).cloned()
}

/// Split `path:line:column` (column optional) from the right, so paths that
/// contain colons survive.
fn split_location(location: &str) -> (&str, Option<u32>) {
    let mut parts = location.rsplitn(3, ':');
    let last = parts.next();
    let middle = parts.next();
    let rest = parts.next();

    match (rest, middle, last) {
        (Some(path), Some(line), Some(_column)) if line.parse::<u32>().is_ok() => {
            (path, line.parse().ok())
        }
        (_, Some(_), Some(line)) if line.parse::<u32>().is_ok() => {
            let cut = location.len() - line.len() - 1;
            (&location[..cut], line.parse().ok())
        }
        _ => (location, None),
    }
}

/// Reduce a printed symbol to a plain `crate::path::function`.
///
/// Handles the instruction address prefix (`0x55d1c0a1 - `), the legacy
/// `::h<16 hex>` suffix, the `[<hex>]` crate disambiguators of v0 mangling
/// and the `<Type>::method` form of inherent methods. Trait impls
/// (`<Type as Trait>::method`) keep their angle brackets.
fn normalize_symbol(symbol: &str) -> String {
    let symbol = strip_address(symbol.trim());
    let symbol = strip_legacy_hash(symbol);
    let symbol = strip_disambiguators(symbol);
    unwrap_inherent(&symbol).unwrap_or(symbol)
}

fn strip_address(symbol: &str) -> &str {
    match symbol.split_once(" - ") {
        Some((address, rest)) if address.starts_with("0x") => rest.trim_start(),
        _ => symbol,
    }
}

/// Remove the `::h0123456789abcdef` suffix of legacy mangled names.
fn strip_legacy_hash(symbol: &str) -> &str {
    let Some(pos) = symbol.rfind("::") else {
        return symbol;
    };
    let suffix = &symbol[pos + 2..];
    let is_hash = suffix.len() == LEGACY_HASH_LEN
        && suffix.starts_with('h')
        && suffix[1..].bytes().all(|b| b.is_ascii_hexdigit());
    if is_hash { &symbol[..pos] } else { symbol }
}

/// Drop every `[<hex>]` group, e.g. `std[e28293b1aa0f68bd]` becomes `std`.
/// Brackets holding anything else (array types) stay.
fn strip_disambiguators(symbol: &str) -> String {
    let mut out = String::with_capacity(symbol.len());
    let mut rest = symbol;
    while let Some(open) = rest.find('[') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find(']') {
            Some(close)
                if close > 0 && after[..close].bytes().all(|b| b.is_ascii_hexdigit()) =>
            {
                rest = &after[close + 1..];
            }
            _ => {
                out.push('[');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

/// `<a::Type>::method` becomes `a::Type::method`.
fn unwrap_inherent(symbol: &str) -> Option<String> {
    let inner = symbol.strip_prefix('<')?;
    let mut depth = 1usize;
    for (i, c) in inner.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => {
                depth -= 1;
                if depth == 0 {
                    let (ty, tail) = (&inner[..i], &inner[i + 1..]);
                    if ty.contains(" as ") || !tail.starts_with("::") {
                        return None;
                    }
                    return Some(format!("{ty}{tail}"));
                }
            }
            _ => {}
        }
    }
    None
}
