#![no_main]

use libfuzzer_sys::fuzz_target;
use tagged_errors::{Arg, Error, Trace};

fuzz_target!(|data: &[u8]| {
    let text = String::from_utf8_lossy(data);
    let mut pieces = text.split('\u{0}');
    let template = pieces.next().unwrap_or_default();
    let args: Vec<Arg> = pieces.map(Arg::display).collect();

    let err = Error::with_trace(Trace::empty(), template, args);
    let _ = err.to_string();
    let _ = format!("{err:?}");
    let _ = err.code_number();
});
