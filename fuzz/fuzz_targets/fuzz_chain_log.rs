#![no_main]

use libfuzzer_sys::fuzz_target;
use tagged_errors::logging::MAX_FIELD_OUTPUT_LEN;
use tagged_errors::{errorf, Error};

fuzz_target!(|data: &[u8]| {
    let text = String::from_utf8_lossy(data);
    let depth = data.first().map_or(0, |b| usize::from(b % 16));

    let mut err: Error = errorf!("%s", text);
    for _ in 0..depth {
        err = errorf!("wrap#w: %w", err);
    }

    let mut out = String::new();
    err.chain_log().write_to(&mut out).unwrap();
    assert_eq!(out.split('\n').count(), depth + 1);
    assert!(out.starts_with("[#0] id="));
    assert!(out.len() < (depth + 1) * (4 * MAX_FIELD_OUTPUT_LEN + 512));
});
