#![no_main]

use libfuzzer_sys::fuzz_target;
use tagged_errors::grammar;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    let parts = grammar::parse(text);
    assert_eq!(parts.message(), parts.message().trim());
    if !parts.has_head() {
        assert!(parts.is_unclassified());
    }

    // Rendering a classified parse and parsing it again keeps the code.
    if !parts.is_unclassified() {
        let again = grammar::parse(&parts.to_string());
        assert_eq!(again.code(), parts.code());
    }
});
