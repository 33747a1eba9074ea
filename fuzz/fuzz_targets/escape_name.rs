#![no_main]

use cypherkit_query::{escape_if_needed, needs_escaping};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(name) = std::str::from_utf8(data) else {
        return;
    };

    let escaped = escape_if_needed(name);
    assert!(!needs_escaping(&escaped));
    assert_eq!(escape_if_needed(&escaped), escaped);
});
