#![no_main]

use cypherkit_query::QueryBuilder;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(payload) = serde_json::from_slice::<serde_json::Value>(data) else {
        return;
    };

    let mut builder = QueryBuilder::new();
    if builder.add_json(&payload).is_err() {
        return;
    }
    let before = builder.bind_param();
    match builder.statement() {
        Ok(statement) => assert_eq!(builder.statement().ok(), Some(statement)),
        Err(_) => assert_eq!(builder.bind_param(), before),
    }
});
