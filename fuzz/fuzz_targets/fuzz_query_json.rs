#![no_main]

use libfuzzer_sys::fuzz_target;
use roguedb_client::Query;

fuzz_target!(|data: &[u8]| {
    if let Ok(query) = serde_json::from_slice::<Query>(data) {
        assert!(!query.is_empty());
        assert!(!query.api_key().is_empty());
        for expression in query.expressions() {
            assert_eq!(expression.comparisons().len(), expression.operands().len());
        }
    }
});
