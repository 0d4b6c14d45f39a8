#![no_main]

use libfuzzer_sys::fuzz_target;
use roguedb_client::ServiceAccount;

fuzz_target!(|data: &[u8]| {
    if let Ok(json) = std::str::from_utf8(data) {
        let _ = ServiceAccount::from_json(json);
    }
});
