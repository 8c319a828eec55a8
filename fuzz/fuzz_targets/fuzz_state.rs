#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // Snapshot decoding must reject malformed input with an error,
    // never a panic: the host feeds it whatever its key-value store
    // hands back.
    match eidx::registry::RegistryState::from_json(data) {
        Ok(state) => {
            let _ = eidx::registry::IdentifierRegistry::from_state(state);
        }
        Err(_) => {}
    }
});
