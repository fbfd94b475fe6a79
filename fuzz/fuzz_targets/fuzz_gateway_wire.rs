#![no_main]
use ferment_gateway::wire::{self, Flavor};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // Gateway bodies are untrusted; decoding must fail cleanly.
    for flavor in [Flavor::Temp, Flavor::DataPoint] {
        if let Ok(p) = wire::parse_temp(flavor, data) {
            assert!(p.value.is_none_or(f32::is_finite));
            assert!(!p.valid || p.value.is_some());
        }
    }
    let _ = wire::parse_level(data);
});
