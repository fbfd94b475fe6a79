#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // Parse and validation errors are fine; panics are not.
    let parsed: Result<ferment_config::Config, toml::de::Error> = ferment_config::load_toml(data);
    if let Ok(cfg) = parsed {
        let checked: eyre::Result<()> = cfg.validate();
        let _ = checked;
    }
});
