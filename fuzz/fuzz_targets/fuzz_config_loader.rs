#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // Parse and validation errors are fine; panics are not.
    if let Ok(cfg) = charger_config::load_toml(data) {
        if cfg.validate().is_ok() {
            // A validated config always yields usable thresholds.
            assert!(charger_core::VoltageThresholds::try_from(&cfg.thresholds).is_ok());
        }
    }
});
