//! Fuzz target: `TunnelConfig::from_json`
//!
//! Invariants checked:
//! - No panics under any byte sequence
//! - Every accepted config passes `validate()` and can build a tunnel
//!
//! cargo fuzz run fuzz_config_json

#![no_main]

use libfuzzer_sys::fuzz_target;
use uvtunnel::config::TunnelConfig;
use uvtunnel::tracking::Tunnel;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = core::str::from_utf8(data) else {
        return;
    };
    if let Ok(config) = TunnelConfig::from_json(text) {
        assert!(config.validate().is_ok());
        assert!(config.min_occlusion_ms < config.max_occlusion_ms);
        let tunnel = Tunnel::new(&config);
        assert!(tunnel.is_empty());
    }
});
