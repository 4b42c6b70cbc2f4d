//! Fuzz target for site.json parsing.
//!
//! Tests that configuration parsing handles arbitrary input without
//! panicking, and that accepted configurations produce a chart reference.

#![no_main]

use cs_config::SiteConfig;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(config) = SiteConfig::parse_json(text) {
        let _ = config.chart_script().src().len();
    }
});
