#![no_main]

use libfuzzer_sys::fuzz_target;
use nuspec_nufft::{plan_for_rate, plan_length};

fuzz_target!(|input: (f64, f64)| {
    let (span, rate_per_bin) = input;
    if let Ok(m) = plan_length(span) {
        assert!(m >= 2 && m % 2 == 0, "span={span} m={m}");
        assert!(m as f64 >= span.ceil(), "span={span} m={m}");
    }
    let _ = plan_for_rate(span, rate_per_bin);
});
