#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use nuspec_nufft::{
    Complex64, Direction, Sample, TransformOptions, fast_nudft1_with_options,
};
use nuspec_runtime::RuntimeMode;

#[derive(Debug, Arbitrary)]
struct FastInput {
    inverse: bool,
    hardened: bool,
    m: u8,
    precision_exponent: u8,
    points: Vec<(f64, f64, f64)>,
}

fuzz_target!(|input: FastInput| {
    let direction = if input.inverse {
        Direction::Inverse
    } else {
        Direction::Forward
    };
    let mode = if input.hardened {
        RuntimeMode::Hardened
    } else {
        RuntimeMode::Strict
    };
    let samples: Vec<Sample> = input
        .points
        .iter()
        .take(64)
        .map(|&(theta, re, im)| Sample::new(theta, Complex64::new(re, im)))
        .collect();
    // 10^-1 .. 10^-16, so both supported and unsupported precisions occur.
    let precision = 10f64.powi(-i32::from(input.precision_exponent % 16 + 1));
    let options = TransformOptions::default().with_mode(mode);

    if let Ok(outcome) =
        fast_nudft1_with_options(&samples, direction, precision, usize::from(input.m), &options)
    {
        assert_eq!(outcome.raw_spectrum().len(), usize::from(input.m));
        if outcome.is_success() {
            assert!(outcome.raw_spectrum().as_slice().iter().all(|c| c.is_finite()));
        } else {
            assert!(outcome.spectrum_checked().is_err());
        }
    }
});
