#![no_main]

use libfuzzer_sys::fuzz_target;
use nuspec_nufft::{Complex64, NufftError, Spectrum, relative_rms_error};

fn spectrum(values: &[(f64, f64)]) -> Option<Spectrum> {
    let coefficients = values
        .iter()
        .take(256)
        .map(|&(re, im)| Complex64::new(re, im))
        .collect();
    Spectrum::from_coefficients(coefficients).ok()
}

fuzz_target!(|input: (Vec<(f64, f64)>, Vec<(f64, f64)>)| {
    let (Some(reference), Some(candidate)) = (spectrum(&input.0), spectrum(&input.1)) else {
        return;
    };
    let finite = |s: &Spectrum| s.as_slice().iter().all(|c| c.is_finite());
    match relative_rms_error(&reference, &candidate) {
        Ok(err) => assert!(err >= 0.0, "err={err}"),
        Err(NufftError::NonFiniteSpectrum { .. }) => {
            assert!(!(finite(&reference) && finite(&candidate)));
        }
        Err(_) => {}
    }
    if finite(&reference) {
        assert_eq!(relative_rms_error(&reference, &reference).ok(), Some(0.0));
    } else {
        assert!(relative_rms_error(&reference, &reference).is_err());
    }
});
