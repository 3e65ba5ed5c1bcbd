use std::f64::consts::PI;

use num_complex::Complex;
use proptest::prelude::*;
use scarlet_tree::fft::fft;

const EPSILON: f64 = 1e-8;

/// Direct O(n²) evaluation of the transform definition, used as the oracle.
fn naive_dft(input: &[Complex<f64>]) -> Vec<Complex<f64>> {
    let n = input.len();
    (0..n)
        .map(|k| {
            input
                .iter()
                .enumerate()
                .map(|(j, &sample)| {
                    let angle = -2.0 * PI * (k as f64) * (j as f64) / (n as f64);
                    sample * Complex::from_polar(1.0, angle)
                })
                .sum()
        })
        .collect()
}

fn assert_spectra_close(actual: &[Complex<f64>], expected: &[Complex<f64>]) {
    assert_eq!(actual.len(), expected.len());
    for (k, (a, e)) in actual.iter().zip(expected).enumerate() {
        assert!((a - e).norm() < EPSILON, "bin {k}: got {a}, expected {e}");
    }
}

fn sample_strategy() -> impl Strategy<Value = Complex<f64>> {
    (-100.0f64..100.0, -100.0f64..100.0).prop_map(|(re, im)| Complex::new(re, im))
}

// ─── Agreement with the definition ───────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    /// Random signals at every power-of-two length up to 256 must match the
    /// direct evaluation of the transform definition.
    #[test]
    fn matches_the_naive_dft(
        samples in proptest::collection::vec(sample_strategy(), 256),
        log_len in 0u32..=8,
    ) {
        let signal = &samples[..1 << log_len];
        assert_spectra_close(&fft(signal), &naive_dft(signal));
    }

    /// The transform is linear: fft(a·x + y) == a·fft(x) + fft(y).
    #[test]
    fn transform_is_linear(
        x in proptest::collection::vec(sample_strategy(), 64),
        y in proptest::collection::vec(sample_strategy(), 64),
        scale in -10.0f64..10.0,
    ) {
        let combined: Vec<Complex<f64>> =
            x.iter().zip(&y).map(|(a, b)| a * scale + b).collect();

        let lhs = fft(&combined);
        let rhs: Vec<Complex<f64>> = fft(&x)
            .iter()
            .zip(fft(&y))
            .map(|(a, b)| a * scale + b)
            .collect();

        assert_spectra_close(&lhs, &rhs);
    }

    /// Bin zero is the plain sum of the samples.
    #[test]
    fn bin_zero_is_the_sample_sum(samples in proptest::collection::vec(sample_strategy(), 128)) {
        let spectrum = fft(&samples);
        let sum: Complex<f64> = samples.iter().sum();
        prop_assert!((spectrum[0] - sum).norm() < EPSILON);
    }
}

// ─── Known closed-form spectra ───────────────────────────────────────────────

#[test]
fn impulse_has_a_flat_spectrum() {
    let mut impulse = vec![Complex::new(0.0, 0.0); 16];
    impulse[0] = Complex::new(1.0, 0.0);

    let spectrum = fft(&impulse);
    for bin in &spectrum {
        assert!((bin - Complex::new(1.0, 0.0)).norm() < EPSILON);
    }
}

#[test]
fn pure_cosine_splits_into_two_bins() {
    const N: usize = 64;
    const FREQUENCY: usize = 5;

    let signal: Vec<Complex<f64>> = (0..N)
        .map(|j| Complex::new((2.0 * PI * (FREQUENCY * j) as f64 / N as f64).cos(), 0.0))
        .collect();

    let spectrum = fft(&signal);
    for (k, bin) in spectrum.iter().enumerate() {
        let expected = if k == FREQUENCY || k == N - FREQUENCY {
            Complex::new(N as f64 / 2.0, 0.0)
        } else {
            Complex::new(0.0, 0.0)
        };
        assert!((bin - expected).norm() < EPSILON, "bin {k}: got {bin}");
    }
}

#[test]
fn f32_samples_transform_too() {
    let signal = [Complex::new(1.0_f32, 0.0), Complex::new(-1.0, 0.0)];
    let spectrum = fft(&signal);
    assert!((spectrum[0] - Complex::new(0.0, 0.0)).norm() < 1e-5);
    assert!((spectrum[1] - Complex::new(2.0, 0.0)).norm() < 1e-5);
}

// ─── Rejected inputs ─────────────────────────────────────────────────────────

#[test]
#[should_panic(expected = "`fft()` - `input.len()` must be a non-zero power of two!")]
fn non_power_of_two_length_panics() {
    let signal = [Complex::new(0.0_f64, 0.0); 12];
    let _ = fft(&signal);
}
