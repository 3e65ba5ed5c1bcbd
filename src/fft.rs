//! Radix-2 fast Fourier transform.
//!
//! A small, self-contained kernel for turning a block of complex samples
//! into its frequency-domain representation. The forward transform uses the
//! `e^(-2πik/n)` twiddle orientation, so a pure real cosine shows up as two
//! symmetric positive-frequency spikes.

use alloc::vec::Vec;

use num_complex::Complex;
use num_traits::{Float, FloatConst, NumCast};

/// Computes the discrete Fourier transform of `input` by recursive
/// decimation in time.
///
/// The input is not modified; the spectrum comes back as a new buffer of
/// the same length. Runs in O(n log n).
///
/// # Panics
///
/// Panics if `input.len()` is not a power of two (the empty slice
/// included); radix-2 decimation cannot split an odd block.
///
/// # Examples
///
/// ```
/// use num_complex::Complex;
/// use scarlet_tree::fft::fft;
///
/// // A unit impulse transforms to a flat spectrum.
/// let impulse = [
///     Complex::new(1.0_f64, 0.0),
///     Complex::new(0.0, 0.0),
///     Complex::new(0.0, 0.0),
///     Complex::new(0.0, 0.0),
/// ];
///
/// for bin in fft(&impulse) {
///     assert!((bin - Complex::new(1.0, 0.0)).norm() < 1e-12);
/// }
/// ```
#[must_use]
pub fn fft<T: Float + FloatConst>(input: &[Complex<T>]) -> Vec<Complex<T>> {
    assert!(
        input.len().is_power_of_two(),
        "`fft()` - `input.len()` must be a non-zero power of two!"
    );
    transform(input, 0, 1)
}

/// Transforms the length `input.len() / stride` subsequence starting at
/// `offset` and stepping by `stride`.
///
/// The even/odd halves recurse with a doubled stride instead of copying
/// into scratch buffers, so the only allocations are the result vectors.
fn transform<T: Float + FloatConst>(input: &[Complex<T>], offset: usize, stride: usize) -> Vec<Complex<T>> {
    let n = input.len() / stride;
    if n == 1 {
        return alloc::vec![input[offset]];
    }

    let even = transform(input, offset, stride * 2);
    let odd = transform(input, offset + stride, stride * 2);

    let angle = -(T::PI() + T::PI())
        / <T as NumCast>::from(n).expect("`fft()` - block length must be representable in `T`!");
    let step = Complex::cis(angle);
    let half = n / 2;

    let mut output = alloc::vec![Complex::new(T::zero(), T::zero()); n];
    let mut twiddle = Complex::new(T::one(), T::zero());
    for k in 0..half {
        let spin = twiddle * odd[k];
        output[k] = even[k] + spin;
        output[k + half] = even[k] - spin;
        twiddle = twiddle * step;
    }

    output
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    fn close(a: Complex<f64>, b: Complex<f64>) -> bool {
        (a - b).norm() < 1e-9
    }

    #[test]
    fn single_sample_is_its_own_spectrum() {
        let sample = [Complex::new(3.5_f64, -1.0)];
        assert_eq!(fft(&sample), sample);
    }

    #[test]
    fn constant_signal_concentrates_in_bin_zero() {
        let signal = [Complex::new(1.0_f64, 0.0); 8];
        let spectrum = fft(&signal);
        assert!(close(spectrum[0], Complex::new(8.0, 0.0)));
        for bin in &spectrum[1..] {
            assert!(close(*bin, Complex::new(0.0, 0.0)));
        }
    }

    #[test]
    fn alternating_signal_concentrates_at_nyquist() {
        let signal: Vec<Complex<f64>> =
            (0..8).map(|k| Complex::new(if k % 2 == 0 { 1.0 } else { -1.0 }, 0.0)).collect();
        let spectrum = fft(&signal);
        for (k, bin) in spectrum.iter().enumerate() {
            let expected = if k == 4 { Complex::new(8.0, 0.0) } else { Complex::new(0.0, 0.0) };
            assert!(close(*bin, expected), "bin {k} was {bin}");
        }
    }

    #[test]
    #[should_panic(expected = "`fft()` - `input.len()` must be a non-zero power of two!")]
    fn odd_length_is_rejected() {
        let signal = [Complex::new(0.0_f64, 0.0); 3];
        let _ = fft(&signal);
    }

    #[test]
    #[should_panic(expected = "`fft()` - `input.len()` must be a non-zero power of two!")]
    fn empty_input_is_rejected() {
        let signal: [Complex<f64>; 0] = [];
        let _ = fft(&signal);
    }
}
