//! Tone stimulus generation.
//!
//! A phase-accumulating complex sinusoid used to put a recognizable signal
//! on the transmit path. This is a stimulus, not a DSP building block --
//! no window, no dithering, just a clean carrier offset.

use std::f64::consts::PI;

use sdrio::Complex32;

/// Generate `len` samples of a complex sinusoid advancing `phase_incr`
/// radians per sample, scaled by `amplitude`.
///
/// For a tone at `f` Hz with sample rate `fs`, pass
/// `phase_incr = 2.0 * PI * f / fs`. The phase accumulator wraps at pi to
/// keep the argument small over long buffers.
pub fn tone(len: usize, phase_incr: f64, amplitude: f32) -> Vec<Complex32> {
    let mut ang: f64 = 0.0;
    let mut samples = Vec::with_capacity(len);
    for _ in 0..len {
        samples.push(Complex32::new(
            amplitude * ang.cos() as f32,
            amplitude * ang.sin() as f32,
        ));
        ang += phase_incr;
        if ang > PI {
            ang -= 2.0 * PI;
        }
    }
    samples
}

/// Generate `len` samples of silence.
pub fn silence(len: usize) -> Vec<Complex32> {
    vec![Complex32::new(0.0, 0.0); len]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_zero_phase() {
        let samples = tone(10, 2.0 * PI / 625.0, 0.5);
        assert!((samples[0].re - 0.5).abs() < 1e-6);
        assert!(samples[0].im.abs() < 1e-6);
    }

    #[test]
    fn amplitude_bounds_hold() {
        let samples = tone(10_000, 2.0 * PI / 625.0, 0.5);
        for s in &samples {
            assert!(s.norm() <= 0.5 + 1e-5);
        }
    }

    #[test]
    fn repeats_after_one_period() {
        // 625 samples per cycle: sample 625 is back at the start phase.
        let samples = tone(1_000, 2.0 * PI / 625.0, 1.0);
        assert!((samples[625].re - samples[0].re).abs() < 1e-4);
        assert!((samples[625].im - samples[0].im).abs() < 1e-4);
    }

    #[test]
    fn silence_is_all_zeros() {
        let samples = silence(100);
        assert_eq!(samples.len(), 100);
        assert!(samples.iter().all(|s| s.re == 0.0 && s.im == 0.0));
    }
}
