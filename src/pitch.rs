//! Reference constants and conversions between Hz, MIDI note numbers and cents.

/// Frequency of key 0 in standard tuning. Equal to `440 * 2^(-69/12)`.
///
/// Table frequencies are stored divided by this value, so key 0 of standard tuning reads
/// back as a scaled frequency of exactly 1.
pub const REFERENCE_FREQUENCY: f64 = 8.17579891564371;

/// Concert pitch A4 in Hz. MIDI output assumes note 69 sounds at this frequency.
pub const CONCERT_A4: f64 = 440.0;

/// Remainder of `n / d` in `0..d`, also for negative `n`.
///
/// ```
/// # use hexgrid_tuning::positive_mod;
/// assert_eq!(positive_mod(-1, 12), 11);
/// assert_eq!(positive_mod(25, 12), 1);
/// ```
pub fn positive_mod(n: i64, d: i64) -> i64 {
    n.rem_euclid(d)
}

/// Fractional MIDI note number of a frequency, with note 69 at [`CONCERT_A4`].
pub fn frequency_to_midi(hz: f64) -> f64 {
    69.0 + 12.0 * (hz / CONCERT_A4).log2()
}

/// Frequency of a (possibly fractional) MIDI note number.
pub fn midi_to_frequency(midi: f64) -> f64 {
    CONCERT_A4 * ((midi - 69.0) / 12.0).exp2()
}

/// Interval from `from_hz` up to `to_hz` in cents.
pub fn cents_between(from_hz: f64, to_hz: f64) -> f64 {
    1200.0 * (to_hz / from_hz).log2()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_is_midi_zero() {
        assert!((midi_to_frequency(0.0) - REFERENCE_FREQUENCY).abs() < 1e-12);
        assert!(frequency_to_midi(REFERENCE_FREQUENCY).abs() < 1e-9);
    }

    #[test]
    fn conversions_agree() {
        assert!((midi_to_frequency(60.0) - 261.6255653).abs() < 1e-6);
        assert!((frequency_to_midi(880.0) - 81.0).abs() < 1e-12);
        assert!((cents_between(440.0, 660.0) - 701.955).abs() < 1e-3);
    }

    #[test]
    fn modulo_is_never_negative() {
        for n in -40..40 {
            let m = positive_mod(n, 7);
            assert!((0..7).contains(&m));
            assert_eq!((n - m) % 7, 0);
        }
    }
}
