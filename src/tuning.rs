use log::{debug, warn};

use crate::error::BuildError;
use crate::mapping::KeyboardMapping;
use crate::pitch::{positive_mod, REFERENCE_FREQUENCY};
use crate::scale::Scale;
use crate::table::{key_of_slot, slot_index, Slot, TABLE_CENTER, TABLE_SIZE};

/// What to do when the anchor key of a mapping lands on an unmapped key.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AnchorPolicy {
    /// Fail with [`BuildError::UnanchorableTuning`].
    #[default]
    RequireMapped,

    /// Pretend the anchor sits on the straight line (in log-frequency) between the nearest
    /// mapped keys below and above it, and tune those so that the line passes through the
    /// anchor frequency.
    InterpolateNeighbours,
}

/// Options for [`Tuning::build`].
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BuildOptions {
    /// Handling of an unmapped anchor key.
    pub anchor_policy: AnchorPolicy,
}

impl BuildOptions {
    /// Options that interpolate an unmapped anchor key.
    pub fn interpolate_anchor() -> Self {
        BuildOptions {
            anchor_policy: AnchorPolicy::InterpolateNeighbours,
        }
    }
}

/// The Tuning struct is the primary place where you will interact with this library.
///
/// It is constructed from a [`Scale`] and a [`KeyboardMapping`] and precomputes, for every
/// key in `-256..=255`, the scale position, the equave and the frequency. Rotating the
/// layout or transposing can push key numbers far outside the MIDI range, so the table
/// covers much more than the 128 keys a mapping usually names.
///
/// A tuning is immutable. To retune, build a new one and swap it in (see
/// [`LiveTuning`](crate::LiveTuning)).
///
/// ```
/// # use hexgrid_tuning::*;
/// let scale = Scale::even_division_of_span(2, 12).unwrap();
/// let mapping = KeyboardMapping::tune_a69_to(432.0);
///
/// let t = Tuning::build(scale, mapping, BuildOptions::default()).unwrap();
/// assert!((t.frequency(69) - 432.0).abs() < 1e-9);
/// assert!((t.frequency(81) - 864.0).abs() < 1e-9);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Tuning {
    /// Scale the table was built from.
    pub scale: Scale,

    /// Keyboard mapping the table was built from.
    pub keyboard_mapping: KeyboardMapping,

    slots: Box<[Slot]>,
    interpolated: bool,
}

/// Octaves above the unison of the middle key's period.
fn period_log(scale: &Scale, slot: &Slot) -> Option<f64> {
    let degree = scale.degree_log(slot.scale_position?)?;
    Some(scale.equave_log() * slot.equave as f64 + degree)
}

/// Nearest mapped slots strictly below and strictly above `index`.
fn mapped_neighbours(slots: &[Slot], index: usize) -> (Option<usize>, Option<usize>) {
    let below = slots[..index].iter().rposition(Slot::is_mapped);
    let above = slots[index + 1..]
        .iter()
        .position(Slot::is_mapped)
        .map(|offset| index + 1 + offset);
    (below, above)
}

impl Tuning {
    /// Builds a tuning with the given `scale` and the default mapping (scale starting on
    /// key 60, tuned to standard pitch).
    pub fn from_scale(scale: Scale) -> Result<Self, BuildError> {
        Tuning::build(scale, KeyboardMapping::default(), BuildOptions::default())
    }

    /// Builds the table for `scale` laid out by `keyboard_mapping`.
    pub fn build(
        scale: Scale,
        keyboard_mapping: KeyboardMapping,
        options: BuildOptions,
    ) -> Result<Self, BuildError> {
        if scale.count() == 0 {
            return Err(BuildError::EmptyScale);
        }

        let ratio = keyboard_mapping.anchor_pitch_ratio;
        if !(ratio.is_finite() && ratio > 0.0) {
            return Err(BuildError::InvalidAnchorFrequency {
                frequency: keyboard_mapping.anchor_frequency,
            });
        }

        let anchor_key = keyboard_mapping.anchor_key;
        let anchor = TABLE_CENTER as i64 + anchor_key as i64;
        if !(0..TABLE_SIZE as i64).contains(&anchor) {
            return Err(BuildError::AnchorOutOfRange { anchor_key });
        }
        let anchor = anchor as usize;

        // first_key/last_key are informational, every slot gets a degree
        let (map_count, period_degrees, keys) = keyboard_mapping.resolved(scale.count());
        let map_count = map_count as i64;
        let scale_count = scale.count() as i64;
        let middle = TABLE_CENTER as i64 + keyboard_mapping.middle_key as i64;

        let mut slots = vec![Slot::default(); TABLE_SIZE].into_boxed_slice();
        for (i, slot) in slots.iter_mut().enumerate() {
            let from_middle = i as i64 - middle;
            let cycle = positive_mod(from_middle, map_count);
            if let Some(degree) = keys[cycle as usize] {
                // exact: `cycle` is the floor remainder of `from_middle`
                let period = (from_middle - cycle) / map_count;
                let degrees = degree as i64 + period * period_degrees;
                let position = positive_mod(degrees, scale_count);
                slot.scale_position = Some(position as usize);
                slot.equave = i32::try_from((degrees - position) / scale_count).map_err(|_| {
                    BuildError::EquaveOutOfRange {
                        key: key_of_slot(i),
                    }
                })?;
            }
        }

        let anchor_log = match period_log(&scale, &slots[anchor]) {
            Some(log) => log,
            None if options.anchor_policy == AnchorPolicy::RequireMapped => {
                return Err(BuildError::UnanchorableTuning { anchor_key });
            }
            None => {
                let (below, above) = mapped_neighbours(&slots, anchor);
                let (Some(below), Some(above)) = (below, above) else {
                    return Err(BuildError::UnanchorableTuning { anchor_key });
                };
                warn!(
                    "anchor key {anchor_key} is unmapped, interpolating between keys {} and {}",
                    key_of_slot(below),
                    key_of_slot(above)
                );
                let low = period_log(&scale, &slots[below]).unwrap_or_default();
                let high = period_log(&scale, &slots[above]).unwrap_or_default();
                let frac = (anchor - below) as f64 / (above - below) as f64;
                low + frac * (high - low)
            }
        };

        let origin_log = ratio.log2() - anchor_log;
        for slot in slots.iter_mut() {
            if let Some(log) = period_log(&scale, slot) {
                slot.log_frequency = origin_log + log;
                slot.frequency = slot.log_frequency.exp2() * REFERENCE_FREQUENCY;
            }
        }

        debug!(
            "built tuning: {} tones, {} mapped keys, origin {:.6} octaves above reference",
            scale.count(),
            slots.iter().filter(|s| s.is_mapped()).count(),
            origin_log
        );

        Ok(Tuning {
            scale,
            keyboard_mapping,
            slots,
            interpolated: false,
        })
    }

    /// Returns a new tuning where every unmapped key with mapped keys on both sides gets a
    /// frequency linearly interpolated (in log-frequency) between them.
    ///
    /// Interpolated keys keep `scale_position() == None`; keys at the ends of the table
    /// without a mapped neighbour on one side stay silent. `self` is left untouched.
    pub fn with_gaps_interpolated(&self) -> Tuning {
        let mut slots = self.slots.clone();

        for (i, slot) in slots.iter_mut().enumerate() {
            if slot.is_mapped() {
                continue;
            }
            if let (Some(below), Some(above)) = mapped_neighbours(&self.slots, i) {
                let frac = (i - below) as f64 / (above - below) as f64;
                slot.log_frequency = (1.0 - frac) * self.slots[below].log_frequency
                    + frac * self.slots[above].log_frequency;
                slot.frequency = slot.log_frequency.exp2() * REFERENCE_FREQUENCY;
            }
        }

        Tuning {
            scale: self.scale.clone(),
            keyboard_mapping: self.keyboard_mapping.clone(),
            slots,
            interpolated: true,
        }
    }

    /// Whether this table came out of [`Tuning::with_gaps_interpolated`].
    pub fn is_interpolated(&self) -> bool {
        self.interpolated
    }

    /// All slots, lowest key first. Slot `i` holds key `i - 256`.
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// The slot for `key`, clamped into the table.
    pub fn slot(&self, key: i32) -> &Slot {
        &self.slots[slot_index(key)]
    }

    /// Frequency in Hz of `key`.
    ///
    /// ```
    /// # use hexgrid_tuning::*;
    /// let t = presets::default_12_edo();
    /// assert!((t.frequency(69) - 440.0).abs() < 1e-4); // A
    /// assert!((t.frequency(60) - 261.6256).abs() < 1e-4); // middle C
    /// ```
    pub fn frequency(&self, key: i32) -> f64 {
        self.slot(key).frequency
    }

    /// Frequency with [`REFERENCE_FREQUENCY`] divided out: 1 for key 0 and 32 for key 60
    /// in standard tuning.
    pub fn scaled_frequency(&self, key: i32) -> f64 {
        self.slot(key).frequency / REFERENCE_FREQUENCY
    }

    /// `log2` of [`scaled_frequency`](Self::scaled_frequency). Rises by one per octave.
    ///
    /// ```
    /// # use hexgrid_tuning::*;
    /// let t = Tuning::from_scale(presets::scale_12_edo()).unwrap();
    /// assert_eq!(t.log_frequency(0), 0.0);
    /// assert_eq!(t.log_frequency(60), 5.0);
    /// ```
    pub fn log_frequency(&self, key: i32) -> f64 {
        self.slot(key).log_frequency
    }

    /// Index into the scale's tones that `key` plays, or `None` if the key is unmapped. The
    /// middle key plays position 0, the first listed tone.
    pub fn scale_position(&self, key: i32) -> Option<usize> {
        self.slot(key).scale_position
    }

    /// Whole periods between `key` and the period of the mapping's middle key.
    pub fn equave(&self, key: i32) -> i32 {
        self.slot(key).equave
    }

    /// Whether `key` is mapped to a scale position.
    pub fn is_mapped(&self, key: i32) -> bool {
        self.slot(key).is_mapped()
    }

    /// Deviation of `key` from 12 tone equal temperament at A440, in semitones.
    pub fn retuning_semitones(&self, key: i32) -> f64 {
        self.log_frequency(key) * 12.0 - key as f64
    }

    /// Deviation of `key` from 12 tone equal temperament at A440, in cents.
    pub fn retuning_cents(&self, key: i32) -> f64 {
        self.retuning_semitones(key) * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParseError;
    use crate::table::MIN_KEY;

    macro_rules! approx_eq {
        ($a:expr, $b:expr, $margin:expr) => {
            assert!(f64::abs($a - $b) < $margin, "Expected {}, got {}", $b, $a);
        };
    }

    fn edo12() -> Scale {
        Scale::even_division_of_span(2, 12).unwrap()
    }

    fn mapping(text: &str) -> Result<KeyboardMapping, ParseError> {
        KeyboardMapping::parse(text)
    }

    #[test]
    fn middle_key_anchor() {
        let k = KeyboardMapping::start_scale_on_and_tune_key_to(0, 0, 440.0);
        let t = Tuning::build(edo12(), k, BuildOptions::default()).unwrap();
        approx_eq!(t.frequency(0), 440.0, 1e-9);
        approx_eq!(t.frequency(12), 880.0, 1e-9);
        approx_eq!(t.frequency(-12), 220.0, 1e-9);
        assert_eq!(t.scale_position(0), Some(0));
        assert_eq!(t.scale_position(-1), Some(11));
        assert_eq!(t.equave(-1), -1);
        assert_eq!(t.equave(12), 1);
    }

    #[test]
    fn anchor_above_middle() {
        let k = KeyboardMapping::start_scale_on_and_tune_key_to(0, 9, 440.0);
        let t = Tuning::build(edo12(), k, BuildOptions::default()).unwrap();
        approx_eq!(t.frequency(9), 440.0, 1e-9);
        approx_eq!(t.frequency(0), 440.0 / 2f64.powf(9.0 / 12.0), 1e-9);
        approx_eq!(t.frequency(0), 261.6256, 1e-4);
    }

    #[test]
    fn positions_index_tones_directly() {
        let just = Scale::parse("just\n3\n9/8\n5/4\n2/1\n").unwrap();
        let k = KeyboardMapping::start_scale_on_and_tune_key_to(0, 0, 100.0);
        let t = Tuning::build(just, k, BuildOptions::default()).unwrap();
        assert_eq!(t.scale_position(0), Some(0));
        assert_eq!(t.scale_position(2), Some(2));
        approx_eq!(t.frequency(0), 100.0, 1e-9);
        approx_eq!(t.frequency(1), 100.0 * (5.0 / 4.0) / (9.0 / 8.0), 1e-9);
        approx_eq!(t.frequency(2), 100.0 * 2.0 / (9.0 / 8.0), 1e-9);
        approx_eq!(t.frequency(3), 200.0, 1e-9);
        approx_eq!(t.frequency(-1), 100.0 / (9.0 / 8.0), 1e-9);
        assert_eq!(t.equave(-1), -1);
    }

    #[test]
    fn unmapped_slots_are_silent() {
        let k = mapping("3\n0\n127\n0\n0\n440.0\n2\n0\nx\n1\n").unwrap();
        let t = Tuning::build(Scale::even_division_of_span(2, 2).unwrap(), k, BuildOptions::default())
            .unwrap();
        for key in [-5, -2, 1, 4, 7] {
            assert!(!t.is_mapped(key), "key {key}");
            assert_eq!(t.frequency(key), 0.0);
            assert_eq!(t.log_frequency(key), 0.0);
            assert_eq!(t.equave(key), 0);
        }
        approx_eq!(t.frequency(3), 880.0, 1e-9);
        approx_eq!(t.frequency(2), 440.0 * 2f64.sqrt(), 1e-9);
    }

    #[test]
    fn unmapped_anchor_policy() {
        let text = "3\n0\n127\n0\n1\n440.0\n2\n0\nx\n1\n";
        let err = Tuning::build(edo12(), mapping(text).unwrap(), BuildOptions::default());
        assert_eq!(err, Err(BuildError::UnanchorableTuning { anchor_key: 1 }));

        let s = Scale::even_division_of_span(2, 2).unwrap();
        let t = Tuning::build(s, mapping(text).unwrap(), BuildOptions::interpolate_anchor())
            .unwrap();
        // keys 0 and 2 are a tritone apart, the anchor sits halfway between them
        approx_eq!(t.frequency(0), 440.0 / 2f64.powf(0.25), 1e-9);
        approx_eq!(t.frequency(2), 440.0 * 2f64.powf(0.25), 1e-9);
        assert_eq!(t.frequency(1), 0.0);
    }

    #[test]
    fn anchor_must_have_both_neighbours() {
        let k = mapping("1\n0\n127\n0\n0\n440.0\n1\nx\n").unwrap();
        assert_eq!(
            Tuning::build(edo12(), k, BuildOptions::interpolate_anchor()),
            Err(BuildError::UnanchorableTuning { anchor_key: 0 })
        );
    }

    #[test]
    fn bad_anchors() {
        let k = KeyboardMapping::tune_key_to(300, 440.0);
        assert_eq!(
            Tuning::build(edo12(), k, BuildOptions::default()),
            Err(BuildError::AnchorOutOfRange { anchor_key: 300 })
        );

        let k = KeyboardMapping::tune_key_to(60, 0.0);
        assert!(matches!(
            Tuning::build(edo12(), k, BuildOptions::default()),
            Err(BuildError::InvalidAnchorFrequency { .. })
        ));
    }

    #[test]
    fn huge_period_degrees() {
        let k = mapping("1\n0\n127\n0\n0\n440.0\n2147483647\n0\n").unwrap();
        let s = Scale::even_division_of_span(2, 1).unwrap();
        assert_eq!(
            Tuning::build(s, k, BuildOptions::default()),
            Err(BuildError::EquaveOutOfRange { key: MIN_KEY })
        );
    }

    #[test]
    fn empty_scale() {
        let mut s = edo12();
        s.tones.clear();
        assert_eq!(Tuning::from_scale(s), Err(BuildError::EmptyScale));
    }

    #[test]
    fn interpolation_leaves_base_alone() {
        let k = mapping("3\n0\n127\n0\n0\n440.0\n2\n0\nx\n1\n").unwrap();
        let base = Tuning::build(Scale::even_division_of_span(2, 2).unwrap(), k, BuildOptions::default())
            .unwrap();
        let filled = base.with_gaps_interpolated();

        assert!(!base.is_interpolated());
        assert!(filled.is_interpolated());
        assert_eq!(base.frequency(1), 0.0);
        assert!(!filled.is_mapped(1));
        approx_eq!(
            filled.log_frequency(1),
            (base.log_frequency(0) + base.log_frequency(2)) / 2.0,
            1e-12
        );
        approx_eq!(
            filled.frequency(1),
            filled.log_frequency(1).exp2() * REFERENCE_FREQUENCY,
            1e-9
        );
        assert_eq!(filled.frequency(0), base.frequency(0));
    }

    #[test]
    fn queries_clamp() {
        let t = Tuning::from_scale(edo12()).unwrap();
        assert_eq!(t.frequency(10_000), t.frequency(255));
        assert_eq!(t.frequency(-10_000), t.frequency(-256));
        assert_eq!(t.slots().len(), TABLE_SIZE);
    }
}
