//! Built-in scales and mappings used to populate the device presets.
//!
//! Every preset is a plain function returning an owned value; nothing here is shared
//! global state. Startup code picks what it needs, usually through [`Preset`].

use crate::error::BuildError;
use crate::mapping::KeyboardMapping;
use crate::scale::Scale;
use crate::tuning::{BuildOptions, Tuning};

const MOS_3L_5S: &str = "!
MOS_3L_5s_generator=757c
8
129.0
258.0
443.0
572.0
701.0
886.0
1015.0
1200.0
";

/// 12 tone equal temperament.
pub fn scale_12_edo() -> Scale {
    Scale::even_division_of_span(2, 12).expect("ED2-12 is a valid division")
}

/// 31 tone equal temperament.
pub fn scale_31_edo() -> Scale {
    Scale::even_division_of_span(2, 31).expect("ED2-31 is a valid division")
}

/// Bohlen-Pierce: the tritave 3/1 in 13 equal steps.
pub fn bohlen_pierce() -> Scale {
    Scale::even_division_of_span(3, 13).expect("ED3-13 is a valid division")
}

/// Wendy Carlos' alpha scale: 701.684905896 cents in 9 equal steps.
pub fn carlos_alpha() -> Scale {
    Scale::even_division_of_cents(701.684905896, 9, "Carlos Alpha")
        .expect("Carlos Alpha is a valid division")
}

/// 3 large and 5 small steps from a 757 cent generator.
pub fn mos_3l_5s() -> Scale {
    Scale::parse(MOS_3L_5S).expect("built-in MOS 3L 5s scale parses")
}

/// Scale degree 0 on key 60 (middle C) with key 69 at 440 Hz.
pub fn mapping_a440_root_c() -> KeyboardMapping {
    KeyboardMapping::start_scale_on_and_tune_key_to(60, 69, 440.0)
}

/// Standard tuning: 12-EDO rooted on C with A = 440 Hz.
pub fn default_12_edo() -> Tuning {
    Preset::Edo12
        .build(mapping_a440_root_c())
        .expect("linear mappings always have a mapped anchor")
}

/// Registry of the built-in scales.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Preset {
    /// [`scale_12_edo`]
    Edo12,
    /// [`scale_31_edo`]
    Edo31,
    /// [`bohlen_pierce`]
    BohlenPierce,
    /// [`carlos_alpha`]
    CarlosAlpha,
    /// [`mos_3l_5s`]
    Mos3L5s,
}

impl Preset {
    /// Every preset, in menu order.
    pub const ALL: [Preset; 5] = [
        Preset::Edo12,
        Preset::Edo31,
        Preset::BohlenPierce,
        Preset::CarlosAlpha,
        Preset::Mos3L5s,
    ];

    /// Display name.
    pub fn name(self) -> &'static str {
        match self {
            Preset::Edo12 => "12 EDO",
            Preset::Edo31 => "31 EDO",
            Preset::BohlenPierce => "Bohlen-Pierce",
            Preset::CarlosAlpha => "Carlos Alpha",
            Preset::Mos3L5s => "MOS 3L 5s",
        }
    }

    /// Looks a preset up by its display name, ignoring case.
    pub fn from_name(name: &str) -> Option<Preset> {
        Preset::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(name))
    }

    /// A fresh copy of the preset's scale.
    pub fn scale(self) -> Scale {
        match self {
            Preset::Edo12 => scale_12_edo(),
            Preset::Edo31 => scale_31_edo(),
            Preset::BohlenPierce => bohlen_pierce(),
            Preset::CarlosAlpha => carlos_alpha(),
            Preset::Mos3L5s => mos_3l_5s(),
        }
    }

    /// Builds a tuning of this preset's scale laid out by `mapping`.
    pub fn build(self, mapping: KeyboardMapping) -> Result<Tuning, BuildError> {
        Tuning::build(self.scale(), mapping, BuildOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_preset_builds() {
        for preset in Preset::ALL {
            let t = preset.build(mapping_a440_root_c()).unwrap();
            assert!((t.frequency(69) - 440.0).abs() < 1e-9, "{}", preset.name());
            assert_eq!(Preset::from_name(preset.name()), Some(preset));
        }
    }

    #[test]
    fn scale_sizes() {
        assert_eq!(scale_12_edo().count(), 12);
        assert_eq!(scale_31_edo().count(), 31);
        assert_eq!(bohlen_pierce().count(), 13);
        assert_eq!(carlos_alpha().count(), 9);
        assert_eq!(mos_3l_5s().count(), 8);
        assert_eq!(mos_3l_5s().description, "MOS_3L_5s_generator=757c");
    }

    #[test]
    fn mos_steps_follow_the_listed_tones() {
        let t = Preset::Mos3L5s.build(mapping_a440_root_c()).unwrap();
        let steps = [129.0, 185.0, 129.0, 129.0, 185.0, 129.0, 185.0, 129.0];
        for (i, step) in steps.iter().enumerate() {
            let key = 60 + i as i32;
            let cents = crate::pitch::cents_between(t.frequency(key), t.frequency(key + 1));
            assert!((cents - step).abs() < 1e-9, "key {key}: {cents}");
        }
    }

    #[test]
    fn standard_tuning() {
        let t = default_12_edo();
        assert!((t.frequency(60) - 261.6255653).abs() < 1e-6);
        assert!(t.retuning_cents(61).abs() < 1e-9);
        assert_eq!(Preset::from_name("bohlen-pierce"), Some(Preset::BohlenPierce));
        assert_eq!(Preset::from_name("19 EDO"), None);
    }
}
