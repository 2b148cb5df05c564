use log::{debug, trace};

use crate::error::ParseError;
use crate::lines::logical_lines;
use crate::pitch::REFERENCE_FREQUENCY;

/// The KeyboardMapping struct represents a KBM file.
///
/// In most cases the salient fields are [`anchor_key`](Self::anchor_key) and
/// [`anchor_frequency`](Self::anchor_frequency), which pin one key of the grid to a known
/// frequency. A KBM file can also remap individual keys to scale degrees through
/// [`keys`](Self::keys), where `None` marks a key that plays nothing (`x` in the file).
///
/// Key indices are relative to the centre of the tuning table, the same numbering the
/// layout uses for MIDI-style note numbers.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct KeyboardMapping {
    /// Size of the repeating pattern. 0 means a linear map over the whole scale.
    pub count: usize,

    /// First key to be mapped. Informational; tables always cover every key.
    pub first_key: i32,

    /// Last key to be mapped. Informational.
    pub last_key: i32,

    /// Key where scale degree 0 sits.
    pub middle_key: i32,

    /// Key whose frequency is fixed.
    pub anchor_key: i32,

    /// Frequency of the anchor key in Hz.
    pub anchor_frequency: f64,

    /// `anchor_frequency / REFERENCE_FREQUENCY`.
    pub anchor_pitch_ratio: f64,

    /// Scale degrees spanned by one repetition of the pattern. 0 for an empty map.
    pub period_degrees: i32,

    /// Degree assigned to each position of the pattern; `None` leaves the key unmapped.
    pub keys: Vec<Option<u32>>,

    /// The text this mapping was parsed from, verbatim.
    pub raw_text: String,

    /// Name of the mapping. Informational only.
    pub name: String,
}

impl Default for KeyboardMapping {
    /// A linear mapping with middle C (key 60) as degree 0 and tuned to its A440 pitch.
    fn default() -> Self {
        let mut k = KeyboardMapping {
            count: 0,
            first_key: 0,
            last_key: 127,
            middle_key: 60,
            anchor_key: 60,
            anchor_frequency: REFERENCE_FREQUENCY * 32.0,
            anchor_pitch_ratio: 32.0,
            period_degrees: 0,
            keys: Vec::new(),
            raw_text: String::new(),
            name: String::from("Default mapping"),
        };
        k.raw_text = format!(
            "! Default KBM file\n{}\n{}\n{}\n{}\n{}\n{}\n{}\n",
            k.count,
            k.first_key,
            k.last_key,
            k.middle_key,
            k.anchor_key,
            k.anchor_frequency,
            k.period_degrees
        );
        k
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Field {
    Size,
    FirstKey,
    LastKey,
    Middle,
    AnchorKey,
    AnchorFrequency,
    PeriodDegrees,
    Keys,
    Trailing,
}

impl Field {
    fn next(self) -> Field {
        match self {
            Field::Size => Field::FirstKey,
            Field::FirstKey => Field::LastKey,
            Field::LastKey => Field::Middle,
            Field::Middle => Field::AnchorKey,
            Field::AnchorKey => Field::AnchorFrequency,
            Field::AnchorFrequency => Field::PeriodDegrees,
            Field::PeriodDegrees => Field::Keys,
            Field::Keys | Field::Trailing => Field::Trailing,
        }
    }
}

/// Checks that a header or key line only holds digits, spaces and `.`.
fn check_mapping_line(lineno: usize, line: &str) -> Result<(), ParseError> {
    if line.is_empty() {
        return Err(ParseError::InvalidMappingLine {
            line: lineno,
            character: '\0',
        });
    }
    match line
        .chars()
        .find(|c| !(c.is_ascii_digit() || *c == ' ' || *c == '.'))
    {
        Some(character) => Err(ParseError::InvalidMappingLine {
            line: lineno,
            character,
        }),
        None => Ok(()),
    }
}

/// Reads the leading number of a checked line: its digits up to the first other character,
/// plus one `.` and the digits after it when `fraction` is set. `60.5` reads as the integer
/// 60, and a line with no leading digits reads as 0.
fn parse_field<T: std::str::FromStr>(
    lineno: usize,
    line: &str,
    fraction: bool,
) -> Result<T, ParseError> {
    let mut seen_point = !fraction;
    let end = line
        .find(|c: char| match c {
            '.' if !seen_point => {
                seen_point = true;
                false
            }
            c => !c.is_ascii_digit(),
        })
        .unwrap_or(line.len());
    let number = match line[..end].trim_end_matches('.') {
        "" => "0",
        number => number,
    };
    number.parse().map_err(|_| ParseError::MalformedNumber {
        line: lineno,
        text: line.to_string(),
    })
}

impl KeyboardMapping {
    /// Parses KBM text held in memory.
    ///
    /// ```
    /// # use hexgrid_tuning::KeyboardMapping;
    /// let kbm = "! white keys\n7\n0\n127\n60\n69\n440.0\n12\n0\n2\n4\n5\n7\n9\n11\n";
    /// let k = KeyboardMapping::parse(kbm).unwrap();
    /// assert_eq!(k.count, 7);
    /// assert_eq!(k.keys[6], Some(11));
    /// ```
    pub fn parse(kbm: &str) -> Result<Self, ParseError> {
        let mut field = Field::Size;
        let mut res = KeyboardMapping::default();

        for (lineno, line) in logical_lines(kbm) {
            if line.starts_with('!') || field == Field::Trailing {
                continue;
            }

            trace!("kbm line {lineno} in {field:?}: {line:?}");
            let unmapped = line == "x";
            if !unmapped {
                check_mapping_line(lineno, line)?;
            }

            match field {
                Field::Size => res.count = parse_field(lineno, line, false)?,
                Field::FirstKey => res.first_key = parse_field(lineno, line, false)?,
                Field::LastKey => res.last_key = parse_field(lineno, line, false)?,
                Field::Middle => res.middle_key = parse_field(lineno, line, false)?,
                Field::AnchorKey => res.anchor_key = parse_field(lineno, line, false)?,
                Field::AnchorFrequency => {
                    res.anchor_frequency = parse_field(lineno, line, true)?;
                    res.anchor_pitch_ratio = res.anchor_frequency / REFERENCE_FREQUENCY;
                }
                Field::PeriodDegrees => res.period_degrees = parse_field(lineno, line, false)?,
                Field::Keys => {
                    let degree = if unmapped {
                        None
                    } else {
                        Some(parse_field(lineno, line, false)?)
                    };
                    res.keys.push(degree);
                }
                Field::Trailing => (),
            }

            if field != Field::Keys || res.keys.len() == res.count {
                field = field.next();
            }
            if field == Field::Keys && res.count == 0 {
                field = Field::Trailing;
            }
        }

        if !matches!(field, Field::Keys | Field::Trailing) {
            return Err(ParseError::TruncatedMapping);
        }

        if res.keys.len() != res.count {
            return Err(ParseError::MappingCountMismatch {
                declared: res.count,
                found: res.keys.len(),
            });
        }

        debug!(
            "parsed keyboard mapping of {} keys, key {} = {} Hz",
            res.count, res.anchor_key, res.anchor_frequency
        );
        res.raw_text = kbm.to_string();
        res.name = String::from("Mapping from text");
        Ok(res)
    }

    /// Generates a linear mapping with scale degree 0 on `scale_start` and `key` tuned to
    /// `freq` Hz.
    pub fn start_scale_on_and_tune_key_to(scale_start: i32, key: i32, freq: f64) -> Self {
        let raw_text = format!(
            "! Automatically generated mapping, tuning key {key} to {freq} Hz\n\
             !\n\
             ! Size of map\n\
             0\n\
             ! First and last keys to map - map the entire keyboard\n\
             0\n\
             127\n\
             ! Middle key where the first entry in the scale is mapped.\n\
             {scale_start}\n\
             ! Reference key where frequency is fixed\n\
             {key}\n\
             ! Frequency for key {key}\n\
             {freq:?}\n\
             ! Scale degree for formal octave. This is an empty mapping, so:\n\
             0\n\
             ! Mapping. This is an empty mapping so list no keys\n"
        );

        KeyboardMapping {
            count: 0,
            first_key: 0,
            last_key: 127,
            middle_key: scale_start,
            anchor_key: key,
            anchor_frequency: freq,
            anchor_pitch_ratio: freq / REFERENCE_FREQUENCY,
            period_degrees: 0,
            keys: Vec::new(),
            raw_text,
            name: format!("Key {key} at {freq} Hz"),
        }
    }

    /// Generates a linear mapping starting the scale on key 60 and tuning `key` to `freq`.
    pub fn tune_key_to(key: i32, freq: f64) -> Self {
        KeyboardMapping::start_scale_on_and_tune_key_to(60, key, freq)
    }

    /// Generates a linear mapping that keeps concert A (key 69) at `freq`.
    pub fn tune_a69_to(freq: f64) -> Self {
        KeyboardMapping::tune_key_to(69, freq)
    }

    /// The pattern actually used to build a table as `(size, period_degrees, keys)`. An
    /// empty map becomes the identity over `scale_count` degrees, one scale per period.
    pub(crate) fn resolved(&self, scale_count: usize) -> (usize, i64, Vec<Option<u32>>) {
        if self.count == 0 || self.keys.is_empty() {
            let keys = (0..scale_count as u32).map(Some).collect();
            (scale_count, scale_count as i64, keys)
        } else {
            (self.keys.len(), self.period_degrees as i64, self.keys.clone())
        }
    }
}
