use log::{debug, trace};

use crate::error::{ParseError, TuningError};
use crate::lines::logical_lines;
use crate::tone::Tone;

/// The Scale is the representation of an SCL file.
///
/// It holds an ordered list of [`Tone`]s. The implicit unison `1/1` is not listed; the last
/// tone is the equave, the interval after which the scale repeats (usually `2/1`).
///
/// Scales are immutable once built. Build one with [`Scale::parse`] or with one of the
/// even-division generators, then hand it to a [`Tuning`](crate::Tuning).
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct Scale {
    /// Name of the scale. Informational only.
    pub name: String,

    /// The description line of the SCL text. Informational only.
    pub description: String,

    /// The text this scale was parsed from, verbatim.
    pub raw_text: String,

    /// The tones, unison excluded.
    pub tones: Vec<Tone>,
}

impl Scale {
    /// Number of tones in the scale, which is also the number of scale positions per period.
    pub fn count(&self) -> usize {
        self.tones.len()
    }

    /// Size of one period in octaves: the log value of the last tone.
    pub fn equave_log(&self) -> f64 {
        self.tones.last().map(Tone::log_value).unwrap_or_default()
    }

    /// Distance in octaves of scale position `position` above the unison, or `None` past the
    /// last tone. Position `p` is tone `p`, so the last position is the equave itself.
    pub fn degree_log(&self, position: usize) -> Option<f64> {
        self.tones.get(position).map(Tone::log_value)
    }

    /// Parses SCL text held in memory.
    ///
    /// ```
    /// # use hexgrid_tuning::Scale;
    /// let s = Scale::parse("! pentatonic\nslendro-ish\n5\n240.0\n480.0\n720.0\n960.0\n2/1\n").unwrap();
    /// assert_eq!(s.count(), 5);
    /// assert_eq!(s.description, "slendro-ish");
    /// ```
    pub fn parse(scl: &str) -> Result<Self, ParseError> {
        #[derive(Debug)]
        enum State {
            ReadHeader,
            ReadCount,
            ReadTones,
            Trailing,
        }
        let mut state = State::ReadHeader;

        let mut description = String::new();
        let mut declared = 0;
        let mut tones = Vec::new();

        for (lineno, line) in logical_lines(scl) {
            if line.starts_with('!') || (matches!(state, State::ReadTones) && line.is_empty()) {
                continue;
            }

            trace!("scl line {lineno} in {state:?}: {line:?}");
            match state {
                State::ReadHeader => {
                    description = line.to_string();
                    state = State::ReadCount;
                }
                State::ReadCount => {
                    let count: i64 =
                        line.parse().map_err(|_| ParseError::MalformedNumber {
                            line: lineno,
                            text: line.to_string(),
                        })?;
                    if count < 1 {
                        return Err(ParseError::InvalidScale {
                            line: lineno,
                            count,
                        });
                    }
                    declared = count as usize;
                    state = State::ReadTones;
                }
                State::ReadTones => {
                    tones.push(Tone::parse(line, Some(lineno))?);
                    if tones.len() == declared {
                        state = State::Trailing;
                    }
                }
                State::Trailing => (),
            }
        }

        if !matches!(state, State::ReadTones | State::Trailing) {
            return Err(ParseError::TruncatedScale);
        }

        if tones.len() != declared {
            return Err(ParseError::ScaleCountMismatch {
                declared,
                found: tones.len(),
            });
        }

        debug!("parsed scale {description:?} with {} tones", tones.len());
        Ok(Scale {
            name: String::from("Scale from text"),
            description,
            raw_text: scl.to_string(),
            tones,
        })
    }

    /// Divides the frequency ratio `span` into `m` equal steps, the scale known as
    /// "ED`span`-`m`". `even_division_of_span(2, 12)` is standard 12 tone equal temperament.
    ///
    /// ```
    /// # use hexgrid_tuning::Scale;
    /// let bp = Scale::even_division_of_span(3, 13).unwrap(); // Bohlen-Pierce
    /// assert_eq!(bp.count(), 13);
    /// assert!((bp.equave_log() - 3f64.log2()).abs() < 1e-12);
    /// ```
    pub fn even_division_of_span(span: u32, m: u32) -> Result<Self, TuningError> {
        if span == 0 {
            return Err(TuningError::InvalidSpan);
        }
        if m == 0 {
            return Err(TuningError::InvalidDivision);
        }

        let step = 1200.0 * (span as f64).log2() / m as f64;
        let mut data = format!(
            "! Automatically generated ED{span}-{m} scale\n\
             Automatically generated ED{span}-{m} scale\n\
             {m}\n\
             !\n"
        );
        for i in 1..m {
            data += &format!("{:.12}\n", step * i as f64);
        }
        data += &format!("{span}/1\n");

        let mut scale = Scale::parse(&data)?;
        scale.name = format!("ED{span}-{m}");
        Ok(scale)
    }

    /// Divides `cents` into `m` equal steps. The last tone is labelled `last_label` when
    /// that is not empty.
    pub fn even_division_of_cents(cents: f64, m: u32, last_label: &str) -> Result<Self, TuningError> {
        if !(cents.is_finite() && cents > 0.0) {
            return Err(TuningError::InvalidSpan);
        }
        if m == 0 {
            return Err(TuningError::InvalidDivision);
        }

        let step = cents / m as f64;
        let mut data = format!(
            "! Automatically generated Even Division of {cents} ct into {m} scale\n\
             Automatically generated Even Division of {cents} ct into {m} scale\n\
             {m}\n\
             !\n"
        );
        for i in 1..m {
            data += &format!("{:.12}\n", step * i as f64);
        }
        // keep a decimal point so the last tone is read back as cents
        data += &format!("{cents:?} {last_label}\n");

        let mut scale = Scale::parse(&data)?;
        scale.name = format!("{cents} ct / {m}");
        Ok(scale)
    }
}
