use std::fmt::Display;

use crate::error::ParseError;

/// Value of a tone.
///
/// The value of a tone is given either as a cents value or ratio.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ToneValue {
    /// Value of a tone given as cents value.
    /// ```
    /// # use hexgrid_tuning::*;
    /// ToneValue::Cents(1200.0); // an octave
    /// ToneValue::Cents(700.0); // a 12-EDO fifth
    /// ```
    Cents(f64),

    /// Value of a tone given as a ratio `numerator / denominator`.
    /// ```
    /// # use hexgrid_tuning::*;
    /// ToneValue::Ratio(2, 1); // an octave as well
    /// ToneValue::Ratio(3, 2); // a just fifth
    /// ```
    Ratio(i64, i64),
}

impl ToneValue {
    /// Size of the interval in cents.
    pub fn cents(&self) -> f64 {
        match *self {
            Self::Cents(value) => value,
            Self::Ratio(n, d) => 1200.0 * (n as f64 / d as f64).log2(),
        }
    }

    /// Size of the interval in octaves, i.e. `log2` of the frequency ratio.
    pub fn log_value(&self) -> f64 {
        match *self {
            Self::Cents(value) => value / 1200.0,
            Self::Ratio(n, d) => (n as f64 / d as f64).log2(),
        }
    }
}

impl Default for ToneValue {
    fn default() -> Self {
        ToneValue::Ratio(1, 1)
    }
}

impl Display for ToneValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ToneValue::Cents(value) => write!(f, "{value}c"),
            ToneValue::Ratio(n, d) => write!(f, "{n}/{d}"),
        }
    }
}

/// A single pitch entry of a scale, as written on one line of an SCL file.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Tone {
    /// Value of the tone.
    pub value: ToneValue,

    /// Source text of the tone.
    pub text: String,

    /// Line on which the tone was read, if it came from text.
    pub line: Option<usize>,
}

impl Tone {
    /// Returns the cents value of the tone.
    pub fn cents(&self) -> f64 {
        self.value.cents()
    }

    /// Returns `cents() / 1200`, the tone's distance from the unison in octaves.
    pub fn log_value(&self) -> f64 {
        self.value.log_value()
    }

    /// Parses one SCL tone line.
    ///
    /// Anything containing a `.` is read as cents, everything else as a ratio `n/d` or a
    /// bare integer `n` (meaning `n/1`). Only the first whitespace separated token is
    /// considered; the rest of the line is a label.
    ///
    /// ```
    /// # use hexgrid_tuning::*;
    /// let fifth = Tone::parse("3/2", Some(4)).unwrap();
    /// assert!((fifth.cents() - 701.955).abs() < 1e-3);
    /// assert!(Tone::parse("0/1", None).is_err());
    /// ```
    pub fn parse(line: &str, lineno: Option<usize>) -> Result<Self, ParseError> {
        let token = line.split_whitespace().next().unwrap_or_default();
        let at = lineno.unwrap_or_default();
        let malformed = || ParseError::MalformedNumber {
            line: at,
            text: token.to_string(),
        };

        let value = if token.contains('.') {
            let cents: f64 = token.parse().map_err(|_| malformed())?;
            if !cents.is_finite() {
                return Err(malformed());
            }
            ToneValue::Cents(cents)
        } else {
            let (n, d) = match token.split_once('/') {
                Some((n, d)) => (n, d),
                None => (token, "1"),
            };
            let n: i64 = n.trim().parse().map_err(|_| malformed())?;
            let d: i64 = d.trim().parse().map_err(|_| malformed())?;
            if n <= 0 || d <= 0 {
                return Err(ParseError::InvalidRatio {
                    line: at,
                    text: token.to_string(),
                });
            }
            ToneValue::Ratio(n, d)
        };

        Ok(Tone {
            value,
            text: line.to_string(),
            line: lineno,
        })
    }
}

impl Display for Tone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.text)
    }
}

impl Default for Tone {
    /// The unison, `1/1`.
    fn default() -> Self {
        Tone {
            value: ToneValue::default(),
            text: String::from("1/1"),
            line: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cents_and_ratios() {
        let t = Tone::parse("386.3137", Some(1)).unwrap();
        assert_eq!(t.value, ToneValue::Cents(386.3137));
        assert!((t.log_value() - 386.3137 / 1200.0).abs() < 1e-12);

        let t = Tone::parse("5/4", Some(2)).unwrap();
        assert_eq!(t.value, ToneValue::Ratio(5, 4));
        assert!((t.log_value() - 1.25f64.log2()).abs() < 1e-12);

        let t = Tone::parse("2", None).unwrap();
        assert_eq!(t.value, ToneValue::Ratio(2, 1));
        assert_eq!(t.log_value(), 1.0);
    }

    #[test]
    fn trailing_label_is_ignored() {
        let t = Tone::parse("3/2 perfect fifth", Some(9)).unwrap();
        assert_eq!(t.value, ToneValue::Ratio(3, 2));
        assert_eq!(t.to_string(), "3/2 perfect fifth");
    }

    #[test]
    fn zero_and_negative_ratios() {
        for bad in ["0/1", "1/0", "0", "-3/2"] {
            assert!(
                matches!(
                    Tone::parse(bad, Some(3)),
                    Err(ParseError::InvalidRatio { line: 3, .. })
                ),
                "{bad} should be an invalid ratio"
            );
        }
    }

    #[test]
    fn garbage() {
        for bad in ["abc", "1.2.3", "3/", "/2", "1/2/3", ""] {
            assert!(
                matches!(
                    Tone::parse(bad, Some(5)),
                    Err(ParseError::MalformedNumber { line: 5, .. })
                ),
                "{bad} should not parse"
            );
        }
    }

    #[test]
    fn negative_cents_are_allowed() {
        assert_eq!(Tone::parse("-100.0", None).unwrap().cents(), -100.0);
    }
}
