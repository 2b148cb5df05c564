//! Error types returned by the parsers, generators and the table builder.
//!
//! Every failure is reported at the call that attempted the parse or build. Nothing is
//! partially constructed: a function either returns a complete value or one of these errors.

use thiserror::Error;

/// Errors produced while reading SCL (scale) or KBM (keyboard mapping) text.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    /// A field or tone that should be numeric could not be parsed.
    #[error("line {line}: `{text}` is not a valid number")]
    MalformedNumber {
        /// 1-based line number.
        line: usize,
        /// The offending text.
        text: String,
    },

    /// Tone is a ratio with a numerator or denominator that is zero or negative.
    #[error("line {line}: ratio `{text}` must have a positive numerator and denominator")]
    InvalidRatio {
        /// 1-based line number.
        line: usize,
        /// The offending text.
        text: String,
    },

    /// The scale declares fewer than one tone.
    #[error("line {line}: a scale needs at least one tone, {count} declared")]
    InvalidScale {
        /// 1-based line number of the count field.
        line: usize,
        /// The declared count.
        count: i64,
    },

    /// The scale text ended before its tone count was read.
    #[error("scale text ended before the tone count")]
    TruncatedScale,

    /// The number of tones listed differs from the declared count.
    #[error("scale declares {declared} tones but lists {found}")]
    ScaleCountMismatch {
        /// Declared count.
        declared: usize,
        /// Tones actually read.
        found: usize,
    },

    /// A mapping line contains a character other than digits, spaces, `.` or a lone `x`.
    #[error("line {line}: bad character `{character}` in keyboard mapping")]
    InvalidMappingLine {
        /// 1-based line number.
        line: usize,
        /// First rejected character, `'\0'` for an empty line.
        character: char,
    },

    /// The mapping text ended before all header fields were read.
    #[error("keyboard mapping ended before the period degree field")]
    TruncatedMapping,

    /// The number of key lines differs from the declared map size.
    #[error("keyboard mapping declares {declared} keys but lists {found}")]
    MappingCountMismatch {
        /// Declared map size.
        declared: usize,
        /// Keys actually read.
        found: usize,
    },
}

/// Errors produced while building a [`Tuning`](crate::Tuning) table.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BuildError {
    /// The scale contains no tones.
    #[error("cannot build a tuning from an empty scale")]
    EmptyScale,

    /// The anchor key is unmapped and the build options forbid (or the table cannot
    /// support) interpolating it from its neighbours.
    #[error("anchor key {anchor_key} is unmapped and cannot be tuned")]
    UnanchorableTuning {
        /// Anchor key relative to the table centre.
        anchor_key: i32,
    },

    /// The anchor key lies outside the table.
    #[error("anchor key {anchor_key} lies outside the tuning table")]
    AnchorOutOfRange {
        /// Anchor key relative to the table centre.
        anchor_key: i32,
    },

    /// The anchor frequency is not a positive finite number.
    #[error("anchor frequency {frequency} Hz is not positive")]
    InvalidAnchorFrequency {
        /// The rejected frequency.
        frequency: f64,
    },

    /// The mapping's period degrees put `key` more equaves away from the middle key than
    /// an `i32` holds.
    #[error("key {key} lies too many equaves from the middle key")]
    EquaveOutOfRange {
        /// Key relative to the table centre.
        key: i32,
    },
}

/// Umbrella error for operations that can fail in several stages.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TuningError {
    /// Parsing failed.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Building the table failed.
    #[error(transparent)]
    Build(#[from] BuildError),

    /// A generator was asked to divide a non-positive span.
    #[error("cannot divide a non-positive span")]
    InvalidSpan,

    /// A generator was asked to divide into zero steps.
    #[error("cannot divide into zero steps")]
    InvalidDivision,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_line_numbers() {
        let e = ParseError::InvalidMappingLine {
            line: 7,
            character: 'q',
        };
        assert_eq!(e.to_string(), "line 7: bad character `q` in keyboard mapping");
    }

    #[test]
    fn umbrella_is_transparent() {
        let e: TuningError = ParseError::TruncatedScale.into();
        assert_eq!(e.to_string(), "scale text ended before the tone count");
        assert!(matches!(e, TuningError::Parse(ParseError::TruncatedScale)));
    }
}
