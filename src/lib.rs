#![warn(missing_docs)]

//! Microtonal tuning engine for a hex-grid MIDI controller.
//!
//! This library parses SCL (scale) and KBM (keyboard mapping) text, combines the two into a
//! precomputed [`Tuning`] table and answers, for every key of the grid, which frequency it
//! sounds, which scale position it plays and in which period it lies.
//!
//! Data only flows one way: text → [`Scale`] / [`KeyboardMapping`] → [`Tuning`] → whatever
//! renders audio, lights or MIDI. Scanning the buttons, talking MIDI and loading files are
//! left to the caller; everything here works on in-memory text and plain values.
//!
//! ```
//! # use hexgrid_tuning::*;
//! let scale = Scale::parse(
//!     "! 5-limit major
//! Just major
//! 7
//! 9/8
//! 5/4
//! 4/3
//! 3/2
//! 5/3
//! 15/8
//! 2/1
//! ",
//! )?;
//! // key 60 plays the first listed tone, so key 66 plays the octave 2/1
//! let mapping = KeyboardMapping::start_scale_on_and_tune_key_to(60, 66, 264.0);
//! let tuning = Tuning::build(scale, mapping, BuildOptions::default())?;
//!
//! assert!((tuning.frequency(68) - 330.0).abs() < 1e-9); // the major third
//! assert!((tuning.frequency(61) - 165.0).abs() < 1e-9);
//! assert_eq!(tuning.scale_position(66), Some(6));
//! assert_eq!(tuning.equave(68), 1);
//! # Ok::<(), TuningError>(())
//! ```

mod error;
mod lines;
mod live;
mod mapping;
mod pitch;
pub mod presets;
mod scale;
mod table;
mod tone;
mod tuning;

pub use error::{BuildError, ParseError, TuningError};
pub use live::{LiveTuning, Published, RetunePolicy, SoundingNote};
pub use mapping::KeyboardMapping;
pub use pitch::{
    cents_between, frequency_to_midi, midi_to_frequency, positive_mod, CONCERT_A4,
    REFERENCE_FREQUENCY,
};
pub use scale::Scale;
pub use table::{slot_index, Slot, MAX_KEY, MIN_KEY, TABLE_CENTER, TABLE_SIZE};
pub use tone::{Tone, ToneValue};
pub use tuning::{AnchorPolicy, BuildOptions, Tuning};
