//! Publishing rebuilt tuning tables to the note handlers.
//!
//! Tables are never changed in place. A retune builds a complete new [`Tuning`] and
//! [`LiveTuning::publish`]es it; readers only ever see whole tables through an [`Arc`].
//!
//! Sounding notes are frozen: a [`SoundingNote`] keeps the table it was started with until
//! it is released, whatever gets published in the meantime. The [`RetunePolicy`] decides
//! when *new* notes start using a newly published table.
//!
//! A note is released by [`LiveTuning::note_off`] or simply by dropping it. Notes cannot be
//! cloned, so each one is released exactly once.

use std::sync::Arc;

use log::{debug, warn};

use crate::tuning::Tuning;

/// When a published table becomes current.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RetunePolicy {
    /// Swap at once. Notes already sounding keep their pitch until released.
    #[default]
    Immediate,

    /// Hold the new table back until no note is sounding, so that a chord is never played
    /// across two tunings.
    DeferWhileSounding,
}

/// Outcome of [`LiveTuning::publish`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Published {
    /// The table is current now.
    Applied,
    /// The table is queued until the last sounding note is released.
    Deferred,
}

/// A note started through [`LiveTuning::note_on`]. It counts as sounding until it is passed
/// to [`LiveTuning::note_off`] or dropped.
///
/// ```compile_fail
/// # use hexgrid_tuning::*;
/// let mut live = LiveTuning::new(presets::default_12_edo(), RetunePolicy::DeferWhileSounding);
/// let note = live.note_on(60);
/// let twice = note.clone();
/// ```
#[derive(Debug)]
pub struct SoundingNote {
    key: i32,
    tuning: Arc<Tuning>,
    _voice: Arc<()>,
}

impl SoundingNote {
    /// Key that was pressed.
    pub fn key(&self) -> i32 {
        self.key
    }

    /// Frequency in Hz, from the table current at note-on.
    pub fn frequency(&self) -> f64 {
        self.tuning.frequency(self.key)
    }

    /// The table this note is playing from.
    pub fn tuning(&self) -> &Arc<Tuning> {
        &self.tuning
    }
}

/// Holder of the current tuning table.
#[derive(Debug)]
pub struct LiveTuning {
    current: Arc<Tuning>,
    pending: Option<Arc<Tuning>>,
    // one strong reference per sounding note, plus this one
    voices: Arc<()>,
    policy: RetunePolicy,
}

impl LiveTuning {
    /// Starts with `tuning` as the current table.
    pub fn new(tuning: Tuning, policy: RetunePolicy) -> Self {
        LiveTuning {
            current: Arc::new(tuning),
            pending: None,
            voices: Arc::new(()),
            policy,
        }
    }

    /// The table new notes are started from.
    pub fn current(&self) -> Arc<Tuning> {
        match &self.pending {
            Some(next) if self.sounding() == 0 => Arc::clone(next),
            _ => Arc::clone(&self.current),
        }
    }

    /// Configured retune policy.
    pub fn policy(&self) -> RetunePolicy {
        self.policy
    }

    /// Number of notes started and not yet released.
    pub fn sounding(&self) -> usize {
        Arc::strong_count(&self.voices) - 1
    }

    /// Whether a published table is waiting for the notes to stop.
    pub fn has_pending(&self) -> bool {
        self.pending.is_some() && self.sounding() > 0
    }

    /// Makes `tuning` the current table, now or once every note is released depending on
    /// the policy. A table still waiting from an earlier publish is dropped.
    pub fn publish(&mut self, tuning: Tuning) -> Published {
        let tuning = Arc::new(tuning);
        let sounding = self.sounding();
        if self.policy == RetunePolicy::DeferWhileSounding && sounding > 0 {
            if self.pending.replace(tuning).is_some() {
                debug!("replacing a tuning that was still waiting to be applied");
            }
            warn!("deferring retune until {sounding} sounding notes are released");
            return Published::Deferred;
        }

        self.pending = None;
        self.current = tuning;
        debug!("applied new tuning with {sounding} sounding notes");
        Published::Applied
    }

    /// Starts a note on `key` from the current table.
    pub fn note_on(&mut self, key: i32) -> SoundingNote {
        self.apply_pending();
        SoundingNote {
            key,
            tuning: Arc::clone(&self.current),
            _voice: Arc::clone(&self.voices),
        }
    }

    /// Releases `note`. Applies a deferred table once the last note stops.
    pub fn note_off(&mut self, note: SoundingNote) {
        drop(note);
        self.apply_pending();
    }

    fn apply_pending(&mut self) {
        if self.sounding() > 0 {
            return;
        }
        if let Some(next) = self.pending.take() {
            debug!("all notes released, applying deferred tuning");
            self.current = next;
        }
    }
}
