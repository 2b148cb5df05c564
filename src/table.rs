//! Fixed-size, centre-anchored storage for tuning tables.
//!
//! A table is a contiguous buffer of [`TABLE_SIZE`] slots. Key `k` lives in slot
//! `TABLE_CENTER + k`, so the keys `-256..=255` are addressable. Lookups clamp out-of-range
//! keys to the nearest end instead of failing.

/// Number of precomputed slots.
pub const TABLE_SIZE: usize = 512;

/// Slot index of key 0.
pub const TABLE_CENTER: usize = TABLE_SIZE / 2;

/// Lowest key held by a table.
pub const MIN_KEY: i32 = -(TABLE_CENTER as i32);

/// Highest key held by a table.
pub const MAX_KEY: i32 = (TABLE_SIZE - TABLE_CENTER) as i32 - 1;

/// Slot index for `key`, clamped into the table.
pub fn slot_index(key: i32) -> usize {
    (TABLE_CENTER as i32 + key.clamp(MIN_KEY, MAX_KEY)) as usize
}

/// Key stored in slot `index`.
pub fn key_of_slot(index: usize) -> i32 {
    index as i32 - TABLE_CENTER as i32
}

/// One precomputed key of a tuning table.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Slot {
    /// Index of the scale tone this slot plays, `None` if the key is unmapped.
    pub scale_position: Option<usize>,

    /// Whole periods above (or below) the period of the mapping's middle key.
    pub equave: i32,

    /// `log2` of `frequency / REFERENCE_FREQUENCY`. 0 for unmapped keys.
    pub log_frequency: f64,

    /// Frequency in Hz. 0 for unmapped keys.
    pub frequency: f64,
}

impl Slot {
    /// Whether the slot carries a scale position.
    pub fn is_mapped(&self) -> bool {
        self.scale_position.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centre_and_bounds() {
        assert_eq!(slot_index(0), TABLE_CENTER);
        assert_eq!(slot_index(MIN_KEY), 0);
        assert_eq!(slot_index(MAX_KEY), TABLE_SIZE - 1);
        assert_eq!((MIN_KEY, MAX_KEY), (-256, 255));
    }

    #[test]
    fn out_of_range_keys_clamp() {
        assert_eq!(slot_index(-10_000), 0);
        assert_eq!(slot_index(i32::MAX), TABLE_SIZE - 1);
        assert_eq!(key_of_slot(slot_index(37)), 37);
    }
}
