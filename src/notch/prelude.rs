// Shared constants for the notch engine

pub use core::f32::consts::PI;

/// Channels that receive filtering. Extra channels only get mix and gain.
pub const MAX_CHANNELS: usize = 2;

/// Harmonics tracked per note (fundamental + 6 overtones).
pub const HARMONICS_PER_NOTE: usize = 7;

/// Upper bound on simultaneously engaged notes.
pub const MAX_ACTIVE_NOTES: usize = 5;

/// Largest bank the dynamic builder can ever produce.
pub const MAX_BANK_FILTERS: usize = MAX_ACTIVE_NOTES * HARMONICS_PER_NOTE;
