use super::prelude::HARMONICS_PER_NOTE;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const NOTE_COUNT: usize = 12;

pub const NOTE_NAMES: [&str; NOTE_COUNT] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Fundamental (octave 3) plus six octave overtones for each chromatic note, in Hz.
pub const HARMONIC_TABLE: [[f32; HARMONICS_PER_NOTE]; NOTE_COUNT] = [
    [130.81, 261.63, 523.25, 1046.50, 2093.00, 4186.01, 8372.02],
    [138.59, 277.18, 554.37, 1108.73, 2217.46, 4434.92, 8869.84],
    [146.83, 293.66, 587.33, 1174.66, 2349.32, 4698.64, 9397.27],
    [155.56, 311.13, 622.25, 1244.51, 2489.02, 4978.03, 9956.06],
    [164.81, 329.63, 659.26, 1318.51, 2637.02, 5274.04, 10548.08],
    [174.61, 349.23, 698.46, 1396.91, 2793.83, 5587.65, 11175.30],
    [185.00, 369.99, 739.99, 1479.98, 2959.96, 5919.91, 11839.82],
    [196.00, 392.00, 783.99, 1567.98, 3135.96, 6271.93, 12543.86],
    [207.65, 415.30, 830.61, 1661.22, 3322.44, 6644.88, 13289.75],
    [220.00, 440.00, 880.00, 1760.00, 3520.00, 7040.00, 14080.00],
    [233.08, 466.16, 932.33, 1864.66, 3729.31, 7458.62, 14917.24],
    [246.94, 493.88, 987.77, 1975.53, 3951.07, 7902.13, 15804.26],
];

/// A chromatic scale position, 0 (C) through 11 (B).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Note(u8);

impl Note {
    pub fn new(index: u8) -> Option<Self> {
        if (index as usize) < NOTE_COUNT {
            Some(Self(index))
        } else {
            None
        }
    }

    /// Fold any MIDI note number onto its pitch class.
    pub fn from_midi(note_number: u8) -> Self {
        Self(note_number % NOTE_COUNT as u8)
    }

    pub fn all() -> impl Iterator<Item = Note> {
        (0..NOTE_COUNT as u8).map(Note)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn name(self) -> &'static str {
        NOTE_NAMES[self.index()]
    }

    /// The note's harmonic frequencies in ascending order.
    pub fn harmonics(self) -> &'static [f32; HARMONICS_PER_NOTE] {
        &HARMONIC_TABLE[self.index()]
    }
}

impl TryFrom<u8> for Note {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Note::new(value).ok_or_else(|| format!("note index {} out of range 0-11", value))
    }
}

impl From<Note> for u8 {
    fn from(note: Note) -> u8 {
        note.0
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
