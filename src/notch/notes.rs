use super::harmonics::{Note, NOTE_COUNT};
use super::prelude::MAX_ACTIVE_NOTES;

/// Result of a toggle request against the active set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Engaged,
    Released,
    /// The set was already full; nothing changed.
    Rejected,
}

impl ToggleOutcome {
    pub fn changed(self) -> bool {
        !matches!(self, ToggleOutcome::Rejected)
    }
}

/// Notes currently selected for suppression, capped at `MAX_ACTIVE_NOTES`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActiveNoteSet {
    engaged: [bool; NOTE_COUNT],
    count: usize,
}

impl ActiveNoteSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from a list of notes, ignoring duplicates and anything past the cap.
    pub fn from_notes<I: IntoIterator<Item = Note>>(notes: I) -> Self {
        let mut set = Self::new();
        for note in notes {
            if !set.is_engaged(note) {
                set.toggle(note);
            }
        }
        set
    }

    pub fn toggle(&mut self, note: Note) -> ToggleOutcome {
        let slot = &mut self.engaged[note.index()];
        if *slot {
            *slot = false;
            self.count -= 1;
            ToggleOutcome::Released
        } else if self.count < MAX_ACTIVE_NOTES {
            *slot = true;
            self.count += 1;
            ToggleOutcome::Engaged
        } else {
            ToggleOutcome::Rejected
        }
    }

    pub fn is_engaged(&self, note: Note) -> bool {
        self.engaged[note.index()]
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn is_full(&self) -> bool {
        self.count >= MAX_ACTIVE_NOTES
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Engaged notes in ascending index order.
    pub fn iter(&self) -> impl Iterator<Item = Note> + '_ {
        Note::all().filter(move |note| self.engaged[note.index()])
    }
}
