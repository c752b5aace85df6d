use super::bank::FrequencyBounds;
use super::harmonics::Note;
use super::notes::ActiveNoteSet;
use super::params::ParameterSnapshot;
use log::warn;
use serde::{Deserialize, Serialize};

/// Everything needed to rebuild the engine after a reload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistedState {
    pub parameters: ParameterSnapshot,
    /// Engaged note indices, ascending.
    pub active_notes: Vec<u8>,
    pub bounds: FrequencyBounds,
}

impl PersistedState {
    pub fn capture(
        parameters: &ParameterSnapshot,
        notes: &ActiveNoteSet,
        bounds: FrequencyBounds,
    ) -> Self {
        Self {
            parameters: *parameters,
            active_notes: notes.iter().map(u8::from).collect(),
            bounds,
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        // Plain data with string keys, so serialization cannot fail.
        serde_json::to_vec(self).unwrap_or_default()
    }

    /// Decode a saved blob. Anything unreadable yields the default state.
    pub fn from_bytes(data: &[u8]) -> Self {
        match serde_json::from_slice::<PersistedState>(data) {
            Ok(state) => state,
            Err(e) => {
                warn!("Discarding unreadable saved state ({}), using defaults", e);
                Self::default()
            }
        }
    }

    pub fn parameters(&self) -> ParameterSnapshot {
        self.parameters.sanitized()
    }

    /// Saved bounds with the ends put back in order.
    pub fn bounds(&self) -> FrequencyBounds {
        FrequencyBounds::new(self.bounds.floor, self.bounds.ceiling)
    }

    /// Valid indices only, sorted, capped at the active-note limit.
    pub fn notes(&self) -> ActiveNoteSet {
        let mut indices: Vec<u8> = self.active_notes.clone();
        indices.sort_unstable();
        indices.dedup();
        let dropped = indices.iter().filter(|&&i| Note::new(i).is_none()).count();
        if dropped > 0 {
            warn!("Ignoring {} out-of-range note indices in saved state", dropped);
        }
        ActiveNoteSet::from_notes(indices.into_iter().filter_map(Note::new))
    }
}
