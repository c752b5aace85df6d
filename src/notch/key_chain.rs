use super::bank::{adopt_matching, BankDesign, NotchFilter};
use super::harmonics::Note;
use super::prelude::HARMONICS_PER_NOTE;

/// Fixed seven-slot chain tracking the harmonics of one key.
///
/// In-bounds harmonics fill the leading slots in ascending order; the
/// remaining slots are passthroughs, so the chain length never changes.
#[derive(Clone, Debug)]
pub struct KeyChain {
    key: Note,
    slots: [NotchFilter; HARMONICS_PER_NOTE],
}

impl KeyChain {
    pub fn build(key: Note, design: &BankDesign) -> Self {
        let mut in_bounds = key
            .harmonics()
            .iter()
            .enumerate()
            .filter(|(_, frequency)| design.bounds.contains(**frequency))
            .map(|(harmonic, _)| harmonic);

        let slots = std::array::from_fn(|slot| match in_bounds.next() {
            Some(harmonic) => NotchFilter::design(key, harmonic, design),
            None => NotchFilter::passthrough(key, slot),
        });

        Self { key, slots }
    }

    pub fn key(&self) -> Note {
        self.key
    }

    /// All seven slots, passthroughs included.
    pub fn slots(&self) -> &[NotchFilter] {
        &self.slots
    }

    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_active()).count()
    }

    pub fn adopt_state(&mut self, previous: &[NotchFilter]) {
        adopt_matching(self.slots.iter_mut(), previous);
    }

    pub fn reset(&mut self) {
        for slot in self.slots.iter_mut() {
            slot.reset();
        }
    }

    #[inline]
    pub fn process_sample(&mut self, channel: usize, input: f32) -> f32 {
        let mut sample = input;
        for slot in self.slots.iter_mut() {
            sample = slot.process(channel, sample);
        }
        sample
    }
}
