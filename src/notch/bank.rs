use super::filter::{Biquad, BiquadCoefficients};
use super::harmonics::Note;
use super::notes::ActiveNoteSet;
use super::prelude::MAX_BANK_FILTERS;
use super::qmap::QCurve;
use log::debug;
use serde::{Deserialize, Serialize};

/// The span in which harmonics are allowed to spawn filters, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrequencyBounds {
    pub floor: f32,
    pub ceiling: f32,
}

impl FrequencyBounds {
    /// Build bounds, swapping the ends if they arrive reversed. A non-finite
    /// end falls back to the default one.
    pub fn new(floor: f32, ceiling: f32) -> Self {
        let defaults = Self::default();
        let floor = if floor.is_finite() { floor } else { defaults.floor };
        let ceiling = if ceiling.is_finite() { ceiling } else { defaults.ceiling };
        if floor <= ceiling {
            Self { floor, ceiling }
        } else {
            Self {
                floor: ceiling,
                ceiling: floor,
            }
        }
    }

    pub fn contains(&self, frequency: f32) -> bool {
        self.floor <= frequency && frequency <= self.ceiling
    }
}

impl Default for FrequencyBounds {
    fn default() -> Self {
        Self {
            floor: 400.0,
            ceiling: 4000.0,
        }
    }
}

/// Everything a rebuild needs besides the set of notes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BankDesign {
    pub sample_rate: f32,
    pub q_ratio: f32,
    pub curve: QCurve,
    pub bounds: FrequencyBounds,
}

/// One notch tuned to a single harmonic of a single note, or an idle passthrough slot.
#[derive(Clone, Debug)]
pub struct NotchFilter {
    note: Note,
    harmonic: usize,
    center_hz: f32,
    q: f32,
    active: bool,
    biquad: Biquad,
}

impl NotchFilter {
    pub fn design(note: Note, harmonic: usize, design: &BankDesign) -> Self {
        let center_hz = note.harmonics()[harmonic];
        let q = design.curve.map(center_hz, design.q_ratio, design.sample_rate);
        debug!(
            "note {} harmonic {} | freq: {} | q ratio: {} | q used: {}",
            note, harmonic, center_hz, design.q_ratio, q
        );
        Self {
            note,
            harmonic,
            center_hz,
            q,
            active: true,
            biquad: Biquad::new(BiquadCoefficients::notch(design.sample_rate, center_hz, q)),
        }
    }

    /// A slot that keeps its place in a fixed chain without touching the signal.
    pub fn passthrough(note: Note, slot: usize) -> Self {
        Self {
            note,
            harmonic: slot,
            center_hz: 0.0,
            q: 0.0,
            active: false,
            biquad: Biquad::passthrough(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn note(&self) -> Note {
        self.note
    }

    pub fn harmonic(&self) -> usize {
        self.harmonic
    }

    pub fn center_hz(&self) -> f32 {
        self.center_hz
    }

    pub fn q(&self) -> f32 {
        self.q
    }

    pub fn biquad(&self) -> &Biquad {
        &self.biquad
    }

    fn same_slot(&self, other: &NotchFilter) -> bool {
        self.active && other.active && self.note == other.note && self.harmonic == other.harmonic
    }

    pub fn reset(&mut self) {
        self.biquad.reset();
    }

    #[inline]
    pub fn process(&mut self, channel: usize, input: f32) -> f32 {
        self.biquad.process(channel, input)
    }
}

/// Notches for every in-bounds harmonic of every engaged note, in note then harmonic order.
#[derive(Clone, Debug, Default)]
pub struct FilterBank {
    filters: Vec<NotchFilter>,
}

impl FilterBank {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn build(notes: &ActiveNoteSet, design: &BankDesign) -> Self {
        let mut filters = Vec::with_capacity(MAX_BANK_FILTERS);
        for note in notes.iter() {
            for (harmonic, &frequency) in note.harmonics().iter().enumerate() {
                if design.bounds.contains(frequency) {
                    filters.push(NotchFilter::design(note, harmonic, design));
                }
            }
        }
        Self { filters }
    }

    pub fn filters(&self) -> &[NotchFilter] {
        &self.filters
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Take over delay-line history from filters in `previous` that track the same harmonic.
    pub fn adopt_state(&mut self, previous: &[NotchFilter]) {
        adopt_matching(self.filters.iter_mut(), previous);
    }

    pub fn reset(&mut self) {
        for filter in self.filters.iter_mut() {
            filter.reset();
        }
    }

    #[inline]
    pub fn process_sample(&mut self, channel: usize, input: f32) -> f32 {
        self.filters
            .iter_mut()
            .fold(input, |sample, filter| filter.process(channel, sample))
    }
}

pub(crate) fn adopt_matching<'a, I>(current: I, previous: &[NotchFilter])
where
    I: Iterator<Item = &'a mut NotchFilter>,
{
    for filter in current {
        if let Some(old) = previous.iter().find(|old| old.same_slot(filter)) {
            filter.biquad.copy_state_from(&old.biquad);
        }
    }
}
