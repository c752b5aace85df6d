use super::bank::{BankDesign, FilterBank, NotchFilter};
use super::harmonics::Note;
use super::key_chain::KeyChain;
use super::notes::ActiveNoteSet;
use super::params::ChainMode;
use super::prelude::MAX_CHANNELS;

/// The filter layout the audio context runs, built whole on the control side.
#[derive(Clone, Debug)]
pub enum FilterChain {
    Dynamic(FilterBank),
    SingleKey(KeyChain),
}

impl FilterChain {
    pub fn build(mode: ChainMode, notes: &ActiveNoteSet, key: Note, design: &BankDesign) -> Self {
        match mode {
            ChainMode::Dynamic => Self::Dynamic(FilterBank::build(notes, design)),
            ChainMode::SingleKey => Self::SingleKey(KeyChain::build(key, design)),
        }
    }

    pub fn mode(&self) -> ChainMode {
        match self {
            Self::Dynamic(_) => ChainMode::Dynamic,
            Self::SingleKey(_) => ChainMode::SingleKey,
        }
    }

    /// Every filter unit in processing order.
    pub fn filters(&self) -> &[NotchFilter] {
        match self {
            Self::Dynamic(bank) => bank.filters(),
            Self::SingleKey(chain) => chain.slots(),
        }
    }

    /// Filters that actually notch something.
    pub fn active_filters(&self) -> impl Iterator<Item = &NotchFilter> {
        self.filters().iter().filter(|filter| filter.is_active())
    }

    pub fn adopt_state(&mut self, previous: &FilterChain) {
        match self {
            Self::Dynamic(bank) => bank.adopt_state(previous.filters()),
            Self::SingleKey(chain) => chain.adopt_state(previous.filters()),
        }
    }

    pub fn reset(&mut self) {
        match self {
            Self::Dynamic(bank) => bank.reset(),
            Self::SingleKey(chain) => chain.reset(),
        }
    }

    /// Filter one sample. Channels past `MAX_CHANNELS` pass through.
    #[inline]
    pub fn process_sample(&mut self, channel: usize, input: f32) -> f32 {
        if channel >= MAX_CHANNELS {
            return input;
        }
        match self {
            Self::Dynamic(bank) => bank.process_sample(channel, input),
            Self::SingleKey(chain) => chain.process_sample(channel, input),
        }
    }
}

impl Default for FilterChain {
    fn default() -> Self {
        Self::Dynamic(FilterBank::empty())
    }
}
