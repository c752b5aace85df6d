use super::bank::{BankDesign, FrequencyBounds};
use super::chain::FilterChain;
use super::config::EngineConfig;
use super::error::ParamError;
use super::harmonics::Note;
use super::notes::{ActiveNoteSet, ToggleOutcome};
use super::params::{ChainMode, OutputLevels, OutputStage, ParamId, ParameterSnapshot};
use super::state::PersistedState;
use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use log::{debug, info, warn};
use std::sync::Arc;

/// Chains that may wait for the audio context before the oldest is discarded.
const PUBLISH_DEPTH: usize = 4;
/// Room for chains travelling back for reclamation.
const RETIRE_DEPTH: usize = PUBLISH_DEPTH * 2;

/// A complete chain on its way to, or back from, the audio context.
#[derive(Debug)]
pub struct PublishedChain {
    chain: FilterChain,
    generation: u64,
    /// Generation of the latest `prepare` this chain follows. A chain never
    /// inherits history from one that predates its reset.
    reset_epoch: u64,
}

impl PublishedChain {
    pub fn chain(&self) -> &FilterChain {
        &self.chain
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn reset_epoch(&self) -> u64 {
        self.reset_epoch
    }
}

type ChainBox = Box<PublishedChain>;

/// Control-context half: owns the notes and parameters and builds every chain.
pub struct NotchController {
    params: ParameterSnapshot,
    notes: ActiveNoteSet,
    bounds: FrequencyBounds,
    config: EngineConfig,
    output: Arc<OutputStage>,
    publish_tx: Sender<ChainBox>,
    stale_rx: Receiver<ChainBox>,
    retired_rx: Receiver<ChainBox>,
    generation: u64,
    reset_epoch: u64,
}

/// Audio-context half: runs whatever chain was most recently published.
pub struct NotchProcessor {
    current: ChainBox,
    incoming: Receiver<ChainBox>,
    retired_tx: Sender<ChainBox>,
    output: Arc<OutputStage>,
}

impl NotchController {
    pub fn params(&self) -> &ParameterSnapshot {
        &self.params
    }

    pub fn notes(&self) -> &ActiveNoteSet {
        &self.notes
    }

    pub fn bounds(&self) -> FrequencyBounds {
        self.bounds
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn design(&self) -> BankDesign {
        BankDesign {
            sample_rate: self.config.sample_rate,
            q_ratio: self.params.q_ratio,
            curve: self.params.q_function,
            bounds: self.bounds,
        }
    }

    /// Build the chain the current settings describe without publishing it.
    pub fn build_chain(&self) -> FilterChain {
        FilterChain::build(self.params.mode, &self.notes, self.params.key, &self.design())
    }

    /// Adopt a new audio configuration: every filter starts from silence.
    pub fn prepare(&mut self, config: EngineConfig) {
        if let Err(e) = config.validate() {
            warn!("Preparing with unsupported configuration: {}", e);
        }
        self.config = config.sanitized();
        info!(
            "Prepared at {} Hz, block size {}, {} channels",
            self.config.sample_rate, self.config.max_block_size, self.config.num_channels
        );
        self.publish(true);
    }

    pub fn toggle_note(&mut self, note: Note) -> ToggleOutcome {
        let outcome = self.notes.toggle(note);
        match outcome {
            ToggleOutcome::Rejected => {
                warn!(
                    "Ignoring note {}: {} notes already engaged",
                    note,
                    self.notes.len()
                );
            }
            _ => {
                debug!("Note {} {:?}", note, outcome);
                self.rebuild();
            }
        }
        outcome
    }

    /// A key button press: selects the key and toggles the note.
    pub fn press_key(&mut self, note: Note) -> ToggleOutcome {
        self.params.key = note;
        let outcome = self.toggle_note(note);
        // The toggle already rebuilt unless it was rejected.
        if !outcome.changed() && self.params.mode == ChainMode::SingleKey {
            self.rebuild();
        }
        outcome
    }

    pub fn set_param(&mut self, param: ParamId, value: f32) -> Result<(), ParamError> {
        if !self.params.set(param, value)? {
            return Ok(());
        }
        if param.needs_rebuild() {
            self.rebuild();
        } else {
            self.output.store(&self.params);
        }
        Ok(())
    }

    /// Set a parameter by its host id, e.g. `"q"` or `"qFunction"`.
    pub fn set_parameter(&mut self, id: &str, value: f32) -> Result<(), ParamError> {
        self.set_param(id.parse()?, value)
    }

    pub fn parameter(&self, id: &str) -> Result<f32, ParamError> {
        Ok(self.params.get(id.parse()?))
    }

    pub fn set_chain_mode(&mut self, mode: ChainMode) {
        if self.params.mode != mode {
            self.params.mode = mode;
            self.rebuild();
        }
    }

    pub fn set_frequency_bounds(&mut self, floor: f32, ceiling: f32) {
        let bounds = FrequencyBounds::new(floor, ceiling);
        if bounds != self.bounds {
            self.bounds = bounds;
            self.rebuild();
        }
    }

    pub fn save_state(&self) -> Vec<u8> {
        PersistedState::capture(&self.params, &self.notes, self.bounds).to_bytes()
    }

    /// Restore a saved blob; unreadable data falls back to defaults.
    pub fn restore_state(&mut self, data: &[u8]) {
        let state = PersistedState::from_bytes(data);
        self.params = state.parameters();
        self.notes = state.notes();
        self.bounds = state.bounds();
        self.output.store(&self.params);
        info!("Restored state with {} engaged notes", self.notes.len());
        self.rebuild();
    }

    pub fn rebuild(&mut self) {
        self.publish(false);
    }

    /// Drop chains the audio context has finished with. Returns how many were reclaimed.
    pub fn collect_retired(&self) -> usize {
        self.retired_rx.try_iter().count()
    }

    fn publish(&mut self, fresh: bool) {
        self.collect_retired();
        self.generation += 1;
        if fresh {
            self.reset_epoch = self.generation;
        }
        let chain = self.build_chain();
        info!(
            "Publishing {:?} chain #{} with {} notches ({} notes engaged)",
            chain.mode(),
            self.generation,
            chain.active_filters().count(),
            self.notes.len()
        );

        let mut pending = Box::new(PublishedChain {
            chain,
            generation: self.generation,
            reset_epoch: self.reset_epoch,
        });
        loop {
            match self.publish_tx.try_send(pending) {
                Ok(()) => break,
                Err(TrySendError::Full(back)) => {
                    // The audio context is behind; the oldest queued chain is already stale.
                    if let Ok(stale) = self.stale_rx.try_recv() {
                        debug!("Discarding unconsumed chain #{}", stale.generation);
                    }
                    pending = back;
                }
                Err(TrySendError::Disconnected(_)) => {
                    debug!("Audio context gone; chain #{} not delivered", self.generation);
                    break;
                }
            }
        }
    }
}

impl NotchProcessor {
    /// The chain the next block will run through.
    pub fn chain(&self) -> &FilterChain {
        &self.current.chain
    }

    pub fn generation(&self) -> u64 {
        self.current.generation
    }

    /// Swap in any chains published since the last block.
    pub fn sync(&mut self) {
        while let Ok(mut next) = self.incoming.try_recv() {
            if next.reset_epoch == self.current.reset_epoch {
                next.chain.adopt_state(&self.current.chain);
            }
            let previous = std::mem::replace(&mut self.current, next);
            // Only fails if the controller stopped reclaiming; dropping here is the last resort.
            let _ = self.retired_tx.try_send(previous);
        }
    }

    /// Process planar channels in place.
    pub fn process_block(&mut self, channels: &mut [&mut [f32]]) {
        self.sync();
        let levels = self.output.load();
        for (channel, samples) in channels.iter_mut().enumerate() {
            for sample in samples.iter_mut() {
                *sample = self.process_sample(channel, *sample, levels);
            }
        }
    }

    /// Process interleaved frames in place.
    pub fn process_interleaved(&mut self, data: &mut [f32], num_channels: usize) {
        if num_channels == 0 {
            return;
        }
        self.sync();
        let levels = self.output.load();
        for frame in data.chunks_mut(num_channels) {
            for (channel, sample) in frame.iter_mut().enumerate() {
                *sample = self.process_sample(channel, *sample, levels);
            }
        }
    }

    #[inline]
    fn process_sample(&mut self, channel: usize, dry_sample: f32, levels: OutputLevels) -> f32 {
        let mut filtered = self.current.chain.process_sample(channel, dry_sample);
        if !filtered.is_finite() {
            // A blown-up filter would stay broken; clear it and let this sample through.
            self.current.chain.reset();
            filtered = dry_sample;
        }
        let mixed = if levels.wet == 0.0 {
            dry_sample
        } else if levels.dry == 0.0 {
            filtered
        } else {
            levels.wet * filtered + levels.dry * dry_sample
        };
        mixed * levels.gain
    }
}

/// Both halves owned together, for hosts that prepare and process from one place.
pub struct NotchEngine {
    controller: NotchController,
    processor: NotchProcessor,
}

impl NotchEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self::with_state(config, ParameterSnapshot::default(), ActiveNoteSet::new())
    }

    pub fn with_state(config: EngineConfig, params: ParameterSnapshot, notes: ActiveNoteSet) -> Self {
        let params = params.sanitized();
        let (publish_tx, incoming) = bounded(PUBLISH_DEPTH);
        let (retired_tx, retired_rx) = bounded(RETIRE_DEPTH);
        let output = Arc::new(OutputStage::new(&params));

        let controller = NotchController {
            params,
            notes,
            bounds: FrequencyBounds::default(),
            config: config.sanitized(),
            output: Arc::clone(&output),
            publish_tx,
            stale_rx: incoming.clone(),
            retired_rx,
            generation: 0,
            reset_epoch: 0,
        };
        let current = Box::new(PublishedChain {
            chain: controller.build_chain(),
            generation: 0,
            reset_epoch: 0,
        });
        let processor = NotchProcessor {
            current,
            incoming,
            retired_tx,
            output,
        };

        Self {
            controller,
            processor,
        }
    }

    /// Hand the halves to separate threads.
    pub fn split(self) -> (NotchController, NotchProcessor) {
        (self.controller, self.processor)
    }

    pub fn controller(&self) -> &NotchController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut NotchController {
        &mut self.controller
    }

    pub fn processor(&self) -> &NotchProcessor {
        &self.processor
    }

    pub fn processor_mut(&mut self) -> &mut NotchProcessor {
        &mut self.processor
    }

    pub fn prepare(&mut self, sample_rate: f32, max_block_size: usize, num_channels: usize) {
        self.controller
            .prepare(EngineConfig::new(sample_rate, max_block_size, num_channels));
        self.processor.sync();
        self.controller.collect_retired();
    }

    pub fn toggle_note(&mut self, note: Note) -> ToggleOutcome {
        self.controller.toggle_note(note)
    }

    pub fn set_parameter(&mut self, id: &str, value: f32) -> Result<(), ParamError> {
        self.controller.set_parameter(id, value)
    }

    pub fn process_block(&mut self, channels: &mut [&mut [f32]]) {
        self.processor.process_block(channels);
    }

    pub fn save_state(&self) -> Vec<u8> {
        self.controller.save_state()
    }

    pub fn restore_state(&mut self, data: &[u8]) {
        self.controller.restore_state(data);
    }

    pub fn tail_length_seconds(&self) -> f64 {
        0.0
    }
}
