use crate::audio::{AudioBackend, CpalBackend};
use crate::input::{ControlEvent, KeyboardHandler, MidiHandler};
use crate::notch::{NotchController, NotchEngine};
use anyhow::Result;
use crossbeam_channel::{unbounded, Receiver};
use log::{info, warn};
use std::time::Duration;

/// Native control-thread host: applies queued user input to the controller.
pub struct NativeHost {
    controller: NotchController,
    event_receiver: Receiver<ControlEvent>,
}

impl NativeHost {
    pub fn new(controller: NotchController, event_receiver: Receiver<ControlEvent>) -> Self {
        Self {
            controller,
            event_receiver,
        }
    }

    pub fn controller(&self) -> &NotchController {
        &self.controller
    }

    /// Apply every queued event, then reclaim chains the audio thread has released.
    pub fn process_events(&mut self) {
        while let Ok(event) = self.event_receiver.try_recv() {
            self.apply(event);
        }
        self.controller.collect_retired();
    }

    pub fn apply(&mut self, event: ControlEvent) {
        let result = match event {
            ControlEvent::PressKey(note) => {
                self.controller.press_key(note);
                Ok(())
            }
            ControlEvent::ToggleNote(note) => {
                self.controller.toggle_note(note);
                Ok(())
            }
            ControlEvent::SetParameter(param, value) => self.controller.set_param(param, value),
            ControlEvent::NudgeParameter(param, delta) => {
                let current = self.controller.params().get(param);
                self.controller.set_param(param, current + delta)
            }
            ControlEvent::SetChainMode(mode) => {
                self.controller.set_chain_mode(mode);
                Ok(())
            }
        };
        if let Err(e) = result {
            warn!("Control event {:?} rejected: {}", event, e);
        }
    }
}

pub fn start() -> Result<()> {
    let (event_tx, event_rx) = unbounded();

    let mut audio_backend = CpalBackend::open()?;
    let config = audio_backend.engine_config();

    let mut engine = NotchEngine::new(config);
    engine.prepare(config.sample_rate, config.max_block_size, config.num_channels);
    let (controller, processor) = engine.split();

    audio_backend.start(processor)?;
    info!("Keys A-J toggle notes, arrows adjust Q and mix, -/= makeup, ,/. curve, M mode");

    let mut keyboard_handler = KeyboardHandler::new(event_tx.clone());
    let mut midi_handler = MidiHandler::new(event_tx);
    let mut host = NativeHost::new(controller, event_rx);

    loop {
        keyboard_handler.update();
        midi_handler.update();
        host.process_events();

        std::thread::sleep(Duration::from_millis(10));
    }
}
