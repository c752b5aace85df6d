use super::ControlEvent;
use crate::notch::{ChainMode, Note, ParamId};
use crossbeam_channel::Sender;
use device_query::{DeviceQuery, DeviceState, Keycode};
use log::{debug, error};
use std::collections::HashMap;

/// Polls the computer keyboard and turns key presses into control events.
pub struct KeyboardHandler {
    device_state: DeviceState,
    key_states: HashMap<Keycode, bool>,
    key_to_note: HashMap<Keycode, u8>,
    control_keys: HashMap<Keycode, bool>, // Track control keys separately
    chain_mode: ChainMode,
    event_sender: Sender<ControlEvent>,
}

impl KeyboardHandler {
    pub fn new(event_sender: Sender<ControlEvent>) -> Self {
        let device_state = DeviceState::new();
        let mut key_states: HashMap<Keycode, bool> = HashMap::new();
        let mut control_keys: HashMap<Keycode, bool> = HashMap::new();

        // One octave laid out like a piano: home row naturals, top row sharps
        let key_to_note: HashMap<Keycode, u8> = [
            (Keycode::A, 0),  // C
            (Keycode::W, 1),  // C#
            (Keycode::S, 2),  // D
            (Keycode::E, 3),  // D#
            (Keycode::D, 4),  // E
            (Keycode::F, 5),  // F
            (Keycode::T, 6),  // F#
            (Keycode::G, 7),  // G
            (Keycode::Y, 8),  // G#
            (Keycode::H, 9),  // A
            (Keycode::U, 10), // A#
            (Keycode::J, 11), // B
        ]
        .iter()
        .cloned()
        .collect();

        for key in key_to_note.keys() {
            key_states.insert(*key, false);
        }

        for key in Self::CONTROL_KEYS {
            control_keys.insert(key, false);
        }

        Self {
            device_state,
            key_states,
            key_to_note,
            control_keys,
            chain_mode: ChainMode::Dynamic,
            event_sender,
        }
    }

    const CONTROL_KEYS: [Keycode; 9] = [
        Keycode::Comma,
        Keycode::Dot,
        Keycode::Up,
        Keycode::Down,
        Keycode::Left,
        Keycode::Right,
        Keycode::Minus,
        Keycode::Equal,
        Keycode::M,
    ];

    fn control_event(&mut self, key: Keycode) -> Option<ControlEvent> {
        let event = match key {
            Keycode::Comma => ControlEvent::SetParameter(ParamId::QFunction, 0.0),
            Keycode::Dot => ControlEvent::SetParameter(ParamId::QFunction, 1.0),
            Keycode::Up => ControlEvent::NudgeParameter(ParamId::Q, 10.0),
            Keycode::Down => ControlEvent::NudgeParameter(ParamId::Q, -10.0),
            Keycode::Right => ControlEvent::NudgeParameter(ParamId::Mix, 5.0),
            Keycode::Left => ControlEvent::NudgeParameter(ParamId::Mix, -5.0),
            Keycode::Equal => ControlEvent::NudgeParameter(ParamId::Makeup, 1.0),
            Keycode::Minus => ControlEvent::NudgeParameter(ParamId::Makeup, -1.0),
            Keycode::M => {
                self.chain_mode = match self.chain_mode {
                    ChainMode::Dynamic => ChainMode::SingleKey,
                    ChainMode::SingleKey => ChainMode::Dynamic,
                };
                ControlEvent::SetChainMode(self.chain_mode)
            }
            _ => return None,
        };
        Some(event)
    }

    fn send(&self, event: ControlEvent) {
        if let Err(e) = self.event_sender.send(event) {
            error!("Error sending control event: {}", e);
        }
    }

    pub fn update(&mut self) {
        let keys: Vec<Keycode> = self.device_state.get_keys();

        // Key buttons latch, so only the press edge matters
        let mut pressed_notes = Vec::new();
        for (key, note) in &self.key_to_note {
            let is_pressed = keys.contains(key);
            let was_pressed = self.key_states.get(key).cloned().unwrap_or(false);
            if is_pressed && !was_pressed {
                pressed_notes.push((*key, *note));
            }
            self.key_states.insert(*key, is_pressed);
        }
        for (key, note) in pressed_notes {
            if let Some(note) = Note::new(note) {
                debug!("Key '{:?}' pressed - toggling {}", key, note);
                self.send(ControlEvent::PressKey(note));
            }
        }

        for key in Self::CONTROL_KEYS {
            let is_pressed = keys.contains(&key);
            let was_pressed = self.control_keys.get(&key).cloned().unwrap_or(false);

            if is_pressed && !was_pressed {
                if let Some(event) = self.control_event(key) {
                    debug!("Key '{:?}' pressed - {:?}", key, event);
                    self.send(event);
                }
            }

            self.control_keys.insert(key, is_pressed);
        }
    }
}
