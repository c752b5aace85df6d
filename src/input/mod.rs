use crate::notch::{ChainMode, Note, ParamId};

mod keyboard;
mod midi;
pub use self::keyboard::KeyboardHandler;
pub use self::midi::MidiHandler;

/// Requests from the user-facing side, applied on the control thread.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlEvent {
    /// Select the key and toggle its note, like a key button.
    PressKey(Note),
    ToggleNote(Note),
    SetParameter(ParamId, f32),
    /// Add a delta to the parameter's current value.
    NudgeParameter(ParamId, f32),
    SetChainMode(ChainMode),
}
