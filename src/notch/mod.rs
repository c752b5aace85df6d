pub mod bank;
pub mod chain;
pub mod config;
pub mod engine;
pub mod error;
pub mod filter;
pub mod harmonics;
pub mod key_chain;
pub mod notes;
pub mod params;
pub mod prelude;
pub mod qmap;
pub mod state;

pub use bank::{BankDesign, FilterBank, FrequencyBounds, NotchFilter};
pub use chain::FilterChain;
pub use config::EngineConfig;
pub use engine::{NotchController, NotchEngine, NotchProcessor};
pub use error::{ConfigError, ParamError};
pub use harmonics::Note;
pub use key_chain::KeyChain;
pub use notes::{ActiveNoteSet, ToggleOutcome};
pub use params::{ChainMode, ParamId, ParameterSnapshot};
pub use qmap::QCurve;
pub use state::PersistedState;
