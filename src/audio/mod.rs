mod cpal_backend;
pub use self::cpal_backend::CpalBackend;

use crate::notch::NotchProcessor;
use anyhow::Result;

pub trait AudioBackend {
    /// Start pulling audio through the processor. The processor moves to the audio thread.
    fn start(&mut self, processor: NotchProcessor) -> Result<()>;
    fn stop(&mut self) -> Result<()>;
}
