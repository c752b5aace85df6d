use super::error::ConfigError;
use super::prelude::MAX_CHANNELS;

/// Audio configuration handed to `prepare` by the host.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EngineConfig {
    pub sample_rate: f32,
    pub max_block_size: usize,
    pub num_channels: usize,
}

impl EngineConfig {
    pub fn new(sample_rate: f32, max_block_size: usize, num_channels: usize) -> Self {
        Self {
            sample_rate,
            max_block_size,
            num_channels,
        }
    }

    /// Mono or stereo, with a usable sample rate and block size.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.sample_rate.is_finite() || self.sample_rate <= 0.0 {
            return Err(ConfigError::InvalidSampleRate(self.sample_rate));
        }
        if self.max_block_size == 0 {
            return Err(ConfigError::InvalidBlockSize);
        }
        if self.num_channels == 0 || self.num_channels > MAX_CHANNELS {
            return Err(ConfigError::UnsupportedChannelCount(self.num_channels));
        }
        Ok(())
    }

    /// Replace unusable fields with working values. Channel counts above
    /// stereo are kept; the extra channels simply skip filtering.
    pub fn sanitized(self) -> Self {
        let defaults = Self::default();
        Self {
            sample_rate: if self.sample_rate.is_finite() && self.sample_rate > 0.0 {
                self.sample_rate
            } else {
                defaults.sample_rate
            },
            max_block_size: self.max_block_size.max(1),
            num_channels: self.num_channels.max(1),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44100.0, // Standard audio sample rate
            max_block_size: 512,
            num_channels: 2,
        }
    }
}
