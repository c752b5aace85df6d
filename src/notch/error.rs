use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ParamError {
    #[error("unknown parameter id `{0}`")]
    UnknownParameter(String),
    #[error("parameter `{id}` received a non-finite value")]
    NotANumber { id: &'static str },
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("sample rate must be finite and positive, got {0}")]
    InvalidSampleRate(f32),
    #[error("maximum block size must be at least one sample")]
    InvalidBlockSize,
    #[error("only mono or stereo layouts are supported, got {0} channels")]
    UnsupportedChannelCount(usize),
}
