use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChargerError {
    #[error("hardware error: {0}")]
    Hardware(String),
    #[error("hardware fault: {0}")]
    HardwareFault(String),
    #[error("timeout waiting for conversion")]
    Timeout,
    #[error("invalid sample: {0}")]
    Sample(#[from] SampleError),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("alarm evaluation failed: {0}")]
    Alarm(String),
}

/// Problems with a raw conversion sequence as delivered by ingestion.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SampleError {
    #[error("raw code {code:#06x} exceeds the 12-bit range")]
    OutOfRange { code: u16 },
    #[error("expected {expected} conversion slots, got {actual}")]
    SequenceLength { expected: usize, actual: usize },
}

#[derive(Debug, Error, Clone)]
pub enum BuildError {
    #[error("missing cell sampler")]
    MissingSampler,
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
