use thiserror::Error;

#[derive(Debug, Error)]
pub enum HwError {
    #[error("conversion-complete timeout")]
    ConversionTimeout,
    #[error("frame recording exhausted after {0} frames")]
    ReplayExhausted(usize),
}

pub type Result<T> = std::result::Result<T, HwError>;
