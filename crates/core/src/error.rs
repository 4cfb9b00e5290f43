//! Construction errors
//!
//! Evaluation never fails. Constructors clamp numeric parameters into their
//! documented ranges and only reject inputs that cannot describe a field at
//! all, such as an empty source list or mismatched array lengths.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TextureError {
    #[error("at least one source field is required")]
    EmptySources,

    #[error("wave needs at least one wavelength")]
    EmptyWave,

    #[error("{what}: expected {expected} entries, got {actual}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("invalid dimensions {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error("{what} must be positive, got {value}")]
    NonPositive { what: &'static str, value: f64 },

    #[error("transform is not invertible")]
    SingularTransform,

    #[error("support kernel has no offsets")]
    EmptySupport,

    #[error("convolution kernel has no taps")]
    EmptyKernel,

    #[error("point list is empty")]
    EmptyPoints,

    #[error("invalid color stops: {0}")]
    InvalidStops(String),

    #[error("channel {channel} out of range for vector of length {len}")]
    InvalidChannel { channel: usize, len: usize },
}

pub type Result<T> = std::result::Result<T, TextureError>;

/// Reject non-positive or non-finite values.
pub(crate) fn positive(what: &'static str, value: f64) -> Result<f64> {
    if value > 0.0 && value.is_finite() {
        Ok(value)
    } else {
        Err(TextureError::NonPositive { what, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let e = TextureError::LengthMismatch {
            what: "weights",
            expected: 3,
            actual: 2,
        };
        assert_eq!(e.to_string(), "weights: expected 3 entries, got 2");
        assert!(positive("resolution", 0.0).is_err());
        assert!(positive("resolution", f64::NAN).is_err());
        assert_eq!(positive("resolution", 2.5), Ok(2.5));
    }
}
