//! Error types for the ST7701S driver interface.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while interpreting driver-level values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Model name has no driver variant.
    #[error("Unknown model: {0}")]
    UnknownModel(String),

    /// Invalid rotation value.
    #[error("Invalid rotation: {0} (must be 0, 90, 180 or 270)")]
    InvalidRotation(String),

    /// Invalid color order value.
    #[error("Invalid color order: {0} (must be RGB or BGR)")]
    InvalidColorOrder(String),

    /// Invalid color palette mode.
    #[error("Invalid color palette: {0} (must be NONE, GRAYSCALE or IMAGE_ADAPTIVE)")]
    InvalidColorPalette(String),

    /// Invalid update interval.
    #[error("Invalid update interval: {0}")]
    InvalidInterval(String),

    /// Palette table does not hold exactly 256 RGB triples.
    #[error("Palette size mismatch: expected {expected} bytes, got {actual}")]
    PaletteSize { expected: usize, actual: usize },
}
