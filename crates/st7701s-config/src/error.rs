//! Configuration errors.
//!
//! Every variant is fatal to the build. `PaletteSize` signals a defect in
//! palette generation rather than bad user input.

use crate::Platform;
use st7701s_driver::PinRole;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our error type.
pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration document is not valid TOML or does not fit the schema.
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Color palette in IMAGE_ADAPTIVE mode requires at least one 'color_palette_images' entry to generate palette")]
    AdaptivePaletteWithoutImages,

    #[error("Providing color palette images requires palette mode to be 'IMAGE_ADAPTIVE'")]
    PaletteImagesWithoutAdaptiveMode,

    #[error("Model {model} can't run on {platform}. Use an ESP32 with PSRAM onboard")]
    UnsupportedOnPlatform { model: String, platform: Platform },

    #[error("Cannot specify both '{first}' and '{second}'")]
    MutuallyExclusive {
        first: &'static str,
        second: &'static str,
    },

    #[error("Either 'dc_pin' or the parallel RGB pins must be configured")]
    MissingInterface,

    #[error("Missing required pin '{0}' for the parallel RGB interface")]
    MissingPin(PinRole),

    #[error("Too many data pins: expected 16, got {0}")]
    TooManyDataPins(usize),

    #[error("GPIO{number} used for '{role}' is not a valid pin on {platform}")]
    InvalidPin {
        role: PinRole,
        number: u8,
        platform: Platform,
    },

    #[error("GPIO{number} is assigned to both '{first}' and '{second}'")]
    PinConflict {
        number: u8,
        first: PinRole,
        second: PinRole,
    },

    #[error("Invalid dimensions: {0}")]
    InvalidDimensions(String),

    #[error("Unknown platform: {0}")]
    UnknownPlatform(String),

    #[error("'pages' must contain at least one page")]
    EmptyPages,

    #[error("Invalid id '{0}': must start with a letter or '_' and contain only letters, digits and '_'")]
    InvalidId(String),

    #[error("Duplicate id '{0}'")]
    DuplicateId(String),

    #[error(transparent)]
    Driver(#[from] st7701s_driver::Error),

    #[error("Could not load image file {path}: {source}")]
    ImageLoad {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Internal error: generated palette has {actual} bytes, expected 768")]
    PaletteSize { actual: usize },

    /// Wraps an error with the display it was raised for.
    #[error("display '{id}': {source}")]
    InDisplay {
        id: String,
        #[source]
        source: Box<ConfigError>,
    },
}

impl ConfigError {
    /// Strips display context, returning the underlying error.
    pub fn root(&self) -> &ConfigError {
        match self {
            ConfigError::InDisplay { source, .. } => source.root(),
            other => other,
        }
    }
}
