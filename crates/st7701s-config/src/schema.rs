//! Raw configuration schema.
//!
//! Mirrors the user's TOML document field for field. Values are only
//! shape-checked here; cross-field rules live in [`crate::panel`].

use crate::{ConfigError, Result};
use anyhow::Context;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// A configuration document.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Document {
    /// Build target
    #[serde(default)]
    pub target: TargetConfig,

    /// Panels to configure
    #[serde(default, rename = "display")]
    pub displays: Vec<RawDisplay>,
}

/// Build target configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TargetConfig {
    /// Hardware platform (esp32, esp32s3, esp8266, rp2040, host)
    #[serde(default = "default_platform")]
    pub platform: String,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            platform: default_platform(),
        }
    }
}

/// One panel as written by the user.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawDisplay {
    /// Identifier of the generated driver variable
    pub id: Option<String>,

    /// Driver model name
    pub model: String,

    /// Data/command pin (serial interface)
    pub dc_pin: Option<RawPin>,

    /// Hardware reset pin
    pub reset_pin: Option<RawPin>,

    /// Parallel RGB pixel clock
    pub pclk_pin: Option<RawPin>,

    /// Parallel RGB data enable
    pub de_pin: Option<RawPin>,

    /// Parallel RGB vertical sync
    pub vsync_pin: Option<RawPin>,

    /// Parallel RGB horizontal sync
    pub hsync_pin: Option<RawPin>,

    /// Parallel RGB data lines D0..D15
    pub data_pins: Option<Vec<RawPin>>,

    /// Backlight enable
    #[serde(alias = "led_pin")]
    pub backlight_pin: Option<RawPin>,

    /// Panel size, as `[w, h]`, `"WxH"` or a table with offsets
    pub dimensions: Option<RawDimensions>,

    /// Rotation in degrees
    pub rotation: Option<RawRotation>,

    /// Axis swap and mirroring
    pub transform: Option<RawTransform>,

    /// Palette mode (NONE, GRAYSCALE, IMAGE_ADAPTIVE)
    #[serde(default = "default_color_palette", alias = "color_mode")]
    pub color_palette: String,

    /// Reference images for IMAGE_ADAPTIVE
    #[serde(default)]
    pub color_palette_images: Vec<PathBuf>,

    /// Identifier of the generated palette array
    pub raw_data_id: Option<String>,

    /// Panel color inversion
    #[serde(alias = "invert_display")]
    pub invert_colors: Option<bool>,

    /// Sub-pixel order (RGB or BGR)
    pub color_order: Option<String>,

    /// Redraw period ("1s", "500ms", "never")
    #[serde(default = "default_update_interval")]
    pub update_interval: String,

    /// Drawing callback source
    pub lambda: Option<String>,

    /// Display pages
    pub pages: Option<Vec<RawPage>>,
}

/// A pin given as a bare GPIO number or with options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RawPin {
    Number(u8),
    Full {
        number: u8,
        #[serde(default)]
        inverted: bool,
    },
}

/// Panel dimensions in one of the accepted spellings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RawDimensions {
    Pair([u16; 2]),
    Text(String),
    Record(DimensionsRecord),
}

/// Dimensions with explicit visible-area offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DimensionsRecord {
    pub width: u16,
    pub height: u16,
    #[serde(default)]
    pub offset_width: i16,
    #[serde(default)]
    pub offset_height: i16,
}

/// Rotation as an integer or string such as `"90°"`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RawRotation {
    Degrees(u16),
    Text(String),
}

/// Axis transform flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawTransform {
    #[serde(default)]
    pub swap_xy: bool,
    #[serde(default)]
    pub mirror_x: bool,
    #[serde(default)]
    pub mirror_y: bool,
}

/// A display page.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawPage {
    pub id: Option<String>,
    pub lambda: String,
}

// Default value functions
fn default_platform() -> String {
    "esp32".to_string()
}

fn default_color_palette() -> String {
    "NONE".to_string()
}

fn default_update_interval() -> String {
    "1s".to_string()
}

impl Document {
    /// Parses a configuration document from TOML text.
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(ConfigError::Parse)
    }

    /// Loads a configuration document from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read configuration file {}", path.as_ref().display()))?;
        let document = Self::parse(&content).context("Failed to parse configuration")?;
        Ok(document)
    }
}
