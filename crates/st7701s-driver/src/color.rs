//! Buffer color modes, color order and the indexed-color palette.

use crate::{Error, Result};
use serde::Serialize;
use std::str::FromStr;

/// Number of entries in an indexed-color palette.
pub const PALETTE_ENTRIES: usize = 256;

/// Size of a palette table in bytes (R, G, B per entry).
pub const PALETTE_BYTES: usize = PALETTE_ENTRIES * 3;

/// Pixel storage format of the driver's framebuffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum ColorMode {
    /// 8-bit direct color (RGB332).
    Bits8 = 0x08,
    /// 8-bit index into a 256-entry palette.
    Bits8Indexed = 0x09,
    /// 16-bit direct color (RGB565).
    #[default]
    Bits16 = 0x10,
}

impl ColorMode {
    /// Bytes used per pixel in the framebuffer.
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            ColorMode::Bits8 | ColorMode::Bits8Indexed => 1,
            ColorMode::Bits16 => 2,
        }
    }

    /// Returns true if pixels index into a palette.
    pub fn is_indexed(&self) -> bool {
        matches!(self, ColorMode::Bits8Indexed)
    }

    /// Enumerator name used by the firmware driver.
    pub fn cpp_name(&self) -> &'static str {
        match self {
            ColorMode::Bits8 => "BITS_8",
            ColorMode::Bits8Indexed => "BITS_8_INDEXED",
            ColorMode::Bits16 => "BITS_16",
        }
    }
}

/// Sub-pixel order of the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ColorOrder {
    Rgb,
    #[default]
    Bgr,
}

impl FromStr for ColorOrder {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_uppercase().as_str() {
            "RGB" => Ok(ColorOrder::Rgb),
            "BGR" => Ok(ColorOrder::Bgr),
            _ => Err(Error::InvalidColorOrder(s.to_string())),
        }
    }
}

impl std::fmt::Display for ColorOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColorOrder::Rgb => write!(f, "RGB"),
            ColorOrder::Bgr => write!(f, "BGR"),
        }
    }
}

/// A 256-entry RGB lookup table for 8-bit indexed color.
///
/// Always holds exactly [`PALETTE_BYTES`] bytes; construction rejects any
/// other length rather than truncating or padding.
#[derive(Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Palette {
    bytes: Vec<u8>,
}

impl Palette {
    /// Creates a palette from a flat R,G,B byte table.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        if bytes.len() != PALETTE_BYTES {
            return Err(Error::PaletteSize {
                expected: PALETTE_BYTES,
                actual: bytes.len(),
            });
        }
        Ok(Self { bytes })
    }

    /// Creates a palette from RGB triples.
    pub fn from_entries(entries: &[[u8; 3]]) -> Result<Self> {
        Self::from_bytes(entries.iter().flatten().copied().collect())
    }

    /// Returns the raw table.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns the entry at `index`.
    pub fn entry(&self, index: u8) -> [u8; 3] {
        let i = index as usize * 3;
        [self.bytes[i], self.bytes[i + 1], self.bytes[i + 2]]
    }

    /// Iterates over the RGB triples in index order.
    pub fn entries(&self) -> impl Iterator<Item = [u8; 3]> + '_ {
        self.bytes.chunks_exact(3).map(|c| [c[0], c[1], c[2]])
    }
}

impl std::fmt::Debug for Palette {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Palette({} entries)", self.bytes.len() / 3)
    }
}
