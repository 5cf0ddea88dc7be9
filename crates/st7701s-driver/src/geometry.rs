//! Panel geometry: rotation and axis transforms.
//!
//! A panel is configured either with a rotation, which the driver maps onto
//! the MADCTL axis bits, or with an explicit transform. Never both.

use crate::{Error, Result};
use serde::Serialize;
use std::str::FromStr;

/// Display rotation in degrees clockwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    /// Creates a rotation from a degree value.
    pub fn from_degrees(degrees: u16) -> Result<Self> {
        match degrees {
            0 => Ok(Rotation::Deg0),
            90 => Ok(Rotation::Deg90),
            180 => Ok(Rotation::Deg180),
            270 => Ok(Rotation::Deg270),
            _ => Err(Error::InvalidRotation(degrees.to_string())),
        }
    }

    /// Returns the rotation in degrees.
    pub fn degrees(&self) -> u16 {
        match self {
            Rotation::Deg0 => 0,
            Rotation::Deg90 => 90,
            Rotation::Deg180 => 180,
            Rotation::Deg270 => 270,
        }
    }

    /// Axis transform that realizes this rotation in the address mode.
    pub fn transform(&self) -> Transform {
        match self {
            Rotation::Deg0 => Transform::default(),
            Rotation::Deg90 => Transform {
                swap_xy: true,
                mirror_x: true,
                mirror_y: false,
            },
            Rotation::Deg180 => Transform {
                swap_xy: false,
                mirror_x: true,
                mirror_y: true,
            },
            Rotation::Deg270 => Transform {
                swap_xy: true,
                mirror_x: false,
                mirror_y: true,
            },
        }
    }
}

impl FromStr for Rotation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim().trim_end_matches('°').trim();
        let degrees = trimmed
            .parse::<u16>()
            .map_err(|_| Error::InvalidRotation(s.to_string()))?;
        Self::from_degrees(degrees).map_err(|_| Error::InvalidRotation(s.to_string()))
    }
}

impl std::fmt::Display for Rotation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}°", self.degrees())
    }
}

/// Axis swap and mirroring applied to logical coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Transform {
    pub swap_xy: bool,
    pub mirror_x: bool,
    pub mirror_y: bool,
}

impl Transform {
    /// Returns the (width, height) seen by drawing code for a panel of the
    /// given native size.
    pub fn logical_size(&self, width: u16, height: u16) -> (u16, u16) {
        if self.swap_xy {
            (height, width)
        } else {
            (width, height)
        }
    }
}
