//! ST7701S Panel Driver Interface
//!
//! Vocabulary shared between the configuration resolver and the display
//! driver: color modes, geometry, pin roles, MADCTL encoding and the
//! `PanelDriver` setter interface with its model factory.

pub mod color;
pub mod display;
pub mod error;
pub mod geometry;
pub mod madctl;
pub mod pins;

pub use color::{ColorMode, ColorOrder, Palette, PALETTE_BYTES, PALETTE_ENTRIES};
pub use display::{Lambda, Model, Page, PanelDriver, St7701sDisplay, UpdateInterval};
pub use error::{Error, Result};
pub use geometry::{Rotation, Transform};
pub use madctl::Madctl;
pub use pins::{Pin, PinRole, DATA_PIN_COUNT};

/// Native panel resolution of the ST7701S.
pub const PANEL_WIDTH: u16 = 480;
pub const PANEL_HEIGHT: u16 = 480;
