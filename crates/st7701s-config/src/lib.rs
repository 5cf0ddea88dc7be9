//! ST7701S Panel Configuration
//!
//! Validates panel configuration documents and resolves each display into
//! an ordered list of driver construction and setter calls.

pub mod codegen;
pub mod error;
pub mod palette;
pub mod panel;
pub mod plan;
pub mod platform;
pub mod quantize;
pub mod schema;

pub use error::{ConfigError, Result};
pub use panel::{Dimensions, Geometry, Interface, PaletteMode, PanelConfig, Rendering};
pub use plan::{resolve_document, DriverCall, Plan, Resolution};
pub use platform::Platform;
pub use schema::Document;
