//! Validated panel configuration.
//!
//! [`PanelConfig::validate`] turns a [`RawDisplay`] into a typed
//! configuration in which every exclusive group is a sum type. Rules are
//! checked in a fixed order so the same input always reports the same error.

use crate::schema::{RawDimensions, RawDisplay, RawPin, RawRotation};
use crate::{ConfigError, Platform, Result};
use st7701s_driver::{
    ColorMode, ColorOrder, Lambda, Model, Page, Pin, PinRole, Rotation, Transform,
    UpdateInterval, DATA_PIN_COUNT,
};
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Bus the panel is attached to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interface {
    /// SPI-style bus with a data/command select line.
    Serial { dc: Pin },
    /// 16-bit parallel RGB bus.
    ParallelRgb(ParallelPins),
}

/// Pins of the parallel RGB bus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParallelPins {
    pub pclk: Pin,
    pub de: Pin,
    pub vsync: Pin,
    pub hsync: Pin,
    pub data: [Pin; DATA_PIN_COUNT],
    pub backlight: Option<Pin>,
}

impl Interface {
    /// Interface pin bindings in emission order.
    pub fn pins(&self) -> Vec<(PinRole, Pin)> {
        match self {
            Interface::Serial { dc } => vec![(PinRole::Dc, *dc)],
            Interface::ParallelRgb(p) => {
                let mut pins = vec![
                    (PinRole::Pclk, p.pclk),
                    (PinRole::De, p.de),
                    (PinRole::Vsync, p.vsync),
                    (PinRole::Hsync, p.hsync),
                ];
                pins.extend(
                    p.data
                        .iter()
                        .enumerate()
                        .map(|(i, pin)| (PinRole::Data(i as u8), *pin)),
                );
                if let Some(backlight) = p.backlight {
                    pins.push((PinRole::Backlight, backlight));
                }
                pins
            }
        }
    }

    pub fn is_parallel(&self) -> bool {
        matches!(self, Interface::ParallelRgb(_))
    }
}

/// Panel memory size and visible-area offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u16,
    pub height: u16,
    pub offset_width: i16,
    pub offset_height: i16,
}

/// Orientation of the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Geometry {
    Rotation(Rotation),
    Transform(Transform),
}

/// How frames are drawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rendering {
    Lambda(Lambda),
    Pages(Vec<Page>),
}

/// Source of the indexed-color palette.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaletteMode {
    /// 16-bit direct color, no palette.
    None,
    /// 256-step grey ramp.
    Grayscale,
    /// Quantized from reference images.
    ImageAdaptive { images: Vec<PathBuf> },
}

impl PaletteMode {
    /// Framebuffer color mode implied by the palette source.
    pub fn color_mode(&self) -> ColorMode {
        match self {
            PaletteMode::None => ColorMode::Bits16,
            PaletteMode::Grayscale | PaletteMode::ImageAdaptive { .. } => ColorMode::Bits8Indexed,
        }
    }
}

/// A validated panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelConfig {
    pub id: String,
    pub model: Model,
    pub interface: Interface,
    pub reset_pin: Option<Pin>,
    pub dimensions: Option<Dimensions>,
    pub geometry: Option<Geometry>,
    pub palette_mode: PaletteMode,
    pub palette_id: String,
    pub invert_colors: Option<bool>,
    pub color_order: Option<ColorOrder>,
    pub update_interval: UpdateInterval,
    pub rendering: Option<Rendering>,
}

impl PanelConfig {
    /// Validates one display. `default_id` names the display when the
    /// configuration does not.
    pub fn validate(raw: &RawDisplay, platform: Platform, default_id: &str) -> Result<Self> {
        let id = raw.id.clone().unwrap_or_else(|| default_id.to_string());
        check_id(&id)?;
        debug!("Validating display '{}' for {}", id, platform);

        let palette_mode = validate_palette(raw)?;

        platform.check_model(&raw.model)?;
        let model: Model = raw.model.parse()?;

        let geometry = match (&raw.rotation, &raw.transform) {
            (Some(_), Some(_)) => {
                return Err(ConfigError::MutuallyExclusive {
                    first: "rotation",
                    second: "transform",
                })
            }
            (Some(rotation), None) => Some(Geometry::Rotation(parse_rotation(rotation)?)),
            (None, Some(t)) => Some(Geometry::Transform(Transform {
                swap_xy: t.swap_xy,
                mirror_x: t.mirror_x,
                mirror_y: t.mirror_y,
            })),
            (None, None) => None,
        };

        let rendering = match (&raw.lambda, &raw.pages) {
            (Some(_), Some(_)) => {
                return Err(ConfigError::MutuallyExclusive {
                    first: "pages",
                    second: "lambda",
                })
            }
            (Some(lambda), None) => Some(Rendering::Lambda(Lambda(lambda.clone()))),
            (None, Some(pages)) => {
                if pages.is_empty() {
                    return Err(ConfigError::EmptyPages);
                }
                let pages = pages
                    .iter()
                    .enumerate()
                    .map(|(i, page)| -> Result<Page> {
                        let page_id = page.id.clone().unwrap_or_else(|| format!("{}_page_{}", id, i));
                        check_id(&page_id)?;
                        Ok(Page {
                            id: page_id,
                            lambda: Lambda(page.lambda.clone()),
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;
                Some(Rendering::Pages(pages))
            }
            (None, None) => None,
        };

        let interface = validate_interface(raw)?;
        let reset_pin = raw.reset_pin.map(pin);
        check_pins(&interface, reset_pin, platform)?;

        let dimensions = raw.dimensions.as_ref().map(parse_dimensions).transpose()?;
        let color_order = raw
            .color_order
            .as_deref()
            .map(str::parse::<ColorOrder>)
            .transpose()?;
        let update_interval: UpdateInterval = raw.update_interval.parse()?;

        if interface.is_parallel() && (color_order.is_some() || geometry.is_some()) {
            warn!(
                "Display '{}': color order and geometry settings on the parallel RGB bus depend on driver support",
                id
            );
        }

        let palette_id = raw
            .raw_data_id
            .clone()
            .unwrap_or_else(|| format!("{}_palette", id));
        check_id(&palette_id)?;

        Ok(Self {
            palette_id,
            id,
            model,
            interface,
            reset_pin,
            dimensions,
            geometry,
            palette_mode,
            invert_colors: raw.invert_colors,
            color_order,
            update_interval,
            rendering,
        })
    }
}

/// Ids become C++ variable names in generated code.
fn check_id(id: &str) -> Result<()> {
    let mut chars = id.chars();
    let valid = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(ConfigError::InvalidId(id.to_string()))
    }
}

fn validate_palette(raw: &RawDisplay) -> Result<PaletteMode> {
    let adaptive = raw.color_palette.eq_ignore_ascii_case("IMAGE_ADAPTIVE");
    if adaptive && raw.color_palette_images.is_empty() {
        return Err(ConfigError::AdaptivePaletteWithoutImages);
    }
    if !raw.color_palette_images.is_empty() && !adaptive {
        return Err(ConfigError::PaletteImagesWithoutAdaptiveMode);
    }
    match raw.color_palette.to_uppercase().as_str() {
        "NONE" => Ok(PaletteMode::None),
        "GRAYSCALE" => Ok(PaletteMode::Grayscale),
        "IMAGE_ADAPTIVE" => Ok(PaletteMode::ImageAdaptive {
            images: raw.color_palette_images.clone(),
        }),
        _ => Err(st7701s_driver::Error::InvalidColorPalette(raw.color_palette.clone()).into()),
    }
}

fn validate_interface(raw: &RawDisplay) -> Result<Interface> {
    let parallel_given = raw.pclk_pin.is_some()
        || raw.de_pin.is_some()
        || raw.vsync_pin.is_some()
        || raw.hsync_pin.is_some()
        || raw.data_pins.is_some();

    match (raw.dc_pin, parallel_given) {
        (Some(_), true) => Err(ConfigError::MutuallyExclusive {
            first: "dc_pin",
            second: "pclk_pin",
        }),
        (Some(dc), false) => {
            if raw.backlight_pin.is_some() {
                warn!("backlight_pin is only used by the parallel RGB interface");
            }
            Ok(Interface::Serial { dc: pin(dc) })
        }
        (None, true) => validate_parallel(raw).map(Interface::ParallelRgb),
        (None, false) => Err(ConfigError::MissingInterface),
    }
}

fn validate_parallel(raw: &RawDisplay) -> Result<ParallelPins> {
    let required = |value: Option<RawPin>, role: PinRole| value.map(pin).ok_or(ConfigError::MissingPin(role));

    let pclk = required(raw.pclk_pin, PinRole::Pclk)?;
    let de = required(raw.de_pin, PinRole::De)?;
    let vsync = required(raw.vsync_pin, PinRole::Vsync)?;
    let hsync = required(raw.hsync_pin, PinRole::Hsync)?;

    let given = raw.data_pins.as_deref().unwrap_or_default();
    if given.len() > DATA_PIN_COUNT {
        return Err(ConfigError::TooManyDataPins(given.len()));
    }
    let mut data = [Pin::new(0); DATA_PIN_COUNT];
    for (i, slot) in data.iter_mut().enumerate() {
        *slot = given
            .get(i)
            .copied()
            .map(pin)
            .ok_or(ConfigError::MissingPin(PinRole::Data(i as u8)))?;
    }

    Ok(ParallelPins {
        pclk,
        de,
        vsync,
        hsync,
        data,
        backlight: raw.backlight_pin.map(pin),
    })
}

/// Rejects pins outside the platform's range and pins bound twice.
fn check_pins(interface: &Interface, reset: Option<Pin>, platform: Platform) -> Result<()> {
    let mut bound = interface.pins();
    if let Some(reset) = reset {
        bound.push((PinRole::Reset, reset));
    }

    let mut seen: HashMap<u8, PinRole> = HashMap::new();
    for (role, p) in bound {
        if let Some(max) = platform.max_gpio() {
            if p.number > max {
                return Err(ConfigError::InvalidPin {
                    role,
                    number: p.number,
                    platform,
                });
            }
        }
        if let Some(first) = seen.insert(p.number, role) {
            return Err(ConfigError::PinConflict {
                number: p.number,
                first,
                second: role,
            });
        }
    }
    Ok(())
}

fn pin(raw: RawPin) -> Pin {
    match raw {
        RawPin::Number(number) => Pin::new(number),
        RawPin::Full { number, inverted } => Pin { number, inverted },
    }
}

fn parse_rotation(raw: &RawRotation) -> Result<Rotation> {
    let rotation = match raw {
        RawRotation::Degrees(degrees) => Rotation::from_degrees(*degrees)?,
        RawRotation::Text(text) => text.parse()?,
    };
    Ok(rotation)
}

fn parse_dimensions(raw: &RawDimensions) -> Result<Dimensions> {
    let (width, height, offset_width, offset_height) = match raw {
        RawDimensions::Pair([w, h]) => (*w, *h, 0, 0),
        RawDimensions::Text(text) => {
            let (w, h) = text
                .split_once(['x', 'X'])
                .ok_or_else(|| ConfigError::InvalidDimensions(text.clone()))?;
            let parse = |s: &str| {
                s.trim()
                    .parse::<u16>()
                    .map_err(|_| ConfigError::InvalidDimensions(text.clone()))
            };
            (parse(w)?, parse(h)?, 0, 0)
        }
        RawDimensions::Record(r) => (r.width, r.height, r.offset_width, r.offset_height),
    };

    if width == 0 || height == 0 || width > i16::MAX as u16 || height > i16::MAX as u16 {
        return Err(ConfigError::InvalidDimensions(format!("{}x{}", width, height)));
    }
    Ok(Dimensions {
        width,
        height,
        offset_width,
        offset_height,
    })
}
