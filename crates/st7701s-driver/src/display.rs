//! Display driver interface and the model factory.
//!
//! The resolver never touches panel hardware. It constructs a driver through
//! [`Model::create`] and configures it exclusively through [`PanelDriver`]
//! setters.

use crate::madctl::{Madctl, CMD_COLMOD, CMD_INVOFF, CMD_INVON, CMD_MADCTL, COLMOD_RGB565};
use crate::{
    ColorMode, ColorOrder, Error, Palette, Pin, PinRole, Result, Rotation, Transform,
    PANEL_HEIGHT, PANEL_WIDTH,
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

/// How often the display redraws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UpdateInterval {
    Every(Duration),
    /// Only redraw on explicit request.
    Never,
}

impl Default for UpdateInterval {
    fn default() -> Self {
        UpdateInterval::Every(Duration::from_secs(1))
    }
}

impl UpdateInterval {
    /// Interval in milliseconds as the firmware scheduler expects it.
    /// `Never` maps to the scheduler's "don't run" sentinel.
    pub fn as_millis(&self) -> u32 {
        match self {
            UpdateInterval::Every(d) => d.as_millis().min(u32::MAX as u128 - 1) as u32,
            UpdateInterval::Never => u32::MAX,
        }
    }
}

impl FromStr for UpdateInterval {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("never") {
            return Ok(UpdateInterval::Never);
        }
        let split = s
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .ok_or_else(|| Error::InvalidInterval(s.to_string()))?;
        let (value, unit) = s.split_at(split);
        let value: f64 = value
            .parse()
            .map_err(|_| Error::InvalidInterval(s.to_string()))?;
        let scale_ms = match unit.trim() {
            "ms" => 1.0,
            "s" | "sec" => 1_000.0,
            "min" => 60_000.0,
            "h" => 3_600_000.0,
            _ => return Err(Error::InvalidInterval(s.to_string())),
        };
        Ok(UpdateInterval::Every(Duration::from_millis(
            (value * scale_ms).round() as u64,
        )))
    }
}

/// Opaque drawing callback source, passed through to the firmware build
/// unexamined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Lambda(pub String);

/// A named display page with its own drawing callback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page {
    pub id: String,
    pub lambda: Lambda,
}

/// Supported panel models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Model {
    /// Generic 480x480 ST7701S panel.
    #[default]
    #[serde(rename = "DEFAULT")]
    Default,
}

impl Model {
    /// Configuration name of the model.
    pub fn name(&self) -> &'static str {
        match self {
            Model::Default => "DEFAULT",
        }
    }

    /// Firmware class implementing the model.
    pub fn cpp_class(&self) -> &'static str {
        match self {
            Model::Default => "st7701s::ST7701SDefault",
        }
    }

    /// Native resolution of the model.
    pub fn native_size(&self) -> (u16, u16) {
        match self {
            Model::Default => (PANEL_WIDTH, PANEL_HEIGHT),
        }
    }

    /// Whether the model inverts colors unless configured otherwise.
    pub fn inverts_by_default(&self) -> bool {
        match self {
            Model::Default => true,
        }
    }

    /// Constructs a driver instance for this model.
    pub fn create(&self) -> Box<dyn PanelDriver> {
        Box::new(St7701sDisplay::new(*self))
    }
}

impl FromStr for Model {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_uppercase().replace(' ', "_").as_str() {
            "DEFAULT" => Ok(Model::Default),
            _ => Err(Error::UnknownModel(s.to_string())),
        }
    }
}

impl std::fmt::Display for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Setter interface of a panel driver.
///
/// Calls arrive in the order the resolver emits them; later calls may rely
/// on state established by earlier ones.
pub trait PanelDriver {
    /// Model this driver was constructed for.
    fn model(&self) -> Model;

    fn set_update_interval(&mut self, interval: UpdateInterval);
    fn set_pin(&mut self, role: PinRole, pin: Pin);
    fn set_color_order(&mut self, order: ColorOrder);
    fn set_swap_xy(&mut self, swap_xy: bool);
    fn set_mirror_x(&mut self, mirror_x: bool);
    fn set_mirror_y(&mut self, mirror_y: bool);
    fn set_rotation(&mut self, rotation: Rotation);
    fn set_writer(&mut self, writer: Lambda);
    fn set_pages(&mut self, pages: Vec<Page>);
    fn set_dimensions(&mut self, width: u16, height: u16);
    fn set_offsets(&mut self, offset_x: i16, offset_y: i16);
    fn set_buffer_color_mode(&mut self, mode: ColorMode);
    fn set_palette(&mut self, palette: Palette);
    fn invert_colors(&mut self, invert: bool);

    /// Pulses the reset line. Returns false when no reset pin is bound.
    fn reset(&mut self) -> bool;

    /// Logs the effective configuration.
    fn dump_config(&self);
}

/// Driver state for an ST7701S panel.
#[derive(Debug, Clone)]
pub struct St7701sDisplay {
    model: Model,
    update_interval: UpdateInterval,
    pins: BTreeMap<PinRole, Pin>,
    width: u16,
    height: u16,
    offset_x: i16,
    offset_y: i16,
    color_order: ColorOrder,
    transform: Transform,
    rotation: Rotation,
    writer: Option<Lambda>,
    pages: Vec<Page>,
    color_mode: ColorMode,
    palette: Option<Palette>,
    invert: bool,
}

impl St7701sDisplay {
    /// Creates a driver with the model's power-on defaults.
    pub fn new(model: Model) -> Self {
        let (width, height) = model.native_size();
        Self {
            model,
            update_interval: UpdateInterval::default(),
            pins: BTreeMap::new(),
            width,
            height,
            offset_x: 0,
            offset_y: 0,
            color_order: ColorOrder::Bgr,
            transform: Transform::default(),
            rotation: Rotation::Deg0,
            writer: None,
            pages: Vec::new(),
            color_mode: ColorMode::Bits16,
            palette: None,
            invert: model.inverts_by_default(),
        }
    }

    pub fn update_interval(&self) -> UpdateInterval {
        self.update_interval
    }

    /// Returns the pin bound to `role`.
    pub fn pin(&self, role: PinRole) -> Option<Pin> {
        self.pins.get(&role).copied()
    }

    /// Returns (width, height) of the panel memory.
    pub fn dimensions(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    /// Returns (x, y) offset of the visible area.
    pub fn offsets(&self) -> (i16, i16) {
        (self.offset_x, self.offset_y)
    }

    pub fn color_order(&self) -> ColorOrder {
        self.color_order
    }

    pub fn color_mode(&self) -> ColorMode {
        self.color_mode
    }

    pub fn palette(&self) -> Option<&Palette> {
        self.palette.as_ref()
    }

    pub fn is_inverted(&self) -> bool {
        self.invert
    }

    pub fn writer(&self) -> Option<&Lambda> {
        self.writer.as_ref()
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    /// Transform in effect: an explicit rotation takes the place of the
    /// swap/mirror flags.
    pub fn effective_transform(&self) -> Transform {
        if self.rotation == Rotation::Deg0 {
            self.transform
        } else {
            self.rotation.transform()
        }
    }

    /// Size seen by drawing code after the transform.
    pub fn logical_size(&self) -> (u16, u16) {
        self.effective_transform()
            .logical_size(self.width, self.height)
    }

    /// MADCTL value programmed during setup.
    pub fn madctl(&self) -> Madctl {
        Madctl::new(self.effective_transform(), self.color_order)
    }

    /// Framebuffer size in bytes for the current color mode.
    pub fn buffer_len(&self) -> usize {
        self.width as usize * self.height as usize * self.color_mode.bytes_per_pixel()
    }

    /// Register writes (command, parameters) derived from the configuration,
    /// in the order setup sends them.
    pub fn register_writes(&self) -> Vec<(u8, Vec<u8>)> {
        let inversion = if self.invert { CMD_INVON } else { CMD_INVOFF };
        vec![
            (CMD_MADCTL, vec![self.madctl().0]),
            (CMD_COLMOD, vec![COLMOD_RGB565]),
            (inversion, Vec::new()),
        ]
    }
}

impl PanelDriver for St7701sDisplay {
    fn model(&self) -> Model {
        self.model
    }

    fn set_update_interval(&mut self, interval: UpdateInterval) {
        self.update_interval = interval;
    }

    fn set_pin(&mut self, role: PinRole, pin: Pin) {
        debug!("Binding {} to {}", role, pin);
        self.pins.insert(role, pin);
    }

    fn set_color_order(&mut self, order: ColorOrder) {
        self.color_order = order;
    }

    fn set_swap_xy(&mut self, swap_xy: bool) {
        self.transform.swap_xy = swap_xy;
    }

    fn set_mirror_x(&mut self, mirror_x: bool) {
        self.transform.mirror_x = mirror_x;
    }

    fn set_mirror_y(&mut self, mirror_y: bool) {
        self.transform.mirror_y = mirror_y;
    }

    fn set_rotation(&mut self, rotation: Rotation) {
        self.rotation = rotation;
    }

    fn set_writer(&mut self, writer: Lambda) {
        self.writer = Some(writer);
    }

    fn set_pages(&mut self, pages: Vec<Page>) {
        self.pages = pages;
    }

    fn set_dimensions(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
    }

    fn set_offsets(&mut self, offset_x: i16, offset_y: i16) {
        self.offset_x = offset_x;
        self.offset_y = offset_y;
    }

    fn set_buffer_color_mode(&mut self, mode: ColorMode) {
        self.color_mode = mode;
    }

    fn set_palette(&mut self, palette: Palette) {
        self.palette = Some(palette);
    }

    fn invert_colors(&mut self, invert: bool) {
        self.invert = invert;
    }

    fn reset(&mut self) -> bool {
        match self.pin(PinRole::Reset) {
            Some(pin) => {
                debug!("Pulsing reset on {}", pin);
                true
            }
            None => {
                debug!("No reset pin bound, skipping hardware reset");
                false
            }
        }
    }

    fn dump_config(&self) {
        let (w, h) = self.logical_size();
        info!("ST7701S display ({})", self.model);
        info!("  Size: {}x{} (offset {},{})", w, h, self.offset_x, self.offset_y);
        info!(
            "  Color mode: {} ({} bytes buffer)",
            self.color_mode.cpp_name(),
            self.buffer_len()
        );
        info!("  Color order: {}", self.color_order);
        info!("  Invert colors: {}", self.invert);
        for (role, pin) in &self.pins {
            info!("  {}: {}", role, pin);
        }
        for (command, params) in self.register_writes() {
            info!("  Register 0x{:02X} <- {:02X?}", command, params);
        }
    }
}
