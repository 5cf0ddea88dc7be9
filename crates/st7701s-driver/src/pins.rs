//! GPIO pin bindings and the roles they play on the panel bus.

use serde::{Serialize, Serializer};

/// Number of data lines on the 16-bit parallel RGB bus.
pub const DATA_PIN_COUNT: usize = 16;

/// A GPIO pin with optional inversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Pin {
    /// GPIO number.
    pub number: u8,
    /// Pin is active-low.
    pub inverted: bool,
}

impl Pin {
    /// Creates a non-inverted pin.
    pub const fn new(number: u8) -> Self {
        Self {
            number,
            inverted: false,
        }
    }

    /// Creates an inverted (active-low) pin.
    pub const fn inverted(number: u8) -> Self {
        Self {
            number,
            inverted: true,
        }
    }
}

impl std::fmt::Display for Pin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.inverted {
            write!(f, "GPIO{} (inverted)", self.number)
        } else {
            write!(f, "GPIO{}", self.number)
        }
    }
}

/// Function of a pin on the panel bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PinRole {
    /// Data/command select (serial interface).
    Dc,
    /// Panel hardware reset.
    Reset,
    /// Pixel clock.
    Pclk,
    /// Data enable.
    De,
    /// Vertical sync.
    Vsync,
    /// Horizontal sync.
    Hsync,
    /// Parallel data line 0-15.
    Data(u8),
    /// Backlight enable.
    Backlight,
}

impl PinRole {
    /// The four control roles of the parallel RGB bus, in binding order.
    pub const PARALLEL_CONTROL: [PinRole; 4] =
        [PinRole::Pclk, PinRole::De, PinRole::Vsync, PinRole::Hsync];

    /// Configuration key naming this role.
    pub fn key(&self) -> String {
        match self {
            PinRole::Dc => "dc_pin".to_string(),
            PinRole::Reset => "reset_pin".to_string(),
            PinRole::Pclk => "pclk_pin".to_string(),
            PinRole::De => "de_pin".to_string(),
            PinRole::Vsync => "vsync_pin".to_string(),
            PinRole::Hsync => "hsync_pin".to_string(),
            PinRole::Data(i) => format!("data_pins[{}]", i),
            PinRole::Backlight => "backlight_pin".to_string(),
        }
    }

    /// Name of the driver setter binding this role.
    pub fn setter(&self) -> &'static str {
        match self {
            PinRole::Dc => "set_dc_pin",
            PinRole::Reset => "set_reset_pin",
            PinRole::Pclk => "set_pclk_pin",
            PinRole::De => "set_de_pin",
            PinRole::Vsync => "set_vsync_pin",
            PinRole::Hsync => "set_hsync_pin",
            PinRole::Data(_) => "set_data_pin",
            PinRole::Backlight => "set_backlight_pin",
        }
    }
}

impl std::fmt::Display for PinRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.key())
    }
}

impl Serialize for PinRole {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
