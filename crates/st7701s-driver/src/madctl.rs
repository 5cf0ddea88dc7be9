//! ST7701S register definitions and MADCTL (memory data access control)
//! encoding.

use crate::{ColorOrder, Transform};

/// Memory data access control command.
pub const CMD_MADCTL: u8 = 0x36;
/// Interface pixel format command.
pub const CMD_COLMOD: u8 = 0x3A;
/// COLMOD value for 16 bits per pixel on the bus.
pub const COLMOD_RGB565: u8 = 0x55;
/// Display inversion off.
pub const CMD_INVOFF: u8 = 0x20;
/// Display inversion on.
pub const CMD_INVON: u8 = 0x21;

/// Bit 7: bottom to top.
pub const MADCTL_MY: u8 = 0x80;
/// Bit 6: right to left.
pub const MADCTL_MX: u8 = 0x40;
/// Bit 5: row/column exchange.
pub const MADCTL_MV: u8 = 0x20;
/// Bit 3: blue-green-red pixel order.
pub const MADCTL_BGR: u8 = 0x08;

/// MADCTL register value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Madctl(pub u8);

impl Madctl {
    /// Encodes an axis transform and color order.
    pub fn new(transform: Transform, order: ColorOrder) -> Self {
        let mut bits = 0;
        if transform.mirror_y {
            bits |= MADCTL_MY;
        }
        if transform.mirror_x {
            bits |= MADCTL_MX;
        }
        if transform.swap_xy {
            bits |= MADCTL_MV;
        }
        if order == ColorOrder::Bgr {
            bits |= MADCTL_BGR;
        }
        Self(bits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Rotation;

    #[test]
    fn test_encode() {
        assert_eq!(Madctl::new(Transform::default(), ColorOrder::Rgb).0, 0x00);
        assert_eq!(Madctl::new(Transform::default(), ColorOrder::Bgr).0, 0x08);

        let all = Transform {
            swap_xy: true,
            mirror_x: true,
            mirror_y: true,
        };
        assert_eq!(Madctl::new(all, ColorOrder::Rgb).0, 0xE0);
        assert_eq!(
            Madctl::new(Rotation::Deg90.transform(), ColorOrder::Bgr).0,
            MADCTL_MV | MADCTL_MX | MADCTL_BGR
        );
    }
}
