//! End-to-end resolution of configuration files.

use image::{Rgb, RgbImage, Rgba, RgbaImage};
use proptest::prelude::*;
use st7701s_config::schema::{DimensionsRecord, RawDimensions, RawDisplay, RawPin};
use st7701s_config::{
    codegen, resolve_document, ConfigError, Document, DriverCall, PanelConfig, Plan, Platform,
};
use st7701s_driver::{ColorMode, Pin, PinRole, DATA_PIN_COUNT};
use std::path::Path;
use tempfile::TempDir;

fn write_config(dir: &TempDir, content: &str) -> std::path::PathBuf {
    let path = dir.path().join("panel.toml");
    std::fs::write(&path, content).unwrap();
    path
}

fn resolve_file(path: &Path) -> Result<st7701s_config::Resolution, ConfigError> {
    let document = Document::load(path).unwrap();
    resolve_document(&document, None, path.parent().unwrap())
}

#[test]
fn adaptive_palette_from_reference_images() {
    let dir = TempDir::new().unwrap();
    let gradient = RgbImage::from_fn(64, 32, |x, y| Rgb([(x * 4) as u8, (y * 8) as u8, 128]));
    gradient.save(dir.path().join("gradient.png")).unwrap();
    let logo = RgbaImage::from_pixel(16, 48, Rgba([255, 0, 0, 255]));
    logo.save(dir.path().join("logo.png")).unwrap();

    let path = write_config(
        &dir,
        r#"
        [[display]]
        id = "lcd"
        model = "DEFAULT"
        dc_pin = 4
        color_palette = "IMAGE_ADAPTIVE"
        color_palette_images = ["gradient.png", "logo.png"]
        "#,
    );

    let resolution = resolve_file(&path).unwrap();
    let plan = &resolution.plans[0];
    assert!(plan.calls.contains(&DriverCall::SetBufferColorMode {
        mode: ColorMode::Bits8Indexed
    }));

    let palette = plan.palette().expect("adaptive mode attaches a palette");
    assert_eq!(palette.as_bytes().len(), 768);
    let entries: Vec<[u8; 3]> = palette.entries().collect();
    assert_eq!(entries.len(), 256);
    assert!(entries.contains(&[255, 0, 0]));
}

#[test]
fn missing_image_names_the_file() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
        [[display]]
        model = "DEFAULT"
        dc_pin = 4
        color_palette = "IMAGE_ADAPTIVE"
        color_palette_images = ["missing.png"]
        "#,
    );

    let err = resolve_file(&path).unwrap_err();
    match err.root() {
        ConfigError::ImageLoad { path, .. } => assert!(path.ends_with("missing.png")),
        other => panic!("unexpected error {:?}", other),
    }
    assert!(err.to_string().contains("Could not load image file"));
}

#[test]
fn undecodable_image_is_rejected() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("broken.png"), b"not a png").unwrap();
    let path = write_config(
        &dir,
        r#"
        [[display]]
        model = "DEFAULT"
        dc_pin = 4
        color_palette = "IMAGE_ADAPTIVE"
        color_palette_images = ["broken.png"]
        "#,
    );

    assert!(matches!(
        resolve_file(&path).unwrap_err().root(),
        ConfigError::ImageLoad { .. }
    ));
}

#[test]
fn parallel_rgb_binds_every_pin_once() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
        [target]
        platform = "esp32s3"

        [[display]]
        id = "rgb"
        model = "DEFAULT"
        pclk_pin = 21
        de_pin = 40
        vsync_pin = 41
        hsync_pin = 39
        data_pins = [4, 5, 6, 7, 15, 8, 20, 3, 46, 9, 10, 11, 12, 13, 14, 0]
        backlight_pin = 38
        dimensions = [480, 480]
        "#,
    );

    let resolution = resolve_file(&path).unwrap();
    let pins: Vec<(PinRole, Pin)> = resolution.plans[0]
        .calls
        .iter()
        .filter_map(|call| match call {
            DriverCall::SetPin { role, pin } => Some((*role, *pin)),
            _ => None,
        })
        .collect();

    assert_eq!(pins.len(), 21);
    assert_eq!(pins[0], (PinRole::Pclk, Pin::new(21)));
    assert_eq!(pins[1], (PinRole::De, Pin::new(40)));
    assert_eq!(pins[2], (PinRole::Vsync, Pin::new(41)));
    assert_eq!(pins[3], (PinRole::Hsync, Pin::new(39)));
    for i in 0..DATA_PIN_COUNT {
        assert_eq!(pins[4 + i].0, PinRole::Data(i as u8));
    }
    assert_eq!(pins[20], (PinRole::Backlight, Pin::new(38)));

    let mut roles: Vec<PinRole> = pins.iter().map(|(role, _)| *role).collect();
    roles.dedup();
    assert_eq!(roles.len(), 21);
}

#[test]
fn codegen_for_document() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
        [[display]]
        id = "left"
        model = "DEFAULT"
        dc_pin = 4
        color_palette = "GRAYSCALE"

        [[display]]
        id = "right"
        model = "DEFAULT"
        dc_pin = 6
        "#,
    );

    let code = codegen::render(&resolve_file(&path).unwrap());
    assert!(code.starts_with("// Generated for ESP32"));
    assert!(code.contains("auto *left = new st7701s::ST7701SDefault();"));
    assert!(code.contains("auto *right = new st7701s::ST7701SDefault();"));
    assert!(code.contains("left->set_palette(left_palette);"));
    assert!(!code.contains("right->set_palette"));
}

fn serial_display() -> RawDisplay {
    RawDisplay {
        model: "DEFAULT".to_string(),
        dc_pin: Some(RawPin::Number(4)),
        color_palette: "NONE".to_string(),
        update_interval: "1s".to_string(),
        ..Default::default()
    }
}

fn dimension_call(plan: &Plan) -> Option<&DriverCall> {
    plan.calls
        .iter()
        .find(|call| matches!(call, DriverCall::SetDimensions { .. }))
}

proptest! {
    #[test]
    fn pair_dimensions_have_zero_offsets(width in 1u16..=2048, height in 1u16..=2048) {
        let raw = RawDisplay {
            dimensions: Some(RawDimensions::Pair([width, height])),
            ..serial_display()
        };
        let config = PanelConfig::validate(&raw, Platform::Esp32, "lcd").unwrap();
        let plan = Plan::resolve(&config, Platform::Esp32, Path::new(".")).unwrap();
        let expected = DriverCall::SetDimensions {
            width,
            height,
            offset_width: 0,
            offset_height: 0,
        };
        prop_assert_eq!(dimension_call(&plan), Some(&expected));
    }

    #[test]
    fn record_dimensions_preserve_offsets(
        width in 1u16..=2048,
        height in 1u16..=2048,
        offset_width in any::<i16>(),
        offset_height in any::<i16>(),
    ) {
        let raw = RawDisplay {
            dimensions: Some(RawDimensions::Record(DimensionsRecord {
                width,
                height,
                offset_width,
                offset_height,
            })),
            ..serial_display()
        };
        let config = PanelConfig::validate(&raw, Platform::Esp32, "lcd").unwrap();
        let plan = Plan::resolve(&config, Platform::Esp32, Path::new(".")).unwrap();
        let expected = DriverCall::SetDimensions {
            width,
            height,
            offset_width,
            offset_height,
        };
        prop_assert_eq!(dimension_call(&plan), Some(&expected));
    }

    #[test]
    fn direct_color_never_attaches_palette(
        invert in any::<Option<bool>>(),
        rotation in prop::sample::select(vec![0u16, 90, 180, 270]),
    ) {
        let raw = RawDisplay {
            invert_colors: invert,
            rotation: Some(st7701s_config::schema::RawRotation::Degrees(rotation)),
            ..serial_display()
        };
        let config = PanelConfig::validate(&raw, Platform::Esp32, "lcd").unwrap();
        let plan = Plan::resolve(&config, Platform::Esp32, Path::new(".")).unwrap();
        prop_assert!(plan.palette().is_none());
        let direct = DriverCall::SetBufferColorMode { mode: ColorMode::Bits16 };
        prop_assert!(plan.calls.contains(&direct));
    }

    #[test]
    fn omitting_any_parallel_pin_is_rejected(missing in 0usize..20) {
        let mut raw = RawDisplay {
            pclk_pin: Some(RawPin::Number(21)),
            de_pin: Some(RawPin::Number(40)),
            vsync_pin: Some(RawPin::Number(41)),
            hsync_pin: Some(RawPin::Number(39)),
            data_pins: Some((0..16).map(RawPin::Number).collect()),
            dc_pin: None,
            ..serial_display()
        };
        let expected = match missing {
            0 => { raw.pclk_pin = None; PinRole::Pclk }
            1 => { raw.de_pin = None; PinRole::De }
            2 => { raw.vsync_pin = None; PinRole::Vsync }
            3 => { raw.hsync_pin = None; PinRole::Hsync }
            n => {
                // Dropping a line shifts the rest down, so the last slot is the one missing.
                if let Some(data) = raw.data_pins.as_mut() {
                    data.remove(n - 4);
                }
                PinRole::Data(15)
            }
        };
        let result = PanelConfig::validate(&raw, Platform::Esp32S3, "lcd");
        prop_assert!(matches!(result, Err(ConfigError::MissingPin(role)) if role == expected));
    }
}
