//! Resolution of validated panels into ordered driver calls.
//!
//! Call order matters to the driver: later setters may depend on the
//! addressing mode established by earlier ones. A plan always starts with
//! [`DriverCall::Construct`] and then follows
//! pins → reset → color order → geometry → rendering → dimensions →
//! color mode → palette → inversion.

use crate::panel::{Geometry, PanelConfig, Rendering};
use crate::schema::Document;
use crate::{palette, ConfigError, Platform, Result};
use serde::Serialize;
use st7701s_driver::{
    ColorMode, ColorOrder, Lambda, Model, Page, Palette, PanelDriver, Pin, PinRole, Rotation,
    Transform, UpdateInterval,
};
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info};

/// One construction or setter invocation on the driver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "call", rename_all = "snake_case")]
pub enum DriverCall {
    /// Instantiates the driver and registers it as a polling component.
    Construct {
        id: String,
        model: Model,
        update_interval: UpdateInterval,
    },
    SetPin {
        role: PinRole,
        pin: Pin,
    },
    SetColorOrder {
        order: ColorOrder,
    },
    SetTransform {
        transform: Transform,
    },
    SetRotation {
        rotation: Rotation,
    },
    SetWriter {
        lambda: Lambda,
    },
    SetPages {
        pages: Vec<Page>,
    },
    SetDimensions {
        width: u16,
        height: u16,
        offset_width: i16,
        offset_height: i16,
    },
    SetBufferColorMode {
        mode: ColorMode,
    },
    SetPalette {
        id: String,
        palette: Palette,
    },
    InvertColors {
        invert: bool,
    },
}

impl DriverCall {
    /// Invokes the call on `driver`. `Construct` is handled by
    /// [`Plan::instantiate`] and only applies the update interval here.
    pub fn apply(&self, driver: &mut dyn PanelDriver) {
        match self {
            DriverCall::Construct {
                update_interval, ..
            } => driver.set_update_interval(*update_interval),
            DriverCall::SetPin { role, pin } => driver.set_pin(*role, *pin),
            DriverCall::SetColorOrder { order } => driver.set_color_order(*order),
            DriverCall::SetTransform { transform } => {
                driver.set_swap_xy(transform.swap_xy);
                driver.set_mirror_x(transform.mirror_x);
                driver.set_mirror_y(transform.mirror_y);
            }
            DriverCall::SetRotation { rotation } => driver.set_rotation(*rotation),
            DriverCall::SetWriter { lambda } => driver.set_writer(lambda.clone()),
            DriverCall::SetPages { pages } => driver.set_pages(pages.clone()),
            DriverCall::SetDimensions {
                width,
                height,
                offset_width,
                offset_height,
            } => {
                driver.set_dimensions(*width, *height);
                driver.set_offsets(*offset_width, *offset_height);
            }
            DriverCall::SetBufferColorMode { mode } => driver.set_buffer_color_mode(*mode),
            DriverCall::SetPalette { palette, .. } => driver.set_palette(palette.clone()),
            DriverCall::InvertColors { invert } => driver.invert_colors(*invert),
        }
    }
}

/// Ordered driver calls for one display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Plan {
    pub id: String,
    pub model: Model,
    /// Firmware components required alongside the driver.
    pub auto_load: Vec<String>,
    pub calls: Vec<DriverCall>,
}

impl Plan {
    /// Resolves a validated panel into driver calls.
    pub fn resolve(config: &PanelConfig, platform: Platform, base_dir: &Path) -> Result<Self> {
        let mut calls = vec![DriverCall::Construct {
            id: config.id.clone(),
            model: config.model,
            update_interval: config.update_interval,
        }];

        calls.extend(
            config
                .interface
                .pins()
                .into_iter()
                .map(|(role, pin)| DriverCall::SetPin { role, pin }),
        );
        if let Some(pin) = config.reset_pin {
            calls.push(DriverCall::SetPin {
                role: PinRole::Reset,
                pin,
            });
        }

        if let Some(order) = config.color_order {
            calls.push(DriverCall::SetColorOrder { order });
        }

        match config.geometry {
            Some(Geometry::Transform(transform)) => {
                calls.push(DriverCall::SetTransform { transform })
            }
            Some(Geometry::Rotation(rotation)) => calls.push(DriverCall::SetRotation { rotation }),
            None => {}
        }

        match &config.rendering {
            Some(Rendering::Lambda(lambda)) => calls.push(DriverCall::SetWriter {
                lambda: lambda.clone(),
            }),
            Some(Rendering::Pages(pages)) => calls.push(DriverCall::SetPages {
                pages: pages.clone(),
            }),
            None => {}
        }

        if let Some(dims) = config.dimensions {
            calls.push(DriverCall::SetDimensions {
                width: dims.width,
                height: dims.height,
                offset_width: dims.offset_width,
                offset_height: dims.offset_height,
            });
        }

        calls.push(DriverCall::SetBufferColorMode {
            mode: config.palette_mode.color_mode(),
        });

        if let Some(palette) = palette::generate(&config.palette_mode, base_dir)? {
            calls.push(DriverCall::SetPalette {
                id: config.palette_id.clone(),
                palette,
            });
        }

        if let Some(invert) = config.invert_colors {
            calls.push(DriverCall::InvertColors { invert });
        }

        debug!("Resolved display '{}' into {} calls", config.id, calls.len());
        Ok(Self {
            id: config.id.clone(),
            model: config.model,
            auto_load: platform.auto_load().iter().map(|s| s.to_string()).collect(),
            calls,
        })
    }

    /// The palette attached by this plan, if any.
    pub fn palette(&self) -> Option<&Palette> {
        self.calls.iter().find_map(|call| match call {
            DriverCall::SetPalette { palette, .. } => Some(palette),
            _ => None,
        })
    }

    /// Replays every call on an existing driver.
    pub fn apply(&self, driver: &mut dyn PanelDriver) {
        for call in &self.calls {
            call.apply(driver);
        }
    }

    /// Constructs the driver through the model factory and configures it.
    pub fn instantiate(&self) -> Box<dyn PanelDriver> {
        let mut driver = self.model.create();
        self.apply(driver.as_mut());
        driver
    }
}

/// Result of resolving a whole document.
#[derive(Debug, Clone, Serialize)]
pub struct Resolution {
    pub platform: Platform,
    pub plans: Vec<Plan>,
}

/// Validates and resolves every display in `document`.
///
/// `platform` overrides the document's target when given. Errors carry the
/// id of the display they were raised for.
pub fn resolve_document(
    document: &Document,
    platform: Option<Platform>,
    base_dir: &Path,
) -> Result<Resolution> {
    let platform = match platform {
        Some(platform) => platform,
        None => document.target.platform.parse()?,
    };
    info!(
        "Resolving {} display(s) for {}",
        document.displays.len(),
        platform
    );

    let mut ids = HashSet::new();
    let mut plans = Vec::with_capacity(document.displays.len());
    for (index, raw) in document.displays.iter().enumerate() {
        let default_id = format!("st7701s_{}", index);
        let id = raw.id.clone().unwrap_or_else(|| default_id.clone());
        let in_display = |e: ConfigError| ConfigError::InDisplay {
            id: id.clone(),
            source: Box::new(e),
        };

        if !ids.insert(id.clone()) {
            return Err(in_display(ConfigError::DuplicateId(id.clone())));
        }
        let config = PanelConfig::validate(raw, platform, &default_id).map_err(in_display)?;
        let mut declared = vec![&config.palette_id];
        if let Some(Rendering::Pages(pages)) = &config.rendering {
            declared.extend(pages.iter().map(|page| &page.id));
        }
        for declared_id in declared {
            if !ids.insert(declared_id.clone()) {
                return Err(in_display(ConfigError::DuplicateId(declared_id.clone())));
            }
        }
        let plan = Plan::resolve(&config, platform, base_dir).map_err(in_display)?;
        plans.push(plan);
    }

    Ok(Resolution { platform, plans })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{RawDisplay, RawPin};
    use st7701s_driver::St7701sDisplay;

    fn config(toml: &str) -> PanelConfig {
        let doc = Document::parse(toml).unwrap();
        PanelConfig::validate(&doc.displays[0], Platform::Esp32, "lcd").unwrap()
    }

    fn resolve(config: &PanelConfig) -> Plan {
        Plan::resolve(config, Platform::Esp32, Path::new(".")).unwrap()
    }

    #[test]
    fn test_grayscale_scenario() {
        let plan = resolve(&config(
            r#"
            [[display]]
            model = "DEFAULT"
            color_mode = "GRAYSCALE"
            dimensions = [480, 480]
            dc_pin = 4
            "#,
        ));

        assert_eq!(plan.calls.len(), 5);
        assert_eq!(
            plan.calls[0],
            DriverCall::Construct {
                id: "lcd".to_string(),
                model: Model::Default,
                update_interval: UpdateInterval::default(),
            }
        );
        assert_eq!(
            plan.calls[1],
            DriverCall::SetPin {
                role: PinRole::Dc,
                pin: Pin::new(4)
            }
        );
        assert_eq!(
            plan.calls[2],
            DriverCall::SetDimensions {
                width: 480,
                height: 480,
                offset_width: 0,
                offset_height: 0
            }
        );
        assert_eq!(
            plan.calls[3],
            DriverCall::SetBufferColorMode {
                mode: ColorMode::Bits8Indexed
            }
        );
        match &plan.calls[4] {
            DriverCall::SetPalette { id, palette } => {
                assert_eq!(id, "lcd_palette");
                assert_eq!(palette, &palette::grayscale().unwrap());
            }
            other => panic!("expected palette, got {:?}", other),
        }
        assert_eq!(plan.auto_load, vec!["psram".to_string()]);
    }

    #[test]
    fn test_full_call_order() {
        let plan = resolve(&config(
            r#"
            [[display]]
            model = "DEFAULT"
            dc_pin = 4
            reset_pin = 5
            color_order = "RGB"
            transform = { swap_xy = true }
            lambda = "it.fill(Color::WHITE);"
            dimensions = { width = 480, height = 320, offset_width = 10 }
            invert_colors = false
            "#,
        ));

        let kinds: Vec<&str> = plan
            .calls
            .iter()
            .map(|call| match call {
                DriverCall::Construct { .. } => "construct",
                DriverCall::SetPin {
                    role: PinRole::Reset,
                    ..
                } => "reset",
                DriverCall::SetPin { .. } => "pin",
                DriverCall::SetColorOrder { .. } => "color_order",
                DriverCall::SetTransform { .. } => "transform",
                DriverCall::SetRotation { .. } => "rotation",
                DriverCall::SetWriter { .. } => "writer",
                DriverCall::SetPages { .. } => "pages",
                DriverCall::SetDimensions { .. } => "dimensions",
                DriverCall::SetBufferColorMode { .. } => "color_mode",
                DriverCall::SetPalette { .. } => "palette",
                DriverCall::InvertColors { .. } => "invert",
            })
            .collect();
        assert_eq!(
            kinds,
            vec![
                "construct",
                "pin",
                "reset",
                "color_order",
                "transform",
                "writer",
                "dimensions",
                "color_mode",
                "invert"
            ]
        );
        assert!(plan.palette().is_none());
    }

    #[test]
    fn test_instantiate_configures_driver() {
        let plan = resolve(&config(
            r#"
            [[display]]
            model = "DEFAULT"
            dc_pin = 4
            rotation = 90
            dimensions = [320, 480]
            color_palette = "GRAYSCALE"
            invert_colors = false
            "#,
        ));

        let mut display = St7701sDisplay::new(Model::Default);
        plan.apply(&mut display);
        assert_eq!(display.pin(PinRole::Dc), Some(Pin::new(4)));
        assert_eq!(display.dimensions(), (320, 480));
        assert_eq!(display.logical_size(), (480, 320));
        assert_eq!(display.color_mode(), ColorMode::Bits8Indexed);
        assert!(display.palette().is_some());
        assert!(!display.is_inverted());

        let driver = plan.instantiate();
        assert_eq!(driver.model(), Model::Default);
    }

    #[test]
    fn test_document_defaults_and_duplicates() {
        let doc = Document {
            displays: vec![
                RawDisplay {
                    model: "DEFAULT".to_string(),
                    dc_pin: Some(RawPin::Number(4)),
                    color_palette: "NONE".to_string(),
                    update_interval: "1s".to_string(),
                    ..Default::default()
                },
                RawDisplay {
                    model: "DEFAULT".to_string(),
                    dc_pin: Some(RawPin::Number(5)),
                    color_palette: "NONE".to_string(),
                    update_interval: "1s".to_string(),
                    ..Default::default()
                },
            ],
            ..Default::default()
        };
        let resolution = resolve_document(&doc, None, Path::new(".")).unwrap();
        assert_eq!(resolution.platform, Platform::Esp32);
        assert_eq!(resolution.plans[0].id, "st7701s_0");
        assert_eq!(resolution.plans[1].id, "st7701s_1");

        let mut dup = doc.clone();
        dup.displays[1].id = Some("st7701s_0".to_string());
        let err = resolve_document(&dup, None, Path::new(".")).unwrap_err();
        assert!(matches!(err.root(), ConfigError::DuplicateId(id) if id == "st7701s_0"));
    }

    #[test]
    fn test_page_ids_share_the_id_namespace() {
        let doc = Document::parse(
            r#"
            [[display]]
            id = "lcd"
            model = "DEFAULT"
            dc_pin = 4

            [[display.pages]]
            id = "lcd"
            lambda = "it.fill(Color::BLACK);"

            [[display.pages]]
            id = "lcd"
            lambda = "it.fill(Color::WHITE);"
            "#,
        )
        .unwrap();
        let err = resolve_document(&doc, None, Path::new(".")).unwrap_err();
        assert!(matches!(err.root(), ConfigError::DuplicateId(id) if id == "lcd"));

        let doc = Document::parse(
            r#"
            [[display]]
            id = "lcd"
            model = "DEFAULT"
            dc_pin = 4

            [[display.pages]]
            id = "home"
            lambda = "it.fill(Color::BLACK);"

            [[display.pages]]
            id = "home"
            lambda = "it.fill(Color::WHITE);"
            "#,
        )
        .unwrap();
        let err = resolve_document(&doc, None, Path::new(".")).unwrap_err();
        assert!(matches!(err.root(), ConfigError::DuplicateId(id) if id == "home"));

        let doc = Document::parse(
            r#"
            [[display]]
            id = "lcd"
            model = "DEFAULT"
            dc_pin = 4

            [[display.pages]]
            lambda = "it.fill(Color::BLACK);"

            [[display.pages]]
            lambda = "it.fill(Color::WHITE);"
            "#,
        )
        .unwrap();
        let resolution = resolve_document(&doc, None, Path::new(".")).unwrap();
        assert_eq!(resolution.plans.len(), 1);
    }

    #[test]
    fn test_document_error_names_display() {
        let doc = Document::parse(
            r#"
            [[display]]
            id = "front"
            model = "DEFAULT"
            dc_pin = 4
            "#,
        )
        .unwrap();
        let err = resolve_document(&doc, Some(Platform::Esp8266), Path::new(".")).unwrap_err();
        assert!(err.to_string().starts_with("display 'front': "));
        assert!(matches!(
            err.root(),
            ConfigError::UnsupportedOnPlatform { .. }
        ));
    }
}
