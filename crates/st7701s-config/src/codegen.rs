//! C++ rendering of resolved plans for the firmware build.

use crate::plan::{DriverCall, Plan, Resolution};
use st7701s_driver::{Lambda, Page, Pin, PinRole, Rotation};

/// Palette bytes per line in the generated array.
const BYTES_PER_LINE: usize = 16;

/// Renders every plan of a resolution into one translation-unit fragment.
pub fn render(resolution: &Resolution) -> String {
    let mut out = format!("// Generated for {}\n", resolution.platform);
    for plan in &resolution.plans {
        out.push('\n');
        out.push_str(&render_plan(plan));
    }
    out
}

/// Renders the construction and setter statements for one plan.
pub fn render_plan(plan: &Plan) -> String {
    let var = &plan.id;
    let mut lines: Vec<String> = plan
        .auto_load
        .iter()
        .map(|component| format!("// requires component: {}", component))
        .collect();

    // PROGMEM arrays must be declared before the statements using them.
    for call in &plan.calls {
        if let DriverCall::SetPalette { id, palette } = call {
            lines.push(format!(
                "static const uint8_t {}[{}] PROGMEM = {{",
                id,
                palette.as_bytes().len()
            ));
            lines.extend(palette.as_bytes().chunks(BYTES_PER_LINE).map(|chunk| {
                let bytes: Vec<String> = chunk.iter().map(|b| format!("0x{:02X}", b)).collect();
                format!("    {},", bytes.join(", "))
            }));
            lines.push("};".to_string());
        }
    }

    for call in &plan.calls {
        lines.extend(call_statements(var, call));
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// Statements realizing one driver call on the variable `var`.
fn call_statements(var: &str, call: &DriverCall) -> Vec<String> {
    match call {
        DriverCall::Construct {
            model,
            update_interval,
            ..
        } => vec![
            format!("auto *{} = new {}();", var, model.cpp_class()),
            format!(
                "{}->set_update_interval({});",
                var,
                update_interval.as_millis()
            ),
            format!("App.register_component({});", var),
            format!("App.register_display({});", var),
        ],
        DriverCall::SetPin { role, pin } => vec![pin_statement(var, *role, *pin)],
        DriverCall::SetColorOrder { order } => vec![format!(
            "{}->set_color_order(display::COLOR_ORDER_{});",
            var, order
        )],
        DriverCall::SetTransform { transform } => vec![
            format!("{}->set_swap_xy({});", var, transform.swap_xy),
            format!("{}->set_mirror_x({});", var, transform.mirror_x),
            format!("{}->set_mirror_y({});", var, transform.mirror_y),
        ],
        DriverCall::SetRotation { rotation } => vec![format!(
            "{}->set_rotation({});",
            var,
            rotation_constant(*rotation)
        )],
        DriverCall::SetWriter { lambda } => {
            vec![format!("{}->set_writer({});", var, lambda_expr(lambda))]
        }
        DriverCall::SetPages { pages } => {
            let ids: Vec<&str> = pages.iter().map(|p| p.id.as_str()).collect();
            let mut statements: Vec<String> = pages.iter().map(page_statement).collect();
            statements.push(format!("{}->set_pages({{{}}});", var, ids.join(", ")));
            statements
        }
        DriverCall::SetDimensions {
            width,
            height,
            offset_width,
            offset_height,
        } => vec![
            format!("{}->set_dimensions({}, {});", var, width, height),
            format!(
                "{}->set_offsets({}, {});",
                var, offset_width, offset_height
            ),
        ],
        DriverCall::SetBufferColorMode { mode } => vec![format!(
            "{}->set_buffer_color_mode(st7701s::{});",
            var,
            mode.cpp_name()
        )],
        DriverCall::SetPalette { id, .. } => vec![format!("{}->set_palette({});", var, id)],
        DriverCall::InvertColors { invert } => {
            vec![format!("{}->invert_colors({});", var, invert)]
        }
    }
}

fn pin_statement(var: &str, role: PinRole, pin: Pin) -> String {
    let expr = format!("new GPIOPin({}, {})", pin.number, pin.inverted);
    match role {
        PinRole::Data(index) => format!("{}->{}({}, {});", var, role.setter(), index, expr),
        _ => format!("{}->{}({});", var, role.setter(), expr),
    }
}

fn rotation_constant(rotation: Rotation) -> String {
    format!("display::DISPLAY_ROTATION_{}_DEGREES", rotation.degrees())
}

fn lambda_expr(lambda: &Lambda) -> String {
    format!(
        "[=](display::Display &it) -> void {{\n    {}\n}}",
        lambda.0.trim()
    )
}

fn page_statement(page: &Page) -> String {
    format!(
        "auto *{} = new display::DisplayPage({});",
        page.id,
        lambda_expr(&page.lambda)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::panel::PanelConfig;
    use crate::schema::Document;
    use crate::Platform;
    use std::path::Path;

    fn plan(toml: &str) -> Plan {
        let doc = Document::parse(toml).unwrap();
        let config = PanelConfig::validate(&doc.displays[0], Platform::Esp32, "lcd").unwrap();
        Plan::resolve(&config, Platform::Esp32, Path::new(".")).unwrap()
    }

    #[test]
    fn test_render_serial_panel() {
        let code = render_plan(&plan(
            r#"
            [[display]]
            model = "DEFAULT"
            dc_pin = 4
            reset_pin = { number = 5, inverted = true }
            rotation = 180
            dimensions = [480, 480]
            invert_colors = true
            "#,
        ));
        assert!(code.contains("// requires component: psram"));
        assert!(code.contains("auto *lcd = new st7701s::ST7701SDefault();"));
        assert!(code.contains("lcd->set_update_interval(1000);"));
        assert!(code.contains("lcd->set_dc_pin(new GPIOPin(4, false));"));
        assert!(code.contains("lcd->set_reset_pin(new GPIOPin(5, true));"));
        assert!(code.contains("lcd->set_rotation(display::DISPLAY_ROTATION_180_DEGREES);"));
        assert!(code.contains("lcd->set_dimensions(480, 480);"));
        assert!(code.contains("lcd->set_offsets(0, 0);"));
        assert!(code.contains("lcd->set_buffer_color_mode(st7701s::BITS_16);"));
        assert!(code.contains("lcd->invert_colors(true);"));
        assert!(!code.contains("PROGMEM"));
    }

    #[test]
    fn test_render_palette_array_precedes_use() {
        let code = render_plan(&plan(
            r#"
            [[display]]
            model = "DEFAULT"
            dc_pin = 4
            color_palette = "GRAYSCALE"
            "#,
        ));
        let decl = code
            .find("static const uint8_t lcd_palette[768] PROGMEM = {")
            .unwrap();
        let usage = code.find("lcd->set_palette(lcd_palette);").unwrap();
        assert!(decl < usage);
        assert!(code.contains("0xFF, 0xFF, 0xFF,"));
    }

    #[test]
    fn test_render_pages_and_transform() {
        let code = render_plan(&plan(
            r#"
            [[display]]
            model = "DEFAULT"
            dc_pin = 4
            color_order = "BGR"
            transform = { mirror_x = true }

            [[display.pages]]
            id = "home"
            lambda = "it.fill(Color::BLACK);"
            "#,
        ));
        assert!(code.contains("lcd->set_color_order(display::COLOR_ORDER_BGR);"));
        assert!(code.contains("lcd->set_swap_xy(false);"));
        assert!(code.contains("lcd->set_mirror_x(true);"));
        assert!(code.contains("auto *home = new display::DisplayPage("));
        assert!(code.contains("lcd->set_pages({home});"));
    }
}
