//! ST7701S Panel Generator
//!
//! CLI that validates panel configuration and emits driver setup code.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use st7701s_config::{codegen, palette, resolve_document, Document, DriverCall, Platform, Resolution};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
enum CliPlatform {
    /// ESP32 with PSRAM
    Esp32,
    /// ESP32-S3 with PSRAM
    Esp32s3,
    /// ESP8266 (memory constrained)
    Esp8266,
    /// Raspberry Pi RP2040
    Rp2040,
    /// Host simulation, no pin checks
    Host,
}

impl From<CliPlatform> for Platform {
    fn from(platform: CliPlatform) -> Self {
        match platform {
            CliPlatform::Esp32 => Platform::Esp32,
            CliPlatform::Esp32s3 => Platform::Esp32S3,
            CliPlatform::Esp8266 => Platform::Esp8266,
            CliPlatform::Rp2040 => Platform::Rp2040,
            CliPlatform::Host => Platform::Host,
        }
    }
}

#[derive(Parser)]
#[command(name = "st7701s-gen")]
#[command(about = "Validate ST7701S panel configuration and generate driver setup code")]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file
    #[arg(short, long, default_value = "panel.toml", global = true)]
    config: PathBuf,

    /// Override the target platform from the configuration
    #[arg(long, value_enum, global = true)]
    platform: Option<CliPlatform>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the configuration without generating anything
    Check,
    /// Print the driver calls for each display
    Plan {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Generate C++ setup code
    Codegen {
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Write a swatch image of each generated palette
    Palette {
        /// Directory for the PNG previews
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let resolution = load(&cli.config, cli.platform.map(Platform::from))?;

    match cli.command {
        Commands::Check => handle_check(&resolution),
        Commands::Plan { json } => handle_plan(&resolution, json, cli.verbose),
        Commands::Codegen { output } => handle_codegen(&resolution, output.as_deref()),
        Commands::Palette { out_dir } => handle_palette(&resolution, &out_dir),
    }
}

fn load(path: &Path, platform: Option<Platform>) -> Result<Resolution> {
    let document = Document::load(path)?;
    info!("Loaded configuration from: {}", path.display());
    if document.displays.is_empty() {
        warn!("No [[display]] entries in {}", path.display());
    }

    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    let resolution = resolve_document(&document, platform, base_dir)
        .with_context(|| format!("Invalid configuration in {}", path.display()))?;
    Ok(resolution)
}

fn handle_check(resolution: &Resolution) -> Result<()> {
    println!(
        "Configuration OK: {} display(s) for {}",
        resolution.plans.len(),
        resolution.platform
    );
    for plan in &resolution.plans {
        let indexed = if plan.palette().is_some() {
            "indexed"
        } else {
            "direct"
        };
        println!("  {} ({}, {} color)", plan.id, plan.model, indexed);
    }
    Ok(())
}

fn handle_plan(resolution: &Resolution, json: bool, verbose: bool) -> Result<()> {
    if verbose {
        // Replay each plan on the driver model so its resulting state is logged
        for plan in &resolution.plans {
            let mut driver = plan.instantiate();
            if !driver.reset() {
                info!("Display '{}' has no reset pin", plan.id);
            }
            driver.dump_config();
        }
    }

    if json {
        let out = serde_json::to_string_pretty(resolution).context("Failed to serialize plan")?;
        println!("{}", out);
        return Ok(());
    }

    for plan in &resolution.plans {
        println!("Display '{}' ({}):", plan.id, plan.model);
        if !plan.auto_load.is_empty() {
            println!("  Requires: {}", plan.auto_load.join(", "));
        }
        for (i, call) in plan.calls.iter().enumerate() {
            println!("  {:>2}. {}", i + 1, describe(call));
        }
    }
    Ok(())
}

fn handle_codegen(resolution: &Resolution, output: Option<&Path>) -> Result<()> {
    let code = codegen::render(resolution);
    match output {
        Some(path) => {
            std::fs::write(path, &code).context("Failed to write generated code")?;
            println!("Generated code written to: {}", path.display());
        }
        None => print!("{}", code),
    }
    Ok(())
}

fn handle_palette(resolution: &Resolution, out_dir: &Path) -> Result<()> {
    std::fs::create_dir_all(out_dir).context("Failed to create output directory")?;
    let mut written = 0;
    for plan in &resolution.plans {
        let Some(table) = plan.palette() else {
            info!("Display '{}' uses direct color, no palette", plan.id);
            continue;
        };
        let path = out_dir.join(format!("{}_palette.png", plan.id));
        palette::preview(table)
            .save(&path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("Palette preview saved to: {}", path.display());
        written += 1;
    }
    if written == 0 {
        println!("No display generates a palette");
    }
    Ok(())
}

fn describe(call: &DriverCall) -> String {
    match call {
        DriverCall::Construct {
            model,
            update_interval,
            ..
        } => format!(
            "construct {} (update every {}ms)",
            model,
            update_interval.as_millis()
        ),
        DriverCall::SetPin { role, pin } => format!("bind {} = {}", role, pin),
        DriverCall::SetColorOrder { order } => format!("color order {}", order),
        DriverCall::SetTransform { transform } => format!(
            "transform swap_xy={} mirror_x={} mirror_y={}",
            transform.swap_xy, transform.mirror_x, transform.mirror_y
        ),
        DriverCall::SetRotation { rotation } => format!("rotation {}", rotation),
        DriverCall::SetWriter { .. } => "drawing lambda".to_string(),
        DriverCall::SetPages { pages } => {
            let ids: Vec<&str> = pages.iter().map(|p| p.id.as_str()).collect();
            format!("pages [{}]", ids.join(", "))
        }
        DriverCall::SetDimensions {
            width,
            height,
            offset_width,
            offset_height,
        } => format!(
            "dimensions {}x{} offset ({}, {})",
            width, height, offset_width, offset_height
        ),
        DriverCall::SetBufferColorMode { mode } => format!("color mode {}", mode.cpp_name()),
        DriverCall::SetPalette { id, palette } => {
            format!("palette {} ({} bytes)", id, palette.as_bytes().len())
        }
        DriverCall::InvertColors { invert } => format!("invert colors {}", invert),
    }
}
