//! Target hardware platforms and their capabilities.

use crate::ConfigError;
use serde::Serialize;
use std::str::FromStr;

/// Models that fit in the memory of a constrained platform.
pub const CONSTRAINED_MODEL_ALLOW_LIST: [&str; 6] = [
    "M5STACK", "TFT_2.4", "TFT_2.4R", "ILI9341", "ILI9342", "ST7789V",
];

/// Platform the firmware is built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    #[default]
    Esp32,
    Esp32S3,
    Esp8266,
    Rp2040,
    /// Host build (simulation), no pin constraints.
    Host,
}

impl Platform {
    /// Returns true if the platform lacks memory for a full framebuffer.
    pub fn is_memory_constrained(&self) -> bool {
        matches!(self, Platform::Esp8266)
    }

    /// Highest usable GPIO number, if the platform has a fixed set.
    pub fn max_gpio(&self) -> Option<u8> {
        match self {
            Platform::Esp32 => Some(39),
            Platform::Esp32S3 => Some(48),
            Platform::Esp8266 => Some(16),
            Platform::Rp2040 => Some(29),
            Platform::Host => None,
        }
    }

    /// Firmware components the panel pulls in on this platform.
    pub fn auto_load(&self) -> &'static [&'static str] {
        match self {
            Platform::Esp32 | Platform::Esp32S3 => &["psram"],
            _ => &[],
        }
    }

    /// Rejects models that cannot run on this platform.
    ///
    /// Works on the raw model name so the allow-list can name models this
    /// driver does not implement.
    pub fn check_model(&self, model: &str) -> Result<(), ConfigError> {
        let normalized = model.trim().to_uppercase().replace(' ', "_");
        if self.is_memory_constrained() && !CONSTRAINED_MODEL_ALLOW_LIST.contains(&normalized.as_str())
        {
            return Err(ConfigError::UnsupportedOnPlatform {
                model: normalized,
                platform: *self,
            });
        }
        Ok(())
    }
}

impl FromStr for Platform {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, ConfigError> {
        match s.to_lowercase().replace('-', "").as_str() {
            "esp32" => Ok(Platform::Esp32),
            "esp32s3" => Ok(Platform::Esp32S3),
            "esp8266" => Ok(Platform::Esp8266),
            "rp2040" => Ok(Platform::Rp2040),
            "host" => Ok(Platform::Host),
            _ => Err(ConfigError::UnknownPlatform(s.to_string())),
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Platform::Esp32 => write!(f, "ESP32"),
            Platform::Esp32S3 => write!(f, "ESP32-S3"),
            Platform::Esp8266 => write!(f, "ESP8266"),
            Platform::Rp2040 => write!(f, "RP2040"),
            Platform::Host => write!(f, "host"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str() {
        assert_eq!("esp32".parse::<Platform>().unwrap(), Platform::Esp32);
        assert_eq!("ESP32-S3".parse::<Platform>().unwrap(), Platform::Esp32S3);
        assert_eq!("esp8266".parse::<Platform>().unwrap(), Platform::Esp8266);
        assert!("avr".parse::<Platform>().is_err());
    }

    #[test]
    fn test_constrained_allow_list() {
        for model in CONSTRAINED_MODEL_ALLOW_LIST {
            assert!(Platform::Esp8266.check_model(model).is_ok(), "{}", model);
        }
        assert!(Platform::Esp8266.check_model("tft 2.4r").is_ok());
        assert!(matches!(
            Platform::Esp8266.check_model("DEFAULT"),
            Err(ConfigError::UnsupportedOnPlatform { .. })
        ));
    }

    #[test]
    fn test_unconstrained_accepts_any_model() {
        assert!(Platform::Esp32.check_model("DEFAULT").is_ok());
        assert!(Platform::Rp2040.check_model("ANYTHING").is_ok());
    }

    #[test]
    fn test_auto_load() {
        assert_eq!(Platform::Esp32.auto_load(), &["psram"]);
        assert!(Platform::Esp8266.auto_load().is_empty());
    }
}
