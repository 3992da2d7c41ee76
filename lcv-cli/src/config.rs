//! Configuration loading and parsing

use anyhow::{Context, Result};
use lcv_decoder::AcquisitionConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main application configuration (loaded from config.toml)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub device: DeviceConfig,
    #[serde(default)]
    pub acquisition: AcquisitionConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeviceConfig {
    /// Explicit port name; discovered when absent
    pub port: Option<String>,
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,
    /// Substring identifying the ventilator in the USB port description
    #[serde(default = "default_port_match", rename = "match")]
    pub port_match: String,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            port: None,
            baud_rate: default_baud_rate(),
            port_match: default_port_match(),
        }
    }
}

fn default_baud_rate() -> u32 {
    lcv_decoder::DEFAULT_BAUD_RATE
}

fn default_port_match() -> String {
    "ASF".to_string()
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct OutputConfig {
    /// Export file; format chosen by extension (.csv or .json)
    pub path: Option<PathBuf>,
}

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: AppConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    config
        .acquisition
        .validate()
        .with_context(|| format!("Invalid acquisition settings in {:?}", path))?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lcv_decoder::Schema;
    use std::io::Write;

    #[test]
    fn test_config_deserialization() {
        let toml_content = r#"
            [device]
            port = "/dev/ttyACM0"
            baud_rate = 57600

            [acquisition]
            schema = "two-field"
            run_duration_secs = 30.0

            [output]
            path = "run.csv"
        "#;

        let config: AppConfig = toml::from_str(toml_content).unwrap();
        assert_eq!(config.device.port.as_deref(), Some("/dev/ttyACM0"));
        assert_eq!(config.device.baud_rate, 57600);
        assert_eq!(config.device.port_match, "ASF");
        assert_eq!(config.acquisition.schema, Schema::TwoField);
        assert_eq!(config.acquisition.run_duration_secs, 30.0);
        assert_eq!(config.acquisition.attempt_timeout_ms, 100);
        assert_eq!(config.output.path, Some(PathBuf::from("run.csv")));
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert!(config.device.port.is_none());
        assert_eq!(config.device.baud_rate, 115_200);
        assert_eq!(config.acquisition.run_duration_secs, 15.0);
        assert!(config.output.path.is_none());
    }

    #[test]
    fn test_load_config_rejects_bad_duration() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[acquisition]\nrun_duration_secs = -2.0").unwrap();

        assert!(load_config(file.path()).is_err());
    }
}
