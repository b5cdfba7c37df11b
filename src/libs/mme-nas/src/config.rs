//! NAS configuration
//!
//! The `nas:` section of the MME configuration file. It is validated here and
//! handed to the EMM engine when the NAS layer is initialized.
//!
//! ```yaml
//! mme:
//!   nas:
//!     timer:
//!       t3412: 3240
//!     force_reject_tau: false
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    ParseError(#[from] serde_yaml::Error),
    #[error("Configuration validation error: {0}")]
    ValidationError(String),
}

/// Configuration result type
pub type ConfigResult<T> = Result<T, ConfigError>;

/// EMM/ESM timer values in seconds (TS 24.301 10.2, 10.3)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NasTimerConf {
    pub t3402: u32,
    pub t3412: u32,
    pub t3422: u32,
    pub t3450: u32,
    pub t3460: u32,
    pub t3470: u32,
    pub t3485: u32,
    pub t3486: u32,
    pub t3489: u32,
    pub t3495: u32,
}

impl Default for NasTimerConf {
    fn default() -> Self {
        Self {
            t3402: 12 * 60,
            t3412: 54 * 60,
            t3422: 6,
            t3450: 6,
            t3460: 6,
            t3470: 6,
            t3485: 8,
            t3486: 8,
            t3489: 4,
            t3495: 8,
        }
    }
}

impl NasTimerConf {
    fn named(&self) -> [(&'static str, u32); 10] {
        [
            ("t3402", self.t3402),
            ("t3412", self.t3412),
            ("t3422", self.t3422),
            ("t3450", self.t3450),
            ("t3460", self.t3460),
            ("t3470", self.t3470),
            ("t3485", self.t3485),
            ("t3486", self.t3486),
            ("t3489", self.t3489),
            ("t3495", self.t3495),
        ]
    }
}

/// NAS configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NasConfig {
    pub timer: NasTimerConf,
    /// Reject every TAU request
    pub force_reject_tau: bool,
    /// Reject every service request
    pub force_reject_sr: bool,
    /// Skip the ESM information request during attach
    pub disable_esm_information: bool,
    /// Replace the UE requested APN with the subscribed default
    pub enable_apn_correction: bool,
}

#[derive(Debug, Default, Deserialize)]
struct MmeSection {
    #[serde(default)]
    nas: NasConfig,
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    mme: MmeSection,
}

impl NasConfig {
    /// Parse the `mme.nas` section of an MME configuration document
    pub fn from_yaml_str(yaml: &str) -> ConfigResult<Self> {
        let file: ConfigFile = serde_yaml::from_str(yaml)?;
        let config = file.mme.nas;
        config.validate()?;
        Ok(config)
    }

    /// Load the `mme.nas` section from a configuration file
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path)?;
        log::debug!("Loading NAS configuration from {}", path.display());
        Self::from_yaml_str(&yaml)
    }

    /// Check the values the engine cannot run with
    pub fn validate(&self) -> ConfigResult<()> {
        for (name, value) in self.timer.named() {
            if value == 0 {
                return Err(ConfigError::ValidationError(format!(
                    "timer {name} must be non-zero"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = NasConfig::default();
        assert_eq!(config.timer.t3412, 3240);
        assert_eq!(config.timer.t3489, 4);
        assert!(!config.force_reject_tau);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_nas_section() {
        let yaml = r#"
logger:
  level: info
mme:
  s1ap:
    server:
      - address: 127.0.0.2
  nas:
    timer:
      t3412: 600
      t3450: 3
    force_reject_sr: true
"#;
        let config = NasConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.timer.t3412, 600);
        assert_eq!(config.timer.t3450, 3);
        assert_eq!(config.timer.t3460, 6);
        assert!(config.force_reject_sr);
        assert!(!config.force_reject_tau);
    }

    #[test]
    fn test_missing_section_gives_defaults() {
        let config = NasConfig::from_yaml_str("mme: {}\n").unwrap();
        assert_eq!(config, NasConfig::default());
    }

    #[test]
    fn test_zero_timer_rejected() {
        let yaml = "mme:\n  nas:\n    timer:\n      t3422: 0\n";
        let err = NasConfig::from_yaml_str(yaml).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(msg) if msg.contains("t3422")));
    }

    #[test]
    fn test_malformed_yaml() {
        let err = NasConfig::from_yaml_str("mme:\n  nas:\n    timer: [1, 2\n").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = NasConfig::from_file("/nonexistent/nextgcore/mme.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
