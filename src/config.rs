// SPDX-License-Identifier: GPL-3.0-only
//! Configuration file
//!
//! ```kdl
//! log-filter "warn,panel_control=debug"
//!
//! display "lobby" {
//!     device-type 0
//!     address "10.0.0.20"
//! }
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use kdl::{KdlDocument, KdlNode, KdlValue};
use thiserror::Error;

pub const APP_DIR: &str = "panel-control";
pub const CONFIG_FILE: &str = "config.kdl";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] kdl::KdlError),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// A display declared in the config file
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DisplayConfig {
    pub name: String,
    pub device_type: u16,
    pub address: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Config {
    /// Overrides the built-in tracing filter (RUST_LOG still wins)
    pub log_filter: Option<String>,
    pub displays: Vec<DisplayConfig>,
}

/// First positional argument of a node
fn first_arg(node: &KdlNode) -> Option<&KdlValue> {
    node.entries()
        .iter()
        .find(|entry| entry.name().is_none())
        .map(|entry| entry.value())
}

fn string_arg(node: &KdlNode) -> Result<String, ConfigError> {
    first_arg(node)
        .and_then(KdlValue::as_string)
        .map(str::to_string)
        .ok_or_else(|| {
            ConfigError::Invalid(format!("'{}' expects a string", node.name().value()))
        })
}

fn parse_display(node: &KdlNode) -> Result<DisplayConfig, ConfigError> {
    let name = string_arg(node)?;
    let mut device_type = None;
    let mut address = None;

    for child in node.children().map(KdlDocument::nodes).unwrap_or_default() {
        match child.name().value() {
            "device-type" => {
                let value = first_arg(child)
                    .and_then(KdlValue::as_integer)
                    .and_then(|v| u16::try_from(v).ok())
                    .ok_or_else(|| {
                        ConfigError::Invalid(format!(
                            "display '{}': device-type must be an integer 0-65535",
                            name
                        ))
                    })?;
                device_type = Some(value);
            }
            "address" => address = Some(string_arg(child)?),
            other => warn!("display '{}': ignoring unknown setting '{}'", name, other),
        }
    }

    Ok(DisplayConfig {
        device_type: device_type.unwrap_or_default(),
        address: address
            .ok_or_else(|| ConfigError::Invalid(format!("display '{}' has no address", name)))?,
        name,
    })
}

impl Config {
    /// `$XDG_CONFIG_HOME/panel-control/config.kdl`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
    }

    /// Load from `path`; a missing file yields the defaults
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(text) => {
                debug!("Loading config from {}", path.display());
                Self::parse(&text)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No config at {}, using defaults", path.display());
                Ok(Self::default())
            }
            Err(source) => Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let doc: KdlDocument = text.parse()?;
        let mut config = Self::default();

        for node in doc.nodes() {
            match node.name().value() {
                "log-filter" => config.log_filter = Some(string_arg(node)?),
                "display" => config.displays.push(parse_display(node)?),
                other => warn!("Ignoring unknown config node '{}'", other),
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut names = HashSet::new();
        for display in &self.displays {
            if display.name.trim().is_empty() {
                return Err(ConfigError::Invalid("display name cannot be empty".into()));
            }
            if display.address.trim().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "display '{}' address cannot be empty",
                    display.name
                )));
            }
            if !names.insert(display.name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "display '{}' is declared twice",
                    display.name
                )));
            }
        }
        Ok(())
    }

    /// Find a display by name
    pub fn display(&self, name: &str) -> Option<&DisplayConfig> {
        self.displays.iter().find(|d| d.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_displays() {
        let config = Config::parse(
            r#"
            log-filter "debug"
            display "lobby" {
                device-type 0
                address "10.0.0.20"
            }
            display "boardroom" {
                address "planar-boardroom.local"
            }
            "#,
        )
        .unwrap();

        assert_eq!(config.log_filter.as_deref(), Some("debug"));
        assert_eq!(config.displays.len(), 2);
        assert_eq!(
            config.display("lobby"),
            Some(&DisplayConfig {
                name: "lobby".into(),
                device_type: 0,
                address: "10.0.0.20".into(),
            })
        );
        assert_eq!(config.display("boardroom").unwrap().device_type, 0);
        assert!(config.display("atrium").is_none());
    }

    #[test]
    fn test_missing_address_rejected() {
        let err = Config::parse(r#"display "lobby" { device-type 0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_out_of_range_device_type_rejected() {
        let err = Config::parse(
            r#"display "lobby" {
                device-type 70000
                address "10.0.0.20"
            }"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let err = Config::parse(
            r#"
            display "lobby" { address "10.0.0.20"; }
            display "lobby" { address "10.0.0.21"; }
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_syntax_error() {
        assert!(matches!(Config::parse("display \"lobby"), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let path = std::env::temp_dir().join("panel-control-test-does-not-exist.kdl");
        assert_eq!(Config::load(&path).unwrap(), Config::default());
    }
}
