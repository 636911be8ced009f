// SPDX-License-Identifier: GPL-3.0-only
//! Video input sources

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Active video source of a display
///
/// Ordinals are stable and shared with integer-only callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u16)]
pub enum InputSource {
    /// Not yet known / fallback
    #[default]
    Default = 0,
    Hdmi1 = 1,
    Hdmi2 = 2,
    Hdmi3 = 3,
    Hdmi4 = 4,
    DisplayPort1 = 5,
    DisplayPort2 = 6,
    OpsSlot = 7,
}

impl InputSource {
    pub const ALL: [InputSource; 8] = [
        InputSource::Default,
        InputSource::Hdmi1,
        InputSource::Hdmi2,
        InputSource::Hdmi3,
        InputSource::Hdmi4,
        InputSource::DisplayPort1,
        InputSource::DisplayPort2,
        InputSource::OpsSlot,
    ];

    pub fn ordinal(self) -> u16 {
        self as u16
    }

    pub fn from_ordinal(value: u16) -> Option<Self> {
        Self::ALL.get(usize::from(value)).copied()
    }
}

impl fmt::Display for InputSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InputSource::Default => "default",
            InputSource::Hdmi1 => "hdmi1",
            InputSource::Hdmi2 => "hdmi2",
            InputSource::Hdmi3 => "hdmi3",
            InputSource::Hdmi4 => "hdmi4",
            InputSource::DisplayPort1 => "dp1",
            InputSource::DisplayPort2 => "dp2",
            InputSource::OpsSlot => "ops",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown input source '{0}'")]
pub struct ParseInputError(String);

impl FromStr for InputSource {
    type Err = ParseInputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, '.' | '-' | '_' | ' '))
            .collect::<String>()
            .to_ascii_lowercase();

        match normalized.as_str() {
            "default" => Ok(InputSource::Default),
            "hdmi1" => Ok(InputSource::Hdmi1),
            "hdmi2" => Ok(InputSource::Hdmi2),
            "hdmi3" => Ok(InputSource::Hdmi3),
            "hdmi4" => Ok(InputSource::Hdmi4),
            "dp" | "dp1" | "displayport" | "displayport1" => Ok(InputSource::DisplayPort1),
            "dp2" | "displayport2" => Ok(InputSource::DisplayPort2),
            "ops" | "opsslot" => Ok(InputSource::OpsSlot),
            _ => Err(ParseInputError(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordinals_are_stable() {
        assert_eq!(InputSource::Default.ordinal(), 0);
        assert_eq!(InputSource::Hdmi1.ordinal(), 1);
        assert_eq!(InputSource::Hdmi4.ordinal(), 4);
        assert_eq!(InputSource::DisplayPort1.ordinal(), 5);
        assert_eq!(InputSource::DisplayPort2.ordinal(), 6);
        assert_eq!(InputSource::OpsSlot.ordinal(), 7);
    }

    #[test]
    fn test_from_ordinal() {
        for input in InputSource::ALL {
            assert_eq!(InputSource::from_ordinal(input.ordinal()), Some(input));
        }
        assert_eq!(InputSource::from_ordinal(8), None);
        assert_eq!(InputSource::from_ordinal(u16::MAX), None);
    }

    #[test]
    fn test_parse_cli_names() {
        assert_eq!("HDMI.3".parse::<InputSource>(), Ok(InputSource::Hdmi3));
        assert_eq!("hdmi-2".parse::<InputSource>(), Ok(InputSource::Hdmi2));
        assert_eq!("DP".parse::<InputSource>(), Ok(InputSource::DisplayPort1));
        assert_eq!("dp2".parse::<InputSource>(), Ok(InputSource::DisplayPort2));
        assert_eq!("OPS".parse::<InputSource>(), Ok(InputSource::OpsSlot));
        assert!("vga".parse::<InputSource>().is_err());
    }
}
