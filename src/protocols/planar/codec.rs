// SPDX-License-Identifier: GPL-3.0-only
//! Planar ASCII control protocol
//!
//! Commands look like `Display.Power=ON\r`. The display pushes status lines
//! like `MULTI.VIEW:QUAD` whenever a property changes.

use thiserror::Error;

use crate::display::InputSource;

/// Terminator appended to every outbound command
const TERMINATOR: char = '\r';

/// Largest volume the display accepts
const MAX_PERCENT: u16 = 100;

const TAG_POWER: &str = "DISPLAY.POWER";
const TAG_VOLUME: &str = "AUDIO.VOLUME";
const TAG_MULTI_VIEW: &str = "MULTI.VIEW";
const TAG_SOURCE: &str = "SOURCE.SELECT(ZONE.1)";

/// Recognized status tags, matched in this order
const STATUS_TAGS: [(&str, StatusKind); 4] = [
    (TAG_POWER, StatusKind::Power),
    (TAG_VOLUME, StatusKind::Volume),
    (TAG_MULTI_VIEW, StatusKind::MultiView),
    (TAG_SOURCE, StatusKind::Source),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StatusKind {
    Power,
    Volume,
    MultiView,
    Source,
}

/// Command sent to the display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanarCommand {
    property: &'static str,
    value: String,
}

impl PlanarCommand {
    fn new(property: &'static str, value: impl Into<String>) -> Self {
        Self {
            property,
            value: value.into(),
        }
    }

    pub fn power(on: bool) -> Self {
        Self::new("Display.Power", if on { "ON" } else { "OFF" })
    }

    /// Volume on the 0..=65535 scale, sent as a 0..=100 percent
    pub fn volume(level: u16) -> Self {
        Self::new("Audio.Volume", level_to_percent(level).to_string())
    }

    /// `None` if the display has no such input
    pub fn input(input: InputSource) -> Option<Self> {
        input_code(input).map(|code| Self::new("Source.Select(Zone.1)", code))
    }

    pub fn multi_view(quad: bool) -> Self {
        Self::new("Multi.View", if quad { "Quad" } else { "Single" })
    }

    /// Wire form, terminated with a carriage return
    pub fn to_wire(&self) -> String {
        format!("{}={}{}", self.property, self.value, TERMINATOR)
    }
}

/// Wire code for an input; Default selects the first HDMI port
fn input_code(input: InputSource) -> Option<&'static str> {
    match input {
        InputSource::Default | InputSource::Hdmi1 => Some("HDMI.1"),
        InputSource::Hdmi2 => Some("HDMI.2"),
        InputSource::Hdmi3 => Some("HDMI.3"),
        InputSource::Hdmi4 => Some("HDMI.4"),
        InputSource::DisplayPort1 => Some("DP"),
        // Only one DisplayPort connector
        InputSource::DisplayPort2 => None,
        InputSource::OpsSlot => Some("OPS"),
    }
}

fn input_from_code(code: &str) -> Option<InputSource> {
    match code {
        "OPS" => Some(InputSource::OpsSlot),
        "HDMI.1" => Some(InputSource::Hdmi1),
        "HDMI.2" => Some(InputSource::Hdmi2),
        "HDMI.3" => Some(InputSource::Hdmi3),
        "HDMI.4" => Some(InputSource::Hdmi4),
        "DP" => Some(InputSource::DisplayPort1),
        _ => None,
    }
}

/// Scale 0..=65535 down to the display's 0..=100, rounding down
pub fn level_to_percent(level: u16) -> u16 {
    (u32::from(level) * u32::from(MAX_PERCENT) / u32::from(u16::MAX)) as u16
}

/// Scale a 0..=100 percent up to 0..=65535, rounding down
///
/// Percents above 100 are clamped.
pub fn percent_to_level(percent: u16) -> u16 {
    let percent = percent.min(MAX_PERCENT);
    (u32::from(percent) * u32::from(u16::MAX) / u32::from(MAX_PERCENT)) as u16
}

/// Property value reported by the display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feedback {
    Power(bool),
    /// Already scaled to 0..=65535
    Volume(u16),
    QuadView(bool),
    Input(InputSource),
}

/// Why a status line did not produce feedback
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("no ':' delimiter")]
    MissingDelimiter,
    #[error("unrecognized property '{0}'")]
    UnrecognizedKey(String),
    #[error("invalid volume '{0}'")]
    InvalidVolume(String),
    #[error("unknown input '{0}'")]
    UnknownInput(String),
}

impl DecodeError {
    /// Noise the display is expected to produce; not worth more than a trace
    pub fn is_noise(&self) -> bool {
        matches!(self, DecodeError::MissingDelimiter | DecodeError::UnrecognizedKey(_))
    }
}

/// Decode one status line such as `AUDIO.VOLUME:40`
pub fn decode(line: &str) -> Result<Feedback, DecodeError> {
    let line = line.to_uppercase();
    let (key, value) = line.split_once(':').ok_or(DecodeError::MissingDelimiter)?;

    let kind = STATUS_TAGS
        .iter()
        .find(|(tag, _)| key.contains(tag))
        .map(|(_, kind)| *kind)
        .ok_or_else(|| DecodeError::UnrecognizedKey(key.to_string()))?;

    match kind {
        StatusKind::Power => Ok(Feedback::Power(value.contains("ON"))),
        StatusKind::Volume => {
            let value = value.trim();
            let percent: u32 = value
                .parse()
                .map_err(|_| DecodeError::InvalidVolume(value.to_string()))?;
            let percent = percent.min(u32::from(MAX_PERCENT)) as u16;
            Ok(Feedback::Volume(percent_to_level(percent)))
        }
        StatusKind::MultiView => Ok(Feedback::QuadView(value.contains("QUAD"))),
        StatusKind::Source => input_from_code(value)
            .map(Feedback::Input)
            .ok_or_else(|| DecodeError::UnknownInput(value.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_encoding() {
        assert_eq!(PlanarCommand::power(true).to_wire(), "Display.Power=ON\r");
        assert_eq!(PlanarCommand::power(false).to_wire(), "Display.Power=OFF\r");
        assert_eq!(PlanarCommand::multi_view(true).to_wire(), "Multi.View=Quad\r");
        assert_eq!(PlanarCommand::multi_view(false).to_wire(), "Multi.View=Single\r");
        assert_eq!(PlanarCommand::volume(u16::MAX).to_wire(), "Audio.Volume=100\r");
        assert_eq!(PlanarCommand::volume(0).to_wire(), "Audio.Volume=0\r");
    }

    #[test]
    fn test_input_encoding() {
        let wire = |input| PlanarCommand::input(input).map(|c| c.to_wire());
        assert_eq!(wire(InputSource::Default).as_deref(), Some("Source.Select(Zone.1)=HDMI.1\r"));
        assert_eq!(wire(InputSource::Hdmi3).as_deref(), Some("Source.Select(Zone.1)=HDMI.3\r"));
        assert_eq!(wire(InputSource::DisplayPort1).as_deref(), Some("Source.Select(Zone.1)=DP\r"));
        assert_eq!(wire(InputSource::OpsSlot).as_deref(), Some("Source.Select(Zone.1)=OPS\r"));
        assert_eq!(wire(InputSource::DisplayPort2), None);
    }

    #[test]
    fn test_volume_scaling() {
        assert_eq!(level_to_percent(32767), 49);
        assert_eq!(percent_to_level(49), 32112);
        assert_eq!(level_to_percent(u16::MAX), 100);
        assert_eq!(percent_to_level(100), u16::MAX);
        assert_eq!(percent_to_level(250), u16::MAX);
    }

    #[test]
    fn test_volume_round_trip_error_is_bounded() {
        // One percent step is 655.35 units; truncation happens on the way out
        let step = u32::from(u16::MAX) / 100 + 1;
        for level in (0..=u16::MAX).step_by(97).chain([u16::MAX]) {
            let back = percent_to_level(level_to_percent(level));
            assert!(back <= level, "level {} came back as {}", level, back);
            assert!(u32::from(level - back) <= step, "level {} came back as {}", level, back);
        }
    }

    #[test]
    fn test_decode_power() {
        assert_eq!(decode("DISPLAY.POWER:ON"), Ok(Feedback::Power(true)));
        assert_eq!(decode("display.power:on"), Ok(Feedback::Power(true)));
        assert_eq!(decode("DISPLAY.POWER:STANDBY"), Ok(Feedback::Power(false)));
        assert_eq!(decode("DISPLAY.POWER:OFF"), Ok(Feedback::Power(false)));
    }

    #[test]
    fn test_decode_volume() {
        assert_eq!(decode("AUDIO.VOLUME:49"), Ok(Feedback::Volume(32112)));
        assert_eq!(decode("AUDIO.VOLUME:100"), Ok(Feedback::Volume(u16::MAX)));
        assert_eq!(decode("AUDIO.VOLUME: 0 "), Ok(Feedback::Volume(0)));
        assert_eq!(decode("AUDIO.VOLUME:400"), Ok(Feedback::Volume(u16::MAX)));
        assert_eq!(
            decode("AUDIO.VOLUME:LOUD"),
            Err(DecodeError::InvalidVolume("LOUD".into()))
        );
        assert_eq!(decode("AUDIO.VOLUME:-5"), Err(DecodeError::InvalidVolume("-5".into())));
    }

    #[test]
    fn test_decode_multi_view_and_source() {
        assert_eq!(decode("MULTI.VIEW:QUAD"), Ok(Feedback::QuadView(true)));
        assert_eq!(decode("MULTI.VIEW:SINGLE"), Ok(Feedback::QuadView(false)));
        assert_eq!(decode("SOURCE.SELECT(ZONE.1):HDMI.4"), Ok(Feedback::Input(InputSource::Hdmi4)));
        assert_eq!(decode("Source.Select(Zone.1):dp"), Ok(Feedback::Input(InputSource::DisplayPort1)));
        assert_eq!(decode("SOURCE.SELECT(ZONE.1):OPS"), Ok(Feedback::Input(InputSource::OpsSlot)));
        assert_eq!(
            decode("SOURCE.SELECT(ZONE.1):VGA"),
            Err(DecodeError::UnknownInput("VGA".into()))
        );
        // Input codes must match exactly
        assert_eq!(
            decode("SOURCE.SELECT(ZONE.1): HDMI.1"),
            Err(DecodeError::UnknownInput(" HDMI.1".into()))
        );
    }

    #[test]
    fn test_decode_noise() {
        assert_eq!(decode("GARBAGE"), Err(DecodeError::MissingDelimiter));
        assert_eq!(decode("FOO.BAR:1"), Err(DecodeError::UnrecognizedKey("FOO.BAR".into())));
        // Zone 2 routing is not tracked
        assert!(decode("SOURCE.SELECT(ZONE.2):HDMI.1").unwrap_err().is_noise());
    }

    #[test]
    fn test_key_matched_by_containment() {
        assert_eq!(decode("#DISPLAY.POWER:ON"), Ok(Feedback::Power(true)));
        // Only the first ':' splits
        assert_eq!(decode("MULTI.VIEW:QUAD:1"), Ok(Feedback::QuadView(true)));
    }
}
