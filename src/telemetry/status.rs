use std::{
    fmt::{Display, Formatter},
    str::FromStr,
};

use serde::{Deserialize, Serialize};

/// Enumerated status value published by the device firmware.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub enum Status {
    #[serde(rename = "ON")]
    On,

    #[serde(rename = "OFF")]
    Off,

    /// Emergency light follows the power-cut detector.
    #[serde(rename = "AUTO")]
    Auto,

    /// Output pulsed once, used by the intensity control.
    #[serde(rename = "PULSE")]
    Pulse,

    #[serde(rename = "NORMAL")]
    Normal,

    #[serde(rename = "POWER_CUT")]
    PowerCut,
}

impl Status {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::On => "ON",
            Self::Off => "OFF",
            Self::Auto => "AUTO",
            Self::Pulse => "PULSE",
            Self::Normal => "NORMAL",
            Self::PowerCut => "POWER_CUT",
        }
    }
}

impl Display for Status {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct UnknownStatus;

impl FromStr for Status {
    type Err = UnknownStatus;

    fn from_str(status: &str) -> Result<Self, Self::Err> {
        match status {
            "ON" => Ok(Self::On),
            "OFF" => Ok(Self::Off),
            "AUTO" => Ok(Self::Auto),
            "PULSE" => Ok(Self::Pulse),
            "NORMAL" => Ok(Self::Normal),
            "POWER_CUT" => Ok(Self::PowerCut),
            _ => Err(UnknownStatus),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_ok() {
        assert_eq!("ON".parse(), Ok(Status::On));
        assert_eq!("OFF".parse(), Ok(Status::Off));
        assert_eq!("POWER_CUT".parse(), Ok(Status::PowerCut));
    }

    #[test]
    fn parse_is_case_sensitive() {
        assert_eq!("on".parse::<Status>(), Err(UnknownStatus));
    }

    #[test]
    fn parse_rejects_numeric_flags() {
        assert_eq!("1".parse::<Status>(), Err(UnknownStatus));
        assert_eq!("0".parse::<Status>(), Err(UnknownStatus));
    }

    #[test]
    fn display_matches_wire_format() {
        for status in [Status::On, Status::Auto, Status::Pulse, Status::PowerCut] {
            assert_eq!(status.to_string().parse(), Ok(status));
        }
    }
}
