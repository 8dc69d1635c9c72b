use std::str::FromStr;

use derive_more::{AsRef, Display};
use serde::{Deserialize, Serialize};

use crate::prelude::*;

#[derive(
    Clone,
    Debug,
    Display,
    Eq,
    Hash,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
    Deserialize,
    AsRef,
)]
#[as_ref(str)]
#[serde(transparent)]
pub struct DeviceId(String);

impl From<String> for DeviceId {
    fn from(device_id: String) -> Self {
        Self(device_id)
    }
}

impl From<&str> for DeviceId {
    fn from(device_id: &str) -> Self {
        Self(device_id.to_owned())
    }
}

/// Device identifier together with the topic prefix the device publishes under.
///
/// Parsed from `ID=prefix`, for example: `ESP32_001=esp32`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DeviceBinding {
    pub device_id: DeviceId,
    pub prefix: String,
}

impl FromStr for DeviceBinding {
    type Err = Error;

    fn from_str(binding: &str) -> Result<Self> {
        let (device_id, prefix) = binding
            .split_once('=')
            .with_context(|| format!("`{binding}` must look like `DEVICE_ID=topic/prefix`"))?;
        let (device_id, prefix) = (device_id.trim(), prefix.trim().trim_end_matches('/'));
        ensure!(!device_id.is_empty(), "device ID in `{binding}` is empty");
        ensure!(!prefix.is_empty(), "topic prefix in `{binding}` is empty");
        ensure!(
            !prefix.contains(['+', '#']),
            "topic prefix in `{binding}` must not contain wildcards",
        );
        Ok(Self { device_id: device_id.into(), prefix: prefix.to_owned() })
    }
}
