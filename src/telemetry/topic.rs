use enumset::{EnumSet, EnumSetType};

use crate::telemetry::{DeviceBinding, DeviceId};

/// Topic suffixes the core subscribes to, relative to a device prefix.
#[derive(Debug, EnumSetType)]
pub enum Subject {
    BatteryVoltage,
    BatteryCurrent,
    MainVoltage,
    MainCurrent,
    LightIntensity,
    LedStatus,
    Led2Status,
    Led4Status,
    EmergencyStatus,
    PowerCutStatus,
    PowerCutHistory,
    CommandStatus,
}

impl Subject {
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::BatteryVoltage => "sensor/voltage",
            Self::BatteryCurrent => "sensor/current",
            Self::MainVoltage => "sensor2/voltage",
            Self::MainCurrent => "sensor2/current",
            Self::LightIntensity => "light/intensity",
            Self::LedStatus => "led/status",
            Self::Led2Status => "led2/status",
            Self::Led4Status => "led4/status",
            Self::EmergencyStatus => "emergency/status",
            Self::PowerCutStatus => "powercut/status",
            Self::PowerCutHistory => "history/powercut",
            Self::CommandStatus => "command/status",
        }
    }

    pub fn from_suffix(suffix: &str) -> Option<Self> {
        EnumSet::<Self>::all().iter().find(|subject| subject.suffix() == suffix)
    }
}

/// Maps topic prefixes onto devices.
#[must_use]
#[derive(Clone, Debug)]
pub struct TopicMap(Vec<DeviceBinding>);

impl TopicMap {
    pub const fn new(bindings: Vec<DeviceBinding>) -> Self {
        Self(bindings)
    }

    /// Full topic names for every subject of every bound device.
    pub fn subscriptions(&self) -> impl Iterator<Item = String> + '_ {
        self.0.iter().flat_map(|binding| {
            EnumSet::<Subject>::all()
                .iter()
                .map(move |subject| format!("{}/{}", binding.prefix, subject.suffix()))
        })
    }

    /// Split the topic into the owning device and the suffix after its prefix.
    ///
    /// The longest matching prefix wins. Topics outside every prefix resolve to [`None`].
    #[must_use]
    pub fn resolve<'t>(&self, topic: &'t str) -> Option<(&DeviceId, &'t str)> {
        self.0
            .iter()
            .filter_map(|binding| {
                let suffix = topic.strip_prefix(binding.prefix.as_str())?.strip_prefix('/')?;
                Some((binding, suffix))
            })
            .max_by_key(|(binding, _)| binding.prefix.len())
            .map(|(binding, suffix)| (&binding.device_id, suffix))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prelude::*;

    fn topic_map() -> Result<TopicMap> {
        Ok(TopicMap::new(vec!["ESP32_001=esp32".parse()?, "garage=esp32/garage".parse()?]))
    }

    #[test]
    fn suffix_round_trip() {
        for subject in EnumSet::<Subject>::all() {
            assert_eq!(Subject::from_suffix(subject.suffix()), Some(subject));
        }
        assert_eq!(Subject::from_suffix("sensor/power"), None);
    }

    #[test]
    fn subscriptions_cover_every_subject() -> Result {
        let subscriptions: Vec<_> = topic_map()?.subscriptions().collect();
        assert_eq!(subscriptions.len(), 24);
        assert!(subscriptions.contains(&"esp32/sensor2/voltage".to_owned()));
        assert!(subscriptions.contains(&"esp32/garage/history/powercut".to_owned()));
        Ok(())
    }

    #[test]
    fn resolve_prefers_longest_prefix() -> Result {
        let topics = topic_map()?;
        let (device_id, suffix) = topics.resolve("esp32/garage/sensor/voltage").unwrap();
        assert_eq!(device_id.as_ref(), "garage");
        assert_eq!(suffix, "sensor/voltage");

        let (device_id, suffix) = topics.resolve("esp32/sensor/voltage").unwrap();
        assert_eq!(device_id.as_ref(), "ESP32_001");
        assert_eq!(suffix, "sensor/voltage");
        Ok(())
    }

    #[test]
    fn resolve_foreign_topic() -> Result {
        let topics = topic_map()?;
        assert!(topics.resolve("chami/esp32/stats/signal").is_none());
        assert!(topics.resolve("esp32").is_none());
        assert!(topics.resolve("esp32x/sensor/voltage").is_none());
        Ok(())
    }
}
