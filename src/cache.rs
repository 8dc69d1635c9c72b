use std::{fs, path::PathBuf};

use crate::{core::power_cut::PowerCutEvent, prelude::*, store::LocalCache};

/// Power-cut events persisted on the local machine as a JSON array.
#[must_use]
pub struct JsonFileCache(PathBuf);

impl JsonFileCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }
}

impl LocalCache for JsonFileCache {
    #[instrument(skip_all, fields(path = %self.0.display()))]
    fn load(&self) -> Result<Vec<PowerCutEvent>> {
        if !self.0.is_file() {
            debug!("no local cache yet");
            return Ok(Vec::new());
        }
        let contents = fs::read(&self.0).context("failed to read the local cache")?;
        serde_json::from_slice(&contents).context("failed to deserialize the local cache")
    }

    #[instrument(skip_all, fields(path = %self.0.display(), n_events = events.len()))]
    fn store(&self, events: &[PowerCutEvent]) -> Result {
        debug!("writing the local cache…");
        let contents = serde_json::to_vec_pretty(events)?;
        fs::write(&self.0, contents).context("failed to write the local cache")
    }
}

#[cfg(test)]
mod tests {
    use std::{env, process};

    use chrono::{TimeDelta, TimeZone, Utc};

    use super::*;
    use crate::{
        core::history::History,
        quantity::{energy::MilliwattHours, voltage::Volts},
    };

    fn event() -> PowerCutEvent {
        PowerCutEvent::builder()
            .device_id("ESP32_001")
            .start_time(Utc.timestamp_millis_opt(1_700_000_000_000).unwrap())
            .end_time(Utc.timestamp_millis_opt(1_700_000_065_000).unwrap())
            .duration(TimeDelta::milliseconds(65_000))
            .start_voltage(Volts(12.6))
            .end_voltage(Volts(12.0))
            .voltage_drop(Volts(0.6))
            .energy_consumed(MilliwattHours(12.5))
            .build()
    }

    #[test]
    fn missing_file_is_empty() -> Result {
        let cache = JsonFileCache::new(env::temp_dir().join("blackout-test-missing.json"));
        assert!(cache.load()?.is_empty());
        Ok(())
    }

    #[test]
    fn store_and_load() -> Result {
        let path = env::temp_dir().join(format!("blackout-test-{}.json", process::id()));
        let cache = JsonFileCache::new(&path);
        cache.store(&[event()])?;
        let loaded = cache.load();
        fs::remove_file(&path)?;
        assert_eq!(loaded?, [event()]);
        Ok(())
    }

    #[test]
    fn append_leaves_truncated_file_alone() -> Result {
        let path = env::temp_dir().join(format!("blackout-test-truncated-{}.json", process::id()));
        let contents = r#"[{"device_id":"ESP32_001","start_time":"2023-11-14T22:13:20Z""#;
        fs::write(&path, contents)?;

        let mut history = History::local(JsonFileCache::new(&path));
        let appended = history.append(event());
        let after = fs::read_to_string(&path);
        fs::remove_file(&path)?;

        assert!(appended.is_err());
        assert_eq!(history.events(), [event()]);
        assert_eq!(after?, contents);
        Ok(())
    }

    #[test]
    fn corrupted_file() -> Result {
        let path = env::temp_dir().join(format!("blackout-test-corrupted-{}.json", process::id()));
        fs::write(&path, "{")?;
        let loaded = JsonFileCache::new(&path).load();
        fs::remove_file(&path)?;
        assert!(loaded.is_err());
        Ok(())
    }
}
