use std::cmp::Reverse;

use chrono::SecondsFormat;
use itertools::Itertools;

use crate::{
    core::{interval::Interval, power_cut::PowerCutEvent},
    prelude::*,
    quantity::{energy::MilliwattHours, voltage::Volts},
    store::{EventStore, LocalCache},
};

pub const CSV_HEADER: &str = "Event,Date Time,Duration (ms),Duration (min),\
                              Start Voltage (V),End Voltage (V),Voltage Drop (V),Energy (mWh)";

/// Merge the durable and local events into a single view, newest first.
///
/// Exact duplicates are collapsed. Events that started at the same time keep their relative
/// order, durable ones first.
#[must_use]
pub fn merge(durable: Vec<PowerCutEvent>, local: Vec<PowerCutEvent>) -> Vec<PowerCutEvent> {
    let mut events: Vec<_> = durable.into_iter().chain(local).unique().collect();
    events.sort_by_key(|event| Reverse(event.start_time));
    events
}

/// Power-cut history as seen by a client: durable store merged with the local cache.
#[must_use]
pub struct History<C> {
    /// Newest first.
    events: Vec<PowerCutEvent>,

    cache: C,

    /// The durable store was not reachable, only the local events are shown.
    is_degraded: bool,
}

impl<C: LocalCache> History<C> {
    #[instrument(skip_all, fields(?interval, limit = limit))]
    pub async fn load(store: &impl EventStore, cache: C, interval: Interval, limit: u32) -> Self {
        info!("loading the history…");
        let (durable, is_degraded) = match store.query_events(interval, limit).await {
            Ok(events) => (events, false),
            Err(error) => {
                warn!("falling back to the local cache: {error:#}");
                (Vec::new(), true)
            }
        };
        let local = cache.load().unwrap_or_else(|error| {
            error!("failed to read the local cache: {error:#}");
            Vec::new()
        });
        info!(n_durable = durable.len(), n_local = local.len(), is_degraded, "merging…");
        Self { events: merge(durable, local), cache, is_degraded }
    }

    /// Local events only, the durable store is not queried.
    pub fn local(cache: C) -> Self {
        let local = cache.load().unwrap_or_else(|error| {
            error!("failed to read the local cache: {error:#}");
            Vec::new()
        });
        Self { events: merge(Vec::new(), local), cache, is_degraded: false }
    }

    pub fn events(&self) -> &[PowerCutEvent] {
        &self.events
    }

    #[must_use]
    pub const fn is_degraded(&self) -> bool {
        self.is_degraded
    }

    /// Append the freshly received event to the merged view and the local cache.
    ///
    /// An unreadable cache is left as is: the event still lands in the view, and the error
    /// is returned.
    #[instrument(skip_all, fields(device_id = %event.device_id, start_time = %event.start_time))]
    pub fn append(&mut self, event: PowerCutEvent) -> Result {
        if self.events.contains(&event) {
            debug!("the event is already in the history");
        } else {
            let index = self.events.partition_point(|other| other.start_time >= event.start_time);
            self.events.insert(index, event.clone());
        }

        let mut cached = self.cache.load().context("failed to read the local cache")?;
        if !cached.contains(&event) {
            cached.push(event);
            self.cache.store(&cached).context("failed to update the local cache")?;
        }
        Ok(())
    }

    /// Forget the local events and empty the view. The durable store is left intact.
    #[instrument(skip_all)]
    pub fn clear(&mut self) -> Result {
        info!(n_events = self.events.len(), "clearing the history…");
        self.cache.store(&[]).context("failed to clear the local cache")?;
        self.events.clear();
        Ok(())
    }

    /// Render the view as comma-separated values, one row per event.
    #[must_use]
    pub fn to_delimited_text(&self) -> String {
        let mut text = String::from(CSV_HEADER);
        text.push('\n');
        for (index, event) in (1..).zip(&self.events) {
            text.push_str(&format!(
                "{index},{},{},{:.2},{},{},{},{}\n",
                event.start_time.to_rfc3339_opts(SecondsFormat::Millis, true),
                event.duration.num_milliseconds(),
                event.duration_minutes(),
                event.start_voltage.0,
                event.end_voltage.0,
                event.voltage_drop.0,
                event.energy_consumed.0,
            ));
        }
        text
    }

    pub fn summary(&self) -> Summary {
        Summary::from_events(&self.events)
    }
}

#[must_use]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Summary {
    pub total: usize,

    /// Rounded to whole minutes.
    pub total_downtime_minutes: f64,

    pub total_energy: MilliwattHours,
    pub average_voltage_drop: Volts,
}

impl Summary {
    #[allow(clippy::cast_precision_loss)]
    pub fn from_events(events: &[PowerCutEvent]) -> Self {
        let total_downtime_minutes =
            events.iter().map(PowerCutEvent::duration_minutes).sum::<f64>().round();
        let total_energy = events.iter().map(|event| event.energy_consumed).sum();
        let average_voltage_drop = if events.is_empty() {
            Volts::ZERO
        } else {
            Volts(events.iter().map(|event| event.voltage_drop.0).sum::<f64>() / events.len() as f64)
        };
        Self { total: events.len(), total_downtime_minutes, total_energy, average_voltage_drop }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};

    use approx::assert_abs_diff_eq;
    use chrono::{DateTime, TimeDelta, TimeZone, Utc};

    use super::*;
    use crate::error::{StoreReadError, StoreWriteError};

    #[derive(Default)]
    struct MemoryCache(RefCell<Vec<PowerCutEvent>>);

    impl LocalCache for &MemoryCache {
        fn load(&self) -> Result<Vec<PowerCutEvent>> {
            Ok(self.0.borrow().clone())
        }

        fn store(&self, events: &[PowerCutEvent]) -> Result {
            *self.0.borrow_mut() = events.to_vec();
            Ok(())
        }
    }

    struct BrokenCache;

    impl LocalCache for BrokenCache {
        fn load(&self) -> Result<Vec<PowerCutEvent>> {
            bail!("corrupted")
        }

        fn store(&self, _events: &[PowerCutEvent]) -> Result {
            bail!("read-only")
        }
    }

    /// Cannot be parsed, but accepts writes.
    #[derive(Default)]
    struct CorruptedCache(RefCell<Option<Vec<PowerCutEvent>>>);

    impl LocalCache for &CorruptedCache {
        fn load(&self) -> Result<Vec<PowerCutEvent>> {
            bail!("unexpected end of input")
        }

        fn store(&self, events: &[PowerCutEvent]) -> Result {
            *self.0.borrow_mut() = Some(events.to_vec());
            Ok(())
        }
    }

    #[derive(Default)]
    struct MockStore {
        events: Vec<PowerCutEvent>,
        is_down: bool,
        n_inserts: Cell<usize>,
    }

    impl EventStore for MockStore {
        async fn insert_event(&self, _event: &PowerCutEvent) -> Result<(), StoreWriteError> {
            self.n_inserts.set(self.n_inserts.get() + 1);
            Ok(())
        }

        async fn query_events(
            &self,
            _interval: Interval,
            _limit: u32,
        ) -> Result<Vec<PowerCutEvent>, StoreReadError> {
            if self.is_down {
                Err(StoreReadError(anyhow::anyhow!("connection refused")))
            } else {
                Ok(self.events.clone())
            }
        }
    }

    fn at(seconds: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + seconds, 0).unwrap()
    }

    fn event(start: i64) -> PowerCutEvent {
        PowerCutEvent::builder()
            .device_id("ESP32_001")
            .start_time(at(start))
            .end_time(at(start + 60))
            .duration(TimeDelta::seconds(60))
            .start_voltage(Volts(12.6))
            .end_voltage(Volts(12.2))
            .voltage_drop(Volts(0.4))
            .energy_consumed(MilliwattHours(5.0))
            .build()
    }

    fn interval() -> Interval {
        Interval::new(at(-1_000_000), at(1_000_000))
    }

    #[test]
    fn merge_collapses_duplicates() {
        let merged = merge(vec![event(10)], vec![event(10), event(20)]);
        assert_eq!(merged, [event(20), event(10)]);
    }

    #[test]
    fn merge_keeps_distinct_ties() {
        let mut other = event(10);
        other.energy_consumed = MilliwattHours(6.0);
        let merged = merge(vec![event(10)], vec![other.clone()]);
        assert_eq!(merged, [event(10), other]);
    }

    #[tokio::test]
    async fn load_merges() {
        let store = MockStore { events: vec![event(10)], ..MockStore::default() };
        let cache = MemoryCache(RefCell::new(vec![event(10), event(20)]));
        let history = History::load(&store, &cache, interval(), 100).await;
        assert!(!history.is_degraded());
        assert_eq!(history.events(), [event(20), event(10)]);
    }

    #[tokio::test]
    async fn load_degrades() {
        let store = MockStore { events: vec![event(10)], is_down: true, ..MockStore::default() };
        let cache = MemoryCache(RefCell::new(vec![event(20)]));
        let history = History::load(&store, &cache, interval(), 100).await;
        assert!(history.is_degraded());
        assert_eq!(history.events(), [event(20)]);
    }

    #[tokio::test]
    async fn load_survives_broken_cache() {
        let store = MockStore { events: vec![event(10)], ..MockStore::default() };
        let history = History::load(&store, BrokenCache, interval(), 100).await;
        assert!(!history.is_degraded());
        assert_eq!(history.events(), [event(10)]);
    }

    #[tokio::test]
    async fn clear_then_append() -> Result {
        let store = MockStore { events: vec![event(10), event(30)], ..MockStore::default() };
        let cache = MemoryCache(RefCell::new(vec![event(20)]));
        let mut history = History::load(&store, &cache, interval(), 100).await;
        assert_eq!(history.events().len(), 3);

        history.clear()?;
        history.append(event(40))?;
        assert_eq!(history.events(), [event(40)]);
        assert_eq!(*cache.0.borrow(), [event(40)]);
        assert_eq!(store.events, [event(10), event(30)]);
        assert_eq!(store.n_inserts.get(), 0);
        Ok(())
    }

    #[test]
    fn local_only() -> Result {
        let cache = MemoryCache(RefCell::new(vec![event(10), event(20)]));
        let mut history = History::local(&cache);
        assert!(!history.is_degraded());
        assert_eq!(history.events(), [event(20), event(10)]);
        history.clear()?;
        assert!(cache.0.borrow().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn append_keeps_order() -> Result {
        let store = MockStore { events: vec![event(30), event(10)], ..MockStore::default() };
        let cache = MemoryCache::default();
        let mut history = History::load(&store, &cache, interval(), 100).await;
        history.append(event(20))?;
        history.append(event(20))?;
        assert_eq!(history.events(), [event(30), event(20), event(10)]);
        assert_eq!(cache.0.borrow().len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn append_fails_on_broken_cache() {
        let mut history = History::load(&MockStore::default(), BrokenCache, interval(), 100).await;
        assert!(history.append(event(20)).is_err());
        assert_eq!(history.events(), [event(20)]);
    }

    #[test]
    fn append_keeps_unreadable_cache_intact() {
        let cache = CorruptedCache::default();
        let mut history = History::local(&cache);
        assert!(history.append(event(20)).is_err());
        assert_eq!(history.events(), [event(20)]);
        assert!(cache.0.borrow().is_none());
    }

    #[test]
    fn clear_keeps_view_on_failure() {
        let mut history = History::local(BrokenCache);
        history.events.push(event(10));
        assert!(history.clear().is_err());
        assert_eq!(history.events(), [event(10)]);
    }

    #[tokio::test]
    async fn delimited_text() {
        let store = MockStore { events: vec![event(0)], ..MockStore::default() };
        let cache = MemoryCache::default();
        let history = History::load(&store, &cache, interval(), 100).await;
        let text = history.to_delimited_text();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some(CSV_HEADER));
        assert_eq!(lines.next(), Some("1,2023-11-14T22:13:20.000Z,60000,1.00,12.6,12.2,0.4,5"));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn summary() {
        let mut longer = event(100);
        longer.duration = TimeDelta::seconds(150);
        longer.voltage_drop = Volts(0.6);
        let summary = Summary::from_events(&[event(0), longer]);
        assert_eq!(summary.total, 2);
        assert_abs_diff_eq!(summary.total_downtime_minutes, 4.0);
        assert_abs_diff_eq!(summary.total_energy.0, 10.0);
        assert_abs_diff_eq!(summary.average_voltage_drop.0, 0.5);
    }

    #[test]
    fn empty_summary() {
        let summary = Summary::from_events(&[]);
        assert_eq!(summary.total, 0);
        assert_eq!(summary.average_voltage_drop, Volts::ZERO);
        assert_eq!(summary.total_energy, MilliwattHours::ZERO);
    }
}
