use crate::{core::window::SlidingWindow, quantity::voltage::Volts};

/// Battery and main voltage windows sharing one label sequence.
///
/// Every observation appends to both windows. A series without a fresh value repeats its
/// last known value, or leaves a gap if it has never been seen.
#[must_use]
#[derive(Debug)]
pub struct VoltageChart {
    pub battery: SlidingWindow<Volts>,
    pub main: SlidingWindow<Volts>,
    last_battery: Option<Volts>,
    last_main: Option<Volts>,
}

impl VoltageChart {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            battery: SlidingWindow::with_capacity(capacity),
            main: SlidingWindow::with_capacity(capacity),
            last_battery: None,
            last_main: None,
        }
    }

    pub fn observe_battery(&mut self, voltage: Volts, label: &str) {
        self.observe(Some(voltage), None, label);
    }

    pub fn observe_main(&mut self, voltage: Volts, label: &str) {
        self.observe(None, Some(voltage), label);
    }

    pub fn observe(&mut self, battery: Option<Volts>, main: Option<Volts>, label: &str) {
        self.last_battery = battery.or(self.last_battery);
        self.last_main = main.or(self.last_main);
        self.battery.append(self.last_battery, label);
        self.main.append(self.last_main, label);
    }

    #[must_use]
    pub const fn last_battery(&self) -> Option<Volts> {
        self.last_battery
    }

    #[must_use]
    pub const fn last_main(&self) -> Option<Volts> {
        self.last_main
    }
}

impl Default for VoltageChart {
    fn default() -> Self {
        Self::with_capacity(SlidingWindow::<Volts>::DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn windows_stay_aligned() {
        let mut chart = VoltageChart::default();
        chart.observe_main(Volts(12.6), "10:00:00");
        chart.observe_battery(Volts(12.1), "10:00:01");
        chart.observe_main(Volts(12.5), "10:00:02");

        assert_eq!(chart.battery.len(), 3);
        assert_eq!(chart.main.len(), 3);
        assert!(chart.battery.labels().eq(chart.main.labels()));

        let battery: Vec<_> = chart.battery.iter().map(|sample| sample.value).collect();
        assert_eq!(battery, [None, Some(Volts(12.1)), Some(Volts(12.1))]);
        let main: Vec<_> = chart.main.iter().map(|sample| sample.value).collect();
        assert_eq!(main, [Some(Volts(12.6)), Some(Volts(12.6)), Some(Volts(12.5))]);
    }

    #[test]
    fn alignment_survives_eviction() {
        let mut chart = VoltageChart::with_capacity(2);
        chart.observe_battery(Volts(1.0), "a");
        chart.observe_main(Volts(2.0), "b");
        chart.observe_battery(Volts(3.0), "c");
        assert!(chart.battery.labels().eq(["b", "c"]));
        assert!(chart.main.labels().eq(["b", "c"]));
        assert_eq!(chart.last_main(), Some(Volts(2.0)));
    }
}
