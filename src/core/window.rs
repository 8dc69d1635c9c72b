/// Single window slot: a value or a gap, plus its display label.
#[derive(Clone, Debug, PartialEq)]
pub struct Sample<V> {
    pub value: Option<V>,
    pub label: String,
}

/// Fixed-capacity sliding window for charting.
///
/// Fills up to the capacity, then every append evicts the oldest sample.
/// Backed by a ring buffer, so appends never shift the storage.
#[must_use]
#[derive(Clone, Debug)]
pub struct SlidingWindow<V> {
    samples: Vec<Sample<V>>,

    /// Index of the oldest sample once the window is full.
    head: usize,

    capacity: usize,
}

impl<V> SlidingWindow<V> {
    pub const DEFAULT_CAPACITY: usize = 60;

    pub fn with_capacity(capacity: usize) -> Self {
        Self { samples: Vec::with_capacity(capacity), head: 0, capacity }
    }

    pub fn append(&mut self, value: Option<V>, label: impl Into<String>) {
        if self.capacity == 0 {
            return;
        }
        let sample = Sample { value, label: label.into() };
        if self.samples.len() < self.capacity {
            self.samples.push(sample);
        } else {
            self.samples[self.head] = sample;
            self.head = (self.head + 1) % self.capacity;
        }
    }

    #[cfg(test)]
    pub const fn len(&self) -> usize {
        self.samples.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Iterate over the samples, oldest first.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Sample<V>> {
        let (newer, older) = self.samples.split_at(self.head);
        older.iter().chain(newer)
    }

    #[cfg(test)]
    pub fn first(&self) -> Option<&Sample<V>> {
        self.iter().next()
    }

    #[cfg(test)]
    pub fn last(&self) -> Option<&Sample<V>> {
        self.iter().next_back()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.iter().map(|sample| sample.label.as_str())
    }
}

impl<V: Copy + Into<f64>> SlidingWindow<V> {
    /// Mean over the present non-zero values.
    #[must_use]
    pub fn average(&self) -> Option<f64> {
        let (sum, count) = self
            .iter()
            .filter_map(|sample| sample.value)
            .map(Into::<f64>::into)
            .filter(|value| *value != 0.0)
            .fold((0.0, 0_u32), |(sum, count), value| (sum + value, count + 1));
        (count != 0).then(|| sum / f64::from(count))
    }
}

impl<V> Default for SlidingWindow<V> {
    fn default() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }
}
