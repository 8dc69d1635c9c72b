use std::fmt::{Debug, Formatter};

use chrono::{DateTime, TimeDelta, Utc};

use crate::prelude::*;

#[derive(Copy, Clone, Eq, PartialEq)]
#[must_use]
pub struct Interval {
    /// Inclusive.
    pub start: DateTime<Utc>,

    /// Exclusive.
    pub end: DateTime<Utc>,
}

impl Debug for Interval {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}..{:?}", self.start, self.end)
    }
}

impl Interval {
    pub const fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Interval of the specified length that ends now.
    pub fn try_since(duration: std::time::Duration) -> Result<Self> {
        let duration = TimeDelta::from_std(duration).context("the duration is too long")?;
        let end = Utc::now();
        let start = end.checked_sub_signed(duration).context("the duration is too long")?;
        Ok(Self::new(start, end))
    }
}
