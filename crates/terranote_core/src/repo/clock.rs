//! Injected time source for comment timestamps.
//!
//! `created_at`/`updated_at` are ISO-8601 strings. The store reads them from
//! a `Clock` so tests can pin and advance time deterministically.

use chrono::{DateTime, SecondsFormat, Utc};
use std::cell::Cell;

/// Produces the current time as an ISO-8601 string.
pub trait Clock {
    fn now_iso(&self) -> String;
}

/// Production clock: UTC wall time with millisecond precision.
#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_iso(&self) -> String {
        Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

impl<C: Clock + ?Sized> Clock for std::rc::Rc<C> {
    fn now_iso(&self) -> String {
        (**self).now_iso()
    }
}

/// Manually advanced clock for tests, counted in epoch milliseconds.
#[derive(Debug)]
pub struct ManualClock {
    epoch_ms: Cell<i64>,
}

impl ManualClock {
    pub fn new(epoch_ms: i64) -> Self {
        Self {
            epoch_ms: Cell::new(epoch_ms),
        }
    }

    pub fn advance_ms(&self, delta: i64) {
        self.epoch_ms.set(self.epoch_ms.get() + delta);
    }
}

impl Clock for ManualClock {
    fn now_iso(&self) -> String {
        DateTime::<Utc>::from_timestamp_millis(self.epoch_ms.get())
            .unwrap_or_default()
            .to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}
