//! Time source abstraction.
//!
//! Engine code never reads the system clock directly. Weekdays follow the
//! local calendar numbering 1..=7 with Sunday as 1.

use std::sync::Mutex;

use chrono::{DateTime, Datelike, Duration, FixedOffset, Local, NaiveDate, Offset, Timelike, Utc};

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// Offset of the user's local calendar.
    fn offset(&self) -> FixedOffset {
        Utc.fix()
    }

    fn local(&self, ts: DateTime<Utc>) -> DateTime<FixedOffset> {
        ts.with_timezone(&self.offset())
    }

    fn local_now(&self) -> DateTime<FixedOffset> {
        self.local(self.now())
    }

    fn today(&self) -> NaiveDate {
        self.local_now().date_naive()
    }

    /// Weekday of `ts` in the local calendar, Sunday = 1 .. Saturday = 7.
    fn weekday(&self, ts: DateTime<Utc>) -> u32 {
        weekday_number(&self.local(ts))
    }

    fn hour(&self, ts: DateTime<Utc>) -> u32 {
        self.local(ts).hour()
    }
}

/// Sunday = 1 .. Saturday = 7.
pub fn weekday_number<D: Datelike>(date: &D) -> u32 {
    date.weekday().number_from_sunday()
}

/// Wall clock in the machine's local time zone.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn offset(&self) -> FixedOffset {
        Local::now().offset().fix()
    }
}

/// Manually driven clock for tests and simulations.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
    offset: FixedOffset,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self::with_offset(now, Utc.fix())
    }

    pub fn with_offset(now: DateTime<Utc>, offset: FixedOffset) -> Self {
        Self {
            now: Mutex::new(now),
            offset,
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(|e| e.into_inner()) = now;
    }

    pub fn advance(&self, by: Duration) {
        let mut guard = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *guard += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn offset(&self) -> FixedOffset {
        self.offset
    }
}

impl<C: Clock + ?Sized> Clock for std::sync::Arc<C> {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }

    fn offset(&self) -> FixedOffset {
        (**self).offset()
    }
}
