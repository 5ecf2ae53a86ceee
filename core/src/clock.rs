use chrono::{DateTime, Utc};

pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Test clock that only moves when told to. Clones share the same time.
#[cfg(test)]
#[derive(Debug, Clone)]
pub(crate) struct ManualClock(std::rc::Rc<std::cell::Cell<DateTime<Utc>>>);

#[cfg(test)]
impl ManualClock {
    pub(crate) fn at_millis(ms: i64) -> Self {
        use chrono::TimeZone;
        let start = Utc.timestamp_millis_opt(ms).unwrap();
        Self(std::rc::Rc::new(std::cell::Cell::new(start)))
    }

    pub(crate) fn advance_ms(&self, ms: i64) {
        self.0.set(self.0.get() + chrono::Duration::milliseconds(ms));
    }
}

#[cfg(test)]
impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.0.get()
    }
}
