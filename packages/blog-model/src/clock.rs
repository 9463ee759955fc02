use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;

/// Wall clock that never repeats or goes backwards.
#[derive(Debug, Default)]
pub(crate) struct Clock {
    last: Mutex<Option<DateTime<Utc>>>,
}

impl Clock {
    pub(crate) fn now(&self) -> DateTime<Utc> {
        let mut last = self.last.lock();
        let mut now = Utc::now();
        if let Some(previous) = *last {
            if now <= previous {
                now = previous + Duration::microseconds(1);
            }
        }
        *last = Some(now);
        now
    }
}
