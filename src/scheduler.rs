//! Decides when the next fetch cycle should run.
//!
//! A cycle runs either because somebody asked for one (manual trigger) or
//! because auto refresh is enabled and the last cycle is older than the
//! refresh interval. Nothing is ever due while a cycle is in flight.

use std::time::{Duration, Instant};

pub const REFRESH_INTERVAL: Duration = Duration::from_secs(10);

#[derive(Debug)]
pub struct RefreshScheduler {
    interval: Duration,
    last_fetch: Option<Instant>,
    auto_refresh: bool,
    manual_pending: bool,
}

impl RefreshScheduler {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_fetch: None,
            auto_refresh: false,
            manual_pending: false,
        }
    }

    pub fn auto_refresh(&self) -> bool {
        self.auto_refresh
    }

    pub fn set_auto_refresh(&mut self, enabled: bool) {
        self.auto_refresh = enabled;
    }

    /// Queues a single manual refresh
    pub fn request_refresh(&mut self) {
        self.manual_pending = true;
    }

    pub fn last_fetch(&self) -> Option<Instant> {
        self.last_fetch
    }

    /// Consumes a pending manual trigger, even when the answer is false
    /// because a cycle is still running.
    pub fn should_fetch_now(&mut self, now: Instant, in_flight: bool) -> bool {
        let manual = std::mem::take(&mut self.manual_pending);
        if in_flight {
            return false;
        }

        manual || (self.auto_refresh && self.is_due(now))
    }

    fn is_due(&self, now: Instant) -> bool {
        match self.last_fetch {
            Some(last) => now.saturating_duration_since(last) > self.interval,
            None => true,
        }
    }

    /// Called after every cycle, no matter how it ended
    pub fn record_fetch_time(&mut self, now: Instant) {
        self.last_fetch = Some(now);
    }
}

impl Default for RefreshScheduler {
    fn default() -> Self {
        Self::new(REFRESH_INTERVAL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auto_refresh_off_never_due() {
        let start = Instant::now();
        let mut scheduler = RefreshScheduler::default();

        assert!(!scheduler.should_fetch_now(start, false));

        scheduler.record_fetch_time(start);
        assert!(!scheduler.should_fetch_now(start + Duration::from_secs(3600), false));
    }

    #[test]
    fn auto_refresh_waits_for_interval() {
        let start = Instant::now();
        let mut scheduler = RefreshScheduler::default();
        scheduler.set_auto_refresh(true);

        // never fetched
        assert!(scheduler.should_fetch_now(start, false));
        scheduler.record_fetch_time(start);

        assert!(!scheduler.should_fetch_now(start + Duration::from_secs(5), false));
        assert!(!scheduler.should_fetch_now(start + Duration::from_secs(10), false));
        assert!(scheduler.should_fetch_now(start + Duration::from_millis(10_001), false));

        let second = start + Duration::from_secs(11);
        scheduler.record_fetch_time(second);
        assert_eq!(scheduler.last_fetch(), Some(second));
        assert!(!scheduler.should_fetch_now(second + Duration::from_secs(1), false));
    }

    #[test]
    fn manual_trigger_is_one_shot() {
        let start = Instant::now();
        let mut scheduler = RefreshScheduler::default();
        scheduler.record_fetch_time(start);

        scheduler.request_refresh();
        assert!(scheduler.should_fetch_now(start, false));
        assert!(!scheduler.should_fetch_now(start, false));
    }

    #[test]
    fn nothing_due_while_in_flight() {
        let start = Instant::now();
        let mut scheduler = RefreshScheduler::default();
        scheduler.set_auto_refresh(true);

        scheduler.request_refresh();
        assert!(!scheduler.should_fetch_now(start, true));

        // the trigger was folded into the running cycle
        scheduler.record_fetch_time(start);
        assert!(!scheduler.should_fetch_now(start, false));
    }

    #[test]
    fn custom_interval() {
        let start = Instant::now();
        let mut scheduler = RefreshScheduler::new(Duration::from_secs(60));
        scheduler.set_auto_refresh(true);
        scheduler.record_fetch_time(start);

        assert!(!scheduler.should_fetch_now(start + Duration::from_secs(30), false));
        assert!(scheduler.should_fetch_now(start + Duration::from_secs(61), false));
    }
}
