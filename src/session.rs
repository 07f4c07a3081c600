use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use arc_swap::ArcSwap;

use crate::{
    config::Config,
    error::FetchError,
    lots::{self, KnownKeys},
    metrics::Metrics,
    scheduler::RefreshScheduler,
    Listing, Target,
};

/// How often [`gather`] asks the scheduler whether a cycle is due
pub const POLL_TICK: Duration = Duration::from_millis(250);

/// Summary of a finished cycle, the lots themselves are published through [`Session::lots`]
#[derive(Debug)]
pub struct CycleReport {
    pub listed: usize,
    pub skipped: usize,
    pub pages: usize,
    pub stopped: Option<FetchError>,
}

/// Everything needed to poll one item in one region.
///
/// The known keys sit behind an async mutex that a cycle holds from its
/// first request until its lots are published, so at most one cycle runs
/// per session and readers only ever see complete cycles.
pub struct Session {
    client: lots::Client,
    target: Target,
    known: tokio::sync::Mutex<KnownKeys>,
    lots: ArcSwap<Vec<Listing>>,
    scheduler: parking_lot::Mutex<RefreshScheduler>,
    metrics: Metrics,
}

impl Session {
    pub fn new(
        client: lots::Client,
        target: Target,
        scheduler: RefreshScheduler,
        metrics: Metrics,
    ) -> Self {
        Self {
            client,
            target,
            known: tokio::sync::Mutex::new(KnownKeys::new()),
            lots: ArcSwap::from_pointee(Vec::new()),
            scheduler: parking_lot::Mutex::new(scheduler),
            metrics,
        }
    }

    pub fn from_config(config: &Config, metrics: Metrics) -> Result<Self, reqwest::Error> {
        let client = lots::Client::new(
            config.base_url.as_str(),
            config.api_key.as_str(),
            config.request_timeout(),
        )?;

        let mut scheduler = RefreshScheduler::new(config.refresh_interval());
        scheduler.set_auto_refresh(config.auto_refresh);

        Ok(Self::new(client, config.target(), scheduler, metrics))
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    /// The lots of the last completed cycle
    pub fn lots(&self) -> Arc<Vec<Listing>> {
        self.lots.load_full()
    }

    pub fn count(&self) -> usize {
        self.lots.load().len()
    }

    pub fn is_fetching(&self) -> bool {
        self.known.try_lock().is_err()
    }

    pub fn auto_refresh(&self) -> bool {
        self.scheduler.lock().auto_refresh()
    }

    pub fn set_auto_refresh(&self, enabled: bool) {
        tracing::info!(enabled, "Setting Auto-Refresh");
        self.scheduler.lock().set_auto_refresh(enabled);
    }

    pub fn request_refresh(&self) {
        self.scheduler.lock().request_refresh();
    }

    /// Runs a cycle if the scheduler says one is due
    pub async fn tick(&self, now: Instant) -> Option<CycleReport> {
        let in_flight = self.is_fetching();
        let due = self.scheduler.lock().should_fetch_now(now, in_flight);
        if !due {
            return None;
        }

        self.refresh().await
    }

    /// Runs one fetch cycle right away, or returns `None` if another cycle
    /// of this session is still running.
    pub async fn refresh(&self) -> Option<CycleReport> {
        let mut known = match self.known.try_lock() {
            Ok(k) => k,
            Err(_) => {
                tracing::debug!("Fetch already in progress");
                return None;
            }
        };

        let start_time = Instant::now();

        let cycle = self.client.fetch(&self.target, &mut known).await;

        let report = CycleReport {
            listed: cycle.lots.len(),
            skipped: cycle.skipped,
            pages: cycle.pages,
            stopped: cycle.stopped,
        };
        let lowest = cycle.lots.iter().map(Listing::unit_price).min();

        self.lots.store(Arc::new(cycle.lots));
        self.scheduler.lock().record_fetch_time(Instant::now());
        self.metrics
            .record_cycle(&self.target, &report, known.len(), lowest);

        tracing::info!(
            new = report.listed,
            skipped = report.skipped,
            pages = report.pages,
            "Updating lots took {:?}",
            start_time.elapsed()
        );

        Some(report)
    }
}

/// Drives a session forever, checking every [`POLL_TICK`] whether to fetch
#[tracing::instrument(skip(session), fields(target = %session.target()))]
pub async fn gather(session: Arc<Session>) {
    tracing::info!("Starting lot collector");

    loop {
        if let Some(report) = session.tick(Instant::now()).await {
            if let Some(reason) = &report.stopped {
                tracing::warn!("Cycle stopped early: {}", reason);
            }
        }

        tokio::time::sleep(POLL_TICK).await;
    }
}
