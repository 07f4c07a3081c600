use super::Target;

#[derive(Debug, Clone)]
pub struct Metrics {
    lots_loaded: prometheus::GaugeVec,
    known_lots: prometheus::GaugeVec,
    lowest_unit_price: prometheus::GaugeVec,
    fetch_cycles: prometheus::IntCounterVec,
    pages_requested: prometheus::IntCounterVec,
    pub last_update: prometheus::Gauge,
}

impl Metrics {
    pub fn new(registry: &prometheus::Registry) -> Result<Self, prometheus::Error> {
        let lots_loaded = prometheus::GaugeVec::new(
            prometheus::Opts::new("lots_loaded", "The number of new lots found by the last cycle"),
            &["region", "item"],
        )?;
        registry.register(Box::new(lots_loaded.clone()))?;

        let known_lots = prometheus::GaugeVec::new(
            prometheus::Opts::new("known_lots", "The number of distinct lots seen since startup"),
            &["region", "item"],
        )?;
        registry.register(Box::new(known_lots.clone()))?;

        let lowest_unit_price = prometheus::GaugeVec::new(
            prometheus::Opts::new(
                "lowest_unit_price",
                "The lowest Buyout Price per unit among the lots of the last cycle",
            ),
            &["region", "item"],
        )?;
        registry.register(Box::new(lowest_unit_price.clone()))?;

        let fetch_cycles = prometheus::IntCounterVec::new(
            prometheus::Opts::new("fetch_cycles", "The number of fetch cycles by outcome"),
            &["region", "item", "outcome"],
        )?;
        registry.register(Box::new(fetch_cycles.clone()))?;

        let pages_requested = prometheus::IntCounterVec::new(
            prometheus::Opts::new("pages_requested", "The number of lot pages requested"),
            &["region", "item"],
        )?;
        registry.register(Box::new(pages_requested.clone()))?;

        let last_update =
            prometheus::Gauge::new("last_updated", "The Unix Timestamp of the last update")?;
        registry.register(Box::new(last_update.clone()))?;

        Ok(Self {
            lots_loaded,
            known_lots,
            lowest_unit_price,
            fetch_cycles,
            pages_requested,
            last_update,
        })
    }

    pub fn record_cycle(
        &self,
        target: &Target,
        report: &crate::session::CycleReport,
        known_lots: usize,
        lowest_unit_price: Option<i64>,
    ) {
        let labels: &[&str; 2] = &[&target.region, &target.item_id];
        let outcome = if report.stopped.is_some() {
            "stopped"
        } else {
            "complete"
        };

        self.lots_loaded
            .with_label_values(labels)
            .set(report.listed as f64);
        self.known_lots
            .with_label_values(labels)
            .set(known_lots as f64);
        if let Some(price) = lowest_unit_price {
            self.lowest_unit_price
                .with_label_values(labels)
                .set(price as f64);
        }
        self.fetch_cycles
            .with_label_values(&[&target.region, &target.item_id, outcome])
            .inc();
        self.pages_requested
            .with_label_values(labels)
            .inc_by(report.pages as u64);

        let unix_timestamp = std::time::SystemTime::now()
            .duration_since(std::time::SystemTime::UNIX_EPOCH)
            .unwrap_or_default();
        self.last_update.set(unix_timestamp.as_secs() as f64);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::CycleReport;

    #[test]
    fn records_cycle() {
        let registry = prometheus::Registry::new();
        let metrics = Metrics::new(&registry).unwrap();
        let target = Target::new("ru", "y1q9");

        let report = CycleReport {
            listed: 250,
            skipped: 0,
            pages: 3,
            stopped: None,
        };
        metrics.record_cycle(&target, &report, 250, Some(40));
        metrics.record_cycle(&target, &report, 250, None);

        let labels = &["ru", "y1q9"];
        assert_eq!(metrics.lots_loaded.with_label_values(labels).get(), 250.0);
        assert_eq!(metrics.known_lots.with_label_values(labels).get(), 250.0);
        assert_eq!(metrics.lowest_unit_price.with_label_values(labels).get(), 40.0);
        assert_eq!(metrics.pages_requested.with_label_values(labels).get(), 6);
        assert_eq!(
            metrics
                .fetch_cycles
                .with_label_values(&["ru", "y1q9", "complete"])
                .get(),
            2
        );
        assert!(metrics.last_update.get() > 0.0);
    }

    #[test]
    fn register_twice_fails() {
        let registry = prometheus::Registry::new();
        assert!(Metrics::new(&registry).is_ok());
        assert!(Metrics::new(&registry).is_err());
    }
}
