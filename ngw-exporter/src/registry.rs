//! Collector registry: registration checks, concurrent gathering and rendering.

use std::collections::{HashMap, HashSet};
use std::fmt::Write;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::future::join_all;
use tracing::{debug, info, warn};

use crate::collectors::Collector;
use crate::error::{CollectError, MetricError};
use crate::exposition::{format_labels, write_family};
use crate::metric::{Descriptor, MetricKind, NAMESPACE, Observation, Sample, build_fq_name};

struct Entry {
    collector: Box<dyn Collector>,
    descriptors: Vec<Arc<Descriptor>>,
}

/// The set of collectors served on the metrics endpoint.
///
/// Every `gather()` scrapes the device afresh; nothing is cached between scrapes.
pub struct Registry {
    entries: Vec<Entry>,
    names: HashSet<String>,

    collector_success: Arc<Descriptor>,
    collector_duration: Arc<Descriptor>,
}

/// Create a shareable registry handle.
pub type SharedRegistry = Arc<Registry>;

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    pub fn new() -> Self {
        let collector_success = Arc::new(Descriptor::new(
            build_fq_name(NAMESPACE, "exporter", "collector_success"),
            "Whether the collector's last device scrape succeeded",
            &["collector"],
        ));
        let collector_duration = Arc::new(Descriptor::new(
            build_fq_name(NAMESPACE, "exporter", "collector_duration_seconds"),
            "How long the collector's last device scrape took",
            &["collector"],
        ));

        let names = [&collector_success, &collector_duration]
            .iter()
            .map(|d| d.fq_name().to_string())
            .collect();

        Self {
            entries: Vec::new(),
            names,
            collector_success,
            collector_duration,
        }
    }

    /// Add a collector after checking its descriptors.
    ///
    /// Fails without registering anything when a name is invalid or already
    /// taken by another collector.
    pub fn register(&mut self, collector: Box<dyn Collector>) -> Result<(), MetricError> {
        let name = collector.name();
        if self.entries.iter().any(|e| e.collector.name() == name) {
            return Err(MetricError::DuplicateCollector(name.to_string()));
        }

        let descriptors: Vec<Arc<Descriptor>> = collector.describe().cloned().collect();
        let mut pending = HashSet::with_capacity(descriptors.len());
        for desc in &descriptors {
            desc.validate()?;
            let fq_name = desc.fq_name();
            if self.names.contains(fq_name) || !pending.insert(fq_name) {
                return Err(MetricError::DuplicateMetric(fq_name.to_string()));
            }
        }

        self.names
            .extend(descriptors.iter().map(|d| d.fq_name().to_string()));

        info!(
            collector = name,
            metrics = descriptors.len(),
            "Registered collector"
        );

        self.entries.push(Entry {
            collector,
            descriptors,
        });
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Names of the registered collectors, in registration order.
    pub fn collector_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|e| e.collector.name())
    }

    /// Every descriptor that can appear in a scrape, the exporter's own included.
    pub fn describe(&self) -> impl Iterator<Item = &Arc<Descriptor>> + '_ {
        self.entries
            .iter()
            .flat_map(|e| e.descriptors.iter())
            .chain([&self.collector_success, &self.collector_duration])
    }

    /// Run every collector concurrently and gather their samples.
    pub async fn gather(&self) -> Gathered {
        let started = Instant::now();

        let scrapes = join_all(self.entries.iter().map(|entry| async move {
            let start = Instant::now();
            let mut samples = entry.collector.collect().await;
            reject_duplicate_series(entry.collector.name(), &mut samples);
            CollectorScrape {
                name: entry.collector.name(),
                descriptors: entry.descriptors.clone(),
                samples,
                duration: start.elapsed(),
            }
        }))
        .await;

        let gathered = Gathered {
            scrapes,
            collector_success: Arc::clone(&self.collector_success),
            collector_duration: Arc::clone(&self.collector_duration),
        };

        debug!(
            collectors = gathered.scrapes.len(),
            errors = gathered.errors().count(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Gathered metrics"
        );

        gathered
    }
}

/// Turn every repeat of a `(metric, label values)` pair into an error sample.
///
/// The first series is kept. A family may not expose the same series twice.
fn reject_duplicate_series(collector: &'static str, samples: &mut [Sample]) {
    let duplicates: Vec<usize> = {
        let mut seen = HashSet::new();
        samples
            .iter()
            .enumerate()
            .filter_map(|(i, sample)| sample.observation().map(|o| (i, o)))
            .filter(|&(_, o)| !seen.insert((o.descriptor().fq_name(), o.label_values())))
            .map(|(i, _)| i)
            .collect()
    };

    for i in duplicates {
        let Some(obs) = samples[i].observation() else {
            continue;
        };
        let desc = obs.descriptor();
        let error = MetricError::DuplicateSeries {
            metric: desc.fq_name().to_string(),
            labels: format_labels(desc.label_names(), obs.label_values()),
        };
        warn!(collector, error = %error, "Dropping duplicate series");
        samples[i] = Sample::Invalid {
            collector,
            error: error.into(),
        };
    }
}

/// The samples of one collector for one scrape.
pub struct CollectorScrape {
    name: &'static str,
    descriptors: Vec<Arc<Descriptor>>,
    samples: Vec<Sample>,
    duration: Duration,
}

impl CollectorScrape {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn succeeded(&self) -> bool {
        !self.samples.iter().any(Sample::is_invalid)
    }
}

/// Result of one registry pull.
pub struct Gathered {
    scrapes: Vec<CollectorScrape>,
    collector_success: Arc<Descriptor>,
    collector_duration: Arc<Descriptor>,
}

impl Gathered {
    pub fn scrapes(&self) -> &[CollectorScrape] {
        &self.scrapes
    }

    /// Errors carried by invalid samples, with the collector that reported them.
    pub fn errors(&self) -> impl Iterator<Item = (&'static str, &CollectError)> + '_ {
        self.scrapes
            .iter()
            .flat_map(|s| s.samples.iter())
            .filter_map(|sample| match sample {
                Sample::Invalid { collector, error } => Some((*collector, error)),
                Sample::Valid(_) => None,
            })
    }

    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }

    /// Plain-text body listing every collector error.
    pub fn error_report(&self) -> String {
        let errors: Vec<_> = self.errors().collect();
        let mut output = String::from("An error has occurred while serving metrics:\n\n");

        writeln!(output, "{} error(s) occurred:", errors.len()).ok();
        for (collector, error) in errors {
            writeln!(output, "* [from collector {:?}] {}", collector, error).ok();
        }

        output
    }

    /// Render valid samples in text exposition format.
    ///
    /// Families follow registration and describe order. Invalid samples are
    /// skipped and only show up in the exporter's own metrics.
    pub fn render(&self) -> String {
        let mut output = String::new();

        for scrape in &self.scrapes {
            let mut by_name: HashMap<&str, Vec<&Observation>> = HashMap::new();
            for observation in scrape.samples.iter().filter_map(Sample::observation) {
                by_name
                    .entry(observation.descriptor().fq_name())
                    .or_default()
                    .push(observation);
            }

            for desc in &scrape.descriptors {
                if let Some(series) = by_name.remove(desc.fq_name()) {
                    write_family(&mut output, desc, series[0].kind(), &series);
                }
            }

            for name in by_name.keys() {
                debug!(collector = scrape.name, metric = %name, "Dropping undeclared metric");
            }
        }

        self.render_self_metrics(&mut output);
        output
    }

    fn render_self_metrics(&self, output: &mut String) {
        let mut success = Vec::with_capacity(self.scrapes.len());
        let mut duration = Vec::with_capacity(self.scrapes.len());

        for scrape in &self.scrapes {
            let value = if scrape.succeeded() { 1.0 } else { 0.0 };
            if let Ok(obs) = Observation::gauge(&self.collector_success, value, &[scrape.name]) {
                success.push(obs);
            }
            if let Ok(obs) = Observation::gauge(
                &self.collector_duration,
                scrape.duration.as_secs_f64(),
                &[scrape.name],
            ) {
                duration.push(obs);
            }
        }

        let success: Vec<&Observation> = success.iter().collect();
        let duration: Vec<&Observation> = duration.iter().collect();
        write_family(output, &self.collector_success, MetricKind::Gauge, &success);
        write_family(
            output,
            &self.collector_duration,
            MetricKind::Gauge,
            &duration,
        );
    }
}
