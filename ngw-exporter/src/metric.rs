//! Metric descriptors and the observations collectors emit for them.

use std::sync::Arc;

use crate::error::{CollectError, MetricError};

/// Namespace prefix shared by every exported metric.
pub const NAMESPACE: &str = "ngw";

/// Join namespace, subsystem and name with `_`, skipping empty components.
pub fn build_fq_name(namespace: &str, subsystem: &str, name: &str) -> String {
    [namespace, subsystem, name]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}

/// Check a metric name against `[a-zA-Z_:][a-zA-Z0-9_:]*`.
pub fn is_valid_metric_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' || first == ':' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ':')
}

/// Check a label name against `[a-zA-Z_][a-zA-Z0-9_]*`.
///
/// Names starting with `__` are reserved and rejected.
pub fn is_valid_label_name(name: &str) -> bool {
    if name.starts_with("__") {
        return false;
    }
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Prometheus metric type of an observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    /// Monotonic device counter (bytes, packets, errors since boot).
    Counter,
    /// Point-in-time state.
    Gauge,
}

impl MetricKind {
    /// Get the TYPE comment string for Prometheus exposition format.
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKind::Counter => "counter",
            MetricKind::Gauge => "gauge",
        }
    }
}

/// Immutable metadata for one metric: name, help text and label schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Descriptor {
    fq_name: String,
    help: String,
    label_names: Vec<String>,
}

impl Descriptor {
    pub fn new(fq_name: impl Into<String>, help: impl Into<String>, label_names: &[&str]) -> Self {
        Self {
            fq_name: fq_name.into(),
            help: help.into(),
            label_names: label_names.iter().map(|l| l.to_string()).collect(),
        }
    }

    pub fn fq_name(&self) -> &str {
        &self.fq_name
    }

    pub fn help(&self) -> &str {
        &self.help
    }

    pub fn label_names(&self) -> &[String] {
        &self.label_names
    }

    /// Check the metric name and every label name.
    pub fn validate(&self) -> Result<(), MetricError> {
        if !is_valid_metric_name(&self.fq_name) {
            return Err(MetricError::InvalidMetricName(self.fq_name.clone()));
        }
        if let Some(label) = self.label_names.iter().find(|l| !is_valid_label_name(l)) {
            return Err(MetricError::InvalidLabelName {
                metric: self.fq_name.clone(),
                label: label.clone(),
            });
        }
        Ok(())
    }
}

/// One sample for a descriptor, produced fresh on every scrape.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    descriptor: Arc<Descriptor>,
    kind: MetricKind,
    value: f64,
    label_values: Vec<String>,
}

impl Observation {
    /// Create an observation; label values are positional and must match the
    /// descriptor's label names one for one.
    pub fn new(
        descriptor: &Arc<Descriptor>,
        kind: MetricKind,
        value: f64,
        label_values: &[&str],
    ) -> Result<Self, MetricError> {
        if label_values.len() != descriptor.label_names.len() {
            return Err(MetricError::LabelCardinality {
                metric: descriptor.fq_name.clone(),
                expected: descriptor.label_names.len(),
                got: label_values.len(),
            });
        }

        Ok(Self {
            descriptor: Arc::clone(descriptor),
            kind,
            value,
            label_values: label_values.iter().map(|v| v.to_string()).collect(),
        })
    }

    pub fn counter(
        descriptor: &Arc<Descriptor>,
        value: f64,
        label_values: &[&str],
    ) -> Result<Self, MetricError> {
        Self::new(descriptor, MetricKind::Counter, value, label_values)
    }

    pub fn gauge(
        descriptor: &Arc<Descriptor>,
        value: f64,
        label_values: &[&str],
    ) -> Result<Self, MetricError> {
        Self::new(descriptor, MetricKind::Gauge, value, label_values)
    }

    pub fn descriptor(&self) -> &Arc<Descriptor> {
        &self.descriptor
    }

    pub fn kind(&self) -> MetricKind {
        self.kind
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn label_values(&self) -> &[String] {
        &self.label_values
    }

    /// Label value for `name`, if the descriptor declares that label.
    pub fn label(&self, name: &str) -> Option<&str> {
        self.descriptor
            .label_names
            .iter()
            .position(|l| l == name)
            .map(|i| self.label_values[i].as_str())
    }
}

/// What a collector hands back to the registry for one scrape.
#[derive(Debug)]
pub enum Sample {
    Valid(Observation),
    /// Sentinel for a failed scrape, in which case it is the only sample, or
    /// for a series the registry refused to expose.
    Invalid {
        collector: &'static str,
        error: CollectError,
    },
}

impl Sample {
    pub fn observation(&self) -> Option<&Observation> {
        match self {
            Sample::Valid(observation) => Some(observation),
            Sample::Invalid { .. } => None,
        }
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self, Sample::Invalid { .. })
    }
}
