//! Prometheus text exposition format (version 0.0.4).

use std::fmt::Write;

use crate::metric::{Descriptor, MetricKind, Observation};

/// Content type of a rendered scrape.
pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Write one metric family: `# HELP`, `# TYPE` and a line per observation.
///
/// Nothing is written when `observations` is empty.
pub fn write_family(
    output: &mut String,
    descriptor: &Descriptor,
    kind: MetricKind,
    observations: &[&Observation],
) {
    if observations.is_empty() {
        return;
    }

    let name = descriptor.fq_name();
    writeln!(output, "# HELP {} {}", name, escape_help(descriptor.help())).ok();
    writeln!(output, "# TYPE {} {}", name, kind.as_str()).ok();

    for observation in observations {
        writeln!(
            output,
            "{}{} {}",
            name,
            format_labels(descriptor.label_names(), observation.label_values()),
            format_value(observation.value())
        )
        .ok();
    }
}

/// Escape special characters in label values.
pub fn escape_label_value(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => result.push_str("\\\\"),
            '"' => result.push_str("\\\""),
            '\n' => result.push_str("\\n"),
            _ => result.push(c),
        }
    }
    result
}

/// Escape help text. Quotes are left alone here, unlike label values.
pub fn escape_help(help: &str) -> String {
    let mut result = String::with_capacity(help.len());
    for c in help.chars() {
        match c {
            '\\' => result.push_str("\\\\"),
            '\n' => result.push_str("\\n"),
            _ => result.push(c),
        }
    }
    result
}

/// Format a floating point value for Prometheus.
pub fn format_value(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.is_infinite() {
        if value.is_sign_positive() {
            "+Inf".to_string()
        } else {
            "-Inf".to_string()
        }
    } else if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{}", value)
    }
}

/// Format positional labels, `{a="1",b="2"}`, or nothing when there are none.
pub fn format_labels(names: &[String], values: &[String]) -> String {
    if names.is_empty() {
        return String::new();
    }

    let parts: Vec<String> = names
        .iter()
        .zip(values)
        .map(|(k, v)| format!("{}=\"{}\"", k, escape_label_value(v)))
        .collect();

    format!("{{{}}}", parts.join(","))
}
