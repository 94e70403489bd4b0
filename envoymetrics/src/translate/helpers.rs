use crate::{
    proto::{
        io::prometheus::client::LabelPair,
        opentelemetry::common::v1::{any_value::Value, AnyValue, KeyValue},
    },
    types::IdentityLabels,
};

/// Prometheus exposition suffixes stripped from metric names, in priority order.
/// The first one that matches wins, not the longest.
pub const KNOWN_SUFFIXES: [&str; 5] = ["_created", "_bucket", "_info", "_sum", "_count"];

const NANOS_PER_MILLI: u64 = 1_000_000;

/// Strip one known suffix from a metric name.
///
/// A name that is exactly a suffix token is left alone, as is any name whose
/// stripped form would be empty or itself a bare suffix token.
fn strip_known_suffix(name: &str) -> Option<&str> {
    let suffix = KNOWN_SUFFIXES
        .iter()
        .find(|suffix| name.len() > suffix.len() && name.ends_with(*suffix))?;
    let base = &name[..name.len() - suffix.len()];
    if base.is_empty() || KNOWN_SUFFIXES.contains(&base) {
        None
    } else {
        Some(base)
    }
}

/// The base metric name for a Prometheus family name.
///
/// Stripping repeats until nothing matches, so normalizing an already
/// normalized name is a no-op. This differs from a single strip on purpose:
/// `"a_sum_count"` becomes `"a"`, not `"a_sum"`.
pub fn normalize_name(name: &str) -> &str {
    let mut current = name;
    while let Some(base) = strip_known_suffix(current) {
        current = base;
    }
    current
}

/// Prometheus millisecond timestamps to OTLP nanoseconds. Pre-epoch times clamp to 0.
pub fn millis_to_nanos(timestamp_ms: i64) -> u64 {
    u64::try_from(timestamp_ms)
        .unwrap_or(0)
        .saturating_mul(NANOS_PER_MILLI)
}

fn string_attribute(key: impl Into<String>, value: impl Into<String>) -> KeyValue {
    KeyValue {
        key: key.into(),
        value: Some(AnyValue {
            value: Some(Value::StringValue(value.into())),
        }),
    }
}

/// A sample's label pairs as data point attributes, verbatim.
///
/// Keys stay unique: a repeated label name keeps its last value, in the position
/// of its first appearance.
pub fn label_attributes(labels: &[LabelPair]) -> Vec<KeyValue> {
    let mut attributes: Vec<KeyValue> = Vec::with_capacity(labels.len());
    for label in labels {
        let attribute = string_attribute(label.name(), label.value());
        match attributes.iter_mut().find(|kv| kv.key == attribute.key) {
            Some(existing) => *existing = attribute,
            None => attributes.push(attribute),
        }
    }
    attributes
}

/// Identity labels as resource attributes.
pub fn identity_attributes(labels: &IdentityLabels) -> Vec<KeyValue> {
    labels
        .iter()
        .map(|(key, value)| string_attribute(key, value))
        .collect()
}
