use crate::{
    proto::{
        envoy::service::metrics::v3::StreamMetricsMessage,
        io::prometheus::client::{Metric, MetricFamily, MetricType},
    },
    translate::{family_type, ConvertError},
};

/// A stream message that breaks its own structure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// An identifier was sent without the node it identifies
    #[error("stream identifier has no node")]
    MissingNode,
    /// A family without a name
    #[error("metric family {index} has no name")]
    UnnamedFamily {
        /// Position of the family in the message
        index: usize,
    },
    /// A sample without the value its family's type calls for
    #[error(transparent)]
    SampleMismatch(#[from] ConvertError),
}

/// Check a message's structure before anything is converted.
///
/// Families of unsupported types are not inspected past their name; they are
/// skipped during translation anyway.
pub fn validate(message: &StreamMetricsMessage) -> Result<(), ValidationError> {
    if let Some(identifier) = &message.identifier {
        if identifier.node.is_none() {
            return Err(ValidationError::MissingNode);
        }
    }
    for (index, family) in message.envoy_metrics.iter().enumerate() {
        if family.name().is_empty() {
            return Err(ValidationError::UnnamedFamily { index });
        }
        validate_samples(family)?;
    }
    Ok(())
}

fn validate_samples(family: &MetricFamily) -> Result<(), ConvertError> {
    let (kind, has_payload): (MetricType, fn(&Metric) -> bool) = match family_type(family) {
        Ok(kind @ MetricType::Counter) => (kind, |sample: &Metric| sample.counter.is_some()),
        Ok(kind @ MetricType::Gauge) => (kind, |sample: &Metric| sample.gauge.is_some()),
        Ok(kind @ MetricType::Histogram) => (kind, |sample: &Metric| sample.histogram.is_some()),
        _ => return Ok(()),
    };
    match family.metric.iter().position(|sample| !has_payload(sample)) {
        Some(index) => Err(ConvertError::missing_value(family, kind, index)),
        None => Ok(()),
    }
}
