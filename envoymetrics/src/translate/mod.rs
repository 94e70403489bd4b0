//! Prometheus metric families to OpenTelemetry metrics.
//!
//! Every family is converted on its own, by type, into at most one OTLP metric.
//! Counters become cumulative monotonic sums, gauges become gauges and histograms
//! become cumulative explicit-bucket histograms. Everything else is skipped.
//!
//! Histograms are assumed to be cumulative. Envoy can be configured to emit
//! delta histograms; those will be labeled cumulative here all the same.

mod builder;
mod counter;
mod gauge;
pub mod helpers;
mod histogram;

pub use builder::{MetricsBuilder, MetricsDocument};
pub use counter::convert_counter;
pub use gauge::convert_gauge;
pub use histogram::{convert_histogram, convert_histogram_sample};

use crate::{
    config::TranslatorConfig,
    proto::{
        io::prometheus::client::{self, MetricFamily, MetricType},
        opentelemetry::metrics::v1::{number_data_point, Metric, NumberDataPoint},
    },
    types::IdentityLabels,
};

use helpers::{label_attributes, millis_to_nanos};

/// The outcome of converting one family, or one sample of one.
///
/// Skipping is policy rather than failure: the input is well formed but has no
/// faithful representation, so it is left out of the output.
#[derive(Debug, Clone, PartialEq)]
pub enum Conversion<T> {
    /// Converted successfully
    Converted(T),
    /// Deliberately left out of the output
    Skipped(SkipReason),
    /// The input was malformed
    Errored(ConvertError),
}

impl<T> Conversion<T> {
    /// True for `Skipped`
    pub fn is_skipped(&self) -> bool {
        matches!(self, Conversion::Skipped(_))
    }

    /// The converted value, if any
    pub fn converted(self) -> Option<T> {
        match self {
            Conversion::Converted(t) => Some(t),
            _ => None,
        }
    }
}

/// Why an input was left out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// A family type with no converter: summaries, untyped, gauge histograms or
    /// numbers this build does not know. Carries the raw type number.
    UnsupportedType(i32),
    /// A histogram sample without a sample count
    MissingSampleCount,
    /// A histogram sample without a sample sum
    MissingSampleSum,
    /// A histogram sample without any buckets
    NoBuckets,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::UnsupportedType(raw) => match MetricType::try_from(*raw) {
                Ok(known) => write!(f, "unsupported type {}", known.as_str_name()),
                Err(_) => write!(f, "unknown type {raw}"),
            },
            SkipReason::MissingSampleCount => f.write_str("histogram sample count is absent"),
            SkipReason::MissingSampleSum => f.write_str("histogram sample sum is absent"),
            SkipReason::NoBuckets => f.write_str("histogram sample has no buckets"),
        }
    }
}

/// A family whose samples do not match its declared type
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConvertError {
    /// A sample is missing the value payload of its family's type
    #[error("sample {index} of {kind} family {family:?} has no {kind} value")]
    MissingValue {
        /// The family name as received
        family: String,
        /// The family's declared type
        kind: &'static str,
        /// Position of the offending sample
        index: usize,
    },
}

impl ConvertError {
    pub(crate) fn missing_value(family: &MetricFamily, kind: MetricType, index: usize) -> Self {
        ConvertError::MissingValue {
            family: family.name().to_string(),
            kind: kind.as_str_name(),
            index,
        }
    }
}

/// The declared type of a family. Proto2 defaults an absent type to COUNTER;
/// numbers outside the enum come back as `Err` with the raw value.
pub fn family_type(family: &MetricFamily) -> Result<MetricType, i32> {
    match family.r#type {
        None => Ok(MetricType::Counter),
        Some(raw) => MetricType::try_from(raw).map_err(|_| raw),
    }
}

/// Convert one family by its declared type.
pub fn convert_family(family: &MetricFamily) -> Conversion<Metric> {
    match family_type(family) {
        Ok(MetricType::Counter) => convert_counter(family),
        Ok(MetricType::Gauge) => convert_gauge(family),
        Ok(MetricType::Histogram) => convert_histogram(family),
        Ok(other) => Conversion::Skipped(SkipReason::UnsupportedType(other as i32)),
        Err(raw) => Conversion::Skipped(SkipReason::UnsupportedType(raw)),
    }
}

/// Converts the families of one stream message into one document.
#[derive(Debug, Clone, Default)]
pub struct Translator {
    config: TranslatorConfig,
}

impl Translator {
    /// A translator with the given scope settings
    pub fn new(config: TranslatorConfig) -> Self {
        Self { config }
    }

    /// Convert every family through a fresh builder seeded with `identity`.
    /// The first malformed family fails the whole message.
    pub fn translate(
        &self,
        identity: &IdentityLabels,
        families: &[MetricFamily],
    ) -> Result<MetricsDocument, ConvertError> {
        let mut builder = MetricsBuilder::with_config(identity.clone(), &self.config);
        for family in families {
            match convert_family(family) {
                Conversion::Converted(metric) => builder.add(metric),
                Conversion::Skipped(reason) => {
                    log::trace!("skipping family {:?}: {reason}", family.name())
                }
                Conversion::Errored(error) => return Err(error),
            }
        }
        Ok(builder.into_document())
    }
}

/// A counter or gauge sample as a double data point
fn number_data_point(sample: &client::Metric, value: f64) -> NumberDataPoint {
    NumberDataPoint {
        attributes: label_attributes(&sample.label),
        time_unix_nano: millis_to_nanos(sample.timestamp_ms()),
        value: Some(number_data_point::Value::AsDouble(value)),
        ..Default::default()
    }
}
