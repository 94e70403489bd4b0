use crate::proto::{
    io::prometheus::client::{self, Bucket, MetricFamily, MetricType},
    opentelemetry::metrics::v1::{
        metric::Data, AggregationTemporality, Histogram, HistogramDataPoint, Metric,
    },
};

use super::{
    helpers::{label_attributes, millis_to_nanos, normalize_name},
    Conversion, ConvertError, SkipReason,
};

/// A histogram family as one cumulative explicit-bucket histogram.
///
/// Samples that cannot be represented are left out, and the metric is still
/// produced even if that leaves it without data points.
pub fn convert_histogram(family: &MetricFamily) -> Conversion<Metric> {
    let mut data_points = Vec::with_capacity(family.metric.len());
    for (index, sample) in family.metric.iter().enumerate() {
        match convert_histogram_sample(family, index, sample) {
            Conversion::Converted(point) => data_points.push(point),
            Conversion::Skipped(reason) => {
                log::trace!(
                    "skipping sample {index} of histogram {:?}: {reason}",
                    family.name()
                )
            }
            Conversion::Errored(error) => return Conversion::Errored(error),
        }
    }

    Conversion::Converted(Metric {
        name: normalize_name(family.name()).to_string(),
        description: family.help().to_string(),
        data: Some(Data::Histogram(Histogram {
            data_points,
            aggregation_temporality: AggregationTemporality::Cumulative as i32,
        })),
        ..Default::default()
    })
}

/// One histogram sample as a data point.
///
/// Skipped when the count or sum is absent, or when there are no buckets at all.
/// Buckets with a non-finite upper bound are dropped; the rest keep their
/// received order with their cumulative counts aligned 1:1 to the bounds.
pub fn convert_histogram_sample(
    family: &MetricFamily,
    index: usize,
    sample: &client::Metric,
) -> Conversion<HistogramDataPoint> {
    let Some(histogram) = sample.histogram.as_ref() else {
        return Conversion::Errored(ConvertError::missing_value(
            family,
            MetricType::Histogram,
            index,
        ));
    };
    let Some(count) = histogram.sample_count else {
        return Conversion::Skipped(SkipReason::MissingSampleCount);
    };
    let Some(sum) = histogram.sample_sum else {
        return Conversion::Skipped(SkipReason::MissingSampleSum);
    };
    if histogram.bucket.is_empty() {
        return Conversion::Skipped(SkipReason::NoBuckets);
    }

    let (explicit_bounds, bucket_counts): (Vec<f64>, Vec<u64>) = histogram
        .bucket
        .iter()
        .filter(|bucket| bucket.upper_bound().is_finite())
        .map(|bucket| (bucket.upper_bound(), cumulative_count(bucket)))
        .unzip();

    Conversion::Converted(HistogramDataPoint {
        attributes: label_attributes(&sample.label),
        time_unix_nano: millis_to_nanos(sample.timestamp_ms()),
        count,
        sum: Some(sum),
        explicit_bounds,
        bucket_counts,
        ..Default::default()
    })
}

fn cumulative_count(bucket: &Bucket) -> u64 {
    match (bucket.cumulative_count, bucket.cumulative_count_float) {
        (Some(count), _) => count,
        (None, Some(count)) => count as u64,
        (None, None) => 0,
    }
}
