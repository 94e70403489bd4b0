use crate::proto::{
    io::prometheus::client::{MetricFamily, MetricType},
    opentelemetry::metrics::v1::{metric::Data, Gauge, Metric},
};

use super::{helpers::normalize_name, number_data_point, Conversion, ConvertError};

/// A gauge family as a gauge with one data point per sample.
pub fn convert_gauge(family: &MetricFamily) -> Conversion<Metric> {
    let mut data_points = Vec::with_capacity(family.metric.len());
    for (index, sample) in family.metric.iter().enumerate() {
        let Some(gauge) = sample.gauge.as_ref() else {
            return Conversion::Errored(ConvertError::missing_value(
                family,
                MetricType::Gauge,
                index,
            ));
        };
        data_points.push(number_data_point(sample, gauge.value()));
    }

    Conversion::Converted(Metric {
        name: normalize_name(family.name()).to_string(),
        description: family.help().to_string(),
        data: Some(Data::Gauge(Gauge { data_points })),
        ..Default::default()
    })
}
