use crate::proto::{
    io::prometheus::client::{MetricFamily, MetricType},
    opentelemetry::metrics::v1::{metric::Data, AggregationTemporality, Metric, Sum},
};

use super::{helpers::normalize_name, number_data_point, Conversion, ConvertError};

/// A counter family as a cumulative, monotonic sum with one data point per sample.
pub fn convert_counter(family: &MetricFamily) -> Conversion<Metric> {
    let mut data_points = Vec::with_capacity(family.metric.len());
    for (index, sample) in family.metric.iter().enumerate() {
        let Some(counter) = sample.counter.as_ref() else {
            return Conversion::Errored(ConvertError::missing_value(
                family,
                MetricType::Counter,
                index,
            ));
        };
        data_points.push(number_data_point(sample, counter.value()));
    }

    Conversion::Converted(Metric {
        name: normalize_name(family.name()).to_string(),
        description: family.help().to_string(),
        data: Some(Data::Sum(Sum {
            data_points,
            aggregation_temporality: AggregationTemporality::Cumulative as i32,
            is_monotonic: true,
        })),
        ..Default::default()
    })
}

#[cfg(test)]
mod test {
    use crate::{
        proto::{
            io::prometheus::client::MetricType,
            opentelemetry::metrics::v1::{metric::Data, number_data_point, AggregationTemporality},
        },
        translate::{
            test_families::{counter_sample, family, gauge_sample},
            Conversion, ConvertError,
        },
    };

    use super::convert_counter;

    #[test_log::test]
    fn every_sample_is_a_monotonic_cumulative_point() {
        let family = family(
            "downstream_cx_total",
            MetricType::Counter,
            vec![
                counter_sample(&[("listener", "a")], 1.0, 1_000),
                counter_sample(&[("listener", "b")], 2.5, 2_000),
                counter_sample(&[], 0.0, 3_000),
            ],
        );
        let Conversion::Converted(metric) = convert_counter(&family) else {
            panic!("counter converts");
        };
        assert_eq!("downstream_cx_total", metric.name);
        assert_eq!("help for downstream_cx_total", metric.description);
        let Some(Data::Sum(sum)) = metric.data else {
            panic!("counters become sums");
        };
        assert!(sum.is_monotonic);
        assert_eq!(
            AggregationTemporality::Cumulative as i32,
            sum.aggregation_temporality
        );
        let values: Vec<_> = sum.data_points.iter().map(|p| p.value).collect();
        assert_eq!(
            vec![
                Some(number_data_point::Value::AsDouble(1.0)),
                Some(number_data_point::Value::AsDouble(2.5)),
                Some(number_data_point::Value::AsDouble(0.0)),
            ],
            values
        );
        let times: Vec<u64> = sum.data_points.iter().map(|p| p.time_unix_nano).collect();
        assert_eq!(
            vec![1_000_000_000, 2_000_000_000, 3_000_000_000],
            times
        );
        assert!(sum.data_points[2].attributes.is_empty());
    }

    #[test_log::test]
    fn name_is_normalized() {
        let created = family(
            "rq_created",
            MetricType::Counter,
            vec![counter_sample(&[], 1.0, 1)],
        );
        let metric = convert_counter(&created)
            .converted()
            .expect("counter converts");
        assert_eq!("rq", metric.name);

        let bare = family("_count", MetricType::Counter, vec![]);
        let metric = convert_counter(&bare)
            .converted()
            .expect("counter converts");
        assert_eq!("_count", metric.name);
    }

    #[test_log::test]
    fn missing_counter_payload_is_an_error() {
        let family = family(
            "rq_total",
            MetricType::Counter,
            vec![counter_sample(&[], 1.0, 1), gauge_sample(&[], 1.0, 1)],
        );
        assert_eq!(
            Conversion::Errored(ConvertError::MissingValue {
                family: "rq_total".to_string(),
                kind: "COUNTER",
                index: 1,
            }),
            convert_counter(&family)
        );
    }
}
