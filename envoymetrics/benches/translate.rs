use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use rand::{rngs::StdRng, Rng, SeedableRng};

use envoymetrics::{
    proto::{
        envoy::{
            config::core::v3::Node,
            service::metrics::v3::{stream_metrics_message::Identifier, StreamMetricsMessage},
        },
        io::prometheus::client::{
            Bucket, Counter, Gauge, Histogram, LabelPair, Metric, MetricFamily, MetricType,
        },
    },
    receiver::validate,
    translate::{MetricsBuilder, Translator},
    types::IdentityLabels,
};

const UPSTREAM_CLUSTERS: usize = 50;
const BUCKET_BOUNDS: [f64; 20] = [
    0.5, 1.0, 5.0, 10.0, 25.0, 50.0, 100.0, 250.0, 500.0, 1_000.0, 2_500.0, 5_000.0, 10_000.0,
    30_000.0, 60_000.0, 300_000.0, 600_000.0, 1_800_000.0, 3_600_000.0, f64::INFINITY,
];

fn labels(cluster: usize) -> Vec<LabelPair> {
    vec![LabelPair {
        name: Some("envoy_cluster_name".to_string()),
        value: Some(format!("upstream_{cluster}")),
    }]
}

fn family(name: &str, kind: MetricType, metric: Vec<Metric>) -> MetricFamily {
    MetricFamily {
        name: Some(name.to_string()),
        help: Some(String::new()),
        r#type: Some(kind as i32),
        metric,
        unit: None,
    }
}

/// Roughly what a sidecar with a few dozen upstream clusters sends every flush
fn envoy_snapshot(rng: &mut StdRng) -> StreamMetricsMessage {
    let timestamp_ms = Some(1_700_000_000_000);
    let counters = (0..UPSTREAM_CLUSTERS)
        .map(|cluster| Metric {
            label: labels(cluster),
            counter: Some(Counter {
                value: Some(rng.gen_range(0..1_000_000) as f64),
            }),
            timestamp_ms,
            ..Default::default()
        })
        .collect();
    let gauges = (0..UPSTREAM_CLUSTERS)
        .map(|cluster| Metric {
            label: labels(cluster),
            gauge: Some(Gauge {
                value: Some(rng.gen_range(0..1_000) as f64),
            }),
            timestamp_ms,
            ..Default::default()
        })
        .collect();
    let histograms = (0..UPSTREAM_CLUSTERS)
        .map(|cluster| {
            let mut cumulative = 0;
            let bucket = BUCKET_BOUNDS
                .iter()
                .map(|upper_bound| {
                    cumulative += rng.gen_range(0..100);
                    Bucket {
                        cumulative_count: Some(cumulative),
                        cumulative_count_float: None,
                        upper_bound: Some(*upper_bound),
                    }
                })
                .collect();
            Metric {
                label: labels(cluster),
                histogram: Some(Histogram {
                    sample_count: Some(cumulative),
                    sample_count_float: None,
                    sample_sum: Some(rng.gen_range(0.0..1_000_000.0)),
                    bucket,
                }),
                timestamp_ms,
                ..Default::default()
            }
        })
        .collect();

    StreamMetricsMessage {
        identifier: Some(Identifier {
            node: Some(Node {
                id: "sidecar~10.0.0.1~backend-7d9f~default.svc.cluster.local".to_string(),
                cluster: "backend".to_string(),
                user_agent_name: "envoy".to_string(),
            }),
        }),
        envoy_metrics: vec![
            family("envoy_cluster_upstream_rq_total", MetricType::Counter, counters),
            family("envoy_cluster_upstream_cx_active", MetricType::Gauge, gauges),
            family(
                "envoy_cluster_upstream_rq_time_bucket",
                MetricType::Histogram,
                histograms,
            ),
        ],
    }
}

pub fn translation(criterion: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let message = envoy_snapshot(&mut rng);
    let identity = IdentityLabels::from_identifier(message.identifier.as_ref());
    let translator = Translator::default();

    let mut group = criterion.benchmark_group("translate");
    group.throughput(criterion::Throughput::Elements((3 * UPSTREAM_CLUSTERS) as u64));

    group.bench_function("validate", |bencher| {
        bencher.iter(|| black_box(validate(black_box(&message))))
    });

    group.bench_function("envoy snapshot", |bencher| {
        bencher.iter(|| {
            black_box(translator.translate(&identity, black_box(&message.envoy_metrics)))
        })
    });

    group.bench_function("build snapshot copy", |bencher| {
        bencher.iter_batched(
            || {
                let document = translator
                    .translate(&identity, &message.envoy_metrics)
                    .unwrap_or_else(|_| MetricsBuilder::new(identity.clone()).build());
                let mut builder = MetricsBuilder::new(identity.clone());
                for metric in document.metrics() {
                    builder.add(metric.clone());
                }
                builder
            },
            |builder| black_box(builder.build()),
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, translation);
criterion_main!(benches);
