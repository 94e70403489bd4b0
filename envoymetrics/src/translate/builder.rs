use std::fmt::Display;

use crate::{
    config::TranslatorConfig,
    proto::opentelemetry::{
        collector::metrics::v1::ExportMetricsServiceRequest,
        common::v1::{InstrumentationScope, KeyValue},
        metrics::v1::{metric::Data, Metric, ResourceMetrics, ScopeMetrics},
        resource::v1::Resource,
    },
    types::IdentityLabels,
};

use super::helpers::identity_attributes;

/// One translated stream message: a single resource carrying the proxy identity,
/// owning a single scope, owning the converted metrics in the order they were added.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsDocument {
    resource_metrics: ResourceMetrics,
}

impl MetricsDocument {
    /// The resource's identity attributes
    pub fn resource_attributes(&self) -> &[KeyValue] {
        self.resource_metrics
            .resource
            .as_ref()
            .map(|resource| resource.attributes.as_slice())
            .unwrap_or_default()
    }

    /// The single scope every metric lives under
    pub fn scope(&self) -> Option<&InstrumentationScope> {
        self.scope_metrics().and_then(|scope| scope.scope.as_ref())
    }

    /// The converted metrics, in the order they were added
    pub fn metrics(&self) -> &[Metric] {
        self.scope_metrics()
            .map(|scope| scope.metrics.as_slice())
            .unwrap_or_default()
    }

    /// Total data points across all metrics
    pub fn data_point_count(&self) -> usize {
        self.metrics().iter().map(data_point_count).sum()
    }

    /// The OTLP representation
    pub fn resource_metrics(&self) -> &ResourceMetrics {
        &self.resource_metrics
    }

    /// Take the OTLP representation
    pub fn into_resource_metrics(self) -> ResourceMetrics {
        self.resource_metrics
    }

    fn scope_metrics(&self) -> Option<&ScopeMetrics> {
        self.resource_metrics.scope_metrics.first()
    }
}

impl From<MetricsDocument> for ExportMetricsServiceRequest {
    fn from(document: MetricsDocument) -> Self {
        ExportMetricsServiceRequest {
            resource_metrics: vec![document.into_resource_metrics()],
        }
    }
}

impl Display for MetricsDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "MetricsDocument {{ resource: {} attributes, metrics: {}, data points: {} }}",
            self.resource_attributes().len(),
            self.metrics().len(),
            self.data_point_count(),
        )
    }
}

fn data_point_count(metric: &Metric) -> usize {
    match &metric.data {
        Some(Data::Sum(sum)) => sum.data_points.len(),
        Some(Data::Gauge(gauge)) => gauge.data_points.len(),
        Some(Data::Histogram(histogram)) => histogram.data_points.len(),
        Some(Data::ExponentialHistogram(histogram)) => histogram.data_points.len(),
        Some(Data::Summary(summary)) => summary.data_points.len(),
        None => 0,
    }
}

/// Accumulates converted metrics for one identity. A builder lives for exactly
/// one stream message and is never shared.
#[derive(Debug)]
pub struct MetricsBuilder {
    identity: IdentityLabels,
    scope: InstrumentationScope,
    metrics: Vec<Metric>,
}

impl MetricsBuilder {
    /// A builder using the default scope name and version
    pub fn new(identity: IdentityLabels) -> Self {
        Self::with_config(identity, &TranslatorConfig::default())
    }

    /// A builder using a configured scope name and version
    pub fn with_config(identity: IdentityLabels, config: &TranslatorConfig) -> Self {
        Self {
            identity,
            scope: InstrumentationScope {
                name: config.scope_name.clone(),
                version: config.scope_version.clone(),
                ..Default::default()
            },
            metrics: Vec::new(),
        }
    }

    /// Append a converted metric. Same-named metrics stay distinct entries.
    pub fn add(&mut self, metric: Metric) {
        self.metrics.push(metric);
    }

    /// Number of metrics added so far
    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    /// True when nothing has been added
    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    /// Render a document from the accumulated state. Each call returns an
    /// independent snapshot.
    pub fn build(&self) -> MetricsDocument {
        MetricsDocument {
            resource_metrics: ResourceMetrics {
                resource: Some(Resource {
                    attributes: identity_attributes(&self.identity),
                    ..Default::default()
                }),
                scope_metrics: vec![ScopeMetrics {
                    scope: Some(self.scope.clone()),
                    metrics: self.metrics.clone(),
                    ..Default::default()
                }],
                ..Default::default()
            },
        }
    }

    /// Render a document, consuming the builder without copying the metrics.
    pub fn into_document(self) -> MetricsDocument {
        MetricsDocument {
            resource_metrics: ResourceMetrics {
                resource: Some(Resource {
                    attributes: identity_attributes(&self.identity),
                    ..Default::default()
                }),
                scope_metrics: vec![ScopeMetrics {
                    scope: Some(self.scope),
                    metrics: self.metrics,
                    ..Default::default()
                }],
                ..Default::default()
            },
        }
    }
}
