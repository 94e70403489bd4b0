//! Receive Envoy metrics service streams and translate them to OpenTelemetry.
//!
//! [`envoymetrics`] implements the server side of Envoy's
//! `envoy.service.metrics.v3.MetricsService` on [tonic]. Every message a proxy
//! streams in is a batch of Prometheus metric families; each batch becomes one
//! OTLP [`translate::MetricsDocument`] carrying the proxy's identity as resource
//! attributes, handed to a [`pipeline::MetricsConsumer`] of your choosing.
//!
//! # Getting Started
//!
//! Pick a consumer: a [`pipeline::ChannelConsumer`] to process documents on your
//! own task, or a [`downstream::OtlpExporter`] to forward them to a collector.
//! Then serve [`receiver::MetricsReceiverService::into_server`] on a tonic router
//! and point Envoy's `stats_sinks` at it.
//!
//! Counters, gauges and histograms are translated. Histograms are assumed to be
//! cumulative; see [`translate`].

pub mod config;
pub mod downstream;
pub mod pipeline;
pub mod receiver;
pub mod translate;
pub mod types;

/// Internal generated types - ideally you shouldn't need to do much with them.
/// Nevertheless, they are exported in case you need them.
pub mod proto;
