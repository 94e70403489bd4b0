//! Sending translated documents on to an OpenTelemetry collector

mod channel_connection;
mod otlp_exporter;

pub use channel_connection::{get_client, ChannelType};
pub use otlp_exporter::OtlpExporter;
