// envoy and prometheus use poor enum variant names
#[allow(clippy::all)]
#[rustfmt::skip]
pub mod envoy {
    pub mod config {
        pub mod core {
            pub mod v3 {
                include!("envoy.config.core.v3.rs");
            }
        }
    }
    pub mod service {
        pub mod metrics {
            pub mod v3 {
                include!("envoy.service.metrics.v3.rs");
            }
        }
    }
}

#[allow(clippy::all)]
#[rustfmt::skip]
pub mod io {
    pub mod prometheus {
        pub mod client {
            include!("io.prometheus.client.rs");
        }
    }
}

/// OTLP types, re-exported so downstream code does not need its own opentelemetry-proto dependency.
pub use opentelemetry_proto::tonic as opentelemetry;
