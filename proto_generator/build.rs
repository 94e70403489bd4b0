use std::path::PathBuf;
#[allow(clippy::unwrap_used)]
fn main() {
    let out_dir = PathBuf::from("../envoymetrics/src/proto");
    let proto_dir = "../proto";

    eprintln!("Hi brave developer! If you are changing protos and envoymetrics fails to build, please retry 1 time.");
    eprintln!("Cargo currently does not have a nice way for me to express a dependency order between these 2");
    eprintln!("workspace projects - because this project is _specifically_ supposed to not be a Cargo dependency.");
    eprintln!("I did this so users don't need to have protoc when compiling envoymetrics!");

    // Envoy only ever dials us, so only the server half of the metrics service is needed.
    tonic_build::configure()
        .build_client(false)
        .build_server(true)
        .out_dir(out_dir)
        .compile_protos(
            &[
                format!("{proto_dir}/io/prometheus/client/metrics.proto"),
                format!("{proto_dir}/envoy/config/core/v3/base.proto"),
                format!("{proto_dir}/envoy/service/metrics/v3/metrics_service.proto"),
            ],
            &[proto_dir],
        )
        .unwrap();

    println!("cargo:rerun-if-changed=../proto");
}
