//! Nothing to see here: `build.rs` regenerates the checked-in envoymetrics protos.
