//! Settings an embedding application can load with its own configuration loader.

use serde::Deserialize;

/// Default ceiling for one decoded stream message. Envoy snapshots of a busy
/// proxy run to a few megabytes.
pub const DEFAULT_MAX_DECODING_MESSAGE_SIZE: usize = 16 * 1024 * 1024;

/// Default depth of the document queue behind a [`crate::pipeline::ChannelConsumer`]
pub const DEFAULT_CHANNEL_CAPACITY: usize = 128;

/// How translated documents describe their instrumentation scope.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TranslatorConfig {
    /// Name of the single scope every metric lives under
    pub scope_name: String,
    /// Version of that scope
    pub scope_version: String,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            scope_name: env!("CARGO_PKG_NAME").to_string(),
            scope_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Settings for the streaming receiver.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ReceiverConfig {
    /// Scope settings for the documents produced
    pub translator: TranslatorConfig,
    /// Largest stream message the gRPC server will decode, in bytes
    pub max_decoding_message_size: usize,
    /// Documents buffered by a channel consumer before the receiver waits
    pub channel_capacity: usize,
}

impl Default for ReceiverConfig {
    fn default() -> Self {
        Self {
            translator: TranslatorConfig::default(),
            max_decoding_message_size: DEFAULT_MAX_DECODING_MESSAGE_SIZE,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

#[cfg(test)]
mod test {
    use super::{ReceiverConfig, TranslatorConfig, DEFAULT_MAX_DECODING_MESSAGE_SIZE};

    #[test_log::test]
    fn scope_defaults_to_the_crate() {
        let config = TranslatorConfig::default();
        assert_eq!("envoymetrics", config.scope_name);
        assert_eq!(env!("CARGO_PKG_VERSION"), config.scope_version);
    }

    #[test_log::test]
    fn partial_documents_fill_in_defaults() {
        let config: ReceiverConfig = serde_json::from_str(
            r#"{
                "translator": { "scope_name": "mesh" },
                "channel_capacity": 4
            }"#,
        )
        .expect("config deserializes");
        assert_eq!("mesh", config.translator.scope_name);
        assert_eq!(env!("CARGO_PKG_VERSION"), config.translator.scope_version);
        assert_eq!(4, config.channel_capacity);
        assert_eq!(
            DEFAULT_MAX_DECODING_MESSAGE_SIZE,
            config.max_decoding_message_size
        );
    }

    #[test_log::test]
    fn empty_document_is_the_default() {
        let config: ReceiverConfig = serde_json::from_str("{}").expect("config deserializes");
        assert_eq!(ReceiverConfig::default(), config);
    }
}
