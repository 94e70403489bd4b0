//! Where translated documents go once a stream message has been converted

use std::future::Future;

use crate::translate::MetricsDocument;

mod channel_consumer;
mod logging_consumer;

pub use channel_consumer::{ChannelClosed, ChannelConsumer};
pub use logging_consumer::LoggingConsumer;

pub(crate) type StdError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A drain that accepts one document per stream message.
///
/// The receiver awaits each hand-off before it reads the next message, so a
/// slow consumer slows its stream down. An error ends the stream it came from.
pub trait MetricsConsumer: Send + Sync + 'static {
    /// Take ownership of a document
    fn consume(
        &self,
        document: MetricsDocument,
    ) -> impl Future<Output = Result<(), StdError>> + Send;
}
