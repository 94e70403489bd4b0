use std::future::Future;

use crate::translate::MetricsDocument;

use super::{MetricsConsumer, StdError};

/// A consumer that just logs documents and drops them
#[derive(Debug, Clone, Copy)]
pub struct LoggingConsumer {
    log_level: log::Level,
}

impl Default for LoggingConsumer {
    fn default() -> Self {
        Self {
            log_level: log::Level::Info,
        }
    }
}

impl LoggingConsumer {
    /// Log documents at `log_level`
    pub fn new(log_level: log::Level) -> Self {
        Self { log_level }
    }
}

impl MetricsConsumer for LoggingConsumer {
    fn consume(
        &self,
        document: MetricsDocument,
    ) -> impl Future<Output = Result<(), StdError>> + Send {
        log::log!(self.log_level, "Consumed: {document}");
        futures::future::ready(Ok::<_, StdError>(()))
    }
}
