use super::internal::helpers::sanitize;
use super::statsig_error::StatsigError;

/// Receives every non-fatal failure from the sync layer.
///
/// Reporting never changes control flow: the failing operation has already
/// retained its previous state by the time `report` is called.
pub trait StatsigErrorSink: Send + Sync {
    fn report(&self, error: &StatsigError);
}

/// Writes reported errors to the `log` facade under the `statsig` target.
#[derive(Default)]
pub struct LogErrorSink;

impl StatsigErrorSink for LogErrorSink {
    fn report(&self, error: &StatsigError) {
        let mut message = error.to_string();
        let mut source = std::error::Error::source(error);
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }

        log::error!(target: "statsig", "{}", sanitize(&message));
    }
}
