//! Error telemetry sink.
//!
//! Every caught error (storage access, query, mutation) is forwarded here as an
//! exception event, whether or not it is also shown to the user. Production
//! uses Sentry; tests use [`RecordingTelemetry`].
//!
//! Code that hands an error to [`Telemetry::capture`] logs it at `info` or
//! below, which the tracing integration turns into breadcrumbs. `warn` and
//! `error` logs become Sentry events of their own.

use std::error::Error;
use std::sync::{Arc, Mutex};

use sentry::integrations::tracing as sentry_tracing;

/// Map tracing levels to Sentry event types.
#[must_use]
pub fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

/// Destination for exception events.
pub trait Telemetry: Send + Sync {
    /// Record one exception event.
    fn capture(&self, error: &(dyn Error + 'static));
}

/// Shared handle to a telemetry sink.
pub type SharedTelemetry = Arc<dyn Telemetry>;

/// Forwards events to the Sentry hub.
///
/// When Sentry is not initialized (no DSN configured) events are dropped by
/// the SDK, so this is always safe to use.
#[derive(Debug, Clone, Copy, Default)]
pub struct SentryTelemetry;

impl Telemetry for SentryTelemetry {
    fn capture(&self, error: &(dyn Error + 'static)) {
        let event_id = sentry::capture_error(error);
        tracing::debug!(sentry_event_id = %event_id, "Exception captured");
    }
}

/// Keeps the message of every captured event in memory.
#[derive(Debug, Clone, Default)]
pub struct RecordingTelemetry {
    events: Arc<Mutex<Vec<String>>>,
}

impl RecordingTelemetry {
    /// Create an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages of all captured events, oldest first.
    #[must_use]
    pub fn events(&self) -> Vec<String> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    /// Number of captured events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.lock().map(|events| events.len()).unwrap_or(0)
    }

    /// Whether nothing has been captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Telemetry for RecordingTelemetry {
    fn capture(&self, error: &(dyn Error + 'static)) {
        if let Ok(mut events) = self.events.lock() {
            events.push(error.to_string());
        }
    }
}
