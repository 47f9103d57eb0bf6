//! Logging setup.
//!
//! Installs the process-wide `tracing` subscriber and picks the event sink
//! that pipeline executors report lifecycle events to.

use crate::events::{EventSink, LoggingEventSink, NoOpEventSink};
use crate::settings::LoggingConfig;
use std::sync::Arc;
use tracing::Subscriber;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Builds the filter: `RUST_LOG` when set, the configured level otherwise.
#[must_use]
pub fn env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level))
}

fn build_subscriber<W>(filter: EnvFilter, json: bool, writer: W) -> impl Subscriber + Send + Sync
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let format = if json {
        fmt::layer()
            .json()
            .with_current_span(true)
            .with_writer(writer)
            .boxed()
    } else {
        fmt::layer().compact().with_writer(writer).boxed()
    };
    tracing_subscriber::registry().with(filter).with(format)
}

/// Builds the subscriber described by `config`, writing to stdout.
pub fn subscriber(config: &LoggingConfig) -> impl Subscriber + Send + Sync {
    build_subscriber(env_filter(config), config.json, std::io::stdout)
}

/// Installs the global subscriber.
///
/// # Errors
///
/// Fails if a global subscriber is already installed.
pub fn init_tracing(config: &LoggingConfig) -> Result<(), TryInitError> {
    subscriber(config).try_init()
}

/// Returns the sink for pipeline lifecycle events.
///
/// Events are only logged when intermediate steps are requested.
#[must_use]
pub fn event_sink(config: &LoggingConfig) -> Arc<dyn EventSink> {
    if config.log_intermediate_steps {
        Arc::new(LoggingEventSink::default())
    } else {
        Arc::new(NoOpEventSink)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::PipelineEvent;
    use parking_lot::Mutex;
    use std::io;
    use uuid::Uuid;

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Captured {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock()).into_owned()
        }
    }

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn capturing(json: bool) -> (impl Subscriber + Send + Sync, Captured) {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = build_subscriber(EnvFilter::new("info"), json, move || writer.clone());
        (subscriber, captured)
    }

    #[tokio::test]
    async fn test_event_sink_follows_config() {
        let (subscriber, captured) = capturing(false);
        let _guard = tracing::subscriber::set_default(subscriber);

        let quiet = event_sink(&LoggingConfig::default());
        quiet
            .emit(&PipelineEvent::new("pipeline.started", "quiet_flow", Uuid::new_v4()))
            .await;
        assert!(captured.text().is_empty());

        let verbose = event_sink(&LoggingConfig {
            log_intermediate_steps: true,
            ..LoggingConfig::default()
        });
        verbose
            .emit(&PipelineEvent::new("pipeline.started", "loud_flow", Uuid::new_v4()))
            .await;

        let text = captured.text();
        assert!(text.contains("Event: pipeline.started"));
        assert!(text.contains("loud_flow"));
        assert!(!text.contains("quiet_flow"));
    }

    #[test]
    fn test_json_format_writes_json_lines() {
        let (subscriber, captured) = capturing(true);
        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(vehicle_id = "TRUCK-22", "Booked");
            tracing::debug!("filtered out");
        });

        let text = captured.text();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 1);
        let line: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(line["fields"]["message"], "Booked");
        assert_eq!(line["fields"]["vehicle_id"], "TRUCK-22");
        assert_eq!(line["level"], "INFO");
    }
}
