//! Event sink system for observability.
//!
//! The tool-chain executor reports pipeline and stage lifecycle events to an
//! [`EventSink`] handed to it at construction time.

mod sink;

pub use sink::{CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink, PipelineEvent};
