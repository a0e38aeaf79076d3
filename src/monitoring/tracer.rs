/*!
 * Request Tracing
 * Structured tracing for engine operations using the tracing crate
 *
 * Every request gets a uuid trace id; slow ones are logged at warn.
 */

use crate::core::limits::{ENV_TRACE_JSON, SLOW_OPERATION_THRESHOLD};
use std::time::Instant;
use tracing::{debug, info, span, warn, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uuid::Uuid;

/// Initialize structured tracing
///
/// `RUST_LOG` sets the filter (default `info`); `BANKER_TRACE_JSON=1` switches
/// to one JSON object per line.
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = json_output_requested(std::env::var(ENV_TRACE_JSON).ok().as_deref());

    let json_layer = json.then(|| tracing_subscriber::fmt::layer().json().with_current_span(true));
    let compact_layer = (!json).then(|| tracing_subscriber::fmt::layer().compact());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(compact_layer)
        .init();
    info!(json, "tracing initialized");
}

fn json_output_requested(value: Option<&str>) -> bool {
    matches!(value.map(str::trim), Some("1") | Some("true"))
}

/// Generate a unique trace ID for request correlation
pub fn generate_trace_id() -> String {
    Uuid::new_v4().to_string()
}

/// Span covering one client request from decode to response
pub struct RequestSpan {
    span: tracing::Span,
    start: Instant,
    operation: String,
    trace_id: String,
}

impl RequestSpan {
    pub fn new(operation: &str) -> Self {
        let trace_id = generate_trace_id();

        let span = span!(
            Level::DEBUG,
            "request",
            trace_id = %trace_id,
            op = operation,
            outcome = tracing::field::Empty,
            duration_us = tracing::field::Empty,
        );

        Self {
            span,
            start: Instant::now(),
            operation: operation.to_string(),
            trace_id,
        }
    }

    pub fn trace_id(&self) -> &str {
        &self.trace_id
    }

    /// Record how the request ended (`granted`, `rejected_unsafe`, ...)
    pub fn record_outcome(&self, outcome: &str) {
        self.span.record("outcome", outcome);
    }

    /// Enter the span context
    pub fn enter(&self) -> tracing::span::Entered<'_> {
        self.span.enter()
    }
}

impl Drop for RequestSpan {
    fn drop(&mut self) {
        let duration = self.start.elapsed();
        self.span.record("duration_us", duration.as_micros() as u64);
        let _entered = self.span.enter();

        if duration > SLOW_OPERATION_THRESHOLD {
            warn!(
                trace_id = %self.trace_id,
                op = %self.operation,
                duration_ms = duration.as_millis() as u64,
                slow = true,
                "slow request detected"
            );
        } else {
            debug!(
                trace_id = %self.trace_id,
                op = %self.operation,
                duration_us = duration.as_micros() as u64,
                "request completed"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_output_switch() {
        assert!(json_output_requested(Some("1")));
        assert!(json_output_requested(Some("true")));
        assert!(!json_output_requested(Some("0")));
        assert!(!json_output_requested(Some("")));
        assert!(!json_output_requested(None));
    }

    #[test]
    fn test_trace_ids_are_unique() {
        assert_ne!(generate_trace_id(), generate_trace_id());
    }

    #[test]
    fn test_request_span_without_subscriber() {
        let span = RequestSpan::new("check_safety");
        span.record_outcome("safe");
        assert_eq!(span.trace_id().len(), 36);
    }
}
