/*!
 * Structured Tracing
 * Subscriber bootstrap and timed operation spans using the tracing crate
 *
 * Features:
 * - JSON-formatted logs for structured parsing
 * - Compact human-readable output for development
 * - Operation spans that report their duration and flag slow runs
 */

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, span, warn, Level, Span};
use tracing_subscriber::{
    fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

/// Environment variable selecting JSON output
pub const ENV_TRACE_JSON: &str = "SYSPRIMS_TRACE_JSON";

/// Operations slower than this are logged at warn level
const SLOW_OPERATION: Duration = Duration::from_millis(100);

static NEXT_OPERATION_ID: AtomicU64 = AtomicU64::new(1);

/// Initialize structured tracing
///
/// Environment variables:
/// - RUST_LOG: Set log level (default: info)
/// - SYSPRIMS_TRACE_JSON: Enable JSON output (default: false)
///
/// Returns `false` if a global subscriber was already installed.
pub fn init_tracing() -> bool {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let use_json = std::env::var(ENV_TRACE_JSON)
        .map(|v| v == "1" || v == "true")
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(env_filter);

    let installed = if use_json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_thread_names(true)
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_span_events(FmtSpan::CLOSE),
            )
            .try_init()
            .is_ok()
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_line_number(true)
                    .with_file(true)
                    .compact(),
            )
            .try_init()
            .is_ok()
    };

    if installed {
        debug!(json = use_json, "Structured tracing initialized");
    }
    installed
}

/// Timed span around one logical operation (snapshot save, load, ...)
pub struct OperationSpan {
    span: Span,
    start: Instant,
    id: u64,
}

impl OperationSpan {
    pub fn new(operation: &'static str) -> Self {
        let id = NEXT_OPERATION_ID.fetch_add(1, Ordering::Relaxed);
        let span = span!(
            Level::DEBUG,
            "operation",
            id,
            operation,
            duration_us = tracing::field::Empty,
            items = tracing::field::Empty,
            result = tracing::field::Empty,
        );

        Self {
            span,
            start: Instant::now(),
            id,
        }
    }

    /// Process-unique operation id
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn record_items(&self, count: usize) {
        self.span.record("items", count);
    }

    pub fn record_result(&self, success: bool) {
        self.span
            .record("result", if success { "success" } else { "error" });
    }

    /// Enter the span so events emitted meanwhile carry its fields
    pub fn enter(&self) -> tracing::span::Entered<'_> {
        self.span.enter()
    }
}

impl Drop for OperationSpan {
    fn drop(&mut self) {
        let duration = self.start.elapsed();
        let _entered = self.span.enter();
        self.span.record("duration_us", duration.as_micros() as u64);

        if duration > SLOW_OPERATION {
            warn!(
                id = self.id,
                duration_ms = duration.as_millis() as u64,
                slow = true,
                "slow operation detected"
            );
        }
    }
}

/// Start a timed operation span
#[inline]
pub fn span_operation(name: &'static str) -> OperationSpan {
    OperationSpan::new(name)
}
