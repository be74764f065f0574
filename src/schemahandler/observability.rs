use std::fmt;
use std::sync::Arc;

use tracing::{error, info, warn};

use crate::error::{ErrorKind, TransformError};

/// Severity classification used for observer callbacks and alerting thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum IngestionSeverity {
    /// Informational event.
    Info,
    /// A continuable error: one record was skipped.
    Warning,
    /// A fatal error; the ingester is finished.
    Error,
    /// Fatal stream/I/O failure.
    Critical,
}

/// Identifies the input an event belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestionContext {
    pub input_name: String,
}

/// Counters reported when an ingestion run ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestionStats {
    /// Records successfully read.
    pub records: u64,
    /// Continuable errors skipped over.
    pub continuable_errors: u64,
}

/// Observer interface for ingestion outcomes.
///
/// Implementors can record metrics, logs, or trigger alerts.
pub trait IngestionObserver: Send + Sync {
    /// Called for every successfully read record.
    fn on_record(&self, _ctx: &IngestionContext, _checksum: &str) {}

    /// Called when a read failed but the ingester recovered.
    fn on_continuable_error(&self, _ctx: &IngestionContext, _error: &TransformError) {}

    /// Called when the input is exhausted cleanly.
    fn on_success(&self, _ctx: &IngestionContext, _stats: IngestionStats) {}

    /// Called when ingestion fails.
    fn on_failure(&self, _ctx: &IngestionContext, _severity: IngestionSeverity, _error: &TransformError) {}

    /// Called when a failure meets the alert threshold.
    ///
    /// Default behavior forwards to [`Self::on_failure`].
    fn on_alert(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &TransformError) {
        self.on_failure(ctx, severity, error)
    }
}

/// Severity of a fatal error.
pub fn severity_for_error(e: &TransformError) -> IngestionSeverity {
    match e.kind() {
        ErrorKind::Stream => IngestionSeverity::Critical,
        ErrorKind::EndOfInput => IngestionSeverity::Info,
        _ => IngestionSeverity::Error,
    }
}

/// An observer that fans out callbacks to a list of observers.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn IngestionObserver>>,
}

impl CompositeObserver {
    pub fn new(observers: Vec<Arc<dyn IngestionObserver>>) -> Self {
        Self { observers }
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("observers_len", &self.observers.len())
            .finish()
    }
}

impl IngestionObserver for CompositeObserver {
    fn on_record(&self, ctx: &IngestionContext, checksum: &str) {
        for o in &self.observers {
            o.on_record(ctx, checksum);
        }
    }

    fn on_continuable_error(&self, ctx: &IngestionContext, error: &TransformError) {
        for o in &self.observers {
            o.on_continuable_error(ctx, error);
        }
    }

    fn on_success(&self, ctx: &IngestionContext, stats: IngestionStats) {
        for o in &self.observers {
            o.on_success(ctx, stats);
        }
    }

    fn on_failure(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &TransformError) {
        for o in &self.observers {
            o.on_failure(ctx, severity, error);
        }
    }

    fn on_alert(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &TransformError) {
        for o in &self.observers {
            o.on_alert(ctx, severity, error);
        }
    }
}

/// Emits ingestion events as `tracing` events.
#[derive(Debug, Default)]
pub struct TracingObserver;

impl IngestionObserver for TracingObserver {
    fn on_continuable_error(&self, ctx: &IngestionContext, error: &TransformError) {
        warn!(input = %ctx.input_name, error = %error, "ingest_record_skipped");
    }

    fn on_success(&self, ctx: &IngestionContext, stats: IngestionStats) {
        info!(
            input = %ctx.input_name,
            records = stats.records,
            continuable_errors = stats.continuable_errors,
            "ingest_success"
        );
    }

    fn on_failure(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &TransformError) {
        error!(input = %ctx.input_name, severity = ?severity, error = %error, "ingest_failure");
    }

    fn on_alert(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &TransformError) {
        error!(input = %ctx.input_name, severity = ?severity, error = %error, alert = true, "ingest_failure");
    }
}
