use std::fmt;
use std::io::Read;
use std::sync::Arc;

use tracing::debug;

use crate::error::{CtxAwareErr, TransformResult};
use crate::transformctx::Ctx;

use super::ingester::{Ingested, Ingester, ReadFailure};
use super::observability::{
    severity_for_error, IngestionContext, IngestionObserver, IngestionSeverity, IngestionStats,
};
use super::SchemaHandler;

/// Lifecycle of an ingester driven by an [`IngestSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngesterState {
    /// Bound to a stream, nothing read yet.
    Open,
    /// At least one read returned a record or a continuable error.
    Reading,
    /// Clean end of input. Terminal.
    Exhausted,
    /// A non-continuable error occurred. Terminal.
    Failed,
}

/// Outcome of one [`IngestSession::read`].
#[derive(Debug)]
pub enum ReadStep {
    Record(Ingested),
    /// The record was skipped; reading may continue.
    Continuable(ReadFailure),
    Exhausted,
    /// Fatal. Every later read returns `Failed` as well.
    Failed(ReadFailure),
}

/// Options controlling session reporting.
#[derive(Clone)]
pub struct SessionOptions {
    /// Optional observer for logging/alerts.
    pub observer: Option<Arc<dyn IngestionObserver>>,
    /// Severity threshold at which `on_alert` is invoked.
    pub alert_at_or_above: IngestionSeverity,
}

impl fmt::Debug for SessionOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionOptions")
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .finish()
    }
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            observer: None,
            alert_at_or_above: IngestionSeverity::Critical,
        }
    }
}

/// Drives one [`Ingester`] from open to a terminal state.
///
/// Each read is classified with the end-of-input sentinel checked first and
/// [`Ingester::is_continuable_error`] consulted second. Errors that do not already carry
/// an input position are attributed with [`CtxAwareErr::wrap_err`].
///
/// As an iterator it yields records and continuable errors, then stops at end of input or
/// right after yielding the fatal error.
pub struct IngestSession<'a> {
    ingester: Box<dyn Ingester + 'a>,
    state: IngesterState,
    stats: IngestionStats,
    context: IngestionContext,
    options: SessionOptions,
}

impl<'a> IngestSession<'a> {
    /// Asks `handler` for an ingester over `input` and wraps it in a session.
    ///
    /// A handler rejection is reported to the observer as a failure and returned.
    pub fn open(
        handler: &dyn SchemaHandler,
        ctx: &'a Ctx,
        input: Box<dyn Read + 'a>,
        options: SessionOptions,
    ) -> TransformResult<Self> {
        let context = IngestionContext {
            input_name: ctx.input_name.clone(),
        };
        match handler.new_ingester(ctx, input) {
            Ok(ingester) => Ok(Self::with_context(ingester, context, options)),
            Err(e) => {
                let e = ctx.wrap_err(e);
                debug!(input = %context.input_name, error = %e, "ingester rejected input");
                report_failure(&options, &context, &e);
                Err(e)
            }
        }
    }

    /// Wraps an already-built ingester.
    pub fn from_ingester(
        ingester: Box<dyn Ingester + 'a>,
        input_name: impl Into<String>,
        options: SessionOptions,
    ) -> Self {
        let context = IngestionContext {
            input_name: input_name.into(),
        };
        Self::with_context(ingester, context, options)
    }

    fn with_context(ingester: Box<dyn Ingester + 'a>, context: IngestionContext, options: SessionOptions) -> Self {
        Self {
            ingester,
            state: IngesterState::Open,
            stats: IngestionStats::default(),
            context,
            options,
        }
    }

    pub fn state(&self) -> IngesterState {
        self.state
    }

    pub fn stats(&self) -> IngestionStats {
        self.stats
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.state, IngesterState::Exhausted | IngesterState::Failed)
    }

    /// Pulls the next record.
    ///
    /// Once terminal, the ingester is not called again: `Exhausted` repeats, and a failed
    /// session reports a fresh contextual error.
    pub fn read(&mut self) -> ReadStep {
        match self.state {
            IngesterState::Exhausted => return ReadStep::Exhausted,
            IngesterState::Failed => {
                let err = self
                    .ingester
                    .fmt_err(format_args!("ingester already failed; no further reads are valid"));
                return ReadStep::Failed(err.into());
            }
            IngesterState::Open | IngesterState::Reading => {}
        }

        let failure = match self.ingester.read() {
            Ok(ingested) => {
                self.state = IngesterState::Reading;
                self.stats.records += 1;
                let checksum = ingested.record.checksum();
                debug!(
                    input = %self.context.input_name,
                    record = self.stats.records,
                    checksum = %checksum,
                    "record read"
                );
                if let Some(obs) = self.options.observer.as_ref() {
                    obs.on_record(&self.context, &checksum);
                }
                return ReadStep::Record(ingested);
            }
            Err(failure) => failure,
        };

        if failure.is_end_of_input() {
            self.state = IngesterState::Exhausted;
            debug!(
                input = %self.context.input_name,
                records = self.stats.records,
                continuable_errors = self.stats.continuable_errors,
                "input exhausted"
            );
            if let Some(obs) = self.options.observer.as_ref() {
                obs.on_success(&self.context, self.stats);
            }
            return ReadStep::Exhausted;
        }

        let ReadFailure { error, raw } = failure;
        let continuable = self.ingester.is_continuable_error(&error);
        let failure = ReadFailure::new(self.ingester.wrap_err(error), raw);

        if continuable {
            self.state = IngesterState::Reading;
            self.stats.continuable_errors += 1;
            debug!(input = %self.context.input_name, error = %failure.error, "record skipped");
            if let Some(obs) = self.options.observer.as_ref() {
                obs.on_continuable_error(&self.context, &failure.error);
            }
            ReadStep::Continuable(failure)
        } else {
            self.state = IngesterState::Failed;
            debug!(input = %self.context.input_name, error = %failure.error, "ingester failed");
            report_failure(&self.options, &self.context, &failure.error);
            ReadStep::Failed(failure)
        }
    }
}

fn report_failure(options: &SessionOptions, ctx: &IngestionContext, e: &crate::error::TransformError) {
    if let Some(obs) = options.observer.as_ref() {
        let sev = severity_for_error(e);
        obs.on_failure(ctx, sev, e);
        if sev >= options.alert_at_or_above {
            obs.on_alert(ctx, sev, e);
        }
    }
}

impl fmt::Debug for IngestSession<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IngestSession")
            .field("context", &self.context)
            .field("state", &self.state)
            .field("stats", &self.stats)
            .field("options", &self.options)
            .finish()
    }
}

impl Iterator for IngestSession<'_> {
    type Item = TransformResult<Ingested>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.is_terminal() {
            return None;
        }
        match self.read() {
            ReadStep::Record(ingested) => Some(Ok(ingested)),
            ReadStep::Continuable(failure) | ReadStep::Failed(failure) => Some(Err(failure.error)),
            ReadStep::Exhausted => None,
        }
    }
}
