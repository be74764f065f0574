use std::fmt;

use thiserror::Error;

/// Convenience result type used across the crate.
pub type TransformResult<T> = Result<T, TransformError>;

/// Error type shared by ingesters, schema handlers and custom functions.
#[derive(Debug, Error)]
pub enum TransformError {
    /// A schema handler declined the schema/input it was offered.
    #[error("schema not supported")]
    SchemaNotSupported,

    /// A custom function or field conversion failed.
    #[error("transform failed: {0}")]
    TransformFailed(String),

    /// A value could not be parsed (datetime layout mismatch, unknown time zone,
    /// unknown epoch unit, malformed boolean, ...).
    #[error("failed to parse '{raw}': {message}")]
    Parse { raw: String, message: String },

    /// Invalid caller-supplied configuration (e.g. an unrecognized encoding name).
    #[error("invalid configuration: {0}")]
    Config(String),

    /// I/O failure from the underlying input stream.
    #[error("stream error: {0}")]
    Stream(#[from] std::io::Error),

    /// Clean end of input. This is a sentinel, not a failure.
    #[error("end of input")]
    EndOfInput,

    /// An error produced by [`CtxAwareErr::fmt_err`].
    #[error("{context}: {message}")]
    Contextual { context: String, message: String },

    /// Another error attributed to an input position by [`CtxAwareErr::wrap_err`].
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<TransformError>,
    },
}

/// Coarse classification of a [`TransformError`], looking through context wrappers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    SchemaNotSupported,
    TransformFailed,
    Parse,
    Config,
    Stream,
    EndOfInput,
    /// A formatted, input-attributed message with no more specific kind.
    Input,
}

impl TransformError {
    pub(crate) fn parse(raw: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            raw: raw.into(),
            message: message.into(),
        }
    }

    /// Returns the kind of the innermost error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::SchemaNotSupported => ErrorKind::SchemaNotSupported,
            Self::TransformFailed(_) => ErrorKind::TransformFailed,
            Self::Parse { .. } => ErrorKind::Parse,
            Self::Config(_) => ErrorKind::Config,
            Self::Stream(_) => ErrorKind::Stream,
            Self::EndOfInput => ErrorKind::EndOfInput,
            Self::Contextual { .. } => ErrorKind::Input,
            Self::WithContext { source, .. } => source.kind(),
        }
    }

    /// True for [`TransformError::TransformFailed`], including when wrapped with context.
    pub fn is_transform_failed(&self) -> bool {
        self.kind() == ErrorKind::TransformFailed
    }

    /// True only for the bare end-of-input sentinel.
    pub fn is_end_of_input(&self) -> bool {
        matches!(self, Self::EndOfInput)
    }

    /// True if the error already carries an input/position prefix.
    pub fn is_contextual(&self) -> bool {
        matches!(self, Self::Contextual { .. } | Self::WithContext { .. })
    }
}

/// Context-aware error formatting.
///
/// Schema parsing can prefix errors with a schema name and line number; ingestion can
/// prefix them with the input name and the current line/record. Implementors only
/// provide the prefix, formatting is uniform.
pub trait CtxAwareErr {
    /// The positional prefix, e.g. `input 'orders.csv' line 12`.
    fn err_context(&self) -> String;

    /// Builds an error whose message is `args` prefixed with [`Self::err_context`].
    fn fmt_err(&self, args: fmt::Arguments<'_>) -> TransformError {
        TransformError::Contextual {
            context: self.err_context(),
            message: args.to_string(),
        }
    }

    /// Attributes an existing error to the current position, keeping its kind.
    ///
    /// Already-contextual errors and the end-of-input sentinel are returned unchanged.
    fn wrap_err(&self, err: TransformError) -> TransformError {
        if err.is_contextual() || err.is_end_of_input() {
            return err;
        }
        TransformError::WithContext {
            context: self.err_context(),
            source: Box::new(err),
        }
    }
}

/// Stock [`CtxAwareErr`] prefixing messages with an input name and optional line number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputErrFormatter {
    pub input_name: String,
    pub line: Option<u64>,
}

impl InputErrFormatter {
    pub fn new(input_name: impl Into<String>) -> Self {
        Self {
            input_name: input_name.into(),
            line: None,
        }
    }

    pub fn at_line(input_name: impl Into<String>, line: u64) -> Self {
        Self {
            input_name: input_name.into(),
            line: Some(line),
        }
    }
}

impl CtxAwareErr for InputErrFormatter {
    fn err_context(&self) -> String {
        match self.line {
            Some(line) => format!("input '{}' line {line}", self.input_name),
            None => format!("input '{}'", self.input_name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{CtxAwareErr, ErrorKind, InputErrFormatter, TransformError};

    #[test]
    fn fmt_err_prefixes_input_and_line() {
        let f = InputErrFormatter::at_line("orders.csv", 12);
        let err = f.fmt_err(format_args!("bad column count {}", 3));
        assert_eq!(err.to_string(), "input 'orders.csv' line 12: bad column count 3");
        assert_eq!(err.kind(), ErrorKind::Input);
    }

    #[test]
    fn wrap_err_keeps_kind_and_skips_sentinel() {
        let f = InputErrFormatter::new("in");
        let wrapped = f.wrap_err(TransformError::TransformFailed("boom".to_string()));
        assert!(wrapped.is_transform_failed());
        assert_eq!(wrapped.to_string(), "input 'in': transform failed: boom");

        let eof = f.wrap_err(TransformError::EndOfInput);
        assert!(eof.is_end_of_input());

        let twice = f.wrap_err(wrapped);
        assert_eq!(twice.to_string(), "input 'in': transform failed: boom");
    }

    #[test]
    fn is_transform_failed_only_for_that_kind() {
        assert!(!TransformError::SchemaNotSupported.is_transform_failed());
        assert!(!TransformError::parse("x", "y").is_transform_failed());
    }
}
