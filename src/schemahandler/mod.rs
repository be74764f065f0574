//! Schema handlers, ingesters and the session that drives them.
//!
//! A [`SchemaHandler`] is built from a schema [`Header`] by one of a list of [`CreateFunc`]s,
//! then hands out one [`Ingester`] per input stream. [`IngestSession`] pulls records from an
//! ingester, applying the end-of-input and continuable-error rules so callers only see
//! records, skipped records and at most one fatal error.
//!
//! ```rust
//! use std::io::{BufRead, BufReader, Read};
//!
//! use schema_ingest::error::{CtxAwareErr, TransformError, TransformResult};
//! use schema_ingest::schemahandler::{
//!     BytesRecord, Ingested, IngestSession, Ingester, ReadFailure, SchemaHandler, SessionOptions,
//! };
//! use schema_ingest::Ctx;
//!
//! struct Lines<'a> {
//!     input: BufReader<Box<dyn Read + 'a>>,
//! }
//!
//! impl CtxAwareErr for Lines<'_> {
//!     fn err_context(&self) -> String {
//!         "lines".to_string()
//!     }
//! }
//!
//! impl Ingester for Lines<'_> {
//!     fn read(&mut self) -> Result<Ingested, ReadFailure> {
//!         let mut line = String::new();
//!         if self.input.read_line(&mut line)? == 0 {
//!             return Err(ReadFailure::end_of_input());
//!         }
//!         let record = line.trim_end().to_string();
//!         Ok(Ingested::new(BytesRecord::new(record), line))
//!     }
//!
//!     fn is_continuable_error(&self, _err: &TransformError) -> bool {
//!         false
//!     }
//! }
//!
//! struct LinesHandler;
//!
//! impl SchemaHandler for LinesHandler {
//!     fn new_ingester<'a>(
//!         &self,
//!         _ctx: &'a Ctx,
//!         input: Box<dyn Read + 'a>,
//!     ) -> TransformResult<Box<dyn Ingester + 'a>> {
//!         Ok(Box::new(Lines { input: BufReader::new(input) }))
//!     }
//! }
//!
//! let ctx = Ctx::new("two-lines.txt");
//! let input: Box<dyn Read> = Box::new(&b"a\nb\n"[..]);
//! let session = IngestSession::open(&LinesHandler, &ctx, input, SessionOptions::default()).unwrap();
//! let records: Vec<_> = session.collect::<TransformResult<_>>().unwrap();
//! assert_eq!(records.len(), 2);
//! ```

mod ingester;
pub mod observability;
mod session;

use std::any::Any;
use std::fmt;
use std::io::Read;
use std::sync::Arc;

use tracing::debug;

use crate::customfuncs::CustomFuncs;
use crate::error::{ErrorKind, TransformError, TransformResult};
use crate::header::Header;
use crate::transformctx::Ctx;

pub use ingester::{checksum_of, BytesRecord, Ingested, Ingester, RawRecord, ReadFailure};
pub use observability::{
    severity_for_error, CompositeObserver, IngestionContext, IngestionObserver, IngestionSeverity,
    IngestionStats, TracingObserver,
};
pub use session::{IngestSession, IngesterState, ReadStep, SessionOptions};

/// Factory for [`Ingester`]s over one parsed schema.
pub trait SchemaHandler {
    /// Binds a new ingester to `input` and `ctx`.
    ///
    /// Fails (typically with a contextual error) if `input` is structurally incompatible
    /// with what the handler expects.
    fn new_ingester<'a>(
        &self,
        ctx: &'a Ctx,
        input: Box<dyn Read + 'a>,
    ) -> TransformResult<Box<dyn Ingester + 'a>>;
}

/// Everything a [`CreateFunc`] may inspect when deciding whether it handles a schema.
#[derive(Clone, Default)]
pub struct CreateCtx {
    /// Schema name, used for error attribution.
    pub name: String,
    pub header: Header,
    /// Full schema content.
    pub content: Vec<u8>,
    /// Functions available to the handler's transforms.
    pub custom_funcs: CustomFuncs,
    /// Caller-defined handler parameters.
    pub create_params: Option<Arc<dyn Any + Send + Sync>>,
}

impl CreateCtx {
    pub fn new(name: impl Into<String>, header: Header) -> Self {
        Self {
            name: name.into(),
            header,
            ..Default::default()
        }
    }

    pub fn with_content(mut self, content: impl Into<Vec<u8>>) -> Self {
        self.content = content.into();
        self
    }

    pub fn with_custom_funcs(mut self, custom_funcs: CustomFuncs) -> Self {
        self.custom_funcs = custom_funcs;
        self
    }

    pub fn with_create_params<T: Any + Send + Sync>(mut self, params: T) -> Self {
        self.create_params = Some(Arc::new(params));
        self
    }

    pub fn create_params<T: Any>(&self) -> Option<&T> {
        self.create_params.as_deref()?.downcast_ref::<T>()
    }
}

impl fmt::Debug for CreateCtx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreateCtx")
            .field("name", &self.name)
            .field("header", &self.header)
            .field("content_len", &self.content.len())
            .field("custom_funcs", &self.custom_funcs)
            .field("create_params_set", &self.create_params.is_some())
            .finish()
    }
}

/// Builds a handler, or declines with [`TransformError::SchemaNotSupported`].
pub type CreateFunc = fn(&CreateCtx) -> TransformResult<Box<dyn SchemaHandler>>;

/// Tries `funcs` in order and returns the first handler that accepts the schema.
///
/// A decline, bare or wrapped with context, moves on to the next function; any other
/// error stops the search and is returned. If every function declines the result is
/// `SchemaNotSupported`.
pub fn create_handler(ctx: &CreateCtx, funcs: &[CreateFunc]) -> TransformResult<Box<dyn SchemaHandler>> {
    for (i, create) in funcs.iter().enumerate() {
        match create(ctx) {
            Err(e) if e.kind() == ErrorKind::SchemaNotSupported => {
                debug!(schema = %ctx.name, index = i, error = %e, "schema handler declined");
            }
            other => return other,
        }
    }
    Err(TransformError::SchemaNotSupported)
}
