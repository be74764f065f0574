//! `schema-ingest` holds the ingestion and transformation contracts of a schema-driven
//! data pipeline, plus the two engines every input format reuses.
//!
//! The pieces:
//!
//! - **Ingestion**: a [`schemahandler::SchemaHandler`] hands out one
//!   [`schemahandler::Ingester`] per input stream; the ingester is pulled record by record
//!   and may recover from a malformed record instead of aborting the stream.
//!   [`schemahandler::IngestSession`] applies those rules for you.
//! - **Custom functions**: a registry of named string functions
//!   ([`customfuncs::CustomFuncs`]) with a baseline set in
//!   [`customfuncs::COMMON_CUSTOM_FUNCS`], combined with [`customfuncs::merge`].
//! - **Datetime normalization**: layout-based or auto-detected parsing, zone overwrite and
//!   conversion, RFC3339 and epoch rendering ([`datetime`]).
//!
//! Every run carries a [`Ctx`] (input name, external properties, error formatter and an
//! opaque caller parameter). Errors meant for users go through [`error::CtxAwareErr`] so
//! they name the input they came from.
//!
//! ## Quick example: custom functions
//!
//! ```rust
//! use schema_ingest::customfuncs::COMMON_CUSTOM_FUNCS;
//! use schema_ingest::Ctx;
//!
//! let ctx = Ctx::new("orders.csv");
//! let out = COMMON_CUSTOM_FUNCS
//!     .invoke(
//!         "dateTimeToRFC3339",
//!         Some(&ctx),
//!         &["2020-01-02 03:04:05", "America/Los_Angeles", "UTC"],
//!     )
//!     .unwrap();
//! assert_eq!(out, "2020-01-02T11:04:05+00:00");
//!
//! let epoch = COMMON_CUSTOM_FUNCS
//!     .invoke("epochToDateTimeRFC3339", None, &["0", "SECOND", "UTC"])
//!     .unwrap();
//! assert_eq!(epoch, "1970-01-01T00:00:00+00:00");
//! ```
//!
//! ## Modules
//!
//! - [`schemahandler`]: handler/ingester/record contracts and the read session
//! - [`customfuncs`]: custom function registry and the baseline functions
//! - [`datetime`]: timezone-aware datetime engine
//! - [`header`]: parser settings and encoding-aware input wrapping
//! - [`transformctx`]: per-run context
//! - [`error`]: error types and context-aware error formatting

pub mod customfuncs;
pub mod datetime;
pub mod error;
pub mod header;
pub mod schemahandler;
pub mod transformctx;

pub use error::{CtxAwareErr, ErrorKind, InputErrFormatter, TransformError, TransformResult};
pub use transformctx::Ctx;
