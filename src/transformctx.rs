//! Per-run transform context shared by ingesters and custom functions.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::{CtxAwareErr, InputErrFormatter, TransformError};

/// Context for one ingestion run.
///
/// The caller owns it for the duration of the run; ingesters and custom functions borrow it.
/// It is never mutated once the run has started.
#[derive(Clone)]
pub struct Ctx {
    /// Name of the input being ingested (file name, object key, ...).
    pub input_name: String,
    /// Caller-supplied key/value properties, readable via [`Ctx::external`].
    pub external_properties: HashMap<String, String>,
    /// Error formatter used to attribute errors to this input.
    pub ctx_aware_err: Arc<dyn CtxAwareErr + Send + Sync>,
    custom_param: Option<Arc<dyn Any + Send + Sync>>,
}

impl Ctx {
    /// Creates a context whose errors are prefixed with `input '<input_name>'`.
    pub fn new(input_name: impl Into<String>) -> Self {
        let input_name = input_name.into();
        Self {
            ctx_aware_err: Arc::new(InputErrFormatter::new(input_name.clone())),
            input_name,
            external_properties: HashMap::new(),
            custom_param: None,
        }
    }

    pub fn with_external_properties(mut self, props: HashMap<String, String>) -> Self {
        self.external_properties = props;
        self
    }

    pub fn with_external(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.external_properties.insert(name.into(), value.into());
        self
    }

    pub fn with_ctx_aware_err(mut self, formatter: Arc<dyn CtxAwareErr + Send + Sync>) -> Self {
        self.ctx_aware_err = formatter;
        self
    }

    /// Attaches a deployment-specific parameter, retrievable by type via [`Ctx::custom_param`].
    pub fn with_custom_param<T: Any + Send + Sync>(mut self, param: T) -> Self {
        self.custom_param = Some(Arc::new(param));
        self
    }

    /// Looks up an external property. Absence is not an error.
    pub fn external(&self, name: &str) -> Option<&str> {
        self.external_properties.get(name).map(String::as_str)
    }

    /// Returns the custom parameter if one was attached and it is a `T`.
    pub fn custom_param<T: Any>(&self) -> Option<&T> {
        self.custom_param.as_deref()?.downcast_ref::<T>()
    }

    pub fn has_custom_param(&self) -> bool {
        self.custom_param.is_some()
    }
}

impl Default for Ctx {
    fn default() -> Self {
        Self::new("")
    }
}

impl CtxAwareErr for Ctx {
    fn err_context(&self) -> String {
        self.ctx_aware_err.err_context()
    }

    fn fmt_err(&self, args: fmt::Arguments<'_>) -> TransformError {
        self.ctx_aware_err.fmt_err(args)
    }

    fn wrap_err(&self, err: TransformError) -> TransformError {
        self.ctx_aware_err.wrap_err(err)
    }
}

impl fmt::Debug for Ctx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ctx")
            .field("input_name", &self.input_name)
            .field("external_properties", &self.external_properties)
            .field("ctx_aware_err", &self.ctx_aware_err.err_context())
            .field("custom_param_set", &self.custom_param.is_some())
            .finish()
    }
}
