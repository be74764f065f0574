//! Named custom functions invoked by schema-driven transforms.
//!
//! Every function shares one calling convention: an optional [`Ctx`] plus zero or more
//! string arguments, returning a string or an error. That uniform shape lets a transform
//! engine call any registered function by name:
//!
//! ```rust
//! use schema_ingest::customfuncs::COMMON_CUSTOM_FUNCS;
//!
//! let out = COMMON_CUSTOM_FUNCS.invoke("coalesce", None, &["", "b", "c"]).unwrap();
//! assert_eq!(out, "b");
//! ```
//!
//! Registries are combined with [`merge`]; on a name collision the later source wins.

mod datetime;
mod strings;

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, LazyLock};

use tracing::debug;

use crate::error::{TransformError, TransformResult};
use crate::transformctx::Ctx;

pub use datetime::{
    date_time_layout_to_rfc3339, date_time_to_epoch, date_time_to_rfc3339, epoch_to_date_time_rfc3339,
    now,
};
pub use strings::{coalesce, concat, lower, upper, uuidv3};

/// A registered custom function.
pub type CustomFunc = Arc<dyn Fn(Option<&Ctx>, &[&str]) -> TransformResult<String> + Send + Sync>;

/// Name → function table. Read-only once built, so it can be shared across threads.
#[derive(Clone, Default)]
pub struct CustomFuncs {
    funcs: HashMap<String, CustomFunc>,
}

impl CustomFuncs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `f` under `name`, replacing any previous entry.
    pub fn insert<F>(&mut self, name: impl Into<String>, f: F)
    where
        F: Fn(Option<&Ctx>, &[&str]) -> TransformResult<String> + Send + Sync + 'static,
    {
        self.funcs.insert(name.into(), Arc::new(f));
    }

    /// Builder form of [`CustomFuncs::insert`].
    pub fn with<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(Option<&Ctx>, &[&str]) -> TransformResult<String> + Send + Sync + 'static,
    {
        self.insert(name, f);
        self
    }

    pub fn get(&self, name: &str) -> Option<&CustomFunc> {
        self.funcs.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.funcs.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.funcs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.funcs.is_empty()
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.funcs.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Calls the function registered as `name`.
    pub fn invoke(&self, name: &str, ctx: Option<&Ctx>, args: &[&str]) -> TransformResult<String> {
        let f = self
            .get(name)
            .ok_or_else(|| TransformError::TransformFailed(format!("unknown custom function '{name}'")))?;
        f(ctx, args)
    }
}

impl fmt::Debug for CustomFuncs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomFuncs")
            .field("names", &self.names())
            .finish()
    }
}

/// Combines `sources` left to right into a new table; later sources overwrite earlier
/// ones on a name collision. Inputs are not modified.
pub fn merge(sources: &[&CustomFuncs]) -> CustomFuncs {
    let mut merged = CustomFuncs::new();
    for source in sources {
        for (name, f) in &source.funcs {
            if merged.funcs.insert(name.clone(), Arc::clone(f)).is_some() {
                debug!(name = %name, "custom function overridden by later source");
            }
        }
    }
    merged
}

// Splits `args` into exactly `N` arguments or fails with an arity error.
pub(crate) fn exact_args<'a, const N: usize>(name: &str, args: &[&'a str]) -> TransformResult<[&'a str; N]> {
    <[&'a str; N]>::try_from(args).map_err(|_| {
        TransformError::TransformFailed(format!(
            "{name}: expected {N} argument(s), got {}",
            args.len()
        ))
    })
}

/// The baseline functions available out of the box.
pub static COMMON_CUSTOM_FUNCS: LazyLock<CustomFuncs> = LazyLock::new(|| {
    CustomFuncs::new()
        .with("coalesce", coalesce)
        .with("concat", concat)
        .with("dateTimeLayoutToRFC3339", |ctx, args| {
            let [datetime, layout, layout_tz, from_tz, to_tz] = exact_args::<5>("dateTimeLayoutToRFC3339", args)?;
            date_time_layout_to_rfc3339(ctx, datetime, layout, layout_tz, from_tz, to_tz)
        })
        .with("dateTimeToEpoch", |ctx, args| {
            let [datetime, from_tz, unit] = exact_args::<3>("dateTimeToEpoch", args)?;
            date_time_to_epoch(ctx, datetime, from_tz, unit)
        })
        .with("dateTimeToRFC3339", |ctx, args| {
            let [datetime, from_tz, to_tz] = exact_args::<3>("dateTimeToRFC3339", args)?;
            date_time_to_rfc3339(ctx, datetime, from_tz, to_tz)
        })
        .with("epochToDateTimeRFC3339", |ctx, args| match args {
            [epoch, unit] => epoch_to_date_time_rfc3339(ctx, epoch, unit, None),
            [epoch, unit, tz] => epoch_to_date_time_rfc3339(ctx, epoch, unit, Some(*tz)),
            _ => Err(TransformError::TransformFailed(format!(
                "epochToDateTimeRFC3339: expected 2 or 3 argument(s), got {}",
                args.len()
            ))),
        })
        .with("lower", |ctx, args| {
            let [s] = exact_args::<1>("lower", args)?;
            lower(ctx, s)
        })
        .with("now", |ctx, args| {
            let [] = exact_args::<0>("now", args)?;
            now(ctx)
        })
        .with("upper", |ctx, args| {
            let [s] = exact_args::<1>("upper", args)?;
            upper(ctx, s)
        })
        .with("uuidv3", |ctx, args| {
            let [s] = exact_args::<1>("uuidv3", args)?;
            uuidv3(ctx, s)
        })
});

#[cfg(test)]
mod tests {
    use super::{merge, CustomFuncs, COMMON_CUSTOM_FUNCS};

    fn constant(value: &'static str) -> impl Fn(Option<&crate::transformctx::Ctx>, &[&str]) -> crate::TransformResult<String> {
        move |_, _| Ok(value.to_string())
    }

    #[test]
    fn baseline_names_are_fixed() {
        assert_eq!(
            COMMON_CUSTOM_FUNCS.names(),
            vec![
                "coalesce",
                "concat",
                "dateTimeLayoutToRFC3339",
                "dateTimeToEpoch",
                "dateTimeToRFC3339",
                "epochToDateTimeRFC3339",
                "lower",
                "now",
                "upper",
                "uuidv3",
            ]
        );
    }

    #[test]
    fn merge_later_source_wins() {
        let a = CustomFuncs::new().with("x", constant("a")).with("only_a", constant("a"));
        let b = CustomFuncs::new().with("x", constant("b"));

        let ab = merge(&[&a, &b]);
        let ba = merge(&[&b, &a]);
        assert_eq!(ab.invoke("x", None, &[]).unwrap(), "b");
        assert_eq!(ba.invoke("x", None, &[]).unwrap(), "a");
        assert_eq!(ab.invoke("only_a", None, &[]).unwrap(), "a");
        assert_eq!(ba.invoke("only_a", None, &[]).unwrap(), "a");
        // Inputs untouched.
        assert_eq!(a.invoke("x", None, &[]).unwrap(), "a");
        assert_eq!(b.len(), 1);
    }

    #[test]
    fn names_are_case_sensitive() {
        let funcs = CustomFuncs::new().with("Lower", constant("custom"));
        let merged = merge(&[&*COMMON_CUSTOM_FUNCS, &funcs]);
        assert_eq!(merged.len(), COMMON_CUSTOM_FUNCS.len() + 1);
        assert_eq!(merged.invoke("lower", None, &["ABC"]).unwrap(), "abc");
        assert_eq!(merged.invoke("Lower", None, &["ABC"]).unwrap(), "custom");
    }

    #[test]
    fn wrong_arity_and_unknown_name_fail() {
        let err = COMMON_CUSTOM_FUNCS.invoke("upper", None, &["a", "b"]).unwrap_err();
        assert!(err.is_transform_failed());
        assert_eq!(err.to_string(), "transform failed: upper: expected 1 argument(s), got 2");

        let err = COMMON_CUSTOM_FUNCS.invoke("nope", None, &[]).unwrap_err();
        assert_eq!(err.to_string(), "transform failed: unknown custom function 'nope'");
    }
}
