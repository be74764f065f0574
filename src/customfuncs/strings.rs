//! String custom functions. None of them inspect the context.

use uuid::Uuid;

use crate::error::TransformResult;
use crate::transformctx::Ctx;

/// First non-empty argument, or `""` if all are empty.
pub fn coalesce(_ctx: Option<&Ctx>, args: &[&str]) -> TransformResult<String> {
    Ok(args
        .iter()
        .find(|s| !s.is_empty())
        .map(|s| s.to_string())
        .unwrap_or_default())
}

/// All arguments concatenated in order.
pub fn concat(_ctx: Option<&Ctx>, args: &[&str]) -> TransformResult<String> {
    Ok(args.concat())
}

pub fn lower(_ctx: Option<&Ctx>, s: &str) -> TransformResult<String> {
    Ok(s.to_lowercase())
}

pub fn upper(_ctx: Option<&Ctx>, s: &str) -> TransformResult<String> {
    Ok(s.to_uppercase())
}

/// Name-based (MD5) UUID of `s` in the nil namespace. Same input, same output.
pub fn uuidv3(_ctx: Option<&Ctx>, s: &str) -> TransformResult<String> {
    Ok(Uuid::new_v3(&Uuid::nil(), s.as_bytes()).to_string())
}
