//! Limit/offset helpers shared by every list endpoint.

/// Default page size when the caller does not supply `limit`.
pub const DEFAULT_LIMIT: i64 = 50;

/// Hard upper bound for `limit`.
pub const MAX_LIMIT: i64 = 500;

/// Clamp a user-provided limit to `[1, max]`, falling back to `default`.
pub fn clamp_limit(limit: Option<i64>, default: i64, max: i64) -> i64 {
    limit.unwrap_or(default).max(1).min(max)
}

/// Clamp a user-provided offset to non-negative.
pub fn clamp_offset(offset: Option<i64>) -> i64 {
    offset.unwrap_or(0).max(0)
}
