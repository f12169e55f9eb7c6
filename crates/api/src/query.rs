//! Shared query parameter types for API handlers.

use serde::Deserialize;

/// Default page size when `limit` is omitted.
pub const DEFAULT_LIMIT: i64 = 50;
/// Largest page size a caller may request.
pub const MAX_LIMIT: i64 = 500;

/// Generic pagination parameters (`?limit=&offset=`).
#[derive(Debug, Default, Deserialize)]
pub struct PaginationParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl PaginationParams {
    /// `limit` clamped to `1..=MAX_LIMIT`.
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }

    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }
}

/// Free-text search plus a comma-separated status filter (`?q=&status=`).
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    pub status: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_defaults_and_clamps() {
        assert_eq!(PaginationParams::default().limit(), DEFAULT_LIMIT);
        let huge = PaginationParams {
            limit: Some(10_000),
            offset: Some(-5),
        };
        assert_eq!(huge.limit(), MAX_LIMIT);
        assert_eq!(huge.offset(), 0);
        let zero = PaginationParams {
            limit: Some(0),
            offset: None,
        };
        assert_eq!(zero.limit(), 1);
    }
}
