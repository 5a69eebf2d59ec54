pub mod clusters;
pub mod info;
pub mod subscriptions;

use pkg_constants::state::{DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT};
use serde::Deserialize;

/// Query parameters for listing resources.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub limit: Option<usize>,
}

impl ListQuery {
    /// Requested page size, clamped to `1..=MAX_LIST_LIMIT`.
    pub fn limit(&self) -> usize {
        self.limit
            .unwrap_or(DEFAULT_LIST_LIMIT)
            .clamp(1, MAX_LIST_LIMIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_defaults_and_clamps() {
        assert_eq!(ListQuery::default().limit(), 100);
        let q = ListQuery {
            limit: Some(0),
            ..Default::default()
        };
        assert_eq!(q.limit(), 1);
        let q = ListQuery {
            limit: Some(50_000),
            ..Default::default()
        };
        assert_eq!(q.limit(), 1000);
    }
}
