//! State store key layout and listing limits.

/// Key prefix for cluster entries: `/registry/clusters/{id}`.
pub const CLUSTERS_PREFIX: &str = "/registry/clusters/";

/// Key prefix for subscription entries:
/// `/registry/subscriptions/{cluster_id}/{inverted id}`.
pub const SUBSCRIPTIONS_PREFIX: &str = "/registry/subscriptions/";

/// Width ids are zero-padded to inside keys, so that lexicographic key
/// order equals numeric order. `i64::MAX` has 19 digits.
pub const KEY_ID_WIDTH: usize = 19;

/// Number of entries returned by a list call when no limit is given.
pub const DEFAULT_LIST_LIMIT: usize = 100;

/// Upper bound for a caller-supplied list limit.
pub const MAX_LIST_LIMIT: usize = 1000;
