//! State store key encoding.
//!
//! Ids are zero-padded so lexicographic order equals numeric order.
//! Subscription ids are stored inverted (`i64::MAX - id`) so a prefix scan
//! of one cluster yields the newest subscription first. Negative ids have
//! no encoding; lookups for them resolve to "not found".

use pkg_constants::state::{CLUSTERS_PREFIX, KEY_ID_WIDTH, SUBSCRIPTIONS_PREFIX};

pub fn cluster_key(id: i64) -> Option<String> {
    (id >= 0).then(|| format!("{}{:0w$}", CLUSTERS_PREFIX, id, w = KEY_ID_WIDTH))
}

pub fn subscriptions_prefix(cluster_id: i64) -> Option<String> {
    (cluster_id >= 0).then(|| {
        format!(
            "{}{:0w$}/",
            SUBSCRIPTIONS_PREFIX,
            cluster_id,
            w = KEY_ID_WIDTH
        )
    })
}

pub fn subscription_key(cluster_id: i64, id: i64) -> Option<String> {
    if id < 0 {
        return None;
    }
    let prefix = subscriptions_prefix(cluster_id)?;
    Some(format!("{}{:0w$}", prefix, i64::MAX - id, w = KEY_ID_WIDTH))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cluster_keys_sort_numerically() {
        let a = cluster_key(9).unwrap();
        let b = cluster_key(10).unwrap();
        assert_eq!(a, "/registry/clusters/0000000000000000009");
        assert!(a < b);
    }

    #[test]
    fn subscription_keys_sort_newest_first() {
        let older = subscription_key(1, 100).unwrap();
        let newer = subscription_key(1, 101).unwrap();
        assert!(newer < older);
        assert!(older.starts_with(&subscriptions_prefix(1).unwrap()));
    }

    #[test]
    fn subscription_prefixes_do_not_overlap() {
        let p1 = subscriptions_prefix(1).unwrap();
        let k11 = subscription_key(11, 5).unwrap();
        assert!(!k11.starts_with(&p1));
    }

    #[test]
    fn extreme_ids_encode() {
        assert!(subscription_key(i64::MAX, 0).is_some());
        assert!(subscription_key(0, i64::MAX).is_some());
    }

    #[test]
    fn negative_ids_have_no_key() {
        assert!(cluster_key(-1).is_none());
        assert!(subscriptions_prefix(-1).is_none());
        assert!(subscription_key(1, -1).is_none());
        assert!(subscription_key(-1, 1).is_none());
    }
}
