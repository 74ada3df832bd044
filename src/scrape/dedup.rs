//! Cross-page de-duplication of product records
//!
//! Records are identified by their `product_id`. A page is merged against the
//! identifiers already seen in the current attempt, and only net-new records
//! are accepted.

use crate::config::AnonymousRecords;
use serde_json::Value;
use std::collections::HashSet;

/// Field that identifies a product record
pub const ID_FIELD: &str = "product_id";

/// Identifiers (and anonymous record fingerprints) seen during one attempt
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeenIds {
    ids: HashSet<String>,
    anonymous: HashSet<String>,
}

impl SeenIds {
    /// Number of distinct identifiers seen
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }
}

/// Result of merging one page
#[derive(Debug, Clone)]
pub struct Merged {
    /// Seen identifiers after the merge
    pub seen: SeenIds,
    /// Records from the page to append to the accumulated list, in page order
    pub accepted: Vec<Value>,
    /// Records whose identifier was not seen before
    pub new_unique: usize,
}

/// Returns the record's identifier, if it carries a usable one
///
/// Empty strings, zero, null, and non-scalar values do not count.
pub fn record_id(record: &Value) -> Option<String> {
    match record.get(ID_FIELD)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        _ => None,
    }
}

/// Merges a page of records into the seen set
///
/// A record with an unseen identifier is accepted and counted. A record whose
/// identifier was already seen is dropped. A record without an identifier never
/// enters the seen set and never counts toward `new_unique`. Under the default
/// `AnonymousRecords::Drop` it is discarded; `AnonymousRecords::KeepFirst`
/// accepts it the first time that exact record appears.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use trade_harvest::config::AnonymousRecords;
/// use trade_harvest::scrape::{merge, SeenIds};
///
/// let page = vec![json!({"product_id": "a"}), json!({"product_id": "a"})];
/// let merged = merge(SeenIds::default(), page.clone(), AnonymousRecords::KeepFirst);
/// assert_eq!(merged.new_unique, 1);
///
/// let again = merge(merged.seen, page, AnonymousRecords::KeepFirst);
/// assert_eq!(again.new_unique, 0);
/// assert!(again.accepted.is_empty());
/// ```
pub fn merge(mut seen: SeenIds, records: Vec<Value>, anonymous: AnonymousRecords) -> Merged {
    let mut accepted = Vec::new();
    let mut new_unique = 0;

    for record in records {
        match record_id(&record) {
            Some(id) => {
                if seen.ids.insert(id) {
                    accepted.push(record);
                    new_unique += 1;
                }
            }
            None => match anonymous {
                AnonymousRecords::KeepFirst => {
                    if seen.anonymous.insert(record.to_string()) {
                        accepted.push(record);
                    }
                }
                AnonymousRecords::Drop => {}
            },
        }
    }

    Merged {
        seen,
        accepted,
        new_unique,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_id_variants() {
        assert_eq!(record_id(&json!({"product_id": "p-1"})), Some("p-1".to_string()));
        assert_eq!(record_id(&json!({"product_id": 42})), Some("42".to_string()));

        assert_eq!(record_id(&json!({"product_id": ""})), None);
        assert_eq!(record_id(&json!({"product_id": 0})), None);
        assert_eq!(record_id(&json!({"product_id": null})), None);
        assert_eq!(record_id(&json!({"product_id": ["x"]})), None);
        assert_eq!(record_id(&json!({"name": "no id"})), None);
    }

    #[test]
    fn test_merge_counts_only_new_ids() {
        let first = merge(
            SeenIds::default(),
            vec![json!({"product_id": "a"}), json!({"product_id": "b"})],
            AnonymousRecords::KeepFirst,
        );
        assert_eq!(first.new_unique, 2);

        let second = merge(
            first.seen,
            vec![json!({"product_id": "b"}), json!({"product_id": "c"})],
            AnonymousRecords::KeepFirst,
        );
        assert_eq!(second.new_unique, 1);
        assert_eq!(second.accepted, vec![json!({"product_id": "c"})]);
        assert_eq!(second.seen.len(), 3);
    }

    #[test]
    fn test_duplicates_within_a_page_are_dropped() {
        let merged = merge(
            SeenIds::default(),
            vec![
                json!({"product_id": "a", "v": 1}),
                json!({"product_id": "a", "v": 2}),
            ],
            AnonymousRecords::KeepFirst,
        );
        assert_eq!(merged.new_unique, 1);
        assert_eq!(merged.accepted, vec![json!({"product_id": "a", "v": 1})]);
    }

    #[test]
    fn test_remerging_same_page_is_idempotent() {
        let page = vec![
            json!({"product_id": "a"}),
            json!({"product_id": "b"}),
            json!({"title": "anonymous"}),
        ];

        let first = merge(SeenIds::default(), page.clone(), AnonymousRecords::KeepFirst);
        assert_eq!(first.new_unique, 2);
        assert_eq!(first.accepted.len(), 3);

        let second = merge(first.seen.clone(), page, AnonymousRecords::KeepFirst);
        assert_eq!(second.new_unique, 0);
        assert!(second.accepted.is_empty());
        assert_eq!(second.seen, first.seen);
    }

    #[test]
    fn test_anonymous_records_kept_once_but_never_counted() {
        let anonymous = json!({"title": "no identifier"});
        let merged = merge(
            SeenIds::default(),
            vec![anonymous.clone(), anonymous.clone(), json!({"product_id": ""})],
            AnonymousRecords::KeepFirst,
        );

        assert_eq!(merged.new_unique, 0);
        assert!(merged.seen.is_empty());
        assert_eq!(merged.accepted, vec![anonymous, json!({"product_id": ""})]);
    }

    #[test]
    fn test_anonymous_records_dropped_under_drop_policy() {
        let merged = merge(
            SeenIds::default(),
            vec![json!({"title": "no identifier"}), json!({"product_id": "a"})],
            AnonymousRecords::Drop,
        );

        assert_eq!(merged.new_unique, 1);
        assert_eq!(merged.accepted, vec![json!({"product_id": "a"})]);
    }

    #[test]
    fn test_default_policy_drops_anonymous_records() {
        let merged = merge(
            SeenIds::default(),
            vec![
                json!({"product_id": "a"}),
                json!({"title": "no identifier"}),
                json!({"product_id": null}),
                json!({"product_id": "b"}),
            ],
            AnonymousRecords::default(),
        );

        assert_eq!(merged.new_unique, 2);
        assert_eq!(merged.seen.len(), merged.accepted.len());
        assert_eq!(
            merged.accepted,
            vec![json!({"product_id": "a"}), json!({"product_id": "b"})]
        );
    }

    #[test]
    fn test_seen_ids_lookup() {
        let merged = merge(
            SeenIds::default(),
            vec![json!({"product_id": "a"}), json!({"product_id": 7})],
            AnonymousRecords::KeepFirst,
        );

        assert!(merged.seen.contains("a"));
        assert!(merged.seen.contains("7"));
        assert!(!merged.seen.contains("b"));

        let mut ids: Vec<_> = merged.seen.iter().collect();
        ids.sort();
        assert_eq!(ids, vec!["7", "a"]);
    }
}
