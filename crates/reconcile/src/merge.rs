//! Natural-key list reconciliation
//!
//! Merges the list recorded on the previous pass with the list just observed
//! remotely. Items still present keep their recorded position and payload,
//! new items are appended in observed order, and items that disappeared are
//! dropped. A remote reorder therefore produces no change at all.

use crate::types::Item;
use std::collections::HashSet;
use std::hash::Hash;

/// Counts describing what a reconciliation pass did
///
/// Every prior item is either `matched` or `dropped`, so the two always sum
/// to the prior length. A repeated prior key counts as dropped for each
/// occurrence after the first. Repeated observed keys are not counted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Items present in both lists (kept in prior order)
    pub matched: usize,
    /// Items only in the observed list (appended)
    pub added: usize,
    /// Items only in the prior list (dropped)
    pub dropped: usize,
}

impl ReconcileReport {
    /// Whether the result differs from the prior list in membership
    pub fn has_changes(&self) -> bool {
        self.added > 0 || self.dropped > 0
    }
}

/// Merge `prior` and `observed` by the key `key_of` extracts
///
/// The result holds, in order:
/// 1. items whose key appears in both lists, in `prior`'s order, with
///    `prior`'s payload;
/// 2. items whose key appears only in `observed`, in `observed`'s order.
///
/// If a key repeats within one list, its first occurrence wins and later
/// ones are skipped, so every key appears at most once in the result.
pub fn reconcile<T, K, F>(prior: Vec<T>, observed: Vec<T>, key_of: F) -> Vec<T>
where
    K: Eq + Hash,
    F: Fn(&T) -> K,
{
    reconcile_with_report(prior, observed, key_of).0
}

/// [`reconcile`], also returning what changed
pub fn reconcile_with_report<T, K, F>(
    prior: Vec<T>,
    observed: Vec<T>,
    key_of: F,
) -> (Vec<T>, ReconcileReport)
where
    K: Eq + Hash,
    F: Fn(&T) -> K,
{
    let observed_keys: HashSet<K> = observed.iter().map(&key_of).collect();
    let mut consumed: HashSet<K> = HashSet::with_capacity(observed_keys.len());
    let mut result = Vec::with_capacity(observed.len());
    let mut report = ReconcileReport::default();

    for item in prior {
        let key = key_of(&item);
        if !observed_keys.contains(&key) {
            report.dropped += 1;
            continue;
        }
        if consumed.insert(key) {
            report.matched += 1;
            result.push(item);
        } else {
            report.dropped += 1;
        }
    }

    for item in observed {
        if consumed.insert(key_of(&item)) {
            report.added += 1;
            result.push(item);
        }
    }

    log::debug!(
        "Reconciled list: {} matched, {} added, {} dropped",
        report.matched,
        report.added,
        report.dropped
    );
    (result, report)
}

/// [`reconcile`] over [`Item`]s, keyed by [`Item::key`]
pub fn reconcile_items<K, P>(prior: Vec<Item<K, P>>, observed: Vec<Item<K, P>>) -> Vec<Item<K, P>>
where
    K: Eq + Hash + Clone,
{
    reconcile(prior, observed, |item| item.key.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(key: u32, payload: &str) -> Item<u32, String> {
        Item::new(key, payload.to_string())
    }

    fn keys(items: &[Item<u32, String>]) -> Vec<u32> {
        items.iter().map(|i| i.key).collect()
    }

    #[test]
    fn test_reconcile_scenario() {
        let prior = vec![item(1, "A"), item(2, "B"), item(3, "C")];
        let observed = vec![item(3, "C'"), item(4, "D"), item(2, "B'")];

        let result = reconcile_items(prior, observed);

        assert_eq!(result, vec![item(2, "B"), item(3, "C"), item(4, "D")]);
    }

    #[test]
    fn test_reconcile_empty_observed_drops_everything() {
        let prior = vec![item(1, "X"), item(2, "Y")];
        let (result, report) = reconcile_with_report(prior, vec![], |i| i.key);

        assert!(result.is_empty());
        assert_eq!(report.dropped, 2);
        assert!(report.has_changes());
    }

    #[test]
    fn test_reconcile_empty_prior_keeps_observed_order() {
        let observed = vec![item(7, "X"), item(3, "Y")];
        let result = reconcile_items(vec![], observed.clone());

        assert_eq!(result, observed);
    }

    #[test]
    fn test_reconcile_stable_under_reorder() {
        let prior = vec![item(1, "a"), item(2, "b"), item(3, "c"), item(4, "d")];
        let observed = vec![item(4, "d"), item(2, "b"), item(1, "a"), item(3, "c")];

        let (result, report) = reconcile_with_report(prior.clone(), observed, |i| i.key);

        assert_eq!(result, prior);
        assert_eq!(report.matched, 4);
        assert!(!report.has_changes());
    }

    #[test]
    fn test_reconcile_new_items_at_tail_in_observed_order() {
        let prior = vec![item(1, "a"), item(2, "b")];
        let observed = vec![item(9, "z"), item(2, "b"), item(5, "y"), item(1, "a")];

        let result = reconcile_items(prior, observed);

        assert_eq!(keys(&result), vec![1, 2, 9, 5]);
    }

    #[test]
    fn test_reconcile_matches_appear_once() {
        let prior = vec![item(1, "a"), item(2, "b")];
        let observed = vec![item(2, "b"), item(1, "a"), item(3, "c")];

        let result = reconcile_items(prior, observed);

        let mut seen = keys(&result);
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len(), result.len());
    }

    #[test]
    fn test_reconcile_duplicate_keys_first_wins() {
        let prior = vec![item(1, "first"), item(1, "second"), item(2, "b")];
        let observed = vec![item(2, "b'"), item(3, "c"), item(1, "a'"), item(3, "c-dup")];

        let result = reconcile_items(prior, observed);

        assert_eq!(result, vec![item(1, "first"), item(2, "b"), item(3, "c")]);
    }

    #[test]
    fn test_report_accounts_for_every_prior_item() {
        let prior = vec![item(1, "first"), item(1, "second"), item(2, "b"), item(4, "d")];
        let observed = vec![item(2, "b'"), item(1, "a'"), item(3, "c")];

        let (result, report) = reconcile_with_report(prior, observed, |i| i.key);

        assert_eq!(keys(&result), vec![1, 2, 3]);
        assert_eq!(report.matched, 2);
        assert_eq!(report.dropped, 2);
        assert_eq!(report.matched + report.dropped, 4);
        assert_eq!(report.added, 1);
    }

    #[test]
    fn test_reconcile_with_custom_key() {
        #[derive(Debug, Clone, PartialEq)]
        struct Attachment {
            tgw: &'static str,
            zone: &'static str,
            weight: u8,
        }

        let prior = vec![
            Attachment {
                tgw: "tgw-1",
                zone: "a",
                weight: 1,
            },
            Attachment {
                tgw: "tgw-1",
                zone: "b",
                weight: 1,
            },
        ];
        let observed = vec![
            Attachment {
                tgw: "tgw-2",
                zone: "a",
                weight: 3,
            },
            Attachment {
                tgw: "tgw-1",
                zone: "b",
                weight: 2,
            },
        ];

        let result = reconcile(prior, observed, |a| (a.tgw, a.zone));

        assert_eq!(
            result,
            vec![
                Attachment {
                    tgw: "tgw-1",
                    zone: "b",
                    weight: 1,
                },
                Attachment {
                    tgw: "tgw-2",
                    zone: "a",
                    weight: 3,
                },
            ]
        );
    }
}
