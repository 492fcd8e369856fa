//! Flat rows <-> nested groups
//!
//! [`aggregate`] folds `(parent, child, values)` rows into one group per
//! parent in a single pass. [`flatten`] is its inverse. Both resolve each
//! parent key exactly once per call and are all-or-nothing: the first
//! resolver error is returned and nothing built so far escapes.

use crate::error::Result;
use crate::types::{AggregatedGroup, FlatOption};
use std::collections::{BTreeMap, HashMap};

/// Group flat rows by parent key and resolve each parent
///
/// Groups come out in first-seen order of their parent key. Within a group a
/// repeated child key keeps the values of the later row. `resolve_parent` is
/// called once per distinct parent key, in first-seen order, and never for
/// empty input.
pub fn aggregate<F>(rows: &[FlatOption], mut resolve_parent: F) -> Result<Vec<AggregatedGroup>>
where
    F: FnMut(&str) -> Result<String>,
{
    let mut order: Vec<&str> = Vec::new();
    let mut children: HashMap<&str, BTreeMap<String, Vec<String>>> = HashMap::new();

    for row in rows {
        let entry = children.entry(row.parent_key.as_str()).or_insert_with(|| {
            order.push(row.parent_key.as_str());
            BTreeMap::new()
        });
        if entry
            .insert(row.child_key.clone(), row.values.clone())
            .is_some()
        {
            log::debug!(
                "Duplicate child '{}' under '{}', keeping later values",
                row.child_key,
                row.parent_key
            );
        }
    }

    let mut groups = Vec::with_capacity(order.len());
    for parent in order {
        log::trace!("Resolving parent '{parent}'");
        let resolved = resolve_parent(parent)?;
        let children = children.remove(parent).unwrap_or_default();
        groups.push(AggregatedGroup {
            parent_key: resolved,
            children,
        });
    }

    log::debug!("Aggregated {} rows into {} groups", rows.len(), groups.len());
    Ok(groups)
}

/// Expand nested groups back into one row per `(parent, child)` pair
///
/// Rows come out in group order, then in each group's child-map order.
/// `resolve_parent` is called once per group and never for empty input.
pub fn flatten<F>(groups: &[AggregatedGroup], mut resolve_parent: F) -> Result<Vec<FlatOption>>
where
    F: FnMut(&str) -> Result<String>,
{
    let mut rows = Vec::with_capacity(groups.iter().map(|g| g.children.len()).sum());

    for group in groups {
        log::trace!("Resolving parent '{}'", group.parent_key);
        let parent = resolve_parent(&group.parent_key)?;
        for (child, values) in &group.children {
            rows.push(FlatOption {
                parent_key: parent.clone(),
                child_key: child.clone(),
                values: values.clone(),
            });
        }
    }

    log::debug!("Flattened {} groups into {} rows", groups.len(), rows.len());
    Ok(rows)
}
