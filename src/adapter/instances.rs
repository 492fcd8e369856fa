//! Connector instance list
//!
//! Instances are an order-significant list keyed by name. Both directions
//! go through the natural-key reconciler so the fabric returning instances
//! in a different order never shows up as a change.

use reconcile::{NaturalKey, ReconcileReport, reconcile, reconcile_with_report};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A connector instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instance {
    /// Natural key
    pub name: String,
    /// Remote id, assigned by the fabric
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_name: Option<String>,
}

#[cfg(test)]
impl Instance {
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            id: None,
            host_name: None,
        }
    }
}

fn name_of(instance: &Instance) -> String {
    instance.name.clone()
}

/// Instance list for a request, plus what changed versus the recorded one
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstancePlan {
    pub instances: Vec<Instance>,
    pub added: Vec<String>,
    pub removed: Vec<String>,
}

impl InstancePlan {
    pub fn has_changes(&self) -> bool {
        !self.added.is_empty() || !self.removed.is_empty()
    }
}

/// Order the desired instances for a request
///
/// Instances already recorded keep their recorded position, new ones follow
/// in config order. Attributes come from config, except the fabric-assigned
/// `id`, which is carried over from the recorded instance when config omits it.
pub fn plan(recorded: &[Instance], desired: &[Instance]) -> InstancePlan {
    let ordered = reconcile(recorded.to_vec(), desired.to_vec(), name_of);

    let mut by_name: HashMap<&str, &Instance> =
        desired.iter().map(|i| (i.name.as_str(), i)).collect();
    let instances: Vec<Instance> = ordered
        .into_iter()
        .filter_map(|current| {
            let wanted = by_name.remove(current.name.as_str())?;
            Some(Instance {
                id: wanted.id.clone().or(current.id),
                ..wanted.clone()
            })
        })
        .collect();

    let added = desired
        .iter()
        .filter(|d| !recorded.iter().any(|r| r.name == d.name))
        .map(name_of)
        .collect();
    let removed = recorded
        .iter()
        .filter(|r| !desired.iter().any(|d| d.name == r.name))
        .map(name_of)
        .collect();

    InstancePlan {
        instances,
        added,
        removed,
    }
}

/// Merge the observed instance list into the recorded one
///
/// Instances still present keep their recorded position and attributes,
/// newly observed ones are appended, vanished ones are dropped. Every name
/// on either side must be a valid natural key; a blank name fails the whole
/// merge before anything is reconciled.
pub fn refresh(
    recorded: Vec<Instance>,
    observed: Vec<Instance>,
) -> reconcile::Result<(Vec<Instance>, ReconcileReport)> {
    for instance in recorded.iter().chain(&observed) {
        NaturalKey::new(instance.name.as_str())?;
    }
    Ok(reconcile_with_report(recorded, observed, name_of))
}
