//! Connector resource adapter
//!
//! Translates between three shapes of the same connector:
//! - declarative config (flat segment option rows, instance list)
//! - the fabric API wire payload (segment id -> zone -> groups)
//! - the recorded state used on the next pass
//!
//! The nesting, resolution and list ordering work is delegated to the
//! `reconcile` crate; this module only owns the wire types.

pub mod instances;
pub mod segment_options;

use reconcile::AggregatedGroup;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

pub use instances::{Instance, InstancePlan};

/// Connector body as sent to and returned by the fabric API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectorPayload {
    pub name: String,

    /// Segment id -> zones, in first-seen order
    #[serde(default, with = "segment_map")]
    pub segment_options: Vec<AggregatedGroup>,

    #[serde(default)]
    pub instances: Vec<InstancePayload>,
}

impl ConnectorPayload {
    /// Assemble a request body
    pub fn new(name: &str, segment_options: Vec<AggregatedGroup>, instances: &[Instance]) -> Self {
        Self {
            name: name.to_string(),
            segment_options,
            instances: instances.iter().map(InstancePayload::from).collect(),
        }
    }

    /// Instances converted back to their declarative form
    pub fn instances(&self) -> Vec<Instance> {
        self.instances.iter().cloned().map(Instance::from).collect()
    }
}

/// Instance as it appears on the wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstancePayload {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_name: Option<String>,
}

impl From<&Instance> for InstancePayload {
    fn from(instance: &Instance) -> Self {
        Self {
            name: instance.name.clone(),
            id: instance.id.clone(),
            host_name: instance.host_name.clone(),
        }
    }
}

impl From<InstancePayload> for Instance {
    fn from(payload: InstancePayload) -> Self {
        Self {
            name: payload.name,
            id: payload.id,
            host_name: payload.host_name,
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ZonesToGroups {
    zones_to_groups: BTreeMap<String, Vec<String>>,
}

/// `Vec<AggregatedGroup>` <-> `{ "<segment id>": { "zonesToGroups": {...} } }`
///
/// Entries are written and read in sequence order, so group order survives
/// the round trip without relying on the JSON map implementation.
mod segment_map {
    use super::*;

    pub fn serialize<S: Serializer>(groups: &[AggregatedGroup], ser: S) -> Result<S::Ok, S::Error> {
        let mut map = ser.serialize_map(Some(groups.len()))?;
        for group in groups {
            map.serialize_entry(
                &group.parent_key,
                &ZonesToGroups {
                    zones_to_groups: group.children.clone(),
                },
            )?;
        }
        map.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<Vec<AggregatedGroup>, D::Error> {
        de.deserialize_map(GroupsVisitor)
    }

    struct GroupsVisitor;

    impl<'de> Visitor<'de> for GroupsVisitor {
        type Value = Vec<AggregatedGroup>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a map of segment id to zonesToGroups")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
            let mut groups = Vec::with_capacity(access.size_hint().unwrap_or(0));
            while let Some((parent_key, zones)) = access.next_entry::<String, ZonesToGroups>()? {
                groups.push(AggregatedGroup {
                    parent_key,
                    children: zones.zones_to_groups,
                });
            }
            Ok(groups)
        }
    }
}
