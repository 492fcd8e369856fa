//! Segment options: `segment / zone -> groups`
//!
//! Config writes these as flat rows keyed by segment *name*; the fabric API
//! nests them under segment *id*. Requests aggregate with name -> id,
//! responses flatten with id -> name.

use reconcile::{AggregatedGroup, FlatOption, Resolver, aggregate, flatten};

/// Build the nested request body from config rows
///
/// Any segment that cannot be resolved fails the whole request.
pub fn build_request(
    rows: &[FlatOption],
    segments: &dyn Resolver,
) -> reconcile::Result<Vec<AggregatedGroup>> {
    aggregate(rows, |name| segments.resolve_name_to_id(name))
}

/// Turn the nested response body back into config rows
pub fn read_response(
    groups: &[AggregatedGroup],
    segments: &dyn Resolver,
) -> reconcile::Result<Vec<FlatOption>> {
    flatten(groups, |id| segments.resolve_id_to_name(id))
}

/// Canonical form of a row list for comparison
///
/// Applies last-write-wins for repeated `(segment, zone)` pairs and orders
/// rows by segment, then zone. Parents map to themselves, so no lookup
/// takes place.
pub fn canonical(rows: &[FlatOption]) -> reconcile::Result<Vec<FlatOption>> {
    let identity = |key: &str| Ok(key.to_string());
    let groups = aggregate(rows, identity)?;
    let mut canonical = flatten(&groups, identity)?;
    canonical.sort_by(|a, b| {
        (a.parent_key.as_str(), a.child_key.as_str())
            .cmp(&(b.parent_key.as_str(), b.child_key.as_str()))
    });
    Ok(canonical)
}
