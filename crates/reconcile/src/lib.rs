//! # Reconcile
//!
//! The declarative-state reconciliation core shared by every resource
//! adapter.
//!
//! ## Core Concepts
//!
//! - **Aggregation**: flat `(parent, child, values)` rows become one nested
//!   group per parent, with the parent key resolved to a remote id
//! - **Flattening**: the inverse, nested groups back to flat rows
//! - **Reconciliation**: merge a recorded list with an observed one by
//!   natural key, so remote reordering never rewrites the list
//! - **Resolver**: the collaborator translating names to ids and back
//!
//! ## Example
//!
//! ```
//! use reconcile::{aggregate, reconcile_items, FlatOption, Item, MapResolver, Resolver};
//!
//! let segments = MapResolver::from_pairs("segment", [("Blue", "seg-1")]).unwrap();
//! let rows = vec![
//!     FlatOption::new("Blue", "zoneA", ["g1", "g2"]),
//!     FlatOption::new("Blue", "zoneB", ["g3"]),
//! ];
//!
//! let groups = aggregate(&rows, |name| segments.resolve_name_to_id(name)).unwrap();
//! assert_eq!(groups[0].parent_key, "seg-1");
//! assert_eq!(groups[0].children.len(), 2);
//!
//! let prior = vec![Item::new(1, "a"), Item::new(2, "b")];
//! let observed = vec![Item::new(3, "c"), Item::new(2, "b")];
//! let merged = reconcile_items(prior, observed);
//! assert_eq!(merged, vec![Item::new(2, "b"), Item::new(3, "c")]);
//! ```
//!
//! Everything here is synchronous and keeps no state between calls. The
//! only blocking work is whatever the supplied resolver does.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod aggregate;
pub mod error;
pub mod merge;
pub mod resolver;
pub mod types;

pub use aggregate::{aggregate, flatten};
pub use error::{Error, ErrorCategory, Result};
pub use merge::{ReconcileReport, reconcile, reconcile_items, reconcile_with_report};
pub use resolver::{MapResolver, Resolver};
pub use types::{AggregatedGroup, FlatOption, Item, NaturalKey};
