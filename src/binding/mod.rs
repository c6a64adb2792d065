//! Data binding between repository items and wire representations
//!
//! The read path (`read`) snapshots a node into a `NodeRepresentation`, bounded
//! by a depth budget. The write path (`write`) applies a representation onto a
//! live node and creates nested children with no depth ceiling. Neither path
//! touches the session lifecycle: callers open the session, call in here, and
//! decide whether to save.

pub mod error;
pub mod read;
pub mod write;

pub use error::BindingError;
pub use read::{property_representation_of, representation_of};
pub use write::{apply_child_nodes, apply_mixins, apply_properties, apply_property, populate, reset_node};

pub type BindingResult<T> = Result<T, BindingError>;

/// Properties whose names start with this prefix are repository-managed and never serialized
pub const RESERVED_PREFIX: &str = "jcr:";

/// Housekeeping properties maintained by the repository that clients must not write
pub const PROPERTY_DENYLIST: &[&str] = &["hippo:paths", "hippo:related"];

pub fn is_reserved(property_name: &str) -> bool {
    property_name.starts_with(RESERVED_PREFIX)
}

pub fn is_denylisted(property_name: &str) -> bool {
    PROPERTY_DENYLIST.contains(&property_name)
}
