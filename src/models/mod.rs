//! Wire representations exchanged with clients
//!
//! These are plain serde containers. They never hold repository handles; the
//! binding engine builds them on the read path and consumes them on the write
//! path.

pub mod management;
pub mod node;
pub mod query;

pub use management::{Group, GroupCollection, Link, User, UserCollection};
pub use node::{NodeRepresentation, PropertyRepresentation};
pub use query::{QueryResultNode, QueryResultRepresentation, SearchQuery};
