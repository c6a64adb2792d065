pub mod group;
pub mod node;
pub mod property;
pub mod query;
pub mod server;
pub mod system;
pub mod user;
