// handlers/protected/mod.rs - Protected handlers (Basic authentication required)
//
// Security Level: HTTP Basic credentials, verified by the repository on login
// Middleware: basic_auth_middleware + request tracing + CORS
//
// Each request gets its own repository session (see `utils::with_session`).

pub mod groups;
pub mod nodes;
pub mod properties;
pub mod query;
pub mod root;
pub mod system;
pub mod users;
pub mod utils;

pub use groups::{
    delete as groups_delete, get as groups_get, list as groups_list, post as groups_post,
};
pub use nodes::{delete as nodes_delete, get as nodes_get, post as nodes_post, put as nodes_put};
pub use properties::{
    delete as properties_delete, get as properties_get, post as properties_post,
    put as properties_put,
};
pub use query::{get as query_get, post as query_post};
pub use root::get as root_get;
pub use system::{
    hardware as system_hardware, properties as system_properties, runtime as system_runtime,
    versions as system_versions,
};
pub use users::{
    delete as users_delete, get as users_get, groups as users_groups, list as users_list,
    me as users_me, post as users_post,
};
