// handlers/mod.rs - 2-Tier Handler Architecture
//
// Public (no credentials) → Protected (HTTP Basic credentials, checked by the
// repository at login)
//
// Every handler is generic over the `Repository` it serves, so the same router
// runs against the in-memory repository in tests and in the default binary.
pub mod public;    // Tier 1: No authentication required (/hello, /health)
pub mod protected; // Tier 2: Basic authentication required (everything else)

pub use public::*;
pub use protected::*;

// REQUEST FLOW FOR PROTECTED HANDLERS:
//
// 1. `basic_auth_middleware` decodes the Authorization header into `Credentials`
//    and stores them as a request extension (401 when missing or malformed).
// 2. The handler extracts `State<AppState<R>>`, `Extension<Credentials>`, the
//    path and the body, and validates what it can without a session.
// 3. `utils::with_session` logs in on the blocking pool, runs the work closure
//    and logs out. A wrong password surfaces here as 401.
// 4. The work closure calls into `binding` / `services` and saves the session
//    only when everything succeeded. Returning early with an error drops the
//    session and with it every transient change.
// 5. `ApiError` renders the `{"statusCode", "message"}` error body.
//
// Directory structure:
// src/
// ├── handlers/
// │   ├── mod.rs           ← This file
// │   ├── public/
// │   │   ├── hello.rs     ← GET /hello
// │   │   └── health.rs    ← GET /health
// │   └── protected/
// │       ├── utils.rs     ← session scope, paths, paging links
// │       ├── root.rs      ← GET /
// │       ├── nodes.rs     ← GET|POST|PUT|DELETE /nodes/*path
// │       ├── properties.rs← GET|POST|PUT|DELETE /properties/*path
// │       ├── query.rs     ← GET|POST /query
// │       ├── users.rs     ← /users, /users/me, /users/:username[/groups]
// │       ├── groups.rs    ← /groups, /groups/:name
// │       └── system.rs    ← /system/{properties,versions,hardware,runtime}
