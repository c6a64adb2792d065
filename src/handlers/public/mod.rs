// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Security Level: None
// Middleware: request tracing and CORS only
//
// These never open a repository session.

pub mod health;
pub mod hello;

pub use health::get as health_get;
pub use hello::get as hello_get;
