pub mod chain;
pub mod core;

// Re-export the primary types so `crate::manager::*` paths stay short.
pub use self::chain::{Handler, Loader, ScopeHandler, SessionHandler, SessionLoader};
pub use self::core::{resolve_identity, resolve_manager, Manager, MIDDLEWARE_POSITION};
