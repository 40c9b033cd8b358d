#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![deny(deprecated)]

//!
//! Principal-Core is an in-process identity and permission-authorization engine.
//!
//! On every request the [`Manager`] resolves *who* is asking (an [`Identity`])
//! from already-authenticated state, publishes it to request and session
//! storage, and lets the [`Sufficient`] and [`Necessary`] wrappers decide
//! whether a protected operation may run by evaluating [`Permission`]s against
//! that identity.
//!
//! ```
//! use std::sync::Arc;
//! use principal_core::{caps, Identity, Manager, Permission};
//! use principal_core::conf::use_session;
//! use principal_core::context::{MemorySession, RequestContext, RequestScope};
//! use principal_core::guard::{sufficient, Operation};
//!
//! let manager = Arc::new(Manager::new([use_session()]).unwrap());
//! let editors = Arc::new(Permission::new("editors", caps!["role:editor"]));
//! let edit = sufficient(|_: &mut dyn RequestScope| println!("editing"), vec![editors]).unwrap();
//!
//! let mut ctx = RequestContext::with_session(MemorySession::new());
//! manager.on_request(&mut ctx);
//! manager.change(&Arc::new(Identity::new("alice", caps!["role:editor"])), &mut ctx);
//! edit.call(&mut ctx);
//! assert!(ctx.denied().is_none());
//! ```

// Capability tokens and token sets.
pub mod types;

// Set algebra behind the any-of / all-of checks.
pub mod rights;

// Identity and Permission.
pub mod access;

// Re-export the core value types at the crate root.
pub use access::{Identity, Permission};

// Request scope and session collaborator boundary.
pub mod context;

// Resolution/propagation chains and the Manager.
pub mod manager;

pub use manager::Manager;

// Startup configuration options.
pub mod conf;

// Sufficient / Necessary authorization wrappers.
pub mod guard;

pub use guard::{Necessary, Sufficient};

// Pluggable permission storage.
pub mod store;

// Error types.
pub mod error;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;
