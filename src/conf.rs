//! Startup configuration for [`Manager`].
//!
//! Each option is a boxed closure applied to the manager in order. Loaders and
//! handlers accumulate, so option order decides chain order.
//!
//! ```
//! use principal_core::conf::{on_unauthorized, use_session};
//! use principal_core::context::{RequestScope, StatusCode};
//! use principal_core::manager::Manager;
//!
//! let manager = Manager::new([
//!     use_session(),
//!     on_unauthorized(|scope: &mut dyn RequestScope| scope.deny(StatusCode::FORBIDDEN)),
//! ])
//! .unwrap();
//! # let _ = manager;
//! ```

use crate::error::PrincipalError;
use crate::guard::Operation;
use crate::manager::chain::{Handler, Loader, SessionHandler, SessionLoader};
use crate::manager::Manager;
use crate::store::DataStore;

pub type Conf = Box<dyn FnOnce(&mut Manager) -> Result<(), PrincipalError>>;

/// Wraps a closure as a [`Conf`], for options not covered below.
pub fn conf<F>(f: F) -> Conf
where
    F: FnOnce(&mut Manager) -> Result<(), PrincipalError> + 'static,
{
    Box::new(f)
}

/// Appends the session loader and the session handler.
pub fn use_session() -> Conf {
    conf(|m| {
        m.loaders.push(Box::new(SessionLoader));
        m.handlers.push(Box::new(SessionHandler));
        Ok(())
    })
}

/// Appends one loader to the resolution chain.
pub fn load_with(loader: impl Loader) -> Conf {
    load_all(vec![Box::new(loader) as Box<dyn Loader>])
}

pub fn load_all(loaders: Vec<Box<dyn Loader>>) -> Conf {
    conf(move |m| {
        m.loaders.extend(loaders);
        Ok(())
    })
}

/// Appends one handler to the propagation chain.
pub fn handle_with(handler: impl Handler) -> Conf {
    handle_all(vec![Box::new(handler) as Box<dyn Handler>])
}

pub fn handle_all(handlers: Vec<Box<dyn Handler>>) -> Conf {
    conf(move |m| {
        m.handlers.extend(handlers);
        Ok(())
    })
}

/// Sets the operation run when authorization fails. The last one set wins.
pub fn on_unauthorized(fallback: impl Operation) -> Conf {
    conf(move |m| {
        m.unauthorized = Some(Box::new(fallback));
        Ok(())
    })
}

/// Replaces the permission store.
pub fn with_store(store: impl DataStore) -> Conf {
    conf(move |m| {
        m.store = Box::new(store);
        Ok(())
    })
}

/// Seeds the configured store with a permission. Fails if the store rejects it,
/// which the default store always does.
pub fn seed_permission(key: impl Into<String>, needs: Vec<crate::types::Capability>) -> Conf {
    let key = key.into();
    conf(move |m| {
        m.store.put(&key, needs)?;
        Ok(())
    })
}
