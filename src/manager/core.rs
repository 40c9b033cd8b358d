//!
//! Per-request orchestration: resolve the identity, propagate it, and answer
//! denials.
//!
//! The manager is built once at startup and shared as `Arc<Manager>`. It keeps
//! no per-request state; each call receives the request's [`RequestScope`].

use std::fmt;
use std::sync::Arc;

use crate::access::{Identity, Permission};
use crate::conf::Conf;
use crate::context::{RequestScope, StatusCode};
use crate::error::PrincipalError;
use crate::guard::Operation;
use crate::manager::chain::{Handler, Loader, ScopeHandler};
use crate::store::{DataStore, NoopDataStore};

/// Position the manager's middleware must occupy in the host's request
/// pipeline: first, ahead of any application handler.
pub const MIDDLEWARE_POSITION: usize = 0;

pub struct Manager {
    pub(crate) loaders: Vec<Box<dyn Loader>>,
    pub(crate) handlers: Vec<Box<dyn Handler>>,
    pub(crate) unauthorized: Option<Box<dyn Operation>>,
    pub(crate) store: Box<dyn DataStore>,
}

impl Manager {
    /// Builds a manager from configuration options, applied in order.
    ///
    /// The scope handler is always appended after the configured handlers, so
    /// `current_identity` works without any configuration.
    pub fn new<I>(confs: I) -> Result<Self, PrincipalError>
    where
        I: IntoIterator<Item = Conf>,
    {
        let mut manager = Manager::empty();
        manager.configure(confs)?;
        manager.handlers.push(Box::new(ScopeHandler));
        Ok(manager)
    }

    fn empty() -> Self {
        Manager { loaders: Vec::new(), handlers: Vec::new(), unauthorized: None, store: Box::new(NoopDataStore) }
    }

    /// Applies further options. Stops at the first option that fails.
    pub fn configure<I>(&mut self, confs: I) -> Result<(), PrincipalError>
    where
        I: IntoIterator<Item = Conf>,
    {
        for conf in confs {
            conf(&mut *self)?;
        }
        Ok(())
    }

    /// Request entry point: binds the manager into the scope, then resolves and
    /// propagates the identity. Returns the identity it published.
    pub fn on_request(self: &Arc<Self>, scope: &mut dyn RequestScope) -> Arc<Identity> {
        scope.bind_manager(Arc::clone(self));
        let identity = Arc::new(self.load_identity(scope));
        self.change(&identity, scope);
        identity
    }

    /// Runs the resolution chain. Every loader runs; the last one wins.
    pub fn load_identity(&self, scope: &dyn RequestScope) -> Identity {
        let mut identity = Identity::anonymous();
        for (step, loader) in self.loaders.iter().enumerate() {
            identity = loader.load(scope);
            tracing::trace!(step, identity = identity.tag(), "loader ran");
        }
        tracing::debug!(identity = identity.tag(), loaders = self.loaders.len(), "identity resolved");
        identity
    }

    /// Runs the propagation chain for `identity` without re-running resolution.
    pub fn change(&self, identity: &Arc<Identity>, scope: &mut dyn RequestScope) {
        for handler in &self.handlers {
            handler.handle(identity, scope);
        }
        tracing::debug!(identity = identity.tag(), handlers = self.handlers.len(), "identity propagated");
    }

    /// The identity last published into `scope`, or anonymous.
    pub fn current_identity(&self, scope: &dyn RequestScope) -> Arc<Identity> {
        resolve_identity(scope)
    }

    /// Calls the configured fallback, or answers 401 when none is set.
    pub fn unauthorized(&self, scope: &mut dyn RequestScope) {
        match &self.unauthorized {
            Some(fallback) => fallback.call(scope),
            None => {
                tracing::warn!(identity = resolve_identity(scope).tag(), "unauthorized");
                scope.deny(StatusCode::UNAUTHORIZED);
            }
        }
    }

    pub fn store(&self) -> &dyn DataStore {
        self.store.as_ref()
    }

    /// Looks a permission up in the configured store.
    pub fn permission(&self, key: &str) -> Option<Permission> {
        self.store.get(key)
    }

    /// The function a host installs at [`MIDDLEWARE_POSITION`].
    pub fn middleware(self: Arc<Self>) -> impl Fn(&mut dyn RequestScope) + Send + Sync + 'static {
        move |scope: &mut dyn RequestScope| {
            self.on_request(scope);
        }
    }
}

impl fmt::Debug for Manager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Manager")
            .field("loaders", &self.loaders.len())
            .field("handlers", &self.handlers.len())
            .field("unauthorized", &self.unauthorized.is_some())
            .finish_non_exhaustive()
    }
}

/// The manager bound into `scope` by [`Manager::on_request`].
pub fn resolve_manager(scope: &dyn RequestScope) -> Result<Arc<Manager>, PrincipalError> {
    scope.manager().ok_or(PrincipalError::ManagerNotBound)
}

/// The identity published into `scope`, or anonymous when none was.
pub fn resolve_identity(scope: &dyn RequestScope) -> Arc<Identity> {
    scope.identity().unwrap_or_else(|| Arc::new(Identity::anonymous()))
}
