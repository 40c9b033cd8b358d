//! Identity resolution and propagation steps.
//!
//! A [`Loader`] produces the identity for a request; the manager runs every
//! loader in order and keeps the last result. A [`Handler`] publishes an
//! identity somewhere; the manager runs every handler in order, every time.
//!
//! Closures with the matching signature implement both traits, so custom steps
//! can be written inline:
//!
//! ```
//! use principal_core::access::Identity;
//! use principal_core::context::RequestScope;
//! use principal_core::manager::Loader;
//!
//! fn takes_loader(_: impl Loader) {}
//! takes_loader(|_: &dyn RequestScope| Identity::new("service", ["role:internal"]));
//! ```

use std::sync::Arc;

use crate::access::Identity;
use crate::context::{RequestScope, SESSION_KEY};

/// A resolution step. Must be deterministic for a given scope and free of side effects.
pub trait Loader: Send + Sync + 'static {
    fn load(&self, scope: &dyn RequestScope) -> Identity;
}

impl<F> Loader for F
where
    F: Fn(&dyn RequestScope) -> Identity + Send + Sync + 'static,
{
    fn load(&self, scope: &dyn RequestScope) -> Identity {
        self(scope)
    }
}

/// A propagation step, run for every resolved or changed identity.
pub trait Handler: Send + Sync + 'static {
    fn handle(&self, identity: &Arc<Identity>, scope: &mut dyn RequestScope);
}

impl<F> Handler for F
where
    F: Fn(&Arc<Identity>, &mut dyn RequestScope) + Send + Sync + 'static,
{
    fn handle(&self, identity: &Arc<Identity>, scope: &mut dyn RequestScope) {
        self(identity, scope)
    }
}

/// Restores the identity whose tag was stored in the session.
///
/// The stored tag becomes both the tag and the sole initial capability.
/// Missing, empty or blank values resolve to anonymous.
#[derive(Debug, Default, Clone, Copy)]
pub struct SessionLoader;

impl Loader for SessionLoader {
    fn load(&self, scope: &dyn RequestScope) -> Identity {
        let stored = scope.session().and_then(|session| session.get(SESSION_KEY));
        match stored {
            Some(id) if !id.trim().is_empty() => Identity::new(id.clone(), [id]),
            Some(_) => {
                tracing::debug!(key = SESSION_KEY, "ignoring blank session identity");
                Identity::anonymous()
            }
            None => Identity::anonymous(),
        }
    }
}

/// Publishes the identity into request-scoped state so later code can read it.
#[derive(Debug, Default, Clone, Copy)]
pub struct ScopeHandler;

impl Handler for ScopeHandler {
    fn handle(&self, identity: &Arc<Identity>, scope: &mut dyn RequestScope) {
        scope.publish_identity(Arc::clone(identity));
    }
}

/// Persists the identity tag into the session so it survives across requests.
#[derive(Debug, Default, Clone, Copy)]
pub struct SessionHandler;

impl Handler for SessionHandler {
    fn handle(&self, identity: &Arc<Identity>, scope: &mut dyn RequestScope) {
        match scope.session_mut() {
            Some(session) => session.set(SESSION_KEY, identity.tag().to_string()),
            None => tracing::debug!(identity = identity.tag(), "no session on scope; identity not persisted"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{MemorySession, RequestContext, SessionStore};

    fn ctx_with_stored(value: &str) -> RequestContext {
        let mut session = MemorySession::new();
        session.set(SESSION_KEY, value.to_string());
        RequestContext::with_session(session)
    }

    #[test]
    fn test_session_loader_absent_is_anonymous() {
        let ctx = RequestContext::with_session(MemorySession::new());
        assert!(SessionLoader.load(&ctx).is_anonymous());
        assert!(SessionLoader.load(&RequestContext::new()).is_anonymous());
    }

    #[test]
    fn test_session_loader_restores_tag() {
        let identity = SessionLoader.load(&ctx_with_stored("alice"));
        assert_eq!(identity.tag(), "alice");
        assert!(identity.provides().contains(&"alice".into()));
        assert_eq!(identity.provides().len(), 2);
    }

    #[test]
    fn test_session_loader_blank_is_anonymous() {
        assert!(SessionLoader.load(&ctx_with_stored("  ")).is_anonymous());
    }

    #[test]
    fn test_session_handler_persists_tag() {
        let mut ctx = RequestContext::with_session(MemorySession::new());
        SessionHandler.handle(&Arc::new(Identity::new("bob", ["role:a"])), &mut ctx);
        assert_eq!(ctx.session().unwrap().get(SESSION_KEY).as_deref(), Some("bob"));
    }

    #[test]
    fn test_session_handler_without_session_is_noop() {
        let mut ctx = RequestContext::new();
        SessionHandler.handle(&Arc::new(Identity::anonymous()), &mut ctx);
        assert!(ctx.session().is_none());
    }

    #[test]
    fn test_scope_handler_publishes() {
        let mut ctx = RequestContext::new();
        let identity = Arc::new(Identity::new("carol", ["role:b"]));
        ScopeHandler.handle(&identity, &mut ctx);
        assert_eq!(ctx.identity(), Some(identity));
    }
}
