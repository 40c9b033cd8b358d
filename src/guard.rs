//! Authorization wrappers for protected operations.
//!
//! [`Sufficient`] grants access when *any* permission allows the current
//! identity; [`Necessary`] grants access only when *every* permission's needs
//! are met. Both stop at the first deciding permission, so each call ends in
//! exactly one action: the operation runs once, or the unauthorized fallback
//! runs once.

use std::fmt;
use std::sync::Arc;

use crate::access::{Identity, Permission};
use crate::context::{RequestScope, StatusCode};
use crate::error::PrincipalError;
use crate::manager::{resolve_identity, resolve_manager};

/// Something that runs within a request: a protected handler, a fallback, or
/// another wrapper.
pub trait Operation: Send + Sync + 'static {
    fn call(&self, scope: &mut dyn RequestScope);
}

impl<F> Operation for F
where
    F: Fn(&mut dyn RequestScope) + Send + Sync + 'static,
{
    fn call(&self, scope: &mut dyn RequestScope) {
        self(scope)
    }
}

/// Outcome of evaluating a wrapper's permissions against an identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Access granted. `by` names the deciding permission; for [`Necessary`]
    /// that is the last one checked.
    Granted { by: String },
    /// Access denied. `by` names the first failing permission; for
    /// [`Sufficient`] that is the last one checked.
    Denied { by: String },
}

impl Decision {
    pub fn is_granted(&self) -> bool {
        matches!(self, Decision::Granted { .. })
    }
}

fn checked(permissions: Vec<Arc<Permission>>) -> Result<Vec<Arc<Permission>>, PrincipalError> {
    if permissions.is_empty() {
        return Err(PrincipalError::NoPermissions);
    }
    Ok(permissions)
}

fn last_tag(permissions: &[Arc<Permission>]) -> String {
    permissions.last().map(|p| p.tag().to_string()).unwrap_or_default()
}

/// Sends the request down the manager's unauthorized path, or answers 401
/// directly when no manager is bound.
fn refuse(scope: &mut dyn RequestScope, decision: &Decision) {
    match resolve_manager(scope) {
        Ok(manager) => manager.unauthorized(scope),
        Err(err) => {
            tracing::warn!(?decision, error = %err, "denying without a manager");
            scope.deny(StatusCode::UNAUTHORIZED);
        }
    }
}

/// Any-of wrapper: the operation runs if at least one permission allows.
pub struct Sufficient<H> {
    inner: H,
    permissions: Vec<Arc<Permission>>,
}

impl<H: Operation> Sufficient<H> {
    pub fn new(inner: H, permissions: Vec<Arc<Permission>>) -> Result<Self, PrincipalError> {
        Ok(Sufficient { inner, permissions: checked(permissions)? })
    }

    pub fn authorize(&self, identity: &Identity) -> Decision {
        match self.permissions.iter().find(|p| p.allows(identity)) {
            Some(p) => Decision::Granted { by: p.tag().to_string() },
            None => Decision::Denied { by: last_tag(&self.permissions) },
        }
    }
}

impl<H: Operation> Operation for Sufficient<H> {
    fn call(&self, scope: &mut dyn RequestScope) {
        let identity = resolve_identity(scope);
        let decision = self.authorize(&identity);
        tracing::debug!(identity = identity.tag(), ?decision, "sufficient check");
        if decision.is_granted() {
            self.inner.call(scope);
        } else {
            refuse(scope, &decision);
        }
    }
}

impl<H> fmt::Debug for Sufficient<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sufficient").field("permissions", &self.permissions).finish_non_exhaustive()
    }
}

/// All-of wrapper: the operation runs only if every permission's needs are met.
pub struct Necessary<H> {
    inner: H,
    permissions: Vec<Arc<Permission>>,
}

impl<H: Operation> Necessary<H> {
    pub fn new(inner: H, permissions: Vec<Arc<Permission>>) -> Result<Self, PrincipalError> {
        Ok(Necessary { inner, permissions: checked(permissions)? })
    }

    pub fn authorize(&self, identity: &Identity) -> Decision {
        match self.permissions.iter().find(|p| !p.requires(identity)) {
            Some(p) => Decision::Denied { by: p.tag().to_string() },
            None => Decision::Granted { by: last_tag(&self.permissions) },
        }
    }
}

impl<H: Operation> Operation for Necessary<H> {
    fn call(&self, scope: &mut dyn RequestScope) {
        let identity = resolve_identity(scope);
        let decision = self.authorize(&identity);
        tracing::debug!(identity = identity.tag(), ?decision, "necessary check");
        if decision.is_granted() {
            self.inner.call(scope);
        } else {
            refuse(scope, &decision);
        }
    }
}

impl<H> fmt::Debug for Necessary<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Necessary").field("permissions", &self.permissions).finish_non_exhaustive()
    }
}

/// Shorthand for [`Sufficient::new`].
pub fn sufficient<H: Operation>(inner: H, permissions: Vec<Arc<Permission>>) -> Result<Sufficient<H>, PrincipalError> {
    Sufficient::new(inner, permissions)
}

/// Shorthand for [`Necessary::new`].
pub fn necessary<H: Operation>(inner: H, permissions: Vec<Arc<Permission>>) -> Result<Necessary<H>, PrincipalError> {
    Necessary::new(inner, permissions)
}
