//! Request-scope abstraction.
//!
//! The host framework owns request and session state. The manager only sees it
//! through [`RequestScope`] and [`SessionStore`], passed explicitly into every
//! call so nothing request-specific is ever stored on the shared manager.
//!
//! [`RequestContext`] is a self-contained in-memory scope, suitable for tests
//! and for hosts with no scope type of their own.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use uuid::Uuid;

use crate::access::Identity;
use crate::manager::Manager;

/// The single session key the manager reads and writes.
pub const SESSION_KEY: &str = "identity_id";

/// Status the boundary layer should answer with when access is denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct StatusCode(pub u16);

impl StatusCode {
    pub const UNAUTHORIZED: StatusCode = StatusCode(401);
    pub const FORBIDDEN: StatusCode = StatusCode(403);

    pub fn as_u16(self) -> u16 {
        self.0
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Durable per-session key/value storage supplied by the host.
pub trait SessionStore: Send {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String);
}

/// Per-request state the manager publishes into and reads back from.
pub trait RequestScope {
    /// The identity most recently published for this request, if any.
    fn identity(&self) -> Option<Arc<Identity>>;
    fn publish_identity(&mut self, identity: Arc<Identity>);

    /// Session storage, when the host has sessions enabled.
    fn session(&self) -> Option<&dyn SessionStore>;
    fn session_mut(&mut self) -> Option<&mut dyn SessionStore>;

    /// Makes the manager reachable from nested code for the rest of the request.
    fn bind_manager(&mut self, manager: Arc<Manager>);
    fn manager(&self) -> Option<Arc<Manager>>;

    /// Signals an access-denied outcome to the boundary layer.
    fn deny(&mut self, status: StatusCode);
}

/// Simple `HashMap`-backed session.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct MemorySession(HashMap<String, String>);

impl MemorySession {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySession {
    fn get(&self, key: &str) -> Option<String> {
        self.0.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.0.insert(key.to_string(), value);
    }
}

/// In-memory [`RequestScope`] for a single request.
///
/// Carry a session across requests with [`RequestContext::into_session`] and
/// [`RequestContext::with_session`].
pub struct RequestContext {
    id: Uuid,
    identity: Option<Arc<Identity>>,
    session: Option<MemorySession>,
    manager: Option<Arc<Manager>>,
    denied: Option<StatusCode>,
}

impl RequestContext {
    /// A request with no session support.
    pub fn new() -> Self {
        RequestContext { id: Uuid::new_v4(), identity: None, session: None, manager: None, denied: None }
    }

    pub fn with_session(session: MemorySession) -> Self {
        RequestContext { session: Some(session), ..Self::new() }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The status recorded by [`RequestScope::deny`], if the request was denied.
    pub fn denied(&self) -> Option<StatusCode> {
        self.denied
    }

    pub fn session_ref(&self) -> Option<&MemorySession> {
        self.session.as_ref()
    }

    pub fn into_session(self) -> Option<MemorySession> {
        self.session
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestContext")
            .field("id", &self.id)
            .field("identity", &self.identity)
            .field("session", &self.session)
            .field("manager_bound", &self.manager.is_some())
            .field("denied", &self.denied)
            .finish()
    }
}

impl RequestScope for RequestContext {
    fn identity(&self) -> Option<Arc<Identity>> {
        self.identity.clone()
    }

    fn publish_identity(&mut self, identity: Arc<Identity>) {
        self.identity = Some(identity);
    }

    fn session(&self) -> Option<&dyn SessionStore> {
        self.session.as_ref().map(|s| s as &dyn SessionStore)
    }

    fn session_mut(&mut self) -> Option<&mut dyn SessionStore> {
        self.session.as_mut().map(|s| s as &mut dyn SessionStore)
    }

    fn bind_manager(&mut self, manager: Arc<Manager>) {
        self.manager = Some(manager);
    }

    fn manager(&self) -> Option<Arc<Manager>> {
        self.manager.clone()
    }

    fn deny(&mut self, status: StatusCode) {
        tracing::debug!(request_id = %self.id, status = %status, "request denied");
        self.denied = Some(status);
    }
}
