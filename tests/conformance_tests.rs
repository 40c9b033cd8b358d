use std::sync::Arc;

use principal_core::conf::{load_with, on_unauthorized, use_session};
use principal_core::context::{MemorySession, RequestContext, RequestScope, SessionStore, StatusCode, SESSION_KEY};
use principal_core::guard::{necessary, sufficient, Operation};
use principal_core::manager::resolve_manager;
use principal_core::testing::Counter;
use principal_core::types::Capability;
use principal_core::{caps, Identity, Manager, Permission};

// --- Shared fixtures ---

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().with_max_level(tracing::Level::DEBUG).try_init();
}

fn p1() -> Arc<Permission> {
    Arc::new(Permission::new("p1", caps!["role:a", "role:b"]))
}

fn p2() -> Arc<Permission> {
    Arc::new(Permission::new("p2", caps!["role:c"]))
}

fn test_identity(provides: Vec<Capability>) -> Arc<Identity> {
    Arc::new(Identity::new("test", provides))
}

fn session_manager(fallback: &Counter) -> Arc<Manager> {
    Arc::new(Manager::new([use_session(), on_unauthorized(fallback.clone())]).unwrap())
}

// --- Evaluation scenarios ---

#[test]
fn test_overlapping_identity_is_allowed_and_required() {
    let i = test_identity(caps!["role:a", "role:b"]);
    assert!(p1().allows(&i));
    assert!(p1().requires(&i));
}

#[test]
fn test_disjoint_identity_is_neither() {
    let i = test_identity(caps!["role:a", "role:b"]);
    assert!(!p2().allows(&i));
    assert!(!p2().requires(&i));
}

#[test]
fn test_mixed_numeric_and_named_needs() {
    let p0 = Permission::new("p0", caps![1, 2, 3, "four"]);
    assert!(!p0.allows(&test_identity(caps!["role:a", "role:b"])));
    assert!(p0.allows(&test_identity(caps!["four"])));
    assert!(p0.requires(&test_identity(caps![1, 2, 3, "four"])));
}

// --- Resolution and propagation ---

#[test]
fn test_extension_is_reachable_from_handlers() {
    init_tracing();
    let manager = session_manager(&Counter::new());
    let mut ctx = RequestContext::with_session(MemorySession::new());
    let found = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let flag = Arc::clone(&found);
    let handler = move |scope: &mut dyn RequestScope| {
        flag.store(resolve_manager(scope).is_ok(), std::sync::atomic::Ordering::SeqCst);
    };

    manager.on_request(&mut ctx);
    Operation::call(&handler, &mut ctx);
    assert!(found.load(std::sync::atomic::Ordering::SeqCst));
}

#[test]
fn test_session_identity_roundtrip() {
    init_tracing();
    let manager = session_manager(&Counter::new());
    let mut ctx = RequestContext::with_session(MemorySession::new());

    let resolved = manager.on_request(&mut ctx);
    assert!(resolved.is_anonymous());

    manager.change(&test_identity(vec![]), &mut ctx);
    assert_eq!(ctx.session().unwrap().get(SESSION_KEY).as_deref(), Some("test"));
    assert_eq!(manager.current_identity(&ctx).tag(), "test");
}

#[test]
fn test_last_loader_wins_regardless_of_first() {
    for first in ["alice", "bob", "anonymous"] {
        let manager = Arc::new(
            Manager::new([
                load_with(move |_: &dyn RequestScope| Identity::new(first, [first])),
                load_with(|_: &dyn RequestScope| Identity::new("x", ["role:x"])),
            ])
            .unwrap(),
        );
        let mut ctx = RequestContext::new();
        assert_eq!(manager.on_request(&mut ctx).tag(), "x");
    }
}

#[test]
fn test_malformed_session_value_is_anonymous() {
    let manager = session_manager(&Counter::new());
    let mut session = MemorySession::new();
    session.set(SESSION_KEY, String::new());
    let mut ctx = RequestContext::with_session(session);
    assert!(manager.on_request(&mut ctx).is_anonymous());
}

// --- Wrapper scenarios ---

#[test]
fn test_sufficient_invokes_handler_exactly_once() {
    init_tracing();
    let fallback = Counter::new();
    let manager = session_manager(&fallback);
    let handler = Counter::new();
    let guarded = sufficient(handler.clone(), vec![p1()]).unwrap();

    let mut ctx = RequestContext::with_session(MemorySession::new());
    manager.on_request(&mut ctx);
    manager.change(&test_identity(caps!["role:a", "role:b"]), &mut ctx);
    guarded.call(&mut ctx);

    assert_eq!(handler.count(), 1);
    assert_eq!(fallback.count(), 0);
}

#[test]
fn test_necessary_with_failing_permission_invokes_fallback() {
    init_tracing();
    let fallback = Counter::new();
    let manager = session_manager(&fallback);
    let handler = Counter::new();
    let guarded = necessary(handler.clone(), vec![p1(), p2()]).unwrap();

    let mut ctx = RequestContext::with_session(MemorySession::new());
    manager.on_request(&mut ctx);
    manager.change(&test_identity(caps!["role:a", "role:b"]), &mut ctx);
    guarded.call(&mut ctx);

    assert_eq!(handler.count(), 0);
    assert_eq!(fallback.count(), 1);
}

#[test]
fn test_denial_without_fallback_is_401() {
    let manager = Arc::new(Manager::new([use_session()]).unwrap());
    let handler = Counter::new();
    let guarded = necessary(handler.clone(), vec![p2()]).unwrap();

    let mut ctx = RequestContext::with_session(MemorySession::new());
    manager.on_request(&mut ctx);
    guarded.call(&mut ctx);

    assert_eq!(handler.count(), 0);
    assert_eq!(ctx.denied(), Some(StatusCode::UNAUTHORIZED));
}

#[test]
fn test_login_then_access_on_next_request() {
    let fallback = Counter::new();
    let manager = session_manager(&fallback);
    let handler = Counter::new();
    // The session loader gives a restored identity its own tag as sole capability.
    let own_page = sufficient(handler.clone(), vec![Arc::new(Permission::new("self", caps!["alice"]))]).unwrap();

    let mut login = RequestContext::with_session(MemorySession::new());
    manager.on_request(&mut login);
    own_page.call(&mut login);
    assert_eq!(fallback.count(), 1);
    manager.change(&Arc::new(Identity::new("alice", caps!["role:user"])), &mut login);

    let mut next = RequestContext::with_session(login.into_session().unwrap());
    manager.on_request(&mut next);
    own_page.call(&mut next);
    assert_eq!(handler.count(), 1);
    assert_eq!(fallback.count(), 1);
}
