#![no_main]

// Harness: permission_eval
// Focus: allows/requires agree with a naive HashSet model, and Sufficient/Necessary
// end every call in exactly one terminal action.

use std::collections::HashSet;
use std::sync::Arc;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use principal_core::{
    context::{RequestContext, RequestScope},
    guard::{necessary, sufficient, Operation},
    testing::Counter,
    types::Capability,
    Identity, Permission,
};

#[derive(Arbitrary, Debug, Clone)]
enum Token {
    Number(u8),
    Name(u8),
}

impl From<&Token> for Capability {
    fn from(token: &Token) -> Self {
        match token {
            Token::Number(n) => Capability::Number(i64::from(*n % 8)),
            Token::Name(n) => Capability::Name(format!("role:{}", n % 8)),
        }
    }
}

#[derive(Arbitrary, Debug, Clone)]
struct EvalFrame {
    provides: Vec<Token>,
    permissions: Vec<Vec<Token>>,
}

fuzz_target!(|frame: EvalFrame| {
    let identity = Identity::new("fuzz", frame.provides.iter().map(Capability::from));
    let have: HashSet<Capability> = identity.provides().iter().cloned().collect();

    let permissions: Vec<Arc<Permission>> = frame
        .permissions
        .iter()
        .enumerate()
        .map(|(idx, needs)| Arc::new(Permission::new(format!("p{}", idx), needs.iter().map(Capability::from))))
        .collect();

    for permission in &permissions {
        let needs: HashSet<Capability> = permission.needs().iter().cloned().collect();
        assert_eq!(permission.allows(&identity), !needs.is_disjoint(&have));
        assert_eq!(permission.requires(&identity), needs.is_subset(&have));
    }

    if permissions.is_empty() {
        return;
    }

    let handler = Counter::new();
    let any = sufficient(handler.clone(), permissions.clone()).unwrap();
    let all = necessary(handler.clone(), permissions.clone()).unwrap();

    for guard in [&any as &dyn Operation, &all as &dyn Operation] {
        let before = handler.count();
        let mut ctx = RequestContext::new();
        ctx.publish_identity(Arc::new(identity.clone()));
        guard.call(&mut ctx);
        let ran = handler.count() - before;
        let denied = usize::from(ctx.denied().is_some());
        assert_eq!(ran + denied, 1);
    }
});
