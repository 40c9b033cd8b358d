use std::sync::Arc;

use crate::access::Permission;
use crate::types::{Capability, CapabilitySet, ANONYMOUS};

/// The resolved principal making a request.
///
/// `provides` always contains the anonymous marker, so a permission needing
/// `"anonymous"` matches every identity. Capabilities can be added after
/// construction but never removed. Deserialization goes through
/// [`Identity::new`], so a stored identity gains the marker too.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(from = "IdentityRepr")]
pub struct Identity {
    tag: String,
    provides: CapabilitySet,
}

#[derive(serde::Deserialize)]
struct IdentityRepr {
    tag: String,
    #[serde(default)]
    provides: CapabilitySet,
}

impl From<IdentityRepr> for Identity {
    fn from(repr: IdentityRepr) -> Self {
        Identity::new(repr.tag, repr.provides.iter().cloned())
    }
}

impl Identity {
    pub fn new<I, T>(tag: impl Into<String>, provides: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Capability>,
    {
        let mut provides: CapabilitySet = provides.into_iter().collect();
        provides.insert(Capability::anonymous());
        Identity { tag: tag.into(), provides }
    }

    /// The identity used when nothing else resolves.
    pub fn anonymous() -> Self {
        Identity::new(ANONYMOUS, [ANONYMOUS])
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn provides(&self) -> &CapabilitySet {
        &self.provides
    }

    /// Adds capabilities to this identity.
    ///
    /// Published identities live behind an `Arc`; use [`Identity::add_shared`]
    /// for those so readers keep their snapshot.
    pub fn add<I, T>(&mut self, tokens: I) -> &CapabilitySet
    where
        I: IntoIterator<Item = T>,
        T: Into<Capability>,
    {
        self.provides.extend_from(tokens);
        &self.provides
    }

    /// Copy-on-write variant of [`Identity::add`] for a shared identity.
    pub fn add_shared<I, T>(identity: &mut Arc<Identity>, tokens: I)
    where
        I: IntoIterator<Item = T>,
        T: Into<Capability>,
    {
        Arc::make_mut(identity).add(tokens);
    }

    /// True only for the Anonymous identity itself: the anonymous tag and no
    /// capability beyond the marker.
    pub fn is_anonymous(&self) -> bool {
        self.tag == ANONYMOUS && self.provides.len() == 1
    }

    pub fn can(&self, permission: &Permission) -> bool {
        permission.allows(self)
    }

    pub fn must(&self, permission: &Permission) -> bool {
        permission.requires(self)
    }
}

impl Default for Identity {
    fn default() -> Self {
        Identity::anonymous()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::caps;

    #[test]
    fn test_anonymous_marker_always_present() {
        let bare = Identity::new("bare", Vec::<Capability>::new());
        assert!(bare.provides().contains(&Capability::anonymous()));
        assert_eq!(bare.provides().len(), 1);

        let named = Identity::new("alice", caps!["role:a"]);
        assert!(named.provides().contains(&Capability::anonymous()));
        assert!(!named.is_anonymous());
    }

    #[test]
    fn test_deserialized_identity_gains_marker() {
        let alice: Identity = serde_json::from_str(r#"{"tag":"alice","provides":["role:a"]}"#).unwrap();
        assert!(alice.provides().contains(&Capability::anonymous()));
        assert_eq!(alice, Identity::new("alice", caps!["role:a"]));
        assert!(Permission::new("public", caps!["anonymous"]).allows(&alice));

        let bare: Identity = serde_json::from_str(r#"{"tag":"bare"}"#).unwrap();
        assert_eq!(bare.provides().len(), 1);

        let json = serde_json::to_string(&alice).unwrap();
        assert_eq!(serde_json::from_str::<Identity>(&json).unwrap(), alice);
    }

    #[test]
    fn test_anonymous_tag_with_extra_capabilities_is_not_anonymous() {
        let impostor = Identity::new("anonymous", caps!["role:admin"]);
        assert!(!impostor.is_anonymous());
        assert!(Identity::new("anonymous", caps!["anonymous"]).is_anonymous());
    }

    #[test]
    fn test_anonymous_singleton_shape() {
        let anon = Identity::anonymous();
        assert_eq!(anon.tag(), "anonymous");
        assert_eq!(anon.provides().len(), 1);
        assert!(anon.is_anonymous());
        assert_eq!(Identity::default(), anon);
    }

    #[test]
    fn test_add_is_additive() {
        let mut id = Identity::new("bob", caps!["role:a"]);
        id.add(caps!["role:b", 42]);
        assert_eq!(id.provides().len(), 4);
        id.add(caps!["role:a"]);
        assert_eq!(id.provides().len(), 4);
    }

    #[test]
    fn test_add_shared_leaves_other_readers_untouched() {
        let mut published = Arc::new(Identity::new("carol", caps!["role:a"]));
        let reader = Arc::clone(&published);
        Identity::add_shared(&mut published, caps!["role:b"]);
        assert!(published.provides().contains(&Capability::from("role:b")));
        assert!(!reader.provides().contains(&Capability::from("role:b")));
    }
}
