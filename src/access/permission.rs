use crate::access::Identity;
use crate::rights;
use crate::types::{Capability, CapabilitySet};

/// A named predicate over the capabilities an identity provides.
///
/// Two evaluation modes are offered:
/// - [`Permission::allows`]: any one needed token is enough.
/// - [`Permission::requires`]: every needed token must be present.
///
/// `excludes` is an optional disqualifier. It stays empty unless
/// [`Permission::exclude`] is called, in which case an identity holding any
/// excluded token fails both modes.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Permission {
    tag: String,
    needs: CapabilitySet,
    #[serde(default, skip_serializing_if = "CapabilitySet::is_empty")]
    excludes: CapabilitySet,
}

impl Permission {
    pub fn new<I, T>(tag: impl Into<String>, needs: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Capability>,
    {
        Permission { tag: tag.into(), needs: needs.into_iter().collect(), excludes: CapabilitySet::new() }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn needs(&self) -> &CapabilitySet {
        &self.needs
    }

    pub fn excludes(&self) -> &CapabilitySet {
        &self.excludes
    }

    /// Adds needed tokens. Meant for registration time, before the permission is shared.
    pub fn need<I, T>(&mut self, tokens: I) -> &mut Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Capability>,
    {
        self.needs.extend_from(tokens);
        self
    }

    pub fn exclude<I, T>(&mut self, tokens: I) -> &mut Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Capability>,
    {
        self.excludes.extend_from(tokens);
        self
    }

    /// Any-of check: true iff `needs ∩ provides` is non-empty.
    pub fn allows(&self, identity: &Identity) -> bool {
        let provides = identity.provides();
        rights::intersects(&self.needs, provides) && rights::disjoint(&self.excludes, provides)
    }

    /// All-of check: true iff `needs ⊆ provides`.
    pub fn requires(&self, identity: &Identity) -> bool {
        let provides = identity.provides();
        rights::subset(&self.needs, provides) && rights::disjoint(&self.excludes, provides)
    }
}
