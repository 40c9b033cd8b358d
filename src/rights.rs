//!
//! Set algebra for capability checks.
//! Both checks are pure and independent of insertion order, so a permission can be
//! evaluated against any identity from any thread without coordination.

use crate::types::CapabilitySet;

/// Checks whether two capability sets share at least one token.
///
/// This is the any-of rule: a single overlapping role or claim is enough.
/// An empty set intersects nothing, including another empty set.
///
/// # Arguments
/// * `needs` - The tokens a permission asks for.
/// * `provides` - The tokens an identity holds.
///
/// # Returns
/// `true` if `needs ∩ provides` is non-empty, `false` otherwise.
#[inline]
pub fn intersects(needs: &CapabilitySet, provides: &CapabilitySet) -> bool {
    // Walk the smaller side.
    let (small, large) = if needs.len() <= provides.len() {
        (needs, provides)
    } else {
        (provides, needs)
    };
    small.iter().any(|token| large.contains(token))
}

/// Checks whether every token in `needs` is present in `provides`.
///
/// This is the all-of rule. The empty set is a subset of everything, so a
/// permission with no needs is satisfied by every identity under this rule
/// while [`intersects`] rejects it. Callers rely on that asymmetry.
///
/// # Returns
/// `true` if `needs ⊆ provides`, `false` otherwise.
#[inline]
pub fn subset(needs: &CapabilitySet, provides: &CapabilitySet) -> bool {
    needs.len() <= provides.len() && needs.iter().all(|token| provides.contains(token))
}

/// Checks that two sets share no token. Used for `excludes`.
#[inline]
pub fn disjoint(a: &CapabilitySet, b: &CapabilitySet) -> bool {
    !intersects(a, b)
}
