//! Identities and the permissions evaluated against them.
//!
//! Evaluation is a pure function of `(Permission, Identity)`: neither side
//! refers to the manager or the request it came from.

pub mod identity;
pub mod permission;

pub use identity::*;
pub use permission::*;
// Also expose the set algebra under a shorter path.
pub use crate::rights;
