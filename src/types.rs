//! Shared value types used by identities, permissions and the set algebra.
//!
//! Capability tokens are the atoms both sides of an authorization check are
//! built from: an [`Identity`](crate::access::Identity) *provides* tokens and a
//! [`Permission`](crate::access::Permission) *needs* them.

use std::collections::BTreeSet;
use std::fmt;

/// Tag and token carried by every identity, including named ones.
pub const ANONYMOUS: &str = "anonymous";

/// Separator used when a composite key is folded into a single token.
pub const COMPOSITE_SEPARATOR: char = ':';

/// A single capability token (a role, claim or right).
///
/// Tokens are compared structurally, so `Capability::from("role:a")` equals any
/// other `Name("role:a")` regardless of where it was built. Integers and names
/// never compare equal to each other: `1` and `"1"` are distinct tokens.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum Capability {
    Number(i64),
    Name(String),
}

impl Capability {
    /// The universal marker every identity provides.
    pub fn anonymous() -> Self {
        Capability::Name(ANONYMOUS.to_string())
    }

    /// Folds a composite key into its canonical `a:b:c` name.
    ///
    /// ```
    /// use principal_core::types::Capability;
    /// assert_eq!(Capability::composite(["item", "key", "gold"]), Capability::from("item:key:gold"));
    /// ```
    pub fn composite<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut name = String::new();
        for (idx, part) in parts.into_iter().enumerate() {
            if idx > 0 {
                name.push(COMPOSITE_SEPARATOR);
            }
            name.push_str(part.as_ref());
        }
        Capability::Name(name)
    }

    pub fn is_anonymous(&self) -> bool {
        matches!(self, Capability::Name(name) if name == ANONYMOUS)
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::Number(n) => write!(f, "{}", n),
            Capability::Name(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Capability {
    fn from(value: &str) -> Self {
        Capability::Name(value.to_string())
    }
}

impl From<String> for Capability {
    fn from(value: String) -> Self {
        Capability::Name(value)
    }
}

impl From<&String> for Capability {
    fn from(value: &String) -> Self {
        Capability::Name(value.clone())
    }
}

macro_rules! capability_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Capability {
                fn from(value: $t) -> Self {
                    Capability::Number(i64::from(value))
                }
            }
        )*
    };
}

capability_from_int!(i8, i16, i32, i64, u8, u16, u32);

/// Unordered collection of capability tokens.
///
/// Backed by a `BTreeSet` so `Debug` output and serialized form are stable.
/// Membership is all that matters; insertion order never affects a check.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct CapabilitySet(BTreeSet<Capability>);

impl CapabilitySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts every token, returning how many were new.
    pub fn extend_from<I, T>(&mut self, tokens: I) -> usize
    where
        I: IntoIterator<Item = T>,
        T: Into<Capability>,
    {
        let before = self.0.len();
        self.0.extend(tokens.into_iter().map(Into::into));
        self.0.len() - before
    }

    pub fn insert(&mut self, token: impl Into<Capability>) -> bool {
        self.0.insert(token.into())
    }

    pub fn contains(&self, token: &Capability) -> bool {
        self.0.contains(token)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Capability> {
        self.0.iter()
    }
}

impl<T: Into<Capability>> FromIterator<T> for CapabilitySet {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        CapabilitySet(iter.into_iter().map(Into::into).collect())
    }
}

impl<'a> IntoIterator for &'a CapabilitySet {
    type Item = &'a Capability;
    type IntoIter = std::collections::btree_set::Iter<'a, Capability>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Builds a `Vec<Capability>` from a heterogeneous list of tokens.
///
/// ```
/// use principal_core::caps;
/// use principal_core::types::Capability;
/// let tokens = caps![1, 2, 3, "four"];
/// assert_eq!(tokens[3], Capability::from("four"));
/// ```
#[macro_export]
macro_rules! caps {
    () => { ::std::vec::Vec::<$crate::types::Capability>::new() };
    ($($token:expr),+ $(,)?) => {
        vec![$($crate::types::Capability::from($token)),+]
    };
}
