use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Stable identifier for a rendered tree node.
///
/// The rule is simple:
/// - IDs are deterministic when derived from insertion order.
/// - IDs are printable and safe to key an animation frame on.
///
/// This keeps a live tree and a tree replayed from a log prefix in
/// lockstep: the same insertion sequence yields the same ids.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub String);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl NodeId {
    /// Deterministic node id from a small set of stable parts.
    ///
    /// Engines pass an engine tag, the key's display form, and the
    /// insertion sequence number. Wall-clock ids are a trap here: a
    /// replayed tree would never match the one it was replayed from.
    pub fn from_parts(parts: impl IntoIterator<Item = impl AsRef<str>>) -> Self {
        Self(hash_hex(parts))
    }
}

fn hash_hex(parts: impl IntoIterator<Item = impl AsRef<str>>) -> String {
    let mut hasher = Sha256::new();
    for (i, p) in parts.into_iter().enumerate() {
        if i > 0 {
            hasher.update(b"\n");
        }
        hasher.update(p.as_ref().as_bytes());
    }
    let out = hasher.finalize();
    hex::encode(out)
}
