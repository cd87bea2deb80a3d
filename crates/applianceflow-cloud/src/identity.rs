//! Composite identity for sub-resources without a server-assigned ID
//!
//! The canonical form writes the appliance ID and every field, each followed
//! by `-`, and hashes the result with CRC-32 (IEEE). The decimal value is the
//! resource ID. Field order and separator are part of the contract: the same
//! inputs must yield the same ID in any implementation, otherwise imported
//! state no longer resolves.

use serde::{Deserialize, Serialize};
use std::fmt;

pub const SEPARATOR: char = '-';

/// Deterministic, hash-derived sub-resource identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompositeId(String);

impl CompositeId {
    /// Compute the ID of a sub-resource from its owning appliance and identity fields
    pub fn compute<I, S>(appliance_id: &str, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(hash_string(&canonical_key(appliance_id, fields)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CompositeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<CompositeId> for String {
    fn from(id: CompositeId) -> Self {
        id.0
    }
}

/// Canonical string that gets hashed: `appliance-field1-field2-...-fieldN-`
pub fn canonical_key<I, S>(appliance_id: &str, fields: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut key = String::with_capacity(64);
    key.push_str(appliance_id);
    key.push(SEPARATOR);
    for field in fields {
        key.push_str(field.as_ref());
        key.push(SEPARATOR);
    }
    key
}

/// CRC-32 (IEEE) of `s`, as an unsigned decimal string
pub fn hash_string(s: &str) -> String {
    crc32fast::hash(s.as_bytes()).to_string()
}
