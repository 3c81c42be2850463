//! Person record.

use serde::{Deserialize, Serialize};

/// Store-assigned person identifier.
pub type PersonId = i64;

/// Serialized as `{id, name, age}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub id: PersonId,
    pub name: String,
    pub age: i64,
}
