//! Group record and membership read model.

use crate::model::person::PersonId;
use serde::{Deserialize, Serialize};

/// Store-assigned group identifier.
pub type GroupId = i64;

/// Serialized as `{id, name, persons}` where `persons` lists member ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    /// Member person ids, ascending.
    pub persons: Vec<PersonId>,
}

/// Response envelope of the membership actions: `{"update": <group>}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembershipUpdate {
    pub update: Group,
}
