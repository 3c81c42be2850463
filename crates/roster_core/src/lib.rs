//! Core domain logic for the roster service: people, groups and the
//! membership relation between them.
//! This crate owns storage, input validation and use-case rules; transport
//! layers only map its results onto their own protocol.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod serializer;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status, LogTarget};
pub use model::group::{Group, GroupId, MembershipUpdate};
pub use model::person::{Person, PersonId};
pub use repo::group_repo::{GroupRepository, SqliteGroupRepository};
pub use repo::person_repo::{PersonRepository, SqlitePersonRepository};
pub use repo::{EntityRef, RepoError, RepoResult};
pub use serializer::{Fields, ValidationErrors};
pub use service::group_service::GroupService;
pub use service::person_service::PersonService;
pub use service::{ServiceError, ServiceResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
