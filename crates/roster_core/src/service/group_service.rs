//! Group use-case service.
//!
//! # Responsibility
//! - Standard list/retrieve/create/update/partial-update/delete over groups.
//! - `add_persons` / `remove_persons` membership actions.
//!
//! # Invariants
//! - Update paths only write `name`; membership changes go through the
//!   membership actions (or the initial member list on create).
//! - Membership actions resolve every requested id before writing; one
//!   unknown id rejects the whole action with `NotFound`.

use crate::model::group::{Group, GroupId, MembershipUpdate};
use crate::repo::group_repo::GroupRepository;
use crate::repo::{EntityRef, RepoError};
use crate::serializer::{
    Fields, GroupFields, GroupPatch, MembershipChange, NewGroup, ValidationErrors,
};
use crate::service::{ServiceError, ServiceResult};
use log::info;

/// Group service over a repository implementation.
pub struct GroupService<R: GroupRepository> {
    repo: R,
}

impl<R: GroupRepository> GroupService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Lists all groups in creation order.
    pub fn list(&self) -> ServiceResult<Vec<Group>> {
        Ok(self.repo.list_groups()?)
    }

    pub fn retrieve(&self, id: GroupId) -> ServiceResult<Group> {
        self.repo
            .get_group(id)?
            .ok_or(ServiceError::NotFound(EntityRef::Group(id)))
    }

    /// Creates a group; `persons` in the body seeds the initial members.
    ///
    /// Unknown initial member ids are a validation error on `persons`.
    pub fn create(&mut self, fields: &Fields) -> ServiceResult<Group> {
        let input = NewGroup::from_fields(fields)?;
        let id = match self.repo.create_group(&input.name, &input.persons) {
            Ok(id) => id,
            Err(RepoError::NotFound(EntityRef::Person(person_id))) => {
                return Err(ServiceError::Validation(ValidationErrors::single(
                    "persons",
                    format!("Invalid pk \"{person_id}\" - object does not exist."),
                )));
            }
            Err(err) => return Err(err.into()),
        };
        info!(
            "event=group_create module=service status=ok group_id={id} members={}",
            input.persons.len()
        );
        self.read_back(id, "created group not found in read-back")
    }

    /// Full update of the writable fields (`name`).
    pub fn update(&self, id: GroupId, fields: &Fields) -> ServiceResult<Group> {
        self.retrieve(id)?;
        let input = GroupFields::from_fields(fields)?;
        self.repo.rename_group(id, &input.name)?;
        self.read_back(id, "updated group not found in read-back")
    }

    pub fn partial_update(&self, id: GroupId, fields: &Fields) -> ServiceResult<Group> {
        self.retrieve(id)?;
        let patch = GroupPatch::from_fields(fields)?;
        if let Some(name) = patch.name.as_deref() {
            self.repo.rename_group(id, name)?;
        }
        self.read_back(id, "patched group not found in read-back")
    }

    /// Deletes the group and its membership links; member persons remain.
    pub fn delete(&self, id: GroupId) -> ServiceResult<()> {
        self.repo.delete_group(id)?;
        info!("event=group_delete module=service status=ok group_id={id}");
        Ok(())
    }

    /// Adds every listed person to the group. Present members are skipped.
    pub fn add_persons(&mut self, id: GroupId, fields: &Fields) -> ServiceResult<MembershipUpdate> {
        self.retrieve(id)?;
        let change = MembershipChange::from_fields(fields)?;
        self.repo.add_members(id, &change.persons)?;
        info!(
            "event=group_members_add module=service status=ok group_id={id} requested={}",
            change.persons.len()
        );
        self.membership_update(id)
    }

    /// Removes every listed person from the group. Absent members are skipped.
    pub fn remove_persons(
        &mut self,
        id: GroupId,
        fields: &Fields,
    ) -> ServiceResult<MembershipUpdate> {
        self.retrieve(id)?;
        let change = MembershipChange::from_fields(fields)?;
        self.repo.remove_members(id, &change.persons)?;
        info!(
            "event=group_members_remove module=service status=ok group_id={id} requested={}",
            change.persons.len()
        );
        self.membership_update(id)
    }

    fn membership_update(&self, id: GroupId) -> ServiceResult<MembershipUpdate> {
        let update = self.read_back(id, "group not found after membership change")?;
        Ok(MembershipUpdate { update })
    }

    fn read_back(&self, id: GroupId, details: &'static str) -> ServiceResult<Group> {
        self.repo
            .get_group(id)?
            .ok_or(ServiceError::InconsistentState(details))
    }
}
