//! Person use-case service: list, retrieve, create, update, partial update
//! and delete.

use crate::model::person::{Person, PersonId};
use crate::repo::person_repo::PersonRepository;
use crate::repo::EntityRef;
use crate::serializer::{Fields, PersonFields, PersonPatch};
use crate::service::{ServiceError, ServiceResult};
use log::info;

/// Person service over a repository implementation.
pub struct PersonService<R: PersonRepository> {
    repo: R,
}

impl<R: PersonRepository> PersonService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Lists all persons in creation order.
    pub fn list(&self) -> ServiceResult<Vec<Person>> {
        Ok(self.repo.list_persons()?)
    }

    pub fn retrieve(&self, id: PersonId) -> ServiceResult<Person> {
        self.repo
            .get_person(id)?
            .ok_or(ServiceError::NotFound(EntityRef::Person(id)))
    }

    /// Creates a person from a body carrying `name` and `age`.
    pub fn create(&self, fields: &Fields) -> ServiceResult<Person> {
        let input = PersonFields::from_fields(fields)?;
        let id = self.repo.create_person(&input)?;
        info!("event=person_create module=service status=ok person_id={id}");
        self.read_back(id, "created person not found in read-back")
    }

    /// Full update: every writable field must be present.
    pub fn update(&self, id: PersonId, fields: &Fields) -> ServiceResult<Person> {
        self.retrieve(id)?;
        let input = PersonFields::from_fields(fields)?;
        self.repo.update_person(id, &input)?;
        self.read_back(id, "updated person not found in read-back")
    }

    /// Partial update: absent fields keep their stored values.
    pub fn partial_update(&self, id: PersonId, fields: &Fields) -> ServiceResult<Person> {
        let current = self.retrieve(id)?;
        let patch = PersonPatch::from_fields(fields)?;
        self.repo.update_person(id, &patch.apply_to(&current))?;
        self.read_back(id, "patched person not found in read-back")
    }

    /// Deletes the person; the store drops its group memberships.
    pub fn delete(&self, id: PersonId) -> ServiceResult<()> {
        self.repo.delete_person(id)?;
        info!("event=person_delete module=service status=ok person_id={id}");
        Ok(())
    }

    fn read_back(&self, id: PersonId, details: &'static str) -> ServiceResult<Person> {
        self.repo
            .get_person(id)?
            .ok_or(ServiceError::InconsistentState(details))
    }
}
