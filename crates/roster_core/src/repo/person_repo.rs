//! Person repository contract and SQLite implementation.
//!
//! # Invariants
//! - Lists are ordered by ascending id, which is creation order.
//! - Deleting a person removes its membership rows via `ON DELETE CASCADE`.

use crate::model::person::{Person, PersonId};
use crate::repo::{ensure_connection_ready, EntityRef, RepoError, RepoResult};
use crate::serializer::PersonFields;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::BTreeSet;

const PERSON_SELECT_SQL: &str = "SELECT id, name, age FROM roster_person";

/// Repository interface for person CRUD.
pub trait PersonRepository {
    /// Inserts one person and returns its assigned id.
    fn create_person(&self, fields: &PersonFields) -> RepoResult<PersonId>;
    fn get_person(&self, id: PersonId) -> RepoResult<Option<Person>>;
    fn list_persons(&self) -> RepoResult<Vec<Person>>;
    /// Replaces all writable fields of an existing person.
    fn update_person(&self, id: PersonId, fields: &PersonFields) -> RepoResult<()>;
    fn delete_person(&self, id: PersonId) -> RepoResult<()>;
    /// Checks that every id exists; fails on the first one that does not.
    fn resolve_persons(&self, ids: &[PersonId]) -> RepoResult<Vec<PersonId>>;
}

/// SQLite-backed person repository.
pub struct SqlitePersonRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePersonRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["roster_person", "roster_group_persons"])?;
        Ok(Self { conn })
    }
}

impl PersonRepository for SqlitePersonRepository<'_> {
    fn create_person(&self, fields: &PersonFields) -> RepoResult<PersonId> {
        self.conn.execute(
            "INSERT INTO roster_person (name, age) VALUES (?1, ?2);",
            params![fields.name.as_str(), fields.age],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn get_person(&self, id: PersonId) -> RepoResult<Option<Person>> {
        let person = self
            .conn
            .query_row(
                &format!("{PERSON_SELECT_SQL} WHERE id = ?1;"),
                [id],
                parse_person_row,
            )
            .optional()?;
        Ok(person)
    }

    fn list_persons(&self) -> RepoResult<Vec<Person>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PERSON_SELECT_SQL} ORDER BY id ASC;"))?;
        let rows = stmt.query_map([], parse_person_row)?;
        let persons = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(persons)
    }

    fn update_person(&self, id: PersonId, fields: &PersonFields) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE roster_person SET name = ?1, age = ?2 WHERE id = ?3;",
            params![fields.name.as_str(), fields.age, id],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(EntityRef::Person(id)));
        }
        Ok(())
    }

    fn delete_person(&self, id: PersonId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM roster_person WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound(EntityRef::Person(id)));
        }
        Ok(())
    }

    fn resolve_persons(&self, ids: &[PersonId]) -> RepoResult<Vec<PersonId>> {
        resolve_person_ids(self.conn, ids)
    }
}

/// Resolves a set of person ids against `roster_person`.
///
/// Returns the distinct ids in ascending order, or `NotFound` for the
/// smallest id that has no row. Runs on any connection, including an open
/// transaction, so callers can resolve and write atomically.
pub(crate) fn resolve_person_ids(conn: &Connection, ids: &[PersonId]) -> RepoResult<Vec<PersonId>> {
    let unique: BTreeSet<PersonId> = ids.iter().copied().collect();
    let mut stmt = conn.prepare("SELECT EXISTS(SELECT 1 FROM roster_person WHERE id = ?1);")?;
    for id in &unique {
        let exists: i64 = stmt.query_row([id], |row| row.get(0))?;
        if exists != 1 {
            return Err(RepoError::NotFound(EntityRef::Person(*id)));
        }
    }
    Ok(unique.into_iter().collect())
}

fn parse_person_row(row: &Row<'_>) -> rusqlite::Result<Person> {
    Ok(Person {
        id: row.get("id")?,
        name: row.get("name")?,
        age: row.get("age")?,
    })
}
