//! Group repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist groups and own the `roster_group_persons` join table.
//! - Resolve requested person ids and mutate membership in one transaction.
//!
//! # Invariants
//! - Member lists are ordered by ascending person id.
//! - Adding a present member or removing an absent one changes nothing.
//! - A membership action with any unknown person id writes nothing.

use crate::model::group::{Group, GroupId};
use crate::model::person::PersonId;
use crate::repo::person_repo::resolve_person_ids;
use crate::repo::{ensure_connection_ready, EntityRef, RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Transaction, TransactionBehavior};
use std::collections::BTreeMap;

/// Repository interface for groups and their membership relation.
pub trait GroupRepository {
    /// Inserts one group with its initial members and returns its id.
    fn create_group(&mut self, name: &str, members: &[PersonId]) -> RepoResult<GroupId>;
    fn get_group(&self, id: GroupId) -> RepoResult<Option<Group>>;
    fn list_groups(&self) -> RepoResult<Vec<Group>>;
    fn rename_group(&self, id: GroupId, name: &str) -> RepoResult<()>;
    /// Deletes the group and its membership rows; member persons stay.
    fn delete_group(&self, id: GroupId) -> RepoResult<()>;
    fn list_members(&self, id: GroupId) -> RepoResult<Vec<PersonId>>;
    fn add_members(&mut self, id: GroupId, person_ids: &[PersonId]) -> RepoResult<()>;
    fn remove_members(&mut self, id: GroupId, person_ids: &[PersonId]) -> RepoResult<()>;
}

/// SQLite-backed group repository.
pub struct SqliteGroupRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteGroupRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        ensure_connection_ready(
            conn,
            &["roster_person", "roster_group", "roster_group_persons"],
        )?;
        Ok(Self { conn })
    }

    fn begin(&mut self) -> RepoResult<Transaction<'_>> {
        Ok(self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?)
    }
}

impl GroupRepository for SqliteGroupRepository<'_> {
    fn create_group(&mut self, name: &str, members: &[PersonId]) -> RepoResult<GroupId> {
        let tx = self.begin()?;
        let resolved = resolve_person_ids(&tx, members)?;
        tx.execute("INSERT INTO roster_group (name) VALUES (?1);", [name])?;
        let group_id = tx.last_insert_rowid();
        insert_members(&tx, group_id, &resolved)?;
        tx.commit()?;
        Ok(group_id)
    }

    fn get_group(&self, id: GroupId) -> RepoResult<Option<Group>> {
        let name: Option<String> = self
            .conn
            .query_row(
                "SELECT name FROM roster_group WHERE id = ?1;",
                [id],
                |row| row.get(0),
            )
            .optional()?;

        match name {
            Some(name) => Ok(Some(Group {
                id,
                name,
                persons: load_members(self.conn, id)?,
            })),
            None => Ok(None),
        }
    }

    fn list_groups(&self) -> RepoResult<Vec<Group>> {
        let mut members = load_all_members(self.conn)?;
        let mut stmt = self
            .conn
            .prepare("SELECT id, name FROM roster_group ORDER BY id ASC;")?;
        let mut rows = stmt.query([])?;
        let mut groups = Vec::new();
        while let Some(row) = rows.next()? {
            let id: GroupId = row.get("id")?;
            groups.push(Group {
                id,
                name: row.get("name")?,
                persons: members.remove(&id).unwrap_or_default(),
            });
        }
        Ok(groups)
    }

    fn rename_group(&self, id: GroupId, name: &str) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE roster_group SET name = ?1 WHERE id = ?2;",
            params![name, id],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(EntityRef::Group(id)));
        }
        Ok(())
    }

    fn delete_group(&self, id: GroupId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM roster_group WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound(EntityRef::Group(id)));
        }
        Ok(())
    }

    fn list_members(&self, id: GroupId) -> RepoResult<Vec<PersonId>> {
        ensure_group_exists(self.conn, id)?;
        load_members(self.conn, id)
    }

    fn add_members(&mut self, id: GroupId, person_ids: &[PersonId]) -> RepoResult<()> {
        let tx = self.begin()?;
        ensure_group_exists(&tx, id)?;
        let resolved = resolve_person_ids(&tx, person_ids)?;
        insert_members(&tx, id, &resolved)?;
        tx.commit()?;
        Ok(())
    }

    fn remove_members(&mut self, id: GroupId, person_ids: &[PersonId]) -> RepoResult<()> {
        let tx = self.begin()?;
        ensure_group_exists(&tx, id)?;
        let resolved = resolve_person_ids(&tx, person_ids)?;
        {
            let mut stmt = tx.prepare(
                "DELETE FROM roster_group_persons
                 WHERE group_id = ?1
                   AND person_id = ?2;",
            )?;
            for person_id in &resolved {
                stmt.execute(params![id, person_id])?;
            }
        }
        tx.commit()?;
        Ok(())
    }
}

fn insert_members(conn: &Connection, group_id: GroupId, person_ids: &[PersonId]) -> RepoResult<()> {
    let mut stmt = conn.prepare(
        "INSERT OR IGNORE INTO roster_group_persons (group_id, person_id)
         VALUES (?1, ?2);",
    )?;
    for person_id in person_ids {
        stmt.execute(params![group_id, person_id])?;
    }
    Ok(())
}

fn ensure_group_exists(conn: &Connection, id: GroupId) -> RepoResult<()> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM roster_group WHERE id = ?1);",
        [id],
        |row| row.get(0),
    )?;
    if exists != 1 {
        return Err(RepoError::NotFound(EntityRef::Group(id)));
    }
    Ok(())
}

fn load_members(conn: &Connection, group_id: GroupId) -> RepoResult<Vec<PersonId>> {
    let mut stmt = conn.prepare(
        "SELECT person_id
         FROM roster_group_persons
         WHERE group_id = ?1
         ORDER BY person_id ASC;",
    )?;
    let rows = stmt.query_map([group_id], |row| row.get(0))?;
    let members = rows.collect::<Result<Vec<PersonId>, _>>()?;
    Ok(members)
}

fn load_all_members(conn: &Connection) -> RepoResult<BTreeMap<GroupId, Vec<PersonId>>> {
    let mut stmt = conn.prepare(
        "SELECT group_id, person_id
         FROM roster_group_persons
         ORDER BY group_id ASC, person_id ASC;",
    )?;
    let mut rows = stmt.query([])?;
    let mut members: BTreeMap<GroupId, Vec<PersonId>> = BTreeMap::new();
    while let Some(row) = rows.next()? {
        members
            .entry(row.get("group_id")?)
            .or_default()
            .push(row.get("person_id")?);
    }
    Ok(members)
}
