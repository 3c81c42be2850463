use roster_core::db::open_db_in_memory;
use roster_core::serializer::{fields_from_value, PersonFields};
use roster_core::{
    EntityRef, Fields, GroupRepository, GroupService, PersonId, PersonRepository, ServiceError,
    SqliteGroupRepository, SqlitePersonRepository,
};
use rusqlite::Connection;
use serde_json::{json, Value};

fn body(value: Value) -> Fields {
    fields_from_value(value).unwrap()
}

fn seed_persons(conn: &Connection, people: &[(&str, i64)]) -> Vec<PersonId> {
    let repo = SqlitePersonRepository::try_new(conn).unwrap();
    people
        .iter()
        .map(|(name, age)| {
            repo.create_person(&PersonFields {
                name: name.to_string(),
                age: *age,
            })
            .unwrap()
        })
        .collect()
}

#[test]
fn created_group_starts_empty_and_serializes_member_ids() {
    let mut conn = open_db_in_memory().unwrap();
    let ids = seed_persons(&conn, &[("John Doe", 36), ("Dohn Joe", 37)]);
    let mut service = GroupService::new(SqliteGroupRepository::try_new(&mut conn).unwrap());

    let group = service.create(&body(json!({"name": "Group1"}))).unwrap();
    assert!(group.persons.is_empty());

    let updated = service
        .add_persons(group.id, &body(json!({"persons": ids})))
        .unwrap();
    assert_eq!(
        serde_json::to_value(&updated).unwrap(),
        json!({"update": {"id": group.id, "name": "Group1", "persons": ids}})
    );
    assert_eq!(service.retrieve(group.id).unwrap(), updated.update);
}

#[test]
fn create_with_unknown_initial_member_is_validation_error() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = GroupService::new(SqliteGroupRepository::try_new(&mut conn).unwrap());

    let err = service
        .create(&body(json!({"name": "Group1", "persons": [42]})))
        .unwrap_err();
    match err {
        ServiceError::Validation(errors) => assert_eq!(
            errors.field("persons"),
            Some(&["Invalid pk \"42\" - object does not exist.".to_string()][..])
        ),
        other => panic!("unexpected error: {other}"),
    }
    assert!(service.list().unwrap().is_empty());
}

#[test]
fn add_persons_is_idempotent_and_sorted() {
    let mut conn = open_db_in_memory().unwrap();
    let ids = seed_persons(&conn, &[("A", 1), ("B", 2), ("C", 3)]);
    let mut service = GroupService::new(SqliteGroupRepository::try_new(&mut conn).unwrap());
    let group = service
        .create(&body(json!({"name": "Group1", "persons": [ids[1], ids[2]]})))
        .unwrap();

    let first = service
        .add_persons(group.id, &body(json!({"persons": [ids[0]]})))
        .unwrap();
    assert_eq!(first.update.persons, ids);

    let again = service
        .add_persons(group.id, &body(json!({"persons": [ids[0], ids[1]]})))
        .unwrap();
    assert_eq!(again.update.persons, ids);
}

#[test]
fn remove_persons_is_idempotent() {
    let mut conn = open_db_in_memory().unwrap();
    let ids = seed_persons(&conn, &[("A", 1), ("B", 2), ("C", 3)]);
    let mut service = GroupService::new(SqliteGroupRepository::try_new(&mut conn).unwrap());
    let group = service
        .create(&body(json!({"name": "Group1", "persons": ids})))
        .unwrap();

    let removed = service
        .remove_persons(group.id, &body(json!({"persons": [ids[0]]})))
        .unwrap();
    assert_eq!(removed.update.persons, vec![ids[1], ids[2]]);

    let again = service
        .remove_persons(group.id, &body(json!({"persons": [ids[0]]})))
        .unwrap();
    assert_eq!(again.update.persons, vec![ids[1], ids[2]]);
}

#[test]
fn membership_action_with_unknown_person_writes_nothing() {
    let mut conn = open_db_in_memory().unwrap();
    let ids = seed_persons(&conn, &[("A", 1), ("B", 2)]);
    let mut service = GroupService::new(SqliteGroupRepository::try_new(&mut conn).unwrap());
    let group = service.create(&body(json!({"name": "Group1"}))).unwrap();

    let err = service
        .add_persons(group.id, &body(json!({"persons": [ids[0], 999, ids[1]]})))
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(EntityRef::Person(999))));
    assert!(service.retrieve(group.id).unwrap().persons.is_empty());
}

#[test]
fn membership_action_on_missing_group_is_not_found() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = GroupService::new(SqliteGroupRepository::try_new(&mut conn).unwrap());

    let err = service
        .remove_persons(5, &body(json!({"persons": [1]})))
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(EntityRef::Group(5))));
}

#[test]
fn membership_action_requires_persons_list() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = GroupService::new(SqliteGroupRepository::try_new(&mut conn).unwrap());
    let group = service.create(&body(json!({"name": "Group1"}))).unwrap();

    let err = service.add_persons(group.id, &body(json!({}))).unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));
}

#[test]
fn update_paths_rename_without_touching_members() {
    let mut conn = open_db_in_memory().unwrap();
    let ids = seed_persons(&conn, &[("John Doe", 36), ("Dohn Joe", 63)]);
    let mut service = GroupService::new(SqliteGroupRepository::try_new(&mut conn).unwrap());
    let group = service
        .create(&body(json!({"name": "Group1", "persons": ids})))
        .unwrap();

    let patched = service
        .partial_update(
            group.id,
            &body(json!({"name": "GroupOfDohnsAndJohns", "persons": []})),
        )
        .unwrap();
    assert_eq!(patched.name, "GroupOfDohnsAndJohns");
    assert_eq!(patched.persons, ids);

    let unchanged = service.partial_update(group.id, &body(json!({}))).unwrap();
    assert_eq!(unchanged, patched);

    let renamed = service
        .update(group.id, &body(json!({"name": "Group2"})))
        .unwrap();
    assert_eq!(renamed.name, "Group2");
    assert_eq!(renamed.persons, ids);
}

#[test]
fn deleting_person_removes_it_from_every_group() {
    let mut conn = open_db_in_memory().unwrap();
    let ids = seed_persons(&conn, &[("John Doe", 36), ("Dohn Joe", 37)]);
    let (first, second) = {
        let mut repo = SqliteGroupRepository::try_new(&mut conn).unwrap();
        let first = repo.create_group("Group1", &[ids[0]]).unwrap();
        let second = repo.create_group("Group2", &ids).unwrap();
        (first, second)
    };

    SqlitePersonRepository::try_new(&conn)
        .unwrap()
        .delete_person(ids[0])
        .unwrap();

    let repo = SqliteGroupRepository::try_new(&mut conn).unwrap();
    assert!(repo.list_members(first).unwrap().is_empty());
    assert_eq!(repo.list_members(second).unwrap(), vec![ids[1]]);
}

#[test]
fn deleting_group_keeps_member_persons() {
    let mut conn = open_db_in_memory().unwrap();
    let ids = seed_persons(&conn, &[("John Doe", 36)]);
    {
        let mut service = GroupService::new(SqliteGroupRepository::try_new(&mut conn).unwrap());
        let group = service
            .create(&body(json!({"name": "Group1", "persons": ids})))
            .unwrap();
        service.delete(group.id).unwrap();

        let err = service.delete(group.id).unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(EntityRef::Group(_))));
        let err = service.retrieve(group.id).unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(EntityRef::Group(_))));
    }

    let persons = SqlitePersonRepository::try_new(&conn)
        .unwrap()
        .list_persons()
        .unwrap();
    assert_eq!(persons.len(), 1);
    let links: i64 = conn
        .query_row("SELECT COUNT(*) FROM roster_group_persons;", [], |row| {
            row.get(0)
        })
        .unwrap();
    assert_eq!(links, 0);
}

#[test]
fn list_groups_serializes_each_membership() {
    let mut conn = open_db_in_memory().unwrap();
    let ids = seed_persons(&conn, &[("Dohn Doe", 36), ("John Joe", 37)]);
    let mut repo = SqliteGroupRepository::try_new(&mut conn).unwrap();
    let g1 = repo.create_group("Group1", &[ids[0]]).unwrap();
    let g2 = repo.create_group("Group2", &[ids[1]]).unwrap();
    let g3 = repo.create_group("Empty", &[]).unwrap();

    let listed = serde_json::to_value(repo.list_groups().unwrap()).unwrap();
    assert_eq!(
        listed,
        json!([
            {"id": g1, "name": "Group1", "persons": [ids[0]]},
            {"id": g2, "name": "Group2", "persons": [ids[1]]},
            {"id": g3, "name": "Empty", "persons": []}
        ])
    );
}
