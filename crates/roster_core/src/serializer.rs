//! Input parsing for person/group request bodies.
//!
//! # Responsibility
//! - Turn a raw JSON object into one typed input shape per operation.
//! - Collect field-level errors for every field before failing.
//!
//! # Invariants
//! - `id` is never read from input.
//! - Partial shapes leave absent fields as `None`; `null` is still an error.
//! - Person id lists are deduplicated and sorted ascending.
//!
//! Output shapes are the `Serialize` impls on [`crate::model`] records.

use crate::model::person::{Person, PersonId};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Raw request body after JSON decoding.
pub type Fields = Map<String, Value>;

/// Key used for errors not tied to one field.
pub const NON_FIELD_ERRORS: &str = "non_field_errors";

const REQUIRED: &str = "This field is required.";
const NOT_NULL: &str = "This field may not be null.";
const INVALID_STRING: &str = "Not a valid string.";
const INVALID_INTEGER: &str = "A valid integer is required.";

/// Field name -> error messages, serialized as a flat JSON object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, Vec<String>>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an error set with one message for one field.
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Messages recorded for `field`, if any.
    pub fn field(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    fn finish<T>(self, build: impl FnOnce() -> Option<T>) -> Result<T, ValidationErrors> {
        if !self.is_empty() {
            return Err(self);
        }
        // Every required field parsed when no error was recorded.
        build().ok_or(self)
    }
}

impl Display for ValidationErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid input:")?;
        for (field, messages) in &self.0 {
            write!(f, " {field}: {}", messages.join(" "))?;
        }
        Ok(())
    }
}

impl Error for ValidationErrors {}

/// Requires the decoded body to be a JSON object.
pub fn fields_from_value(value: Value) -> Result<Fields, ValidationErrors> {
    match value {
        Value::Object(fields) => Ok(fields),
        other => Err(ValidationErrors::single(
            NON_FIELD_ERRORS,
            format!(
                "Invalid data. Expected a dictionary, but got {}.",
                json_type_name(&other)
            ),
        )),
    }
}

/// Writable person fields for create and full update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonFields {
    pub name: String,
    pub age: i64,
}

impl PersonFields {
    pub fn from_fields(fields: &Fields) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let name = required(fields, "name", &mut errors, parse_text);
        let age = required(fields, "age", &mut errors, parse_integer);
        errors.finish(|| Some(Self { name: name?, age: age? }))
    }
}

/// Person partial update; absent fields keep their stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonPatch {
    pub name: Option<String>,
    pub age: Option<i64>,
}

impl PersonPatch {
    pub fn from_fields(fields: &Fields) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let name = optional(fields, "name", &mut errors, parse_text);
        let age = optional(fields, "age", &mut errors, parse_integer);
        errors.finish(|| Some(Self { name, age }))
    }

    /// Merges the supplied fields over `current`.
    pub fn apply_to(&self, current: &Person) -> PersonFields {
        PersonFields {
            name: self.name.clone().unwrap_or_else(|| current.name.clone()),
            age: self.age.unwrap_or(current.age),
        }
    }
}

/// Group create input. Initial members are optional.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewGroup {
    pub name: String,
    pub persons: Vec<PersonId>,
}

impl NewGroup {
    pub fn from_fields(fields: &Fields) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let name = required(fields, "name", &mut errors, parse_text);
        let persons = optional(fields, "persons", &mut errors, parse_person_ids);
        errors.finish(|| {
            Some(Self {
                name: name?,
                persons: persons.unwrap_or_default(),
            })
        })
    }
}

/// Group full update. `persons` is not writable through this path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupFields {
    pub name: String,
}

impl GroupFields {
    pub fn from_fields(fields: &Fields) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let name = required(fields, "name", &mut errors, parse_text);
        errors.finish(|| Some(Self { name: name? }))
    }
}

/// Group partial update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupPatch {
    pub name: Option<String>,
}

impl GroupPatch {
    pub fn from_fields(fields: &Fields) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let name = optional(fields, "name", &mut errors, parse_text);
        errors.finish(|| Some(Self { name }))
    }
}

/// Body of `add_persons` / `remove_persons`: `{"persons": [ids]}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MembershipChange {
    pub persons: Vec<PersonId>,
}

impl MembershipChange {
    pub fn from_fields(fields: &Fields) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let persons = required(fields, "persons", &mut errors, parse_person_ids);
        errors.finish(|| Some(Self { persons: persons? }))
    }
}

fn required<T>(
    fields: &Fields,
    name: &str,
    errors: &mut ValidationErrors,
    parse: impl Fn(&Value) -> Result<T, String>,
) -> Option<T> {
    match fields.get(name) {
        Some(value) => parse_present(name, value, errors, parse),
        None => {
            errors.add(name, REQUIRED);
            None
        }
    }
}

fn optional<T>(
    fields: &Fields,
    name: &str,
    errors: &mut ValidationErrors,
    parse: impl Fn(&Value) -> Result<T, String>,
) -> Option<T> {
    fields
        .get(name)
        .and_then(|value| parse_present(name, value, errors, parse))
}

fn parse_present<T>(
    name: &str,
    value: &Value,
    errors: &mut ValidationErrors,
    parse: impl Fn(&Value) -> Result<T, String>,
) -> Option<T> {
    if value.is_null() {
        errors.add(name, NOT_NULL);
        return None;
    }
    match parse(value) {
        Ok(parsed) => Some(parsed),
        Err(message) => {
            errors.add(name, message);
            None
        }
    }
}

fn parse_text(value: &Value) -> Result<String, String> {
    value
        .as_str()
        .map(str::to_owned)
        .ok_or_else(|| INVALID_STRING.to_string())
}

fn parse_integer(value: &Value) -> Result<i64, String> {
    coerce_integer(value).ok_or_else(|| INVALID_INTEGER.to_string())
}

fn parse_person_ids(value: &Value) -> Result<Vec<PersonId>, String> {
    let Value::Array(items) = value else {
        return Err(format!(
            "Expected a list of items but got type \"{}\".",
            json_type_name(value)
        ));
    };

    let mut ids = BTreeSet::new();
    for item in items {
        let id = match item {
            Value::Number(_) | Value::String(_) => coerce_integer(item),
            _ => None,
        };
        match id {
            Some(id) => {
                ids.insert(id);
            }
            None => {
                return Err(format!(
                    "Incorrect type. Expected pk value, received {}.",
                    json_type_name(item)
                ))
            }
        }
    }
    Ok(ids.into_iter().collect())
}

/// Accepts JSON integers, integral floats and strings holding an integer.
fn coerce_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number.as_i64().or_else(|| {
            number
                .as_f64()
                .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64)
                .map(|f| f as i64)
        }),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: Value) -> Fields {
        fields_from_value(value).expect("test body should be an object")
    }

    #[test]
    fn person_fields_require_name_and_age() {
        let errors = PersonFields::from_fields(&fields(json!({}))).unwrap_err();
        assert_eq!(errors.field("name"), Some(&[REQUIRED.to_string()][..]));
        assert_eq!(errors.field("age"), Some(&[REQUIRED.to_string()][..]));
    }

    #[test]
    fn person_fields_ignore_client_id_and_coerce_integer_strings() {
        let parsed =
            PersonFields::from_fields(&fields(json!({"id": 99, "name": "John Doe", "age": "36"})))
                .unwrap();
        assert_eq!(
            parsed,
            PersonFields {
                name: "John Doe".to_string(),
                age: 36
            }
        );
    }

    #[test]
    fn person_fields_report_type_errors_per_field() {
        let errors =
            PersonFields::from_fields(&fields(json!({"name": 5, "age": "old"}))).unwrap_err();
        assert_eq!(errors.field("name"), Some(&[INVALID_STRING.to_string()][..]));
        assert_eq!(errors.field("age"), Some(&[INVALID_INTEGER.to_string()][..]));
    }

    #[test]
    fn person_patch_keeps_absent_fields() {
        let patch = PersonPatch::from_fields(&fields(json!({"name": "Dohn Joe"}))).unwrap();
        let current = Person {
            id: 1,
            name: "John Doe".to_string(),
            age: 36,
        };
        let merged = patch.apply_to(&current);
        assert_eq!(merged.name, "Dohn Joe");
        assert_eq!(merged.age, 36);
    }

    #[test]
    fn person_patch_rejects_null() {
        let errors = PersonPatch::from_fields(&fields(json!({"age": null}))).unwrap_err();
        assert_eq!(errors.field("age"), Some(&[NOT_NULL.to_string()][..]));
    }

    #[test]
    fn integral_float_is_an_integer_but_fraction_is_not() {
        assert_eq!(coerce_integer(&json!(37.0)), Some(37));
        assert_eq!(coerce_integer(&json!(37.5)), None);
        assert_eq!(coerce_integer(&json!(true)), None);
    }

    #[test]
    fn new_group_defaults_to_no_members() {
        let group = NewGroup::from_fields(&fields(json!({"name": "Group1"}))).unwrap();
        assert!(group.persons.is_empty());
    }

    #[test]
    fn group_update_ignores_persons() {
        let update =
            GroupFields::from_fields(&fields(json!({"name": "G", "persons": "junk"}))).unwrap();
        assert_eq!(update.name, "G");
    }

    #[test]
    fn membership_change_dedups_and_sorts() {
        let change =
            MembershipChange::from_fields(&fields(json!({"persons": [3, 1, "3", 2]}))).unwrap();
        assert_eq!(change.persons, vec![1, 2, 3]);
    }

    #[test]
    fn membership_change_rejects_bad_shapes() {
        let missing = MembershipChange::from_fields(&fields(json!({}))).unwrap_err();
        assert_eq!(missing.field("persons"), Some(&[REQUIRED.to_string()][..]));

        let scalar = MembershipChange::from_fields(&fields(json!({"persons": 1}))).unwrap_err();
        assert_eq!(
            scalar.field("persons"),
            Some(&["Expected a list of items but got type \"number\".".to_string()][..])
        );

        let nested =
            MembershipChange::from_fields(&fields(json!({"persons": [{"id": 1}]}))).unwrap_err();
        assert_eq!(
            nested.field("persons"),
            Some(&["Incorrect type. Expected pk value, received object.".to_string()][..])
        );
    }

    #[test]
    fn non_object_body_is_a_non_field_error() {
        let errors = fields_from_value(json!([1, 2])).unwrap_err();
        assert_eq!(
            errors.field(NON_FIELD_ERRORS),
            Some(&["Invalid data. Expected a dictionary, but got array.".to_string()][..])
        );
    }

    #[test]
    fn validation_errors_serialize_as_field_map() {
        let errors = ValidationErrors::single("name", REQUIRED);
        assert_eq!(
            serde_json::to_value(&errors).unwrap(),
            json!({"name": ["This field is required."]})
        );
    }
}
