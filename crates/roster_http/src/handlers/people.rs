//! `/people/` handlers.

use super::{parse_body, parse_id};
use crate::error::ApiError;
use crate::state::AppState;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use roster_core::{Person, PersonService, SqlitePersonRepository};
use rusqlite::Connection;

fn service(conn: &Connection) -> Result<PersonService<SqlitePersonRepository<'_>>, ApiError> {
    Ok(PersonService::new(SqlitePersonRepository::try_new(conn)?))
}

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Person>>, ApiError> {
    let persons = state.with_conn(|conn| Ok(service(conn)?.list()?))?;
    Ok(Json(persons))
}

pub async fn create(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<Person>), ApiError> {
    let fields = parse_body(&body)?;
    let person = state.with_conn(|conn| Ok(service(conn)?.create(&fields)?))?;
    Ok((StatusCode::CREATED, Json(person)))
}

pub async fn retrieve(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<Person>, ApiError> {
    let id = parse_id(&raw_id)?;
    let person = state.with_conn(|conn| Ok(service(conn)?.retrieve(id)?))?;
    Ok(Json(person))
}

pub async fn update(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    body: Bytes,
) -> Result<Json<Person>, ApiError> {
    let id = parse_id(&raw_id)?;
    let fields = parse_body(&body)?;
    let person = state.with_conn(|conn| Ok(service(conn)?.update(id, &fields)?))?;
    Ok(Json(person))
}

pub async fn partial_update(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    body: Bytes,
) -> Result<Json<Person>, ApiError> {
    let id = parse_id(&raw_id)?;
    let fields = parse_body(&body)?;
    let person = state.with_conn(|conn| Ok(service(conn)?.partial_update(id, &fields)?))?;
    Ok(Json(person))
}

pub async fn destroy(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&raw_id)?;
    state.with_conn(|conn| Ok(service(conn)?.delete(id)?))?;
    Ok(StatusCode::NO_CONTENT)
}
