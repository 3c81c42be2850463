//! `/groups/` handlers, including the membership actions.

use super::{parse_body, parse_id};
use crate::error::ApiError;
use crate::state::AppState;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use roster_core::{Group, GroupService, MembershipUpdate, SqliteGroupRepository};
use rusqlite::Connection;

fn service(conn: &mut Connection) -> Result<GroupService<SqliteGroupRepository<'_>>, ApiError> {
    Ok(GroupService::new(SqliteGroupRepository::try_new(conn)?))
}

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Group>>, ApiError> {
    let groups = state.with_conn(|conn| Ok(service(conn)?.list()?))?;
    Ok(Json(groups))
}

pub async fn create(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<Group>), ApiError> {
    let fields = parse_body(&body)?;
    let group = state.with_conn(|conn| Ok(service(conn)?.create(&fields)?))?;
    Ok((StatusCode::CREATED, Json(group)))
}

pub async fn retrieve(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<Group>, ApiError> {
    let id = parse_id(&raw_id)?;
    let group = state.with_conn(|conn| Ok(service(conn)?.retrieve(id)?))?;
    Ok(Json(group))
}

pub async fn update(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    body: Bytes,
) -> Result<Json<Group>, ApiError> {
    let id = parse_id(&raw_id)?;
    let fields = parse_body(&body)?;
    let group = state.with_conn(|conn| Ok(service(conn)?.update(id, &fields)?))?;
    Ok(Json(group))
}

pub async fn partial_update(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    body: Bytes,
) -> Result<Json<Group>, ApiError> {
    let id = parse_id(&raw_id)?;
    let fields = parse_body(&body)?;
    let group = state.with_conn(|conn| Ok(service(conn)?.partial_update(id, &fields)?))?;
    Ok(Json(group))
}

pub async fn destroy(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&raw_id)?;
    state.with_conn(|conn| Ok(service(conn)?.delete(id)?))?;
    Ok(StatusCode::NO_CONTENT)
}

/// `PATCH /groups/{id}/add_persons/` with `{"persons": [ids]}`.
pub async fn add_persons(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    body: Bytes,
) -> Result<Json<MembershipUpdate>, ApiError> {
    let id = parse_id(&raw_id)?;
    let fields = parse_body(&body)?;
    let update = state.with_conn(|conn| Ok(service(conn)?.add_persons(id, &fields)?))?;
    Ok(Json(update))
}

/// `DELETE /groups/{id}/remove_persons/` with `{"persons": [ids]}`.
pub async fn remove_persons(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    body: Bytes,
) -> Result<Json<MembershipUpdate>, ApiError> {
    let id = parse_id(&raw_id)?;
    let fields = parse_body(&body)?;
    let update = state.with_conn(|conn| Ok(service(conn)?.remove_persons(id, &fields)?))?;
    Ok(Json(update))
}
