//! Field reports. Any user files them; owners and admins change them.

use axum::extract::State;
use axum::Json;
use domains::GovernanceRecord;

use super::{page, ApiResult};
use crate::dto::{GovernanceCreateRequest, GovernanceUpdateRequest, MessageResponse, PageQuery};
use crate::web::extract::{Authorized, CurrentUser, ExpertOrAdmin, PathId, QueryParams, ValidJson};
use crate::web::state::AppState;

pub async fn create(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ValidJson(req): ValidJson<GovernanceCreateRequest>,
) -> ApiResult<Json<GovernanceRecord>> {
    let record = state.governance.create(&user, req.into()).await?;
    Ok(Json(record))
}

pub async fn list_mine(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    QueryParams(q): QueryParams<PageQuery>,
) -> ApiResult<Json<Vec<GovernanceRecord>>> {
    let records = state.governance.list_mine(&user, page(q.skip, q.limit)?).await?;
    Ok(Json(records))
}

pub async fn list_all(
    State(state): State<AppState>,
    _: Authorized<ExpertOrAdmin>,
    QueryParams(q): QueryParams<PageQuery>,
) -> ApiResult<Json<Vec<GovernanceRecord>>> {
    let records = state.governance.list_all(page(q.skip, q.limit)?).await?;
    Ok(Json(records))
}

pub async fn get(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    PathId(id): PathId,
) -> ApiResult<Json<GovernanceRecord>> {
    Ok(Json(state.governance.get(&user, id).await?))
}

pub async fn update(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    PathId(id): PathId,
    ValidJson(req): ValidJson<GovernanceUpdateRequest>,
) -> ApiResult<Json<GovernanceRecord>> {
    Ok(Json(state.governance.update(&user, id, req.into()).await?))
}

pub async fn delete(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    PathId(id): PathId,
) -> ApiResult<Json<MessageResponse>> {
    state.governance.delete(&user, id).await?;
    Ok(Json(MessageResponse::new("governance record deleted")))
}
