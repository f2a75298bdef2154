//! The pest knowledge base and its prevention schemes.

use axum::extract::State;
use axum::Json;
use domains::{PestInfo, PreventionScheme};

use super::{page, ApiResult};
use crate::dto::{MessageResponse, PageQuery, PestCreateRequest, PestUpdateRequest, SchemeCreateRequest};
use crate::web::extract::{AdminOnly, Authorized, CurrentUser, ExpertOrAdmin, PathId, QueryParams, ValidJson};
use crate::web::state::AppState;

pub async fn create_pest(
    State(state): State<AppState>,
    _: Authorized<ExpertOrAdmin>,
    ValidJson(req): ValidJson<PestCreateRequest>,
) -> ApiResult<Json<PestInfo>> {
    Ok(Json(state.knowledge.create_pest(req.into()).await?))
}

pub async fn list_pests(
    State(state): State<AppState>,
    _: CurrentUser,
    QueryParams(q): QueryParams<PageQuery>,
) -> ApiResult<Json<Vec<PestInfo>>> {
    Ok(Json(state.knowledge.list_pests(page(q.skip, q.limit)?).await?))
}

pub async fn get_pest(
    State(state): State<AppState>,
    _: CurrentUser,
    PathId(id): PathId,
) -> ApiResult<Json<PestInfo>> {
    Ok(Json(state.knowledge.get_pest(id).await?))
}

pub async fn update_pest(
    State(state): State<AppState>,
    _: Authorized<ExpertOrAdmin>,
    PathId(id): PathId,
    ValidJson(req): ValidJson<PestUpdateRequest>,
) -> ApiResult<Json<PestInfo>> {
    Ok(Json(state.knowledge.update_pest(id, req.into()).await?))
}

pub async fn delete_pest(
    State(state): State<AppState>,
    _: Authorized<AdminOnly>,
    PathId(id): PathId,
) -> ApiResult<Json<MessageResponse>> {
    state.knowledge.delete_pest(id).await?;
    Ok(Json(MessageResponse::new("pest entry deleted")))
}

pub async fn add_scheme(
    State(state): State<AppState>,
    _: Authorized<ExpertOrAdmin>,
    PathId(pest_id): PathId,
    ValidJson(req): ValidJson<SchemeCreateRequest>,
) -> ApiResult<Json<PreventionScheme>> {
    Ok(Json(state.knowledge.add_scheme(pest_id, req.into()).await?))
}

pub async fn delete_scheme(
    State(state): State<AppState>,
    _: Authorized<AdminOnly>,
    PathId(id): PathId,
) -> ApiResult<Json<MessageResponse>> {
    state.knowledge.delete_scheme(id).await?;
    Ok(Json(MessageResponse::new("prevention scheme deleted")))
}
