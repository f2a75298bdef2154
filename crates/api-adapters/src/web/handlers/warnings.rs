use axum::extract::State;
use axum::Json;
use domains::WarningMessage;

use super::{page, ApiResult};
use crate::dto::{MessageResponse, PageQuery, WarningCreateRequest};
use crate::web::extract::{Authorized, CurrentUser, ExpertOrAdmin, PathId, QueryParams, ValidJson};
use crate::web::state::AppState;

/// Stores the warning; the email broadcast runs after the response.
pub async fn publish(
    State(state): State<AppState>,
    Authorized(user, _): Authorized<ExpertOrAdmin>,
    ValidJson(req): ValidJson<WarningCreateRequest>,
) -> ApiResult<Json<WarningMessage>> {
    Ok(Json(state.warnings.publish(&user, req.into()).await?))
}

pub async fn list_active(
    State(state): State<AppState>,
    _: CurrentUser,
    QueryParams(q): QueryParams<PageQuery>,
) -> ApiResult<Json<Vec<WarningMessage>>> {
    Ok(Json(state.warnings.list_active(page(q.skip, q.limit)?).await?))
}

pub async fn delete(
    State(state): State<AppState>,
    Authorized(user, _): Authorized<ExpertOrAdmin>,
    PathId(id): PathId,
) -> ApiResult<Json<MessageResponse>> {
    state.warnings.delete(&user, id).await?;
    Ok(Json(MessageResponse::new("warning deleted")))
}
