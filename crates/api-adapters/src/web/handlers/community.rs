//! Articles, posts and their moderation.

use axum::extract::State;
use axum::Json;
use domains::{AuditLogFilter, AuditOutcome, ContentKind};

use super::{content_kind, page, ApiResult};
use crate::dto::{
    AuditLogQuery, AuditLogResponse, AuditRequest, AuditResponse, ContentCreateRequest,
    ContentResponse, PageQuery, PendingQuery,
};
use crate::web::extract::{AdminOnly, Authorized, CurrentUser, ExpertOrAdmin, QueryParams, ValidJson};
use crate::web::state::AppState;

fn responses(items: Vec<domains::Content>) -> Vec<ContentResponse> {
    items.into_iter().map(ContentResponse::from).collect()
}

pub async fn create_article(
    State(state): State<AppState>,
    Authorized(user, _): Authorized<ExpertOrAdmin>,
    ValidJson(req): ValidJson<ContentCreateRequest>,
) -> ApiResult<Json<ContentResponse>> {
    let article = state.community.submit(ContentKind::Article, &user, req.into()).await?;
    Ok(Json(article.into()))
}

pub async fn list_articles(
    State(state): State<AppState>,
    _: CurrentUser,
    QueryParams(q): QueryParams<PageQuery>,
) -> ApiResult<Json<Vec<ContentResponse>>> {
    let items = state
        .community
        .list_published(ContentKind::Article, page(q.skip, q.limit)?)
        .await?;
    Ok(Json(responses(items)))
}

pub async fn create_post(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ValidJson(req): ValidJson<ContentCreateRequest>,
) -> ApiResult<Json<ContentResponse>> {
    let post = state.community.submit(ContentKind::Post, &user, req.into()).await?;
    Ok(Json(post.into()))
}

pub async fn list_posts(
    State(state): State<AppState>,
    _: CurrentUser,
    QueryParams(q): QueryParams<PageQuery>,
) -> ApiResult<Json<Vec<ContentResponse>>> {
    let items = state
        .community
        .list_published(ContentKind::Post, page(q.skip, q.limit)?)
        .await?;
    Ok(Json(responses(items)))
}

pub async fn list_pending(
    State(state): State<AppState>,
    _: Authorized<AdminOnly>,
    QueryParams(q): QueryParams<PendingQuery>,
) -> ApiResult<Json<Vec<ContentResponse>>> {
    let kind = content_kind(&q.target_type)?;
    let items = state.community.list_pending(kind, page(q.skip, q.limit)?).await?;
    Ok(Json(responses(items)))
}

pub async fn audit(
    State(state): State<AppState>,
    Authorized(admin, _): Authorized<AdminOnly>,
    ValidJson(req): ValidJson<AuditRequest>,
) -> ApiResult<Json<AuditResponse>> {
    let kind = content_kind(&req.target_type)?;
    let content = state
        .community
        .submit_for_audit(req.target_id, kind, &admin, req.is_approved, req.feedback)
        .await?;
    Ok(Json(AuditResponse::new(AuditOutcome::from_approval(req.is_approved), content.status)))
}

pub async fn audit_logs(
    State(state): State<AppState>,
    _: Authorized<AdminOnly>,
    QueryParams(q): QueryParams<AuditLogQuery>,
) -> ApiResult<Json<Vec<AuditLogResponse>>> {
    let filter = AuditLogFilter {
        target_kind: q.target_type.as_deref().map(content_kind).transpose()?,
        target_id: q.target_id,
    };
    let entries = state.community.audit_trail(filter, page(q.skip, q.limit)?).await?;
    Ok(Json(entries.into_iter().map(AuditLogResponse::from).collect()))
}
