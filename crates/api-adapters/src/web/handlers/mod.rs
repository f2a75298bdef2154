//! Route handlers, one module per resource.

pub mod community;
pub mod governance;
pub mod knowledge;
pub mod system;
pub mod users;
pub mod warnings;

use domains::{ContentKind, Page};
use services::ServiceError;

use super::error::ApiError;

type ApiResult<T> = Result<T, ApiError>;

/// `skip` defaults to 0 and `limit` to [`Page::DEFAULT_LIMIT`].
fn page(skip: Option<i64>, limit: Option<i64>) -> ApiResult<Page> {
    let page = Page::new(skip.unwrap_or(0), limit.unwrap_or(Page::DEFAULT_LIMIT)).map_err(ServiceError::from)?;
    Ok(page)
}

fn content_kind(raw: &str) -> ApiResult<ContentKind> {
    let kind = raw.parse::<ContentKind>().map_err(ServiceError::from)?;
    Ok(kind)
}
