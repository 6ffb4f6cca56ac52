//! Guest blessings: the public wall and admin moderation.

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap};
use axum::Json;
use serde::Serialize;
use wedding_core::blessings::{self, BlessingSubmission, Page};
use wedding_core::error::CoreError;
use wedding_core::types::{DbId, Timestamp};
use wedding_db::models::blessing::{
    ApproveBlessing, Blessing, BlessingListParams, BlessingStats, LatestBlessingParams,
};
use wedding_db::repositories::blessing_repo::BlessingFilter;
use wedding_db::repositories::BlessingRepo;
use wedding_events::bus::{SiteEvent, BLESSING_RECEIVED};

use crate::error::AppResult;
use crate::handlers::json_body;
use crate::response::ApiResponse;
use crate::state::AppState;

/// A blessing on the public wall.
#[derive(Debug, Serialize)]
pub struct PublicBlessing {
    pub id: DbId,
    pub name: String,
    pub from: String,
    pub content: String,
    pub created_at: Timestamp,
    pub approved: bool,
}

impl From<Blessing> for PublicBlessing {
    fn from(b: Blessing) -> Self {
        Self {
            id: b.id,
            name: b.name,
            from: b.from_person,
            content: b.content,
            created_at: b.created_at,
            approved: b.is_approved,
        }
    }
}

/// A blessing in the admin list.
#[derive(Debug, Serialize)]
pub struct AdminBlessing {
    pub id: DbId,
    pub name: String,
    pub from: String,
    pub content: String,
    pub created_at: Timestamp,
    pub is_approved: bool,
}

impl From<Blessing> for AdminBlessing {
    fn from(b: Blessing) -> Self {
        Self {
            id: b.id,
            name: b.name,
            from: b.from_person,
            content: b.content,
            created_at: b.created_at,
            is_approved: b.is_approved,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SendResponse {
    pub success: bool,
    pub message: String,
    pub blessing_id: DbId,
}

#[derive(Debug, Serialize)]
pub struct Pagination {
    pub page: i64,
    pub per_page: i64,
    pub total: i64,
    pub total_pages: i64,
}

#[derive(Debug, Serialize)]
pub struct AdminListResponse {
    pub success: bool,
    pub data: Vec<AdminBlessing>,
    pub pagination: Pagination,
}

/// POST /api/blessing/send
///
/// Stores the blessing and publishes `blessing.received`; delivery of the
/// notification happens off the request path.
pub async fn send(State(state): State<AppState>, body: Bytes) -> AppResult<Json<SendResponse>> {
    let submission: BlessingSubmission = json_body(&body)?;
    let blessing = submission.validate()?;

    let row = BlessingRepo::create(&state.pool, &blessing.name, &blessing.from, &blessing.content)
        .await?;

    tracing::info!(blessing_id = row.id, name = %row.name, "Blessing received");
    state.event_bus.publish(
        SiteEvent::new(BLESSING_RECEIVED)
            .with_source("blessing", row.id)
            .with_payload(serde_json::json!({
                "name": blessing.name,
                "from": blessing.from,
                "content": blessing.content,
            })),
    );

    Ok(Json(SendResponse {
        success: true,
        message: "Blessing sent successfully!".into(),
        blessing_id: row.id,
    }))
}

/// GET /api/blessing/latest?limit=5
///
/// Pending blessings are included only when the request comes from the
/// admin dashboard (its `Referer` mentions `admin`).
pub async fn latest(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<LatestBlessingParams>,
) -> AppResult<Json<ApiResponse<Vec<PublicBlessing>>>> {
    let referer = headers
        .get(header::REFERER)
        .and_then(|v| v.to_str().ok());
    let include_pending = blessings::is_admin_referer(referer);
    let limit = blessings::latest_limit(params.limit);

    let items = BlessingRepo::latest(&state.pool, limit, include_pending)
        .await?
        .into_iter()
        .map(PublicBlessing::from)
        .collect();
    Ok(Json(ApiResponse::ok(items)))
}

/// GET /api/blessing/admin/list
pub async fn admin_list(
    State(state): State<AppState>,
    Query(params): Query<BlessingListParams>,
) -> AppResult<Json<AdminListResponse>> {
    let page = Page::new(params.page, params.per_page);
    let filter = BlessingFilter {
        search: params.search.as_deref().filter(|s| !s.is_empty()),
        approved: blessings::approved_filter(params.approved.as_deref()),
    };

    let total = BlessingRepo::count_filtered(&state.pool, &filter).await?;
    let data = BlessingRepo::list_filtered(&state.pool, &filter, page.per_page, page.offset())
        .await?
        .into_iter()
        .map(AdminBlessing::from)
        .collect();

    Ok(Json(AdminListResponse {
        success: true,
        data,
        pagination: Pagination {
            page: page.page,
            per_page: page.per_page,
            total,
            total_pages: page.total_pages(total),
        },
    }))
}

/// GET /api/blessing/admin/stats
pub async fn admin_stats(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<BlessingStats>>> {
    let stats = BlessingRepo::stats(&state.pool).await?;
    Ok(Json(ApiResponse::ok(stats)))
}

/// POST /api/blessing/admin/{id}/approve
///
/// Body `{approved}`; approving is the default.
pub async fn approve(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    body: Bytes,
) -> AppResult<Json<ApiResponse<AdminBlessing>>> {
    let input: ApproveBlessing = json_body(&body)?;
    let approved = input.approved.unwrap_or(true);

    let blessing = BlessingRepo::set_approved(&state.pool, id, approved)
        .await?
        .ok_or_else(|| CoreError::not_found("Blessing", id))?;

    tracing::info!(blessing_id = id, approved, "Blessing moderated");
    let message = if approved {
        "Blessing approved"
    } else {
        "Blessing hidden"
    };
    Ok(Json(ApiResponse::with_message(message, blessing.into())))
}

/// DELETE /api/blessing/admin/{id}
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<ApiResponse<()>>> {
    if !BlessingRepo::delete(&state.pool, id).await? {
        return Err(CoreError::not_found("Blessing", id).into());
    }
    tracing::info!(blessing_id = id, "Blessing deleted");
    Ok(Json(ApiResponse::message("Blessing deleted")))
}
