//! Couple details for the site footer.

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use wedding_db::repositories::SettingRepo;

use crate::error::AppResult;
use crate::response::ApiResponse;
use crate::state::AppState;

const SETTING_KEYS: &[&str] = &["groom_name", "bride_name", "wedding_date", "contact_email"];

#[derive(Debug, Serialize)]
pub struct CoupleInfo {
    pub groom_name: String,
    pub bride_name: String,
    pub wedding_date: String,
    pub contact_email: String,
}

/// GET /api/couple/info
///
/// Values come from `settings`; unset keys fall back to the configured
/// defaults.
pub async fn info(State(state): State<AppState>) -> AppResult<Json<ApiResponse<CoupleInfo>>> {
    let stored = SettingRepo::get_many(&state.pool, SETTING_KEYS).await?;
    let value = |key: &str| {
        stored
            .iter()
            .find(|s| s.key == key)
            .map(|s| s.value.clone())
    };

    let defaults = &state.config.couple_defaults;
    Ok(Json(ApiResponse::ok(CoupleInfo {
        groom_name: value("groom_name").unwrap_or_else(|| defaults.groom_name.clone()),
        bride_name: value("bride_name").unwrap_or_else(|| defaults.bride_name.clone()),
        wedding_date: value("wedding_date").unwrap_or_default(),
        contact_email: value("contact_email").unwrap_or_else(|| defaults.contact_email.clone()),
    })))
}
