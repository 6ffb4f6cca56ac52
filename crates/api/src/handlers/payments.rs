//! Bank transfer accounts and the gift-section message.
//!
//! Accounts live in the `payment` section of the site document; every write
//! takes a backup and rewrites that section.

use axum::body::Bytes;
use axum::extract::{FromRequest, Multipart, Path, Request, State};
use axum::http::header;
use axum::Json;
use serde::{Deserialize, Serialize};
use wedding_core::error::CoreError;
use wedding_core::payments::{self, PaymentAccount, PaymentDraft, PaymentSection};
use wedding_core::site_data::SECTION_PAYMENT;
use wedding_core::types::DbId;
use wedding_core::uploads::{self, validate_image_extension};

use crate::error::{AppError, AppResult};
use crate::handlers::{json_body, read_form, unix_secs, Form, UploadedFile};
use crate::response::ApiResponse;
use crate::services::{backup, document, files};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct GlobalMessage {
    pub message: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct GlobalMessageRequest {
    #[serde(default)]
    pub message: String,
}

/// What the public gift section renders.
#[derive(Debug, Serialize)]
pub struct FrontendPayments {
    pub global_message: String,
    pub payments: Vec<PaymentAccount>,
}

/// A QR image uploaded with the form, named but not yet written.
struct PendingQr {
    filename: String,
    url: String,
    bytes: Vec<u8>,
    ext: String,
}

impl PendingQr {
    fn from_upload(file: UploadedFile) -> AppResult<Self> {
        let ext = validate_image_extension(&file.filename)?;
        let filename = uploads::qr_filename(&ext, unix_secs());
        Ok(Self {
            url: uploads::absolute_url("qr", &filename),
            filename,
            bytes: file.bytes,
            ext,
        })
    }

    async fn write(self, state: &AppState) -> AppResult<()> {
        let bytes = files::optimize(self.bytes, &self.ext).await?;
        files::write_image(&state.config.images_root(), "qr", &self.filename, &bytes).await?;
        tracing::info!(filename = %self.filename, "Payment QR stored");
        Ok(())
    }
}

/// Read the account fields of a multipart form. Text fields that are
/// absent stay `None` so updates keep the stored value.
fn draft_from_form(form: &Form) -> AppResult<PaymentDraft> {
    let text = |name: &str| form.field(name).map(str::to_string);
    let sort_order = match form.field("sort_order").map(str::trim) {
        None | Some("") => None,
        Some(raw) => Some(
            raw.parse::<i64>()
                .map_err(|_| AppError::BadRequest(format!("Invalid sort_order: {raw}")))?,
        ),
    };

    Ok(PaymentDraft {
        recipient_name: text("recipient_name"),
        bank_name: text("bank_name"),
        account_number: text("account_number"),
        title: text("title"),
        description: text("description"),
        qr_code_url: text("qr_code_url"),
        is_active: form
            .field("is_active")
            .map(|v| v.trim().eq_ignore_ascii_case("true")),
        sort_order,
    })
}

/// Accept the account either as JSON or as a multipart form carrying an
/// optional `qr_code_file`.
async fn read_payment_request(
    state: &AppState,
    request: Request,
) -> AppResult<(PaymentDraft, Option<PendingQr>)> {
    let is_multipart = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("multipart/form-data"));

    if is_multipart {
        let multipart = Multipart::from_request(request, state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        let mut form = read_form(multipart, state.config.max_upload_bytes).await?;
        let draft = draft_from_form(&form)?;
        let qr = form
            .take_file("qr_code_file")
            .map(PendingQr::from_upload)
            .transpose()?;
        Ok((draft, qr))
    } else {
        let body = Bytes::from_request(request, state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        Ok((json_body(&body)?, None))
    }
}

async fn load_section(state: &AppState) -> AppResult<PaymentSection> {
    let doc = document::load(&state.pool).await?;
    Ok(PaymentSection::from_value(doc.get(SECTION_PAYMENT)))
}

async fn store_section(state: &AppState, section: &PaymentSection) -> AppResult<()> {
    document::save_section(&state.pool, SECTION_PAYMENT, section.to_value()).await
}

/// Delete the file behind an uploaded QR url. Default images are left alone.
async fn remove_uploaded_qr(state: &AppState, url: &str) {
    let Some(filename) = payments::uploaded_qr_filename(url) else {
        return;
    };
    let path = state.config.images_root().join("qr").join(filename);
    match files::remove_if_exists(&path).await {
        Ok(true) => tracing::info!(filename, "Old payment QR removed"),
        Ok(false) => {}
        Err(e) => tracing::warn!(filename, error = %e, "Failed to remove payment QR"),
    }
}

fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// GET /api/payment/list
pub async fn list(State(state): State<AppState>) -> AppResult<Json<ApiResponse<Vec<PaymentAccount>>>> {
    let section = load_section(&state).await?;
    Ok(Json(ApiResponse::ok(payments::sorted(&section.payments))))
}

/// POST /api/payment
pub async fn create(
    State(state): State<AppState>,
    request: Request,
) -> AppResult<Json<ApiResponse<PaymentAccount>>> {
    let (draft, qr) = read_payment_request(&state, request).await?;

    let _guard = state.write_lock.lock().await;
    let mut section = load_section(&state).await?;
    let account = payments::create_account(
        &section,
        draft,
        qr.as_ref().map(|q| q.url.clone()),
        &now_rfc3339(),
    )?;

    backup::before_write(&state, "create payment").await;
    if let Some(qr) = qr {
        qr.write(&state).await?;
    }
    section.payments.push(account.clone());
    store_section(&state, &section).await?;

    tracing::info!(payment_id = account.id, bank = %account.bank_name, "Payment account created");
    Ok(Json(ApiResponse::with_message(
        "Payment account created",
        account,
    )))
}

/// PUT /api/payment/{id}
///
/// A newly uploaded QR replaces and deletes the previous uploaded one.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    request: Request,
) -> AppResult<Json<ApiResponse<PaymentAccount>>> {
    let (draft, qr) = read_payment_request(&state, request).await?;

    let _guard = state.write_lock.lock().await;
    let mut section = load_section(&state).await?;
    let index = section
        .payments
        .iter()
        .position(|p| p.id == id)
        .ok_or_else(|| CoreError::not_found("Payment", id))?;

    backup::before_write(&state, "update payment").await;
    let previous_qr = section.payments[index].qr_code_url.clone();
    let new_qr_url = qr.as_ref().map(|q| q.url.clone());
    let replaces_qr = qr.is_some();
    if let Some(qr) = qr {
        qr.write(&state).await?;
    }

    let updated = payments::apply_update(&section.payments[index], draft, new_qr_url, &now_rfc3339());
    section.payments[index] = updated.clone();
    store_section(&state, &section).await?;
    if replaces_qr {
        remove_uploaded_qr(&state, &previous_qr).await;
    }

    tracing::info!(payment_id = id, "Payment account updated");
    Ok(Json(ApiResponse::with_message(
        "Payment account updated",
        updated,
    )))
}

/// DELETE /api/payment/{id}
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<ApiResponse<()>>> {
    let _guard = state.write_lock.lock().await;
    let mut section = load_section(&state).await?;
    let index = section
        .payments
        .iter()
        .position(|p| p.id == id)
        .ok_or_else(|| CoreError::not_found("Payment", id))?;

    backup::before_write(&state, "delete payment").await;
    let removed = section.payments.remove(index);
    store_section(&state, &section).await?;
    remove_uploaded_qr(&state, &removed.qr_code_url).await;

    tracing::info!(payment_id = id, "Payment account deleted");
    Ok(Json(ApiResponse::message("Payment account deleted")))
}

/// GET /api/payment/global-message
pub async fn get_global_message(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<GlobalMessage>>> {
    let section = load_section(&state).await?;
    Ok(Json(ApiResponse::ok(GlobalMessage {
        message: section.global_message,
    })))
}

/// POST /api/payment/global-message
pub async fn save_global_message(
    State(state): State<AppState>,
    body: Bytes,
) -> AppResult<Json<ApiResponse<()>>> {
    let input: GlobalMessageRequest = json_body(&body)?;

    let _guard = state.write_lock.lock().await;
    backup::before_write(&state, "save payment message").await;
    let mut section = load_section(&state).await?;
    section.global_message = input.message;
    store_section(&state, &section).await?;

    Ok(Json(ApiResponse::message("Global message saved")))
}

/// GET /api/payment/frontend
pub async fn frontend(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<FrontendPayments>>> {
    let section = load_section(&state).await?;
    Ok(Json(ApiResponse::ok(FrontendPayments {
        payments: payments::frontend_accounts(&section.payments),
        global_message: section.global_message,
    })))
}
