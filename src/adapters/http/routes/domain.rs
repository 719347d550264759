use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, patch, post},
};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::{
    adapters::http::{app_state::AppState, middleware::require_service_token},
    app_error::AppResult,
    domain::entities::{
        dns_record::RequiredDnsRecord, domain_attachment::SecurityFlagsUpdate,
        propagation_report::{PropagationReport, RecordCheck},
    },
    use_cases::domain::DomainAttachmentView,
};

pub fn store_router() -> Router<AppState> {
    Router::new()
        .route(
            "/{store_id}/domain",
            get(get_domain).post(connect_domain).delete(disconnect_domain),
        )
        .route("/{store_id}/domain/verify", post(verify_domain))
        .route("/{store_id}/domain/security", patch(update_security))
}

pub fn public_router() -> Router<AppState> {
    Router::new().route("/check-allowed", get(check_allowed))
}

#[derive(Serialize)]
struct DomainResponse {
    store_id: Uuid,
    domain: Option<String>,
    status: String,
    verification_token: Option<String>,
    verified_at: Option<NaiveDateTime>,
    error_message: Option<String>,
    tls_enabled: bool,
    redirect_https: bool,
    redirect_www: bool,
    last_checked_at: Option<NaiveDateTime>,
    dns_records: Vec<RequiredDnsRecord>,
}

impl From<DomainAttachmentView> for DomainResponse {
    fn from(view: DomainAttachmentView) -> Self {
        Self {
            store_id: view.store_id,
            domain: view.domain_name,
            status: view.status.as_str().to_string(),
            verification_token: view.verification_token,
            verified_at: view.verified_at,
            error_message: view.error_message,
            tls_enabled: view.tls_enabled,
            redirect_https: view.redirect_https,
            redirect_www: view.redirect_www,
            last_checked_at: view.last_checked_at,
            dns_records: view.dns_records,
        }
    }
}

#[derive(Serialize)]
struct ReportResponse {
    propagated: bool,
    a_ok: bool,
    www_ok: bool,
    txt_ok: bool,
    cname_ok: bool,
    checks: Vec<RecordCheck>,
    mismatches: Vec<String>,
    elapsed_ms: u64,
}

impl From<PropagationReport> for ReportResponse {
    fn from(report: PropagationReport) -> Self {
        Self {
            propagated: report.is_propagated(),
            a_ok: report.a_ok,
            www_ok: report.www_ok,
            txt_ok: report.txt_ok,
            cname_ok: report.cname_ok,
            elapsed_ms: u64::try_from(report.elapsed.as_millis()).unwrap_or(u64::MAX),
            checks: report.checks,
            mismatches: report.mismatches,
        }
    }
}

#[derive(Serialize)]
struct VerifyResponse {
    domain: DomainResponse,
    report: ReportResponse,
}

#[derive(Deserialize)]
struct ConnectDomainPayload {
    domain: String,
}

#[derive(Deserialize)]
struct UpdateSecurityPayload {
    tls_enabled: Option<bool>,
    redirect_https: Option<bool>,
    redirect_www: Option<bool>,
}

#[derive(Deserialize)]
struct CheckAllowedParams {
    domain: String,
}

async fn get_domain(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    Path(store_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    require_service_token(&headers, &app_state)?;

    let view = app_state.domain_use_cases.get(store_id).await?;
    Ok(Json(DomainResponse::from(view)))
}

async fn connect_domain(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    Path(store_id): Path<Uuid>,
    Json(payload): Json<ConnectDomainPayload>,
) -> AppResult<impl IntoResponse> {
    require_service_token(&headers, &app_state)?;

    let view = app_state
        .domain_use_cases
        .connect(store_id, &payload.domain)
        .await?;
    Ok((StatusCode::CREATED, Json(DomainResponse::from(view))))
}

async fn disconnect_domain(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    Path(store_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    require_service_token(&headers, &app_state)?;

    app_state.domain_use_cases.disconnect(store_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn verify_domain(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    Path(store_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    require_service_token(&headers, &app_state)?;

    let outcome = app_state.domain_use_cases.verify(store_id).await?;
    Ok(Json(VerifyResponse {
        domain: outcome.attachment.into(),
        report: outcome.report.into(),
    }))
}

async fn update_security(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    Path(store_id): Path<Uuid>,
    Json(payload): Json<UpdateSecurityPayload>,
) -> AppResult<impl IntoResponse> {
    require_service_token(&headers, &app_state)?;

    let view = app_state
        .domain_use_cases
        .update_security(
            store_id,
            SecurityFlagsUpdate {
                tls_enabled: payload.tls_enabled,
                redirect_https: payload.redirect_https,
                redirect_www: payload.redirect_www,
            },
        )
        .await?;
    Ok(Json(DomainResponse::from(view)))
}

/// Public endpoint for the edge proxy's on-demand TLS ask.
async fn check_allowed(
    State(app_state): State<AppState>,
    Query(params): Query<CheckAllowedParams>,
) -> impl IntoResponse {
    match app_state
        .domain_use_cases
        .is_domain_allowed(&params.domain)
        .await
    {
        Ok(true) => StatusCode::OK,
        Ok(false) => StatusCode::NOT_FOUND,
        Err(e) => {
            warn!(domain = %params.domain, error = %e, "Allow check failed, denying");
            StatusCode::NOT_FOUND
        }
    }
}
