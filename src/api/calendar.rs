use actix_web::{delete, get, put, web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::extract::JsonBody;
use super::{invalidate_tenant_cache, require_active_tenant, require_tenant, run_db, validated, ApiError};
use crate::domain::enums::CalendarProvider;
use crate::domain::requests::StoreCalendarTokenRequest;
use crate::domain::FieldErrors;
use crate::http_server::AppState;
use crate::models::{CalendarToken, NewCalendarToken, TokenState};
use crate::repository::calendar;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarStatus {
    pub provider: String,
    pub calendar_id: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub connected_at: DateTime<Utc>,
    pub state: TokenState,
}

impl CalendarStatus {
    fn of(token: CalendarToken, now: DateTime<Utc>) -> Self {
        let state = token.state(now);
        Self {
            provider: token.provider,
            calendar_id: token.calendar_id,
            expires_at: token.expires_at,
            connected_at: token.created_at,
            state,
        }
    }
}

fn parse_provider(state: &AppState, raw: &str) -> Result<CalendarProvider, ApiError> {
    CalendarProvider::parse(raw).ok_or_else(|| {
        state.metrics.increment_rejected();
        ApiError::Validation(FieldErrors::single(
            "provider",
            "Calendar provider must be google or outlook",
        ))
    })
}

/// Stores a fresh OAuth token pair, replacing the active one for this
/// provider. Tokens are encrypted before they leave the handler.
#[put("/api/tenants/{tenant_id}/calendar/{provider}")]
pub async fn store_calendar_token(
    state: web::Data<AppState>,
    path: web::Path<(Uuid, String)>,
    payload: JsonBody<StoreCalendarTokenRequest>,
) -> Result<HttpResponse, ApiError> {
    let (tenant_id, provider) = path.into_inner();
    let provider = parse_provider(&state, &provider)?;
    let request = payload.into_inner();
    validated(&state, &request)?;

    let access_token = state
        .crypto
        .encrypt(request.access_token.trim())
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    let refresh_token = state
        .crypto
        .encrypt_optional(request.refresh_token.as_deref().map(str::trim))
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    let token = run_db(&state, move |pool| {
        require_active_tenant(pool, tenant_id)?;

        Ok(calendar::store_calendar_token(
            pool,
            NewCalendarToken {
                tenant_id,
                provider: provider.as_str(),
                access_token: &access_token,
                refresh_token: refresh_token.as_deref(),
                expires_at: request.expires_at,
                calendar_id: request.calendar_id.as_deref(),
            },
        )?)
    })
    .await?;

    invalidate_tenant_cache(&state, tenant_id);
    tracing::info!("Connected {} calendar for tenant {}", provider.as_str(), tenant_id);
    Ok(HttpResponse::Ok().json(CalendarStatus::of(token, Utc::now())))
}

#[get("/api/tenants/{tenant_id}/calendar")]
pub async fn get_calendar_status(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let tenant_id = path.into_inner();

    let tokens = run_db(&state, move |pool| {
        require_tenant(pool, tenant_id)?;
        Ok(calendar::list_active_calendar_tokens(pool, tenant_id)?)
    })
    .await?;

    let now = Utc::now();
    let statuses: Vec<CalendarStatus> = tokens
        .into_iter()
        .map(|token| CalendarStatus::of(token, now))
        .collect();

    for status in statuses.iter().filter(|s| s.state == TokenState::ReauthRequired) {
        tracing::warn!(
            "Tenant {} must reconnect their {} calendar",
            tenant_id,
            status.provider
        );
    }

    Ok(HttpResponse::Ok().json(statuses))
}

#[delete("/api/tenants/{tenant_id}/calendar/{provider}")]
pub async fn disconnect_calendar(
    state: web::Data<AppState>,
    path: web::Path<(Uuid, String)>,
) -> Result<HttpResponse, ApiError> {
    let (tenant_id, provider) = path.into_inner();
    let provider = parse_provider(&state, &provider)?;

    let disconnected = run_db(&state, move |pool| {
        require_tenant(pool, tenant_id)?;
        Ok(calendar::disconnect_calendar(pool, tenant_id, provider.as_str())?)
    })
    .await?;

    if !disconnected {
        return Err(ApiError::NotFound("No active calendar connection".to_string()));
    }

    invalidate_tenant_cache(&state, tenant_id);
    tracing::info!("Disconnected {} calendar for tenant {}", provider.as_str(), tenant_id);
    Ok(HttpResponse::NoContent().finish())
}
