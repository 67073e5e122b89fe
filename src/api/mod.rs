//! REST handlers. Every write validates its payload before the pool is
//! touched; database work runs on actix's blocking thread pool.

pub mod analytics;
pub mod appointments;
pub mod assistants;
pub mod calendar;
pub mod call_logs;
pub mod extract;
pub mod knowledge_base;
pub mod onboarding;
pub mod options;
pub mod tenants;
pub mod tools;

use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, ResponseError};
use serde_json::json;
use uuid::Uuid;

use crate::db::{DbError, PgPool};
use crate::domain::validation::check;
use crate::domain::FieldErrors;
use crate::http_server::AppState;
use crate::models::Tenant;
use crate::repository::tenants::find_tenant_by_id;

#[derive(Debug)]
pub enum ApiError {
    Validation(FieldErrors),
    /// Body or query string could not be parsed at all.
    BadRequest { field: String, message: String },
    NotFound(String),
    Conflict(String),
    Precondition(String),
    Internal(String),
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::Validation(e) => write!(f, "{}", e),
            ApiError::BadRequest { field, message } => write!(f, "Bad request ({}): {}", field, message),
            ApiError::NotFound(e) => write!(f, "Not found: {}", e),
            ApiError::Conflict(e) => write!(f, "Conflict: {}", e),
            ApiError::Precondition(e) => write!(f, "Precondition failed: {}", e),
            ApiError::Internal(e) => write!(f, "Internal error: {}", e),
        }
    }
}

impl std::error::Error for ApiError {}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) | ApiError::Precondition(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            ApiError::Validation(errors) => json!(errors),
            ApiError::BadRequest { field, message } => {
                json!({ "errors": [{ "field": field, "message": message }] })
            }
            ApiError::NotFound(message)
            | ApiError::Conflict(message)
            | ApiError::Precondition(message) => json!({ "error": message }),
            ApiError::Internal(_) => json!({ "error": "Internal server error" }),
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}

impl From<FieldErrors> for ApiError {
    fn from(errors: FieldErrors) -> Self {
        ApiError::Validation(errors)
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Conflict(constraint) => ApiError::Conflict(conflict_message(&constraint)),
            DbError::Precondition(message) => ApiError::Precondition(message),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

/// Human wording for the unique constraints a client can run into.
fn conflict_message(constraint: &str) -> String {
    let message = match constraint {
        "tenants_email_key" => "A tenant with this email already exists",
        "assistants_tenant_id_key" => "This tenant already has an assistant",
        "assistants_vapi_assistant_id_key" => "This assistant ID is already in use",
        "appointments_calendar_event_id_key" => "This calendar event is already booked",
        "call_logs_vapi_call_id_key" => "This call has already been logged",
        "calendar_tokens_one_active_per_provider" => {
            "Another calendar connection was stored at the same time"
        }
        _ => return format!("Duplicate value ({})", constraint),
    };
    message.to_string()
}

/// Runs the payload's validator rules and counts rejections.
pub(crate) fn validated<T: validator::Validate>(state: &AppState, payload: &T) -> Result<(), ApiError> {
    check(payload).map_err(|errors| {
        state.metrics.increment_rejected();
        tracing::debug!("Rejected payload: {}", errors);
        ApiError::Validation(errors)
    })
}

/// Runs blocking database work off the async executor.
pub(crate) async fn run_db<T, F>(state: &web::Data<AppState>, work: F) -> Result<T, ApiError>
where
    F: FnOnce(&PgPool) -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    let pool = state.pool.clone();
    let result = match web::block(move || work(&pool)).await {
        Ok(result) => result,
        Err(e) => Err(DbError::TaskJoinError(e.to_string()).into()),
    };

    match &result {
        Err(ApiError::Conflict(message)) => {
            state.metrics.increment_conflicts();
            tracing::info!("Write rejected: {}", message);
        }
        Err(ApiError::Internal(message)) => {
            state.metrics.increment_errors();
            tracing::error!("Request failed: {}", message);
        }
        _ => {}
    }

    result
}

pub(crate) fn require_tenant(pool: &PgPool, tenant_id: Uuid) -> Result<Tenant, ApiError> {
    find_tenant_by_id(pool, tenant_id)?
        .ok_or_else(|| ApiError::NotFound("Tenant not found".to_string()))
}

/// Writes are refused for deactivated tenants.
pub(crate) fn require_active_tenant(pool: &PgPool, tenant_id: Uuid) -> Result<Tenant, ApiError> {
    let tenant = require_tenant(pool, tenant_id)?;
    if !tenant.is_active {
        return Err(ApiError::Precondition("Tenant is deactivated".to_string()));
    }
    Ok(tenant)
}

/// Cache key prefix covering every cached read of one tenant.
pub(crate) fn tenant_cache_prefix(tenant_id: Uuid) -> String {
    format!("/api/tenants/{}/", tenant_id)
}

pub(crate) fn invalidate_tenant_cache(state: &AppState, tenant_id: Uuid) {
    state.cache.invalidate_prefix(&tenant_cache_prefix(tenant_id));
    tracing::debug!("Dropped cached reads for tenant {}", tenant_id);
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(options::get_options)
        .service(tenants::create_tenant)
        .service(tenants::get_tenant)
        .service(tenants::update_tenant)
        .service(tenants::deactivate_tenant)
        .service(tenants::reactivate_tenant)
        .service(onboarding::submit_onboarding)
        .service(onboarding::get_business_info)
        .service(assistants::create_assistant)
        .service(assistants::get_assistant)
        .service(assistants::update_assistant)
        .service(assistants::deactivate_assistant)
        .service(calendar::store_calendar_token)
        .service(calendar::get_calendar_status)
        .service(calendar::disconnect_calendar)
        .service(appointments::sync_appointment)
        .service(appointments::create_appointment)
        .service(appointments::list_appointments)
        .service(call_logs::record_call)
        .service(call_logs::list_calls)
        .service(knowledge_base::create_entry)
        .service(knowledge_base::list_entries)
        .service(knowledge_base::update_entry)
        .service(knowledge_base::delete_entry)
        .service(tools::business_hours_check)
        .service(tools::create_tool)
        .service(tools::list_tools)
        .service(tools::delete_tool)
        .service(analytics::run_rollup)
        .service(analytics::get_analytics);
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;
    use std::time::Duration;

    use actix_web::web;
    use diesel::r2d2::{ConnectionManager, Pool};
    use diesel::PgConnection;

    use crate::crypto::TokenCrypto;
    use crate::http_server::AppState;
    use crate::observability::metrics::Metrics;
    use crate::services::query_cache::QueryCache;

    pub const TEST_KEY: &str = "000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f";

    /// State whose pool never connects; handlers under test must fail
    /// before they reach the database.
    pub fn state() -> web::Data<AppState> {
        let manager = ConnectionManager::<PgConnection>::new("postgres://unused@localhost:1/none");
        let pool = Pool::builder()
            .max_size(1)
            .connection_timeout(Duration::from_millis(50))
            .build_unchecked(manager);

        web::Data::new(AppState {
            pool,
            crypto: TokenCrypto::from_hex_key(TEST_KEY).unwrap(),
            metrics: Arc::new(Metrics::new()),
            cache: QueryCache::new(Duration::from_secs(60)),
            tool_webhook_base_url: "https://hooks.example.com".to_string(),
        })
    }
}
