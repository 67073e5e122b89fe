use actix_web::{get, post, web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use super::extract::JsonBody;
use super::{invalidate_tenant_cache, require_active_tenant, require_tenant, run_db, validated, ApiError};
use crate::domain::requests::CallLogRequest;
use crate::domain::FieldErrors;
use crate::http_server::AppState;
use crate::models::NewCallLog;
use crate::repository::assistants::find_tenant_assistant;
use crate::repository::call_logs;

const DEFAULT_LIMIT: i64 = 50;
const MAX_LIMIT: i64 = 200;

#[derive(Debug, Deserialize)]
pub struct CallListQuery {
    pub limit: Option<i64>,
}

#[post("/api/tenants/{tenant_id}/calls")]
pub async fn record_call(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    payload: JsonBody<CallLogRequest>,
) -> Result<HttpResponse, ApiError> {
    let tenant_id = path.into_inner();
    let request = payload.into_inner();
    validated(&state, &request)?;

    let duration = i32::try_from(request.duration).map_err(|_| {
        ApiError::Validation(FieldErrors::single("duration", "Duration is too large"))
    })?;

    let call = run_db(&state, move |pool| {
        require_active_tenant(pool, tenant_id)?;
        if find_tenant_assistant(pool, tenant_id, request.assistant_id)?.is_none() {
            return Err(ApiError::NotFound("Assistant not found".to_string()));
        }

        Ok(call_logs::record_call_log(
            pool,
            NewCallLog {
                tenant_id,
                assistant_id: request.assistant_id,
                vapi_call_id: request.vapi_call_id.trim(),
                caller_number: request.caller_number.as_deref(),
                duration,
                result: request.result().map(|r| r.as_str()),
                sentiment: request.sentiment().map(|s| s.as_str()),
                summary: request.summary.as_deref(),
                transcript: request.transcript.as_deref(),
                started_at: request.started_at,
                ended_at: request.ended_at,
            },
        )?)
    })
    .await?;

    state.metrics.increment_calls_logged();
    invalidate_tenant_cache(&state, tenant_id);
    tracing::info!(
        "Logged call {} ({}s, result {:?}) for tenant {}",
        call.vapi_call_id,
        call.duration,
        call.result,
        tenant_id
    );
    Ok(HttpResponse::Created().json(call))
}

#[get("/api/tenants/{tenant_id}/calls")]
pub async fn list_calls(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    query: web::Query<CallListQuery>,
) -> Result<HttpResponse, ApiError> {
    let tenant_id = path.into_inner();
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT);

    if !(1..=MAX_LIMIT).contains(&limit) {
        state.metrics.increment_rejected();
        return Err(ApiError::Validation(FieldErrors::single(
            "limit",
            format!("Limit must be between 1 and {}", MAX_LIMIT),
        )));
    }

    let calls = run_db(&state, move |pool| {
        require_tenant(pool, tenant_id)?;
        Ok(call_logs::list_recent_call_logs(pool, tenant_id, limit)?)
    })
    .await?;

    Ok(HttpResponse::Ok().json(calls))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support;
    use crate::http_server::configure_app;
    use actix_web::http::StatusCode;
    use actix_web::{test, App};
    use serde_json::json;

    #[actix_web::test]
    async fn test_negative_duration_is_rejected() {
        let state = test_support::state();
        let app = test::init_service(App::new().app_data(state).configure(configure_app)).await;

        let req = test::TestRequest::post()
            .uri(&format!("/api/tenants/{}/calls", Uuid::new_v4()))
            .set_json(json!({
                "assistantId": Uuid::new_v4(),
                "vapiCallId": "call_1",
                "duration": -4,
                "result": "maybe",
                "startedAt": "2024-07-01T09:00:00Z",
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body: serde_json::Value = test::read_body_json(resp).await;
        let fields: Vec<&str> = body["errors"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["field"].as_str().unwrap())
            .collect();
        assert_eq!(fields, vec!["duration", "result"]);
    }

    #[actix_web::test]
    async fn test_limit_out_of_range() {
        let state = test_support::state();
        let app = test::init_service(App::new().app_data(state).configure(configure_app)).await;

        let req = test::TestRequest::get()
            .uri(&format!("/api/tenants/{}/calls?limit=0", Uuid::new_v4()))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
