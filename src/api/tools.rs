use actix_web::{delete, get, post, web, HttpResponse};
use chrono::Utc;
use rand::distributions::Alphanumeric;
use rand::{thread_rng, Rng};
use serde_json::json;
use uuid::Uuid;

use super::extract::JsonBody;
use super::{invalidate_tenant_cache, require_active_tenant, require_tenant, run_db, validated, ApiError};
use crate::domain::enums::ToolType;
use crate::domain::hours::format_business_hours;
use crate::domain::requests::ToolRequest;
use crate::domain::text::slugify;
use crate::http_server::AppState;
use crate::models::NewTool;
use crate::repository::business::find_business_info_by_tenant;
use crate::repository::calendar::list_active_calendar_tokens;
use crate::repository::tools;

fn create_random_string() -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(8)
        .map(char::from)
        .collect()
}

/// `{base}/tools/{tool-type}/{random}`, used when the caller brings no URL.
pub fn generate_webhook_url(base_url: &str, tool_type: ToolType) -> String {
    format!(
        "{}/tools/{}/{}",
        base_url.trim_end_matches('/'),
        slugify(tool_type.as_str()),
        create_random_string()
    )
}

#[post("/api/tenants/{tenant_id}/tools")]
pub async fn create_tool(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    payload: JsonBody<ToolRequest>,
) -> Result<HttpResponse, ApiError> {
    let tenant_id = path.into_inner();
    let request = payload.into_inner();
    validated(&state, &request)?;

    let tool_type = request
        .tool_type()
        .ok_or_else(|| ApiError::Internal("tool type passed validation but did not parse".to_string()))?;
    let webhook_url = match request.webhook_url.as_deref() {
        Some(url) => url.to_string(),
        None => generate_webhook_url(&state.tool_webhook_base_url, tool_type),
    };
    let config = request.config.clone().unwrap_or_else(|| json!({}));

    let tool = run_db(&state, move |pool| {
        require_active_tenant(pool, tenant_id)?;

        if tool_type.requires_calendar() && list_active_calendar_tokens(pool, tenant_id)?.is_empty() {
            return Err(ApiError::Precondition(
                "Connect a calendar before adding this tool".to_string(),
            ));
        }

        Ok(tools::create_tool(
            pool,
            NewTool {
                tenant_id,
                name: request.name.trim(),
                tool_type: tool_type.as_str(),
                webhook_url: &webhook_url,
                config,
            },
        )?)
    })
    .await?;

    invalidate_tenant_cache(&state, tenant_id);
    tracing::info!("Added {} tool {} for tenant {}", tool.tool_type, tool.id, tenant_id);
    Ok(HttpResponse::Created().json(tool))
}

#[get("/api/tenants/{tenant_id}/tools")]
pub async fn list_tools(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let tenant_id = path.into_inner();

    let tools = run_db(&state, move |pool| {
        require_tenant(pool, tenant_id)?;
        Ok(tools::list_active_tools(pool, tenant_id)?)
    })
    .await?;

    Ok(HttpResponse::Ok().json(tools))
}

#[delete("/api/tenants/{tenant_id}/tools/{tool_id}")]
pub async fn delete_tool(
    state: web::Data<AppState>,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<HttpResponse, ApiError> {
    let (tenant_id, tool_id) = path.into_inner();

    let removed = run_db(&state, move |pool| {
        require_tenant(pool, tenant_id)?;
        Ok(tools::deactivate_tool(pool, tool_id, tenant_id)?)
    })
    .await?;

    if !removed {
        return Err(ApiError::NotFound("Tool not found".to_string()));
    }

    invalidate_tenant_cache(&state, tenant_id);
    Ok(HttpResponse::NoContent().finish())
}

/// What the `business_hours_check` tool answers: is the business open now
/// (UK time)?
#[get("/api/tenants/{tenant_id}/tools/business-hours")]
pub async fn business_hours_check(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let tenant_id = path.into_inner();

    let info = run_db(&state, move |pool| {
        require_tenant(pool, tenant_id)?;
        find_business_info_by_tenant(pool, tenant_id)?
            .ok_or_else(|| ApiError::NotFound("Business info not found".to_string()))
    })
    .await?;

    let hours = info.hours().map_err(|e| ApiError::Internal(e.to_string()))?;
    let now = Utc::now();

    Ok(HttpResponse::Ok().json(json!({
        "open": hours.is_open_at(now),
        "checkedAt": now,
        "hours": format_business_hours(&hours),
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support;
    use crate::http_server::configure_app;
    use actix_web::http::StatusCode;
    use actix_web::App;

    #[test]
    fn test_generated_webhook_url() {
        let url = generate_webhook_url("https://hooks.example.com/", ToolType::CalendarBooking);
        let prefix = "https://hooks.example.com/tools/calendar-booking/";

        assert!(url.starts_with(prefix));
        let suffix = &url[prefix.len()..];
        assert_eq!(suffix.len(), 8);
        assert!(suffix.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[actix_web::test]
    async fn test_invalid_tool_is_rejected() {
        let state = test_support::state();
        let app = actix_web::test::init_service(App::new().app_data(state).configure(configure_app)).await;

        let req = actix_web::test::TestRequest::post()
            .uri(&format!("/api/tenants/{}/tools", Uuid::new_v4()))
            .set_json(json!({
                "name": "Booker",
                "toolType": "teleport",
                "webhookUrl": "not a url",
                "config": [1, 2, 3],
            }))
            .to_request();
        let resp = actix_web::test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body: serde_json::Value = actix_web::test::read_body_json(resp).await;
        let fields: Vec<&str> = body["errors"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["field"].as_str().unwrap())
            .collect();
        assert_eq!(fields, vec!["config", "toolType", "webhookUrl"]);
    }
}
