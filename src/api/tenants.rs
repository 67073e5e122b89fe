use actix_web::{get, patch, post, web, HttpResponse};
use uuid::Uuid;

use super::extract::JsonBody;
use super::{invalidate_tenant_cache, require_tenant, run_db, validated, ApiError};
use crate::domain::phone::format_uk_phone_number;
use crate::domain::requests::{CreateTenantRequest, UpdateTenantRequest};
use crate::http_server::AppState;
use crate::models::{NewTenant, UpdateTenant};
use crate::repository::tenants;

#[post("/api/tenants")]
pub async fn create_tenant(
    state: web::Data<AppState>,
    payload: JsonBody<CreateTenantRequest>,
) -> Result<HttpResponse, ApiError> {
    let request = payload.into_inner();
    validated(&state, &request)?;

    let tenant = run_db(&state, move |pool| {
        let email = request.email.trim().to_lowercase();
        let phone = request
            .phone
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .map(format_uk_phone_number);

        // The unique index still guards concurrent signups.
        if tenants::find_tenant_by_email(pool, &email)?.is_some() {
            return Err(ApiError::Conflict(
                "A tenant with this email already exists".to_string(),
            ));
        }

        Ok(tenants::create_tenant(
            pool,
            NewTenant {
                email: &email,
                name: request.name.trim(),
                phone: phone.as_deref(),
            },
        )?)
    })
    .await?;

    state.metrics.increment_tenants_created();
    tracing::info!("Created tenant {}", tenant.id);
    Ok(HttpResponse::Created().json(tenant))
}

#[get("/api/tenants/{tenant_id}")]
pub async fn get_tenant(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let tenant_id = path.into_inner();
    let tenant = run_db(&state, move |pool| require_tenant(pool, tenant_id)).await?;
    Ok(HttpResponse::Ok().json(tenant))
}

#[patch("/api/tenants/{tenant_id}")]
pub async fn update_tenant(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    payload: JsonBody<UpdateTenantRequest>,
) -> Result<HttpResponse, ApiError> {
    let tenant_id = path.into_inner();
    let request = payload.into_inner();
    validated(&state, &request)?;

    let updates = UpdateTenant {
        name: request.name.map(|n| n.trim().to_string()),
        // An empty string clears the phone number.
        phone: request.phone.map(|p| {
            let p = p.trim();
            (!p.is_empty()).then(|| format_uk_phone_number(p))
        }),
    };

    if updates.name.is_none() && updates.phone.is_none() {
        let tenant = run_db(&state, move |pool| require_tenant(pool, tenant_id)).await?;
        return Ok(HttpResponse::Ok().json(tenant));
    }

    let tenant = run_db(&state, move |pool| {
        tenants::update_tenant(pool, tenant_id, updates)?
            .ok_or_else(|| ApiError::NotFound("Tenant not found".to_string()))
    })
    .await?;

    Ok(HttpResponse::Ok().json(tenant))
}

#[post("/api/tenants/{tenant_id}/deactivate")]
pub async fn deactivate_tenant(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let tenant_id = path.into_inner();

    let summary = run_db(&state, move |pool| {
        tenants::deactivate_tenant(pool, tenant_id)?
            .ok_or_else(|| ApiError::NotFound("Tenant not found".to_string()))
    })
    .await?;

    invalidate_tenant_cache(&state, tenant_id);
    tracing::info!(
        "Deactivated tenant {} ({} assistant(s), {} calendar token(s), {} tool(s), {} knowledge entries)",
        tenant_id,
        summary.assistants,
        summary.calendar_tokens,
        summary.tools,
        summary.knowledge_entries
    );
    Ok(HttpResponse::Ok().json(summary))
}

#[post("/api/tenants/{tenant_id}/reactivate")]
pub async fn reactivate_tenant(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let tenant_id = path.into_inner();

    let tenant = run_db(&state, move |pool| {
        tenants::reactivate_tenant(pool, tenant_id)?
            .ok_or_else(|| ApiError::NotFound("Tenant not found".to_string()))
    })
    .await?;

    invalidate_tenant_cache(&state, tenant_id);
    tracing::info!("Reactivated tenant {}", tenant_id);
    Ok(HttpResponse::Ok().json(tenant))
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
    async fn test_create_tenant_rejects_invalid_payload() {
        let state = test_support::state();
        let app = test::init_service(App::new().app_data(state.clone()).configure(configure_app)).await;

        let req = test::TestRequest::post()
            .uri("/api/tenants")
            .set_json(json!({ "email": "not-an-email", "name": "", "phone": "12345" }))
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
        assert_eq!(fields, vec!["email", "name", "phone"]);
        assert_eq!(state.metrics.snapshot().requests_rejected, 1);
    }

    #[actix_web::test]
    async fn test_malformed_json_is_bad_request() {
        let state = test_support::state();
        let app = test::init_service(App::new().app_data(state).configure(configure_app)).await;

        let req = test::TestRequest::post()
            .uri("/api/tenants")
            .insert_header(("content-type", "application/json"))
            .set_payload("{\"email\": ")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["errors"][0]["field"], "body");
    }

    #[actix_web::test]
    async fn test_update_tenant_rejects_blank_name() {
        let state = test_support::state();
        let app = test::init_service(App::new().app_data(state).configure(configure_app)).await;

        let req = test::TestRequest::patch()
            .uri(&format!("/api/tenants/{}", Uuid::new_v4()))
            .set_json(json!({ "name": "   " }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
