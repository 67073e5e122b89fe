use actix_web::{get, patch, post, web, HttpResponse};
use uuid::Uuid;

use super::extract::JsonBody;
use super::{invalidate_tenant_cache, require_active_tenant, require_tenant, run_db, validated, ApiError};
use crate::db::PgPool;
use crate::domain::instructions::{build_assistant_instructions, AssistantContext, KnowledgeSnippet};
use crate::domain::phone::format_uk_phone_number;
use crate::domain::requests::{CreateAssistantRequest, UpdateAssistantRequest};
use crate::http_server::AppState;
use crate::models::{NewAssistant, UpdateAssistant};
use crate::repository::assistants;
use crate::repository::business::find_business_info_by_tenant;
use crate::repository::knowledge_base::list_knowledge_entries;

/// Prompt built from the stored business details and knowledge base.
fn default_instructions(pool: &PgPool, tenant_id: Uuid) -> Result<String, ApiError> {
    let info = find_business_info_by_tenant(pool, tenant_id)?.ok_or_else(|| {
        ApiError::Precondition(
            "Business details must be saved before creating an assistant".to_string(),
        )
    })?;
    let entries = list_knowledge_entries(pool, tenant_id, None)?;

    let hours = info.hours().map_err(|e| ApiError::Internal(e.to_string()))?;
    let services = info.service_list().map_err(|e| ApiError::Internal(e.to_string()))?;

    let knowledge = entries
        .iter()
        .filter_map(|entry| {
            Some(KnowledgeSnippet {
                content_type: entry.content_type_enum()?,
                title: &entry.title,
                content: &entry.content,
            })
        })
        .collect();

    Ok(build_assistant_instructions(&AssistantContext {
        business_name: &info.business_name,
        industry: info.industry_enum(),
        location: info.location.as_deref(),
        phone: &info.phone,
        hours: &hours,
        services: &services,
        knowledge,
    }))
}

#[post("/api/tenants/{tenant_id}/assistant")]
pub async fn create_assistant(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    payload: JsonBody<CreateAssistantRequest>,
) -> Result<HttpResponse, ApiError> {
    let tenant_id = path.into_inner();
    let request = payload.into_inner();
    validated(&state, &request)?;

    let assistant = run_db(&state, move |pool| {
        require_active_tenant(pool, tenant_id)?;

        let instructions = match request.instructions.as_deref().map(str::trim) {
            Some(given) if !given.is_empty() => given.to_string(),
            _ => default_instructions(pool, tenant_id)?,
        };
        let phone_number = request
            .phone_number
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .map(format_uk_phone_number);

        Ok(assistants::create_assistant(
            pool,
            NewAssistant {
                tenant_id,
                vapi_assistant_id: request.vapi_assistant_id.trim(),
                name: request.name.trim(),
                voice: request.voice.trim(),
                instructions: &instructions,
                first_message: request.first_message.as_deref().filter(|m| !m.trim().is_empty()),
                phone_number: phone_number.as_deref(),
            },
        )?)
    })
    .await?;

    state.metrics.increment_assistants_created();
    invalidate_tenant_cache(&state, tenant_id);
    tracing::info!("Created assistant {} for tenant {}", assistant.id, tenant_id);
    Ok(HttpResponse::Created().json(assistant))
}

#[get("/api/tenants/{tenant_id}/assistant")]
pub async fn get_assistant(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let tenant_id = path.into_inner();

    let assistant = run_db(&state, move |pool| {
        require_tenant(pool, tenant_id)?;
        assistants::find_assistant_by_tenant(pool, tenant_id)?
            .ok_or_else(|| ApiError::NotFound("Assistant not found".to_string()))
    })
    .await?;

    Ok(HttpResponse::Ok().json(assistant))
}

#[patch("/api/tenants/{tenant_id}/assistant")]
pub async fn update_assistant(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    payload: JsonBody<UpdateAssistantRequest>,
) -> Result<HttpResponse, ApiError> {
    let tenant_id = path.into_inner();
    let request = payload.into_inner();
    validated(&state, &request)?;

    let updates = UpdateAssistant {
        name: request.name.map(|n| n.trim().to_string()),
        voice: request.voice.map(|v| v.trim().to_string()),
        instructions: request.instructions,
        first_message: request.first_message.map(|m| {
            let m = m.trim();
            (!m.is_empty()).then(|| m.to_string())
        }),
    };

    let assistant = run_db(&state, move |pool| {
        require_active_tenant(pool, tenant_id)?;

        let nothing_to_change = updates.name.is_none()
            && updates.voice.is_none()
            && updates.instructions.is_none()
            && updates.first_message.is_none();
        let found = if nothing_to_change {
            assistants::find_assistant_by_tenant(pool, tenant_id)?
        } else {
            assistants::update_assistant(pool, tenant_id, updates)?
        };

        found.ok_or_else(|| ApiError::NotFound("Assistant not found".to_string()))
    })
    .await?;

    Ok(HttpResponse::Ok().json(assistant))
}

#[post("/api/tenants/{tenant_id}/assistant/deactivate")]
pub async fn deactivate_assistant(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let tenant_id = path.into_inner();

    let assistant = run_db(&state, move |pool| {
        require_tenant(pool, tenant_id)?;
        assistants::deactivate_assistant(pool, tenant_id)?
            .ok_or_else(|| ApiError::NotFound("Assistant not found".to_string()))
    })
    .await?;

    invalidate_tenant_cache(&state, tenant_id);
    tracing::info!("Deactivated assistant {} for tenant {}", assistant.id, tenant_id);
    Ok(HttpResponse::Ok().json(assistant))
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
    async fn test_create_assistant_requires_fields() {
        let state = test_support::state();
        let app = test::init_service(App::new().app_data(state).configure(configure_app)).await;

        let req = test::TestRequest::post()
            .uri(&format!("/api/tenants/{}/assistant", Uuid::new_v4()))
            .set_json(json!({ "vapiAssistantId": "", "name": "Ava", "voice": "" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["errors"].as_array().unwrap().len(), 2);
    }

    #[actix_web::test]
    async fn test_bad_tenant_id_is_not_found() {
        let state = test_support::state();
        let app = test::init_service(App::new().app_data(state).configure(configure_app)).await;

        let req = test::TestRequest::get()
            .uri("/api/tenants/not-a-uuid/assistant")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
