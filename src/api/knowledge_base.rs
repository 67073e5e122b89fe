use actix_web::{delete, get, post, put, web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use super::extract::JsonBody;
use super::{invalidate_tenant_cache, require_active_tenant, require_tenant, run_db, validated, ApiError};
use crate::domain::enums::ContentType;
use crate::domain::requests::KnowledgeEntryRequest;
use crate::domain::FieldErrors;
use crate::http_server::AppState;
use crate::models::NewKnowledgeEntry;
use crate::repository::knowledge_base;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeFilter {
    pub content_type: Option<String>,
}

fn as_new_entry(tenant_id: Uuid, request: &KnowledgeEntryRequest) -> NewKnowledgeEntry<'_> {
    NewKnowledgeEntry {
        tenant_id,
        title: request.title.trim(),
        content: request.content.trim(),
        content_type: request.content_type.as_str(),
        source: request.source().as_str(),
        source_url: request.source_url.as_deref(),
        file_name: request.file_name.as_deref(),
    }
}

#[post("/api/tenants/{tenant_id}/knowledge")]
pub async fn create_entry(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    payload: JsonBody<KnowledgeEntryRequest>,
) -> Result<HttpResponse, ApiError> {
    let tenant_id = path.into_inner();
    let request = payload.into_inner();
    validated(&state, &request)?;

    let entry = run_db(&state, move |pool| {
        require_active_tenant(pool, tenant_id)?;
        Ok(knowledge_base::create_knowledge_entry(
            pool,
            as_new_entry(tenant_id, &request),
        )?)
    })
    .await?;

    invalidate_tenant_cache(&state, tenant_id);
    Ok(HttpResponse::Created().json(entry))
}

#[get("/api/tenants/{tenant_id}/knowledge")]
pub async fn list_entries(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    filter: web::Query<KnowledgeFilter>,
) -> Result<HttpResponse, ApiError> {
    let tenant_id = path.into_inner();

    let content_type = match filter.into_inner().content_type {
        None => None,
        Some(raw) => match ContentType::parse(&raw) {
            Some(content_type) => Some(content_type),
            None => {
                state.metrics.increment_rejected();
                return Err(ApiError::Validation(FieldErrors::single(
                    "contentType",
                    "Unknown content type",
                )));
            }
        },
    };

    let entries = run_db(&state, move |pool| {
        require_tenant(pool, tenant_id)?;
        Ok(knowledge_base::list_knowledge_entries(
            pool,
            tenant_id,
            content_type.map(|c| c.as_str()),
        )?)
    })
    .await?;

    Ok(HttpResponse::Ok().json(entries))
}

#[put("/api/tenants/{tenant_id}/knowledge/{entry_id}")]
pub async fn update_entry(
    state: web::Data<AppState>,
    path: web::Path<(Uuid, Uuid)>,
    payload: JsonBody<KnowledgeEntryRequest>,
) -> Result<HttpResponse, ApiError> {
    let (tenant_id, entry_id) = path.into_inner();
    let request = payload.into_inner();
    validated(&state, &request)?;

    let entry = run_db(&state, move |pool| {
        require_active_tenant(pool, tenant_id)?;
        knowledge_base::update_knowledge_entry(pool, entry_id, as_new_entry(tenant_id, &request))?
            .ok_or_else(|| ApiError::NotFound("Knowledge base entry not found".to_string()))
    })
    .await?;

    invalidate_tenant_cache(&state, tenant_id);
    Ok(HttpResponse::Ok().json(entry))
}

#[delete("/api/tenants/{tenant_id}/knowledge/{entry_id}")]
pub async fn delete_entry(
    state: web::Data<AppState>,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<HttpResponse, ApiError> {
    let (tenant_id, entry_id) = path.into_inner();

    let deleted = run_db(&state, move |pool| {
        require_tenant(pool, tenant_id)?;
        Ok(knowledge_base::delete_knowledge_entry(pool, entry_id, tenant_id)?)
    })
    .await?;

    if !deleted {
        return Err(ApiError::NotFound("Knowledge base entry not found".to_string()));
    }

    invalidate_tenant_cache(&state, tenant_id);
    Ok(HttpResponse::NoContent().finish())
}
