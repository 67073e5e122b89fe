use actix_web::{get, post, web, HttpResponse};
use serde_json::json;
use uuid::Uuid;

use super::extract::JsonBody;
use super::{invalidate_tenant_cache, require_active_tenant, require_tenant, run_db, validated, ApiError};
use crate::domain::enums::{ContentType, KnowledgeSource};
use crate::domain::hours::format_business_hours;
use crate::domain::onboarding::OnboardingSubmission;
use crate::domain::phone::format_uk_phone_number;
use crate::http_server::AppState;
use crate::models::{NewBusinessInfo, NewKnowledgeEntry};
use crate::repository::business::{find_business_info_by_tenant, save_onboarding};

const DEFAULT_SCRAPED_TITLE: &str = "Website content";

fn to_json<T: serde::Serialize>(value: &T) -> Result<serde_json::Value, ApiError> {
    serde_json::to_value(value).map_err(|e| ApiError::Internal(e.to_string()))
}

/// Accepts the whole onboarding wizard in one go. Nothing is stored unless
/// every part validates.
#[post("/api/tenants/{tenant_id}/onboarding")]
pub async fn submit_onboarding(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    payload: JsonBody<OnboardingSubmission>,
) -> Result<HttpResponse, ApiError> {
    let tenant_id = path.into_inner();
    let submission = payload.into_inner();
    validated(&state, &submission)?;

    let business_hours = to_json(&submission.configuration.business_hours)?;
    let services = to_json(&submission.configuration.services)?;
    let appointment_settings = to_json(&submission.configuration.appointment_settings())?;

    let (info, entry) = run_db(&state, move |pool| {
        require_active_tenant(pool, tenant_id)?;

        let details = &submission.business_details;
        let industry = details.industry().map(|i| i.as_str()).unwrap_or_default();
        let provider = submission.calendar_connection.provider().map(|p| p.as_str());
        let phone = format_uk_phone_number(&details.phone);
        let website = details.website.trim();

        let scraped = &submission.scraped_content;
        let scraped_entry = scraped.has_content().then(|| NewKnowledgeEntry {
            tenant_id,
            title: scraped
                .title
                .as_deref()
                .filter(|t| !t.trim().is_empty())
                .unwrap_or(DEFAULT_SCRAPED_TITLE),
            content: scraped.content.trim(),
            content_type: ContentType::BusinessInfo.as_str(),
            source: KnowledgeSource::Url.as_str(),
            source_url: Some(
                scraped
                    .url
                    .as_deref()
                    .filter(|u| !u.is_empty())
                    .unwrap_or(website),
            ),
            file_name: None,
        });

        Ok(save_onboarding(
            pool,
            NewBusinessInfo {
                tenant_id,
                business_name: details.business_name.trim(),
                industry,
                phone: &phone,
                location: details.location.as_deref().filter(|l| !l.trim().is_empty()),
                website: Some(website),
                business_hours,
                services,
                appointment_settings,
                calendar_provider: provider,
            },
            scraped_entry,
        )?)
    })
    .await?;

    state.metrics.increment_onboarding();
    invalidate_tenant_cache(&state, tenant_id);
    tracing::info!(
        "Saved onboarding for tenant {} (knowledge entry: {})",
        tenant_id,
        entry.is_some()
    );

    Ok(HttpResponse::Ok().json(json!({
        "businessInfo": info,
        "knowledgeEntry": entry,
    })))
}

#[get("/api/tenants/{tenant_id}/business")]
pub async fn get_business_info(
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

    let formatted_hours = info.hours().ok().map(|h| format_business_hours(&h));

    Ok(HttpResponse::Ok().json(json!({
        "businessInfo": info,
        "formattedHours": formatted_hours,
    })))
}
