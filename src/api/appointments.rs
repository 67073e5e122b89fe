use actix_web::{get, post, put, web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use super::extract::JsonBody;
use super::{invalidate_tenant_cache, require_active_tenant, require_tenant, run_db, validated, ApiError};
use crate::db::PgPool;
use crate::domain::requests::AppointmentRequest;
use crate::domain::FieldErrors;
use crate::http_server::AppState;
use crate::models::NewAppointment;
use crate::repository::appointments;
use crate::repository::assistants::find_tenant_assistant;

#[derive(Debug, Deserialize)]
pub struct AppointmentWindow {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

fn as_new_appointment(tenant_id: Uuid, request: &AppointmentRequest) -> NewAppointment<'_> {
    NewAppointment {
        tenant_id,
        assistant_id: request.assistant_id,
        calendar_event_id: request.calendar_event_id.trim(),
        customer_name: request.customer_name.trim(),
        customer_phone: request.customer_phone.as_deref(),
        customer_email: request.customer_email.as_deref(),
        service_name: request.service_name.as_deref(),
        start_time: request.start_time,
        end_time: request.end_time,
        status: request.status().as_str(),
        notes: request.notes.as_deref(),
    }
}

/// The assistant named in the payload has to belong to the tenant.
fn check_booking_target(pool: &PgPool, tenant_id: Uuid, assistant_id: Uuid) -> Result<(), ApiError> {
    require_active_tenant(pool, tenant_id)?;
    find_tenant_assistant(pool, tenant_id, assistant_id)?
        .map(|_| ())
        .ok_or_else(|| ApiError::NotFound("Assistant not found".to_string()))
}

#[post("/api/tenants/{tenant_id}/appointments")]
pub async fn create_appointment(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    payload: JsonBody<AppointmentRequest>,
) -> Result<HttpResponse, ApiError> {
    let tenant_id = path.into_inner();
    let request = payload.into_inner();
    validated(&state, &request)?;

    let appointment = run_db(&state, move |pool| {
        check_booking_target(pool, tenant_id, request.assistant_id)?;
        Ok(appointments::create_appointment(
            pool,
            as_new_appointment(tenant_id, &request),
        )?)
    })
    .await?;

    invalidate_tenant_cache(&state, tenant_id);
    tracing::info!(
        "Booked appointment {} (event {}) for tenant {}",
        appointment.id,
        appointment.calendar_event_id,
        tenant_id
    );
    Ok(HttpResponse::Created().json(appointment))
}

/// Idempotent write used by calendar sync: the same event id always lands on
/// the same row.
#[put("/api/tenants/{tenant_id}/appointments/sync")]
pub async fn sync_appointment(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    payload: JsonBody<AppointmentRequest>,
) -> Result<HttpResponse, ApiError> {
    let tenant_id = path.into_inner();
    let request = payload.into_inner();
    validated(&state, &request)?;

    let appointment = run_db(&state, move |pool| {
        check_booking_target(pool, tenant_id, request.assistant_id)?;
        Ok(appointments::sync_appointment(
            pool,
            as_new_appointment(tenant_id, &request),
        )?)
    })
    .await?;

    state.metrics.increment_appointments_synced();
    invalidate_tenant_cache(&state, tenant_id);
    Ok(HttpResponse::Ok().json(appointment))
}

#[get("/api/tenants/{tenant_id}/appointments")]
pub async fn list_appointments(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    window: web::Query<AppointmentWindow>,
) -> Result<HttpResponse, ApiError> {
    let tenant_id = path.into_inner();
    let AppointmentWindow { from, to } = window.into_inner();

    if let (Some(from), Some(to)) = (from, to) {
        if from >= to {
            state.metrics.increment_rejected();
            return Err(ApiError::Validation(FieldErrors::single(
                "to",
                "End of the window must be after its start",
            )));
        }
    }

    let appointments = run_db(&state, move |pool| {
        require_tenant(pool, tenant_id)?;
        Ok(appointments::list_appointments(pool, tenant_id, from, to)?)
    })
    .await?;

    Ok(HttpResponse::Ok().json(appointments))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support;
    use crate::http_server::configure_app;
    use actix_web::http::StatusCode;
    use actix_web::{test, App};
    use serde_json::json;

    fn booking(start: &str, end: &str) -> serde_json::Value {
        json!({
            "assistantId": Uuid::new_v4(),
            "calendarEventId": "evt_42",
            "customerName": "Tom Jones",
            "startTime": start,
            "endTime": end,
        })
    }

    #[actix_web::test]
    async fn test_end_before_start_is_rejected() {
        let state = test_support::state();
        let app = test::init_service(App::new().app_data(state).configure(configure_app)).await;

        let req = test::TestRequest::post()
            .uri(&format!("/api/tenants/{}/appointments", Uuid::new_v4()))
            .set_json(booking("2024-07-01T10:00:00Z", "2024-07-01T09:30:00Z"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["errors"][0]["field"], "endTime");
    }

    #[actix_web::test]
    async fn test_sync_rejects_unknown_status() {
        let state = test_support::state();
        let app = test::init_service(App::new().app_data(state).configure(configure_app)).await;

        let mut body = booking("2024-07-01T09:00:00Z", "2024-07-01T09:30:00Z");
        body["status"] = json!("pencilled");

        let req = test::TestRequest::put()
            .uri(&format!("/api/tenants/{}/appointments/sync", Uuid::new_v4()))
            .set_json(body)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[actix_web::test]
    async fn test_inverted_window_is_rejected() {
        let state = test_support::state();
        let app = test::init_service(App::new().app_data(state).configure(configure_app)).await;

        let req = test::TestRequest::get()
            .uri(&format!(
                "/api/tenants/{}/appointments?from=2024-07-02T00:00:00Z&to=2024-07-01T00:00:00Z",
                Uuid::new_v4()
            ))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[actix_web::test]
    async fn test_unparseable_window_is_bad_request() {
        let state = test_support::state();
        let app = test::init_service(App::new().app_data(state).configure(configure_app)).await;

        let req = test::TestRequest::get()
            .uri(&format!("/api/tenants/{}/appointments?from=yesterday", Uuid::new_v4()))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["errors"][0]["field"], "query");
    }
}
