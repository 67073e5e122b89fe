use actix_web::{get, post, web, HttpRequest, HttpResponse};
use chrono::{Days, NaiveDate, Utc};
use chrono_tz::Europe::London;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use super::{invalidate_tenant_cache, require_tenant, run_db, ApiError};
use crate::domain::FieldErrors;
use crate::http_server::AppState;
use crate::repository::analytics::{list_assistant_performance, list_daily_summaries, list_sentiment};
use crate::services::analytics::write_daily_rollup;

const DEFAULT_RANGE_DAYS: u64 = 30;
const MAX_RANGE_DAYS: i64 = 366;

#[derive(Debug, Deserialize)]
pub struct RollupQuery {
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct AnalyticsRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

fn uk_today() -> NaiveDate {
    Utc::now().with_timezone(&London).date_naive()
}

fn reject(state: &AppState, field: &str, message: &str) -> ApiError {
    state.metrics.increment_rejected();
    ApiError::Validation(FieldErrors::single(field, message))
}

fn days_before(date: NaiveDate, days: u64, field: &str) -> Result<NaiveDate, FieldErrors> {
    date.checked_sub_days(Days::new(days))
        .ok_or_else(|| FieldErrors::single(field, "Date is out of range"))
}

/// Resolves the requested range, defaulting to the 30 days up to yesterday.
pub fn resolve_range(
    range: &AnalyticsRange,
    today: NaiveDate,
) -> Result<(NaiveDate, NaiveDate), FieldErrors> {
    let to = match range.to {
        Some(to) => to,
        None => days_before(today, 1, "to")?,
    };
    let from = match range.from {
        Some(from) => from,
        None => days_before(to, DEFAULT_RANGE_DAYS - 1, "to")?,
    };

    if from > to {
        return Err(FieldErrors::single("from", "Start date must not be after end date"));
    }
    if (to - from).num_days() >= MAX_RANGE_DAYS {
        return Err(FieldErrors::single(
            "to",
            format!("Range cannot exceed {} days", MAX_RANGE_DAYS),
        ));
    }
    Ok((from, to))
}

/// Rolls up one finished UK day on demand (defaults to yesterday). A day
/// that already has rollups is left as it is.
#[post("/api/tenants/{tenant_id}/analytics/rollup")]
pub async fn run_rollup(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    query: web::Query<RollupQuery>,
) -> Result<HttpResponse, ApiError> {
    let tenant_id = path.into_inner();
    let today = uk_today();
    let date = match query.date {
        Some(date) => date,
        None => days_before(today, 1, "date").map_err(|errors| {
            state.metrics.increment_rejected();
            ApiError::Validation(errors)
        })?,
    };

    if date >= today {
        return Err(reject(&state, "date", "Only finished days can be rolled up"));
    }

    let outcome = run_db(&state, move |pool| {
        require_tenant(pool, tenant_id)?;
        Ok(write_daily_rollup(pool, tenant_id, date)?)
    })
    .await?;

    if !outcome.already_existed() {
        state.metrics.increment_rollups_written();
        invalidate_tenant_cache(&state, tenant_id);
    }

    Ok(HttpResponse::Ok().json(json!({
        "date": date,
        "alreadyExisted": outcome.already_existed(),
        "outcome": outcome,
    })))
}

#[get("/api/tenants/{tenant_id}/analytics")]
pub async fn get_analytics(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    range: web::Query<AnalyticsRange>,
) -> Result<HttpResponse, ApiError> {
    let tenant_id = path.into_inner();
    let (from, to) = resolve_range(&range, uk_today()).map_err(|errors| {
        state.metrics.increment_rejected();
        ApiError::Validation(errors)
    })?;

    let cache_key = req.uri().to_string();
    if let Some(cached) = state.cache.get(&cache_key) {
        return Ok(HttpResponse::Ok().json(cached));
    }

    let report = run_db(&state, move |pool| {
        require_tenant(pool, tenant_id)?;
        let summaries = list_daily_summaries(pool, tenant_id, from, to)?;
        let sentiment = list_sentiment(pool, tenant_id, from, to)?;
        let assistants = list_assistant_performance(pool, tenant_id, from, to)?;

        let total_calls: i64 = summaries.iter().map(|s| i64::from(s.total_calls)).sum();
        let successful_calls: i64 = summaries.iter().map(|s| i64::from(s.successful_calls)).sum();
        let appointments_booked: i64 = summaries.iter().map(|s| i64::from(s.appointments_booked)).sum();
        let success_rate = if total_calls == 0 {
            0.0
        } else {
            successful_calls as f64 / total_calls as f64
        };

        Ok(json!({
            "from": from,
            "to": to,
            "totals": {
                "totalCalls": total_calls,
                "successfulCalls": successful_calls,
                "successRate": success_rate,
                "appointmentsBooked": appointments_booked,
            },
            "daily": summaries,
            "sentiment": sentiment,
            "assistants": assistants,
        }))
    })
    .await?;

    state.cache.insert(cache_key, report.clone());
    Ok(HttpResponse::Ok().json(report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support;
    use crate::http_server::configure_app;
    use actix_web::http::StatusCode;
    use actix_web::App;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_default_range_ends_yesterday() {
        let range = AnalyticsRange { from: None, to: None };
        let (from, to) = resolve_range(&range, day(2024, 7, 31)).unwrap();
        assert_eq!(to, day(2024, 7, 30));
        assert_eq!(from, day(2024, 7, 1));
    }

    #[test]
    fn test_range_limits() {
        let inverted = AnalyticsRange {
            from: Some(day(2024, 7, 10)),
            to: Some(day(2024, 7, 1)),
        };
        assert!(resolve_range(&inverted, day(2024, 8, 1)).unwrap_err().has_field("from"));

        let too_long = AnalyticsRange {
            from: Some(day(2022, 1, 1)),
            to: Some(day(2024, 1, 1)),
        };
        assert!(resolve_range(&too_long, day(2024, 8, 1)).unwrap_err().has_field("to"));

        let single_day = AnalyticsRange {
            from: Some(day(2024, 7, 1)),
            to: Some(day(2024, 7, 1)),
        };
        assert!(resolve_range(&single_day, day(2024, 8, 1)).is_ok());
    }

    #[test]
    fn test_range_at_calendar_edge_is_rejected() {
        let range = AnalyticsRange {
            from: None,
            to: Some(NaiveDate::MIN),
        };
        let errors = resolve_range(&range, day(2024, 8, 1)).unwrap_err();
        assert!(errors.has_field("to"));

        let explicit = AnalyticsRange {
            from: Some(NaiveDate::MIN),
            to: Some(NaiveDate::MIN),
        };
        assert!(resolve_range(&explicit, day(2024, 8, 1)).is_ok());

        let today_is_first_day = AnalyticsRange { from: None, to: None };
        assert!(resolve_range(&today_is_first_day, NaiveDate::MIN).is_err());
    }

    #[actix_web::test]
    async fn test_out_of_range_query_date_is_unprocessable() {
        let state = test_support::state();
        let app = actix_web::test::init_service(App::new().app_data(state).configure(configure_app)).await;

        let req = actix_web::test::TestRequest::get()
            .uri(&format!(
                "/api/tenants/{}/analytics?to={}",
                Uuid::new_v4(),
                NaiveDate::MIN
            ))
            .to_request();
        let resp = actix_web::test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body: serde_json::Value = actix_web::test::read_body_json(resp).await;
        assert_eq!(body["errors"][0]["field"], "to");
    }

    #[actix_web::test]
    async fn test_rollup_of_unfinished_day_is_rejected() {
        let state = test_support::state();
        let app = actix_web::test::init_service(App::new().app_data(state).configure(configure_app)).await;

        let req = actix_web::test::TestRequest::post()
            .uri(&format!(
                "/api/tenants/{}/analytics/rollup?date={}",
                Uuid::new_v4(),
                uk_today()
            ))
            .to_request();
        let resp = actix_web::test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
