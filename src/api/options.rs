use actix_web::{get, web, HttpResponse};
use serde::Serialize;
use serde_json::json;

use crate::domain::enums::{
    CalendarProvider, ContentType, Industry, ToolType, APPOINTMENT_DURATIONS, BUFFER_TIMES,
};
use crate::http_server::AppState;

const CACHE_KEY: &str = "/api/options";

#[derive(Serialize)]
struct Choice {
    value: &'static str,
    label: &'static str,
}

pub fn onboarding_options() -> serde_json::Value {
    let industries: Vec<Choice> = Industry::all()
        .into_iter()
        .map(|i| Choice {
            value: i.as_str(),
            label: i.display_name(),
        })
        .collect();
    let content_types: Vec<Choice> = ContentType::all()
        .into_iter()
        .map(|c| Choice {
            value: c.as_str(),
            label: c.display_name(),
        })
        .collect();
    let calendar_providers: Vec<&str> = CalendarProvider::all().iter().map(|p| p.as_str()).collect();
    let tool_types: Vec<&str> = ToolType::all().iter().map(|t| t.as_str()).collect();

    json!({
        "industries": industries,
        "calendarProviders": calendar_providers,
        "toolTypes": tool_types,
        "contentTypes": content_types,
        "appointmentDurations": APPOINTMENT_DURATIONS,
        "bufferTimes": BUFFER_TIMES,
    })
}

#[get("/api/options")]
pub async fn get_options(state: web::Data<AppState>) -> HttpResponse {
    if let Some(cached) = state.cache.get(CACHE_KEY) {
        return HttpResponse::Ok().json(cached);
    }

    let options = onboarding_options();
    state.cache.insert(CACHE_KEY, options.clone());
    HttpResponse::Ok().json(options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support;
    use actix_web::App;

    #[test]
    fn test_options_cover_every_enumeration() {
        let options = onboarding_options();

        assert_eq!(
            options["industries"].as_array().unwrap().len(),
            Industry::all().len()
        );
        assert_eq!(options["calendarProviders"], json!(["google", "outlook"]));
        assert_eq!(options["appointmentDurations"], json!([15, 30, 45, 60, 90, 120]));
        assert_eq!(options["bufferTimes"], json!([0, 5, 10, 15]));
        assert_eq!(options["contentTypes"][0]["value"], "faq");
    }

    #[actix_web::test]
    async fn test_get_options_is_cached() {
        let state = test_support::state();
        let app = actix_web::test::init_service(App::new().app_data(state.clone()).service(get_options)).await;

        let req = actix_web::test::TestRequest::get().uri("/api/options").to_request();
        let resp = actix_web::test::call_service(&app, req).await;
        assert!(resp.status().is_success());

        assert!(state.cache.get(CACHE_KEY).is_some());
    }
}
