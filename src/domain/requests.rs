use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;
use validator::{Validate, ValidateEmail, ValidationError};

use super::enums::{AppointmentStatus, CallResult, ContentType, KnowledgeSource, Sentiment, ToolType};
use super::validation::{
    invalid, invalid_field, json_object, not_blank, optional_uk_phone, website_url,
};

fn optional_email(email: &str) -> Result<(), ValidationError> {
    if email.is_empty() || email.validate_email() {
        return Ok(());
    }
    Err(invalid("email", "Please enter a valid email address"))
}

fn known_status(status: &str) -> Result<(), ValidationError> {
    match AppointmentStatus::parse(status) {
        Some(_) => Ok(()),
        None => Err(invalid("status", "Unknown appointment status")),
    }
}

fn known_call_result(result: &str) -> Result<(), ValidationError> {
    match CallResult::parse(result) {
        Some(_) => Ok(()),
        None => Err(invalid("result", "Result must be pass, fail or null")),
    }
}

fn known_sentiment(sentiment: &str) -> Result<(), ValidationError> {
    match Sentiment::parse(sentiment) {
        Some(_) => Ok(()),
        None => Err(invalid("sentiment", "Sentiment must be positive, neutral or negative")),
    }
}

fn known_content_type(content_type: &str) -> Result<(), ValidationError> {
    match ContentType::parse(content_type) {
        Some(_) => Ok(()),
        None => Err(invalid("content_type", "Unknown content type")),
    }
}

fn known_source(source: &str) -> Result<(), ValidationError> {
    match KnowledgeSource::parse(source) {
        Some(_) => Ok(()),
        None => Err(invalid("source", "Source must be manual, file or url")),
    }
}

fn known_tool_type(tool_type: &str) -> Result<(), ValidationError> {
    match ToolType::parse(tool_type) {
        Some(_) => Ok(()),
        None => Err(invalid("tool_type", "Unknown tool type")),
    }
}

// call_logs.duration is an INTEGER column
fn call_duration(seconds: i64) -> Result<(), ValidationError> {
    if seconds < 0 {
        return Err(invalid("duration", "Duration cannot be negative"));
    }
    if seconds > i64::from(i32::MAX) {
        return Err(invalid("duration", "Duration is too large"));
    }
    Ok(())
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTenantRequest {
    #[serde(default)]
    #[validate(email(message = "Please enter a valid email address"))]
    pub email: String,
    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "Name is required"))]
    pub name: String,
    #[serde(default)]
    #[validate(custom(function = "optional_uk_phone"))]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTenantRequest {
    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "Name is required"))]
    pub name: Option<String>,
    #[serde(default)]
    #[validate(custom(function = "optional_uk_phone"))]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateAssistantRequest {
    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "Assistant ID is required"))]
    pub vapi_assistant_id: String,
    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "Assistant name is required"))]
    pub name: String,
    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "Voice is required"))]
    pub voice: String,
    #[serde(default)]
    pub instructions: Option<String>,
    #[serde(default)]
    pub first_message: Option<String>,
    #[serde(default)]
    #[validate(custom(function = "optional_uk_phone"))]
    pub phone_number: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAssistantRequest {
    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "Assistant name is required"))]
    pub name: Option<String>,
    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "Voice is required"))]
    pub voice: Option<String>,
    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "Instructions is required"))]
    pub instructions: Option<String>,
    #[serde(default)]
    pub first_message: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct StoreCalendarTokenRequest {
    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "Access token is required"))]
    pub access_token: String,
    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "Refresh token is required"))]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub calendar_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "check_appointment_times", skip_on_field_errors = false))]
pub struct AppointmentRequest {
    pub assistant_id: Uuid,
    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "Calendar event ID is required"))]
    pub calendar_event_id: String,
    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "Customer name is required"))]
    pub customer_name: String,
    #[serde(default)]
    pub customer_phone: Option<String>,
    #[serde(default)]
    #[validate(custom(function = "optional_email"))]
    pub customer_email: Option<String>,
    #[serde(default)]
    pub service_name: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[serde(default)]
    #[validate(custom(function = "known_status"))]
    pub status: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl AppointmentRequest {
    pub fn status(&self) -> AppointmentStatus {
        self.status
            .as_deref()
            .and_then(AppointmentStatus::parse)
            .unwrap_or_default()
    }
}

fn check_appointment_times(request: &AppointmentRequest) -> Result<(), ValidationError> {
    if request.start_time >= request.end_time {
        return Err(invalid_field("endTime", "time_order", "End time must be after start time"));
    }
    Ok(())
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "check_call_window", skip_on_field_errors = false))]
pub struct CallLogRequest {
    pub assistant_id: Uuid,
    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "Call ID is required"))]
    pub vapi_call_id: String,
    #[serde(default)]
    pub caller_number: Option<String>,
    #[validate(custom(function = "call_duration"))]
    pub duration: i64,
    #[serde(default)]
    #[validate(custom(function = "known_call_result"))]
    pub result: Option<String>,
    #[serde(default)]
    #[validate(custom(function = "known_sentiment"))]
    pub sentiment: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub transcript: Option<String>,
    pub started_at: DateTime<Utc>,
    #[serde(default)]
    pub ended_at: Option<DateTime<Utc>>,
}

impl CallLogRequest {
    pub fn result(&self) -> Option<CallResult> {
        self.result.as_deref().and_then(CallResult::parse)
    }

    pub fn sentiment(&self) -> Option<Sentiment> {
        self.sentiment.as_deref().and_then(Sentiment::parse)
    }
}

fn check_call_window(request: &CallLogRequest) -> Result<(), ValidationError> {
    match request.ended_at {
        Some(ended_at) if ended_at < request.started_at => Err(invalid_field(
            "endedAt",
            "time_order",
            "Call cannot end before it starts",
        )),
        _ => Ok(()),
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "check_source_details", skip_on_field_errors = false))]
pub struct KnowledgeEntryRequest {
    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "Title is required"))]
    pub title: String,
    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "Content is required"))]
    pub content: String,
    #[serde(default)]
    #[validate(custom(function = "known_content_type"))]
    pub content_type: String,
    #[serde(default)]
    #[validate(custom(function = "known_source"))]
    pub source: Option<String>,
    #[serde(default)]
    pub source_url: Option<String>,
    #[serde(default)]
    pub file_name: Option<String>,
}

impl KnowledgeEntryRequest {
    pub fn content_type(&self) -> Option<ContentType> {
        ContentType::parse(&self.content_type)
    }

    pub fn source(&self) -> KnowledgeSource {
        self.source
            .as_deref()
            .and_then(KnowledgeSource::parse)
            .unwrap_or(KnowledgeSource::Manual)
    }
}

/// URL entries need somewhere to point at, uploads need a file name.
fn check_source_details(request: &KnowledgeEntryRequest) -> Result<(), ValidationError> {
    match request.source.as_deref().and_then(KnowledgeSource::parse) {
        Some(KnowledgeSource::Url) => {
            let valid = request
                .source_url
                .as_deref()
                .is_some_and(|url| website_url(url).is_ok());
            if !valid {
                return Err(invalid_field("sourceUrl", "url", "Please enter a valid URL"));
            }
        }
        Some(KnowledgeSource::File) => {
            let named = request.file_name.as_deref().is_some_and(|f| !f.trim().is_empty());
            if !named {
                return Err(invalid_field("fileName", "required", "File name is required for uploads"));
            }
        }
        _ => {}
    }
    Ok(())
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ToolRequest {
    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "Tool name is required"))]
    pub name: String,
    #[serde(default)]
    #[validate(custom(function = "known_tool_type"))]
    pub tool_type: String,
    #[serde(default)]
    #[validate(custom(function = "website_url"))]
    pub webhook_url: Option<String>,
    #[serde(default)]
    #[validate(custom(function = "json_object"))]
    pub config: Option<serde_json::Value>,
}

impl ToolRequest {
    pub fn tool_type(&self) -> Option<ToolType> {
        ToolType::parse(&self.tool_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::validation::check;
    use chrono::TimeZone;

    fn appointment() -> AppointmentRequest {
        AppointmentRequest {
            assistant_id: Uuid::new_v4(),
            calendar_event_id: "evt_123".to_string(),
            customer_name: "Jane Doe".to_string(),
            customer_phone: Some("07911123456".to_string()),
            customer_email: None,
            service_name: Some("Check-up".to_string()),
            start_time: Utc.with_ymd_and_hms(2024, 7, 1, 9, 0, 0).unwrap(),
            end_time: Utc.with_ymd_and_hms(2024, 7, 1, 9, 30, 0).unwrap(),
            status: None,
            notes: None,
        }
    }

    #[test]
    fn test_tenant_request() {
        let request = CreateTenantRequest {
            email: "owner@smiledental.co.uk".to_string(),
            name: "Priya".to_string(),
            phone: None,
        };
        assert!(check(&request).is_ok());

        let request = CreateTenantRequest {
            email: "nope".to_string(),
            name: String::new(),
            phone: Some("555".to_string()),
        };
        let errors = check(&request).unwrap_err();
        assert!(errors.has_field("email"));
        assert!(errors.has_field("name"));
        assert!(errors.has_field("phone"));
    }

    #[test]
    fn test_appointment_time_order() {
        assert!(check(&appointment()).is_ok());
        assert_eq!(appointment().status(), AppointmentStatus::Confirmed);

        let mut request = appointment();
        request.end_time = request.start_time;
        let errors = check(&request).unwrap_err();
        assert!(errors.has_field("endTime"));
    }

    #[test]
    fn test_appointment_status_closed_set() {
        let mut request = appointment();
        request.status = Some("no-show".to_string());
        assert!(check(&request).unwrap_err().has_field("status"));

        request.status = Some("cancelled".to_string());
        assert!(check(&request).is_ok());
        assert_eq!(request.status(), AppointmentStatus::Cancelled);
    }

    #[test]
    fn test_call_log_rules() {
        let started_at = Utc.with_ymd_and_hms(2024, 7, 1, 9, 0, 0).unwrap();
        let mut request = CallLogRequest {
            assistant_id: Uuid::new_v4(),
            vapi_call_id: "call_1".to_string(),
            caller_number: None,
            duration: 0,
            result: None,
            sentiment: None,
            summary: None,
            transcript: None,
            started_at,
            ended_at: None,
        };
        assert!(check(&request).is_ok());

        request.duration = -1;
        request.result = Some("maybe".to_string());
        request.ended_at = Some(started_at - chrono::Duration::minutes(1));
        let errors = check(&request).unwrap_err();
        assert!(errors.has_field("duration"));
        assert!(errors.has_field("result"));
        assert!(errors.has_field("endedAt"));

        request.duration = 120;
        request.result = Some("pass".to_string());
        request.ended_at = None;
        assert!(check(&request).is_ok());
        assert_eq!(request.result(), Some(CallResult::Pass));
    }

    #[test]
    fn test_knowledge_entry_sources() {
        let mut request = KnowledgeEntryRequest {
            title: "Cancellation policy".to_string(),
            content: "24 hours notice please.".to_string(),
            content_type: "policy".to_string(),
            source: None,
            source_url: None,
            file_name: None,
        };
        assert!(check(&request).is_ok());
        assert_eq!(request.source(), KnowledgeSource::Manual);

        request.source = Some("url".to_string());
        assert!(check(&request).unwrap_err().has_field("sourceUrl"));
        request.source_url = Some("https://smiledental.co.uk/policies".to_string());
        assert!(check(&request).is_ok());

        request.source = Some("file".to_string());
        assert!(check(&request).unwrap_err().has_field("fileName"));

        request.source = Some("fax".to_string());
        request.content_type = "rumour".to_string();
        let errors = check(&request).unwrap_err();
        assert!(errors.has_field("source"));
        assert!(errors.has_field("contentType"));
    }

    #[test]
    fn test_tool_request() {
        let mut request = ToolRequest {
            name: "Book appointment".to_string(),
            tool_type: "calendar_booking".to_string(),
            webhook_url: None,
            config: Some(serde_json::json!({"durationMinutes": 30})),
        };
        assert!(check(&request).is_ok());

        request.tool_type = "send_sms".to_string();
        request.webhook_url = Some("ftp://hooks.example.com".to_string());
        request.config = Some(serde_json::json!([1, 2, 3]));
        let errors = check(&request).unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["config", "toolType", "webhookUrl"]);
    }

    #[test]
    fn test_missing_strings_are_reported_as_blank() {
        let request: CreateTenantRequest = serde_json::from_str("{}").unwrap();
        let errors = check(&request).unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["email", "name"]);
    }

    #[test]
    fn test_optional_customer_email() {
        let mut request = appointment();
        request.customer_email = Some(String::new());
        assert!(check(&request).is_ok());

        request.customer_email = Some("jane@".to_string());
        request.end_time = request.start_time;
        let errors = check(&request).unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["customerEmail", "endTime"]);
    }

    #[test]
    fn test_call_duration_fits_integer_column() {
        assert!(call_duration(i64::from(i32::MAX)).is_ok());
        assert!(call_duration(i64::from(i32::MAX) + 1).is_err());
        assert!(call_duration(-1).is_err());
    }
}
