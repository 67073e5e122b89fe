use crate::domain::enums::{AppointmentStatus, CallResult, ContentType, Industry, Sentiment};
use crate::domain::hours::BusinessHours;
use crate::domain::onboarding::{AppointmentSettings, Service};
use crate::schema::{
    analytics_daily_summary, appointments, assistant_performance_daily, assistants, business_info,
    calendar_tokens, call_logs, call_sentiment_analysis, knowledge_base, tenants, tools,
};
use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Queryable, Identifiable, Selectable, Serialize)]
#[diesel(table_name = tenants)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[serde(rename_all = "camelCase")]
pub struct Tenant {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub phone: Option<String>,
    pub is_active: bool,
    pub deactivated_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Insertable)]
#[diesel(table_name = tenants)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewTenant<'a> {
    pub email: &'a str,
    pub name: &'a str,
    pub phone: Option<&'a str>,
}

#[derive(AsChangeset, Default)]
#[diesel(table_name = tenants)]
pub struct UpdateTenant {
    pub name: Option<String>,
    pub phone: Option<Option<String>>,
}

#[derive(Debug, Clone, Queryable, Identifiable, Selectable, Associations, Serialize)]
#[diesel(table_name = business_info)]
#[diesel(belongs_to(Tenant))]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[serde(rename_all = "camelCase")]
pub struct BusinessInfo {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub business_name: String,
    pub industry: String,
    pub phone: String,
    pub location: Option<String>,
    pub website: Option<String>,
    pub business_hours: serde_json::Value,
    pub services: serde_json::Value,
    pub appointment_settings: serde_json::Value,
    pub calendar_provider: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BusinessInfo {
    pub fn industry_enum(&self) -> Option<Industry> {
        Industry::parse(&self.industry)
    }

    pub fn hours(&self) -> Result<BusinessHours, serde_json::Error> {
        serde_json::from_value(self.business_hours.clone())
    }

    pub fn service_list(&self) -> Result<Vec<Service>, serde_json::Error> {
        serde_json::from_value(self.services.clone())
    }

    pub fn settings(&self) -> Result<AppointmentSettings, serde_json::Error> {
        serde_json::from_value(self.appointment_settings.clone())
    }
}

#[derive(Insertable, AsChangeset)]
#[diesel(table_name = business_info)]
#[diesel(treat_none_as_null = true)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewBusinessInfo<'a> {
    pub tenant_id: Uuid,
    pub business_name: &'a str,
    pub industry: &'a str,
    pub phone: &'a str,
    pub location: Option<&'a str>,
    pub website: Option<&'a str>,
    pub business_hours: serde_json::Value,
    pub services: serde_json::Value,
    pub appointment_settings: serde_json::Value,
    pub calendar_provider: Option<&'a str>,
}

#[derive(Debug, Clone, Queryable, Identifiable, Selectable, Associations, Serialize)]
#[diesel(table_name = assistants)]
#[diesel(belongs_to(Tenant))]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[serde(rename_all = "camelCase")]
pub struct Assistant {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub vapi_assistant_id: String,
    pub name: String,
    pub voice: String,
    pub instructions: String,
    pub first_message: Option<String>,
    pub phone_number: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Insertable)]
#[diesel(table_name = assistants)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewAssistant<'a> {
    pub tenant_id: Uuid,
    pub vapi_assistant_id: &'a str,
    pub name: &'a str,
    pub voice: &'a str,
    pub instructions: &'a str,
    pub first_message: Option<&'a str>,
    pub phone_number: Option<&'a str>,
}

#[derive(AsChangeset, Default)]
#[diesel(table_name = assistants)]
pub struct UpdateAssistant {
    pub name: Option<String>,
    pub voice: Option<String>,
    pub instructions: Option<String>,
    pub first_message: Option<Option<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenState {
    Valid,
    /// Expired, but the refresh token can renew it without the owner.
    NeedsRefresh,
    /// Expired with no refresh token: the owner has to connect again.
    ReauthRequired,
}

#[derive(Debug, Clone, Queryable, Identifiable, Selectable, Associations, Serialize)]
#[diesel(table_name = calendar_tokens)]
#[diesel(belongs_to(Tenant))]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[serde(rename_all = "camelCase")]
pub struct CalendarToken {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub provider: String,
    #[serde(skip_serializing)]
    pub access_token: String,
    #[serde(skip_serializing)]
    pub refresh_token: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub calendar_id: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CalendarToken {
    pub fn state(&self, now: DateTime<Utc>) -> TokenState {
        match self.expires_at {
            Some(expires_at) if expires_at <= now => {
                if self.refresh_token.is_some() {
                    TokenState::NeedsRefresh
                } else {
                    TokenState::ReauthRequired
                }
            }
            _ => TokenState::Valid,
        }
    }
}

#[derive(Insertable)]
#[diesel(table_name = calendar_tokens)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewCalendarToken<'a> {
    pub tenant_id: Uuid,
    pub provider: &'a str,
    pub access_token: &'a str,
    pub refresh_token: Option<&'a str>,
    pub expires_at: Option<DateTime<Utc>>,
    pub calendar_id: Option<&'a str>,
}

#[derive(Debug, Clone, Queryable, Identifiable, Selectable, Associations, Serialize)]
#[diesel(table_name = appointments)]
#[diesel(belongs_to(Tenant))]
#[diesel(belongs_to(Assistant))]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub assistant_id: Uuid,
    pub calendar_event_id: String,
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub customer_email: Option<String>,
    pub service_name: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub synced_at: DateTime<Utc>,
}

impl Appointment {
    pub fn status_enum(&self) -> Option<AppointmentStatus> {
        AppointmentStatus::parse(&self.status)
    }
}

#[derive(Insertable)]
#[diesel(table_name = appointments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewAppointment<'a> {
    pub tenant_id: Uuid,
    pub assistant_id: Uuid,
    pub calendar_event_id: &'a str,
    pub customer_name: &'a str,
    pub customer_phone: Option<&'a str>,
    pub customer_email: Option<&'a str>,
    pub service_name: Option<&'a str>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: &'a str,
    pub notes: Option<&'a str>,
}

/// Fields a calendar sync is allowed to overwrite on an existing event.
#[derive(AsChangeset)]
#[diesel(table_name = appointments)]
#[diesel(treat_none_as_null = true)]
pub struct AppointmentSyncChanges<'a> {
    pub assistant_id: Uuid,
    pub customer_name: &'a str,
    pub customer_phone: Option<&'a str>,
    pub customer_email: Option<&'a str>,
    pub service_name: Option<&'a str>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: &'a str,
    pub notes: Option<&'a str>,
    pub synced_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Identifiable, Selectable, Associations, Serialize)]
#[diesel(table_name = call_logs)]
#[diesel(belongs_to(Tenant))]
#[diesel(belongs_to(Assistant))]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[serde(rename_all = "camelCase")]
pub struct CallLog {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub assistant_id: Uuid,
    pub vapi_call_id: String,
    pub caller_number: Option<String>,
    pub duration: i32,
    pub result: Option<String>,
    pub sentiment: Option<String>,
    pub summary: Option<String>,
    pub transcript: Option<String>,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl CallLog {
    pub fn result_enum(&self) -> Option<CallResult> {
        self.result.as_deref().and_then(CallResult::parse)
    }

    pub fn sentiment_enum(&self) -> Option<Sentiment> {
        self.sentiment.as_deref().and_then(Sentiment::parse)
    }
}

#[derive(Insertable)]
#[diesel(table_name = call_logs)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewCallLog<'a> {
    pub tenant_id: Uuid,
    pub assistant_id: Uuid,
    pub vapi_call_id: &'a str,
    pub caller_number: Option<&'a str>,
    pub duration: i32,
    pub result: Option<&'a str>,
    pub sentiment: Option<&'a str>,
    pub summary: Option<&'a str>,
    pub transcript: Option<&'a str>,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Queryable, Identifiable, Selectable, Associations, Serialize)]
#[diesel(table_name = knowledge_base)]
#[diesel(belongs_to(Tenant))]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeEntry {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub title: String,
    pub content: String,
    pub content_type: String,
    pub source: String,
    pub source_url: Option<String>,
    pub file_name: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl KnowledgeEntry {
    pub fn content_type_enum(&self) -> Option<ContentType> {
        ContentType::parse(&self.content_type)
    }
}

#[derive(Insertable, AsChangeset)]
#[diesel(table_name = knowledge_base)]
#[diesel(treat_none_as_null = true)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewKnowledgeEntry<'a> {
    pub tenant_id: Uuid,
    pub title: &'a str,
    pub content: &'a str,
    pub content_type: &'a str,
    pub source: &'a str,
    pub source_url: Option<&'a str>,
    pub file_name: Option<&'a str>,
}

#[derive(Debug, Clone, Queryable, Identifiable, Selectable, Associations, Serialize)]
#[diesel(table_name = tools)]
#[diesel(belongs_to(Tenant))]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[serde(rename_all = "camelCase")]
pub struct Tool {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub name: String,
    pub tool_type: String,
    pub webhook_url: String,
    pub config: serde_json::Value,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Insertable)]
#[diesel(table_name = tools)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewTool<'a> {
    pub tenant_id: Uuid,
    pub name: &'a str,
    pub tool_type: &'a str,
    pub webhook_url: &'a str,
    pub config: serde_json::Value,
}

#[derive(Debug, Clone, Queryable, Identifiable, Selectable, Serialize)]
#[diesel(table_name = analytics_daily_summary)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsDailySummary {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub date: NaiveDate,
    pub total_calls: i32,
    pub successful_calls: i32,
    pub failed_calls: i32,
    pub total_duration: i32,
    pub average_duration: f64,
    pub appointments_booked: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Insertable)]
#[diesel(table_name = analytics_daily_summary)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewAnalyticsDailySummary {
    pub tenant_id: Uuid,
    pub date: NaiveDate,
    pub total_calls: i32,
    pub successful_calls: i32,
    pub failed_calls: i32,
    pub total_duration: i32,
    pub average_duration: f64,
    pub appointments_booked: i32,
}

#[derive(Debug, Clone, Queryable, Identifiable, Selectable, Serialize)]
#[diesel(table_name = call_sentiment_analysis)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[serde(rename_all = "camelCase")]
pub struct CallSentimentAnalysis {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub date: NaiveDate,
    pub positive_count: i32,
    pub neutral_count: i32,
    pub negative_count: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Insertable)]
#[diesel(table_name = call_sentiment_analysis)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewCallSentimentAnalysis {
    pub tenant_id: Uuid,
    pub date: NaiveDate,
    pub positive_count: i32,
    pub neutral_count: i32,
    pub negative_count: i32,
}

#[derive(Debug, Clone, Queryable, Identifiable, Selectable, Serialize)]
#[diesel(table_name = assistant_performance_daily)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[serde(rename_all = "camelCase")]
pub struct AssistantPerformanceDaily {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub assistant_id: Uuid,
    pub date: NaiveDate,
    pub calls_handled: i32,
    pub success_rate: f64,
    pub average_duration: f64,
    pub appointments_booked: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Insertable)]
#[diesel(table_name = assistant_performance_daily)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewAssistantPerformanceDaily {
    pub tenant_id: Uuid,
    pub assistant_id: Uuid,
    pub date: NaiveDate,
    pub calls_handled: i32,
    pub success_rate: f64,
    pub average_duration: f64,
    pub appointments_booked: i32,
}
