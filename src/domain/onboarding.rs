use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use super::enums::{CalendarProvider, Industry};
use super::hours::BusinessHours;
use super::validation::{
    invalid, not_blank, optional_website_url, service_price, uk_phone, website_url,
};

pub const MIN_APPOINTMENT_LENGTH: i64 = 15;

fn known_industry(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(invalid("required", "Industry is required"));
    }
    if Industry::parse(value).is_none() {
        return Err(invalid("industry", "Please select a valid industry"));
    }
    Ok(())
}

fn known_provider(value: &str) -> Result<(), ValidationError> {
    match CalendarProvider::parse(value) {
        Some(_) => Ok(()),
        None => Err(invalid("provider", "Calendar provider must be google or outlook")),
    }
}

// Missing strings and numbers deserialize as empty so that every absent
// field is reported by validation, not just the first one serde trips over.

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BusinessDetails {
    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "Business name is required"))]
    pub business_name: String,
    #[serde(default)]
    #[validate(custom(function = "known_industry"))]
    pub industry: String,
    #[serde(default)]
    #[validate(custom(function = "uk_phone"))]
    pub phone: String,
    #[serde(default)]
    #[validate(custom(function = "website_url"))]
    pub website: String,
    #[serde(default)]
    pub location: Option<String>,
}

impl BusinessDetails {
    pub fn industry(&self) -> Option<Industry> {
        Industry::parse(&self.industry)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "Service name is required"))]
    pub name: String,
    #[validate(
        required(message = "Duration is required"),
        range(min = 1, message = "Duration must be at least 1 minute")
    )]
    pub duration: Option<i64>,
    #[validate(required(message = "Price is required"), custom(function = "service_price"))]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// What ends up in `business_info.appointment_settings`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentSettings {
    pub appointment_length: i64,
    pub buffer_time: i64,
    #[serde(default)]
    pub max_advance_booking: Option<u32>,
    #[serde(default)]
    pub min_advance_booking: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Configuration {
    #[validate(
        required(message = "Appointment length is required"),
        range(min = 15, message = "Appointment length must be at least 15 minutes")
    )]
    pub appointment_length: Option<i64>,
    #[validate(
        required(message = "Buffer time is required"),
        range(min = 0, message = "Buffer time cannot be negative")
    )]
    pub buffer_time: Option<i64>,
    #[serde(default)]
    #[validate(length(min = 1, message = "At least one service is required"), nested)]
    pub services: Vec<Service>,
    #[validate(required(message = "Business hours are required"), nested)]
    pub business_hours: Option<BusinessHours>,
    #[serde(default)]
    pub max_advance_booking: Option<u32>,
    #[serde(default)]
    pub min_advance_booking: Option<u32>,
}

impl Configuration {
    pub fn appointment_settings(&self) -> AppointmentSettings {
        AppointmentSettings {
            appointment_length: self.appointment_length.unwrap_or(MIN_APPOINTMENT_LENGTH),
            buffer_time: self.buffer_time.unwrap_or(0),
            max_advance_booking: self.max_advance_booking,
            min_advance_booking: self.min_advance_booking,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CalendarConnection {
    #[serde(default)]
    #[validate(custom(function = "known_provider"))]
    pub provider: String,
    #[serde(default)]
    pub connected: bool,
}

impl CalendarConnection {
    pub fn provider(&self) -> Option<CalendarProvider> {
        CalendarProvider::parse(&self.provider)
    }
}

/// Text pulled off the business website by the scraping collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ScrapedContent {
    #[serde(default)]
    #[validate(custom(function = "optional_website_url"))]
    pub url: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: String,
}

impl ScrapedContent {
    pub fn has_content(&self) -> bool {
        !self.content.trim().is_empty()
    }
}

/// The whole onboarding wizard. Every part is checked before anything fails,
/// so one response carries all of the wizard's errors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingSubmission {
    #[serde(default)]
    #[validate(nested)]
    pub business_details: BusinessDetails,
    #[serde(default)]
    #[validate(nested)]
    pub scraped_content: ScrapedContent,
    #[serde(default)]
    #[validate(nested)]
    pub configuration: Configuration,
    #[serde(default)]
    #[validate(nested)]
    pub calendar_connection: CalendarConnection,
}
