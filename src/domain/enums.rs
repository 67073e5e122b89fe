use serde::{Deserialize, Serialize};

/// Appointment lengths (minutes) offered during onboarding.
pub const APPOINTMENT_DURATIONS: [u32; 6] = [15, 30, 45, 60, 90, 120];

/// Buffer between appointments (minutes) offered during onboarding.
pub const BUFFER_TIMES: [u32; 4] = [0, 5, 10, 15];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Industry {
    Healthcare,
    Dental,
    Legal,
    Beauty,
    Fitness,
    Consulting,
    Automotive,
    RealEstate,
    Veterinary,
    Education,
    Financial,
    Hospitality,
    Retail,
    ProfessionalServices,
    Others,
}

impl Industry {
    pub fn as_str(&self) -> &'static str {
        match self {
            Industry::Healthcare => "healthcare",
            Industry::Dental => "dental",
            Industry::Legal => "legal",
            Industry::Beauty => "beauty",
            Industry::Fitness => "fitness",
            Industry::Consulting => "consulting",
            Industry::Automotive => "automotive",
            Industry::RealEstate => "real-estate",
            Industry::Veterinary => "veterinary",
            Industry::Education => "education",
            Industry::Financial => "financial",
            Industry::Hospitality => "hospitality",
            Industry::Retail => "retail",
            Industry::ProfessionalServices => "professional-services",
            Industry::Others => "others",
        }
    }

    pub fn parse(s: &str) -> Option<Industry> {
        Industry::all().into_iter().find(|i| i.as_str() == s)
    }

    pub fn all() -> Vec<Industry> {
        vec![
            Industry::Healthcare,
            Industry::Dental,
            Industry::Legal,
            Industry::Beauty,
            Industry::Fitness,
            Industry::Consulting,
            Industry::Automotive,
            Industry::RealEstate,
            Industry::Veterinary,
            Industry::Education,
            Industry::Financial,
            Industry::Hospitality,
            Industry::Retail,
            Industry::ProfessionalServices,
            Industry::Others,
        ]
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Industry::Healthcare => "Healthcare & Medical",
            Industry::Dental => "Dental Practice",
            Industry::Legal => "Legal Services",
            Industry::Beauty => "Beauty & Wellness",
            Industry::Fitness => "Fitness & Sports",
            Industry::Consulting => "Consulting",
            Industry::Automotive => "Automotive Services",
            Industry::RealEstate => "Real Estate",
            Industry::Veterinary => "Veterinary",
            Industry::Education => "Education & Training",
            Industry::Financial => "Financial Services",
            Industry::Hospitality => "Hospitality",
            Industry::Retail => "Retail",
            Industry::ProfessionalServices => "Professional Services",
            Industry::Others => "Other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalendarProvider {
    Google,
    Outlook,
}

impl CalendarProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            CalendarProvider::Google => "google",
            CalendarProvider::Outlook => "outlook",
        }
    }

    pub fn parse(s: &str) -> Option<CalendarProvider> {
        match s.to_lowercase().as_str() {
            "google" => Some(CalendarProvider::Google),
            "outlook" => Some(CalendarProvider::Outlook),
            _ => None,
        }
    }

    pub fn all() -> Vec<CalendarProvider> {
        vec![CalendarProvider::Google, CalendarProvider::Outlook]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolType {
    CalendarBooking,
    AvailabilityCheck,
    AppointmentCancel,
    AppointmentReschedule,
    BusinessHoursCheck,
}

impl ToolType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolType::CalendarBooking => "calendar_booking",
            ToolType::AvailabilityCheck => "availability_check",
            ToolType::AppointmentCancel => "appointment_cancel",
            ToolType::AppointmentReschedule => "appointment_reschedule",
            ToolType::BusinessHoursCheck => "business_hours_check",
        }
    }

    pub fn parse(s: &str) -> Option<ToolType> {
        ToolType::all().into_iter().find(|t| t.as_str() == s)
    }

    pub fn all() -> Vec<ToolType> {
        vec![
            ToolType::CalendarBooking,
            ToolType::AvailabilityCheck,
            ToolType::AppointmentCancel,
            ToolType::AppointmentReschedule,
            ToolType::BusinessHoursCheck,
        ]
    }

    /// Whether the tool needs a connected calendar to do anything useful.
    pub fn requires_calendar(&self) -> bool {
        !matches!(self, ToolType::BusinessHoursCheck)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    Faq,
    Policy,
    ServiceInfo,
    BusinessInfo,
    ContactInfo,
    Pricing,
    General,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Faq => "faq",
            ContentType::Policy => "policy",
            ContentType::ServiceInfo => "service_info",
            ContentType::BusinessInfo => "business_info",
            ContentType::ContactInfo => "contact_info",
            ContentType::Pricing => "pricing",
            ContentType::General => "general",
        }
    }

    pub fn parse(s: &str) -> Option<ContentType> {
        ContentType::all().into_iter().find(|c| c.as_str() == s)
    }

    pub fn all() -> Vec<ContentType> {
        vec![
            ContentType::Faq,
            ContentType::Policy,
            ContentType::ServiceInfo,
            ContentType::BusinessInfo,
            ContentType::ContactInfo,
            ContentType::Pricing,
            ContentType::General,
        ]
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ContentType::Faq => "Frequently Asked Questions",
            ContentType::Policy => "Policies",
            ContentType::ServiceInfo => "Services",
            ContentType::BusinessInfo => "About the Business",
            ContentType::ContactInfo => "Contact Details",
            ContentType::Pricing => "Pricing",
            ContentType::General => "General Information",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KnowledgeSource {
    Manual,
    File,
    Url,
}

impl KnowledgeSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            KnowledgeSource::Manual => "manual",
            KnowledgeSource::File => "file",
            KnowledgeSource::Url => "url",
        }
    }

    pub fn parse(s: &str) -> Option<KnowledgeSource> {
        match s {
            "manual" => Some(KnowledgeSource::Manual),
            "file" => Some(KnowledgeSource::File),
            "url" => Some(KnowledgeSource::Url),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallResult {
    Pass,
    Fail,
}

impl CallResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            CallResult::Pass => "pass",
            CallResult::Fail => "fail",
        }
    }

    pub fn parse(s: &str) -> Option<CallResult> {
        match s {
            "pass" => Some(CallResult::Pass),
            "fail" => Some(CallResult::Fail),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

impl Sentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Neutral => "neutral",
            Sentiment::Negative => "negative",
        }
    }

    pub fn parse(s: &str) -> Option<Sentiment> {
        match s {
            "positive" => Some(Sentiment::Positive),
            "neutral" => Some(Sentiment::Neutral),
            "negative" => Some(Sentiment::Negative),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    #[default]
    Confirmed,
    Cancelled,
    Rescheduled,
    Completed,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Confirmed => "confirmed",
            AppointmentStatus::Cancelled => "cancelled",
            AppointmentStatus::Rescheduled => "rescheduled",
            AppointmentStatus::Completed => "completed",
        }
    }

    pub fn parse(s: &str) -> Option<AppointmentStatus> {
        match s {
            "confirmed" => Some(AppointmentStatus::Confirmed),
            "cancelled" => Some(AppointmentStatus::Cancelled),
            "rescheduled" => Some(AppointmentStatus::Rescheduled),
            "completed" => Some(AppointmentStatus::Completed),
            _ => None,
        }
    }

    /// Cancelled appointments don't count as bookings in the rollups.
    pub fn is_booking(&self) -> bool {
        !matches!(self, AppointmentStatus::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_industry_wire_names() {
        assert_eq!(Industry::parse("real-estate"), Some(Industry::RealEstate));
        assert_eq!(
            Industry::parse("professional-services"),
            Some(Industry::ProfessionalServices)
        );
        assert_eq!(Industry::parse("Real Estate"), None);

        let json = serde_json::to_string(&Industry::RealEstate).unwrap();
        assert_eq!(json, "\"real-estate\"");
    }

    #[test]
    fn test_every_enum_parses_its_own_str() {
        for industry in Industry::all() {
            assert_eq!(Industry::parse(industry.as_str()), Some(industry));
        }
        for tool in ToolType::all() {
            assert_eq!(ToolType::parse(tool.as_str()), Some(tool));
        }
        for content in ContentType::all() {
            assert_eq!(ContentType::parse(content.as_str()), Some(content));
        }
        assert_eq!(Industry::all().len(), 15);
        assert_eq!(ToolType::all().len(), 5);
        assert_eq!(ContentType::all().len(), 7);
    }

    #[test]
    fn test_calendar_provider_is_closed() {
        assert_eq!(CalendarProvider::parse("google"), Some(CalendarProvider::Google));
        assert_eq!(CalendarProvider::parse("Outlook"), Some(CalendarProvider::Outlook));
        assert_eq!(CalendarProvider::parse("icloud"), None);
        assert!(serde_json::from_str::<CalendarProvider>("\"icloud\"").is_err());
    }

    #[test]
    fn test_serde_matches_as_str() {
        let tool = serde_json::to_value(ToolType::BusinessHoursCheck).unwrap();
        assert_eq!(tool, ToolType::BusinessHoursCheck.as_str());
        let content = serde_json::to_value(ContentType::ServiceInfo).unwrap();
        assert_eq!(content, ContentType::ServiceInfo.as_str());
    }

    #[test]
    fn test_cancelled_is_not_a_booking() {
        assert!(AppointmentStatus::Confirmed.is_booking());
        assert!(AppointmentStatus::Rescheduled.is_booking());
        assert!(!AppointmentStatus::Cancelled.is_booking());
    }
}
