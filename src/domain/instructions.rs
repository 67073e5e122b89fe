use std::fmt::Write;

use super::enums::{ContentType, Industry};
use super::hours::{format_business_hours, BusinessHours};
use super::onboarding::Service;
use super::text::format_currency;

pub struct KnowledgeSnippet<'a> {
    pub content_type: ContentType,
    pub title: &'a str,
    pub content: &'a str,
}

/// Everything the default assistant prompt is built from.
pub struct AssistantContext<'a> {
    pub business_name: &'a str,
    pub industry: Option<Industry>,
    pub location: Option<&'a str>,
    pub phone: &'a str,
    pub hours: &'a BusinessHours,
    pub services: &'a [Service],
    pub knowledge: Vec<KnowledgeSnippet<'a>>,
}

pub fn build_assistant_instructions(ctx: &AssistantContext<'_>) -> String {
    let mut out = String::new();

    let sector = ctx
        .industry
        .map(|i| i.display_name().to_lowercase())
        .unwrap_or_else(|| "local".to_string());
    let _ = writeln!(
        out,
        "You are the friendly phone receptionist for {}, a {} business.",
        ctx.business_name, sector
    );
    if let Some(location) = ctx.location.filter(|l| !l.trim().is_empty()) {
        let _ = writeln!(out, "The business is located in {}.", location);
    }
    let _ = writeln!(out, "The main contact number is {}.", ctx.phone);
    let _ = writeln!(out, "Opening hours (UK time): {}.", format_business_hours(ctx.hours));

    if !ctx.services.is_empty() {
        let _ = writeln!(out, "\nServices offered:");
        for service in ctx.services {
            let _ = writeln!(
                out,
                "- {} ({} minutes, {})",
                service.name,
                service.duration.unwrap_or_default(),
                format_currency(service.price.unwrap_or_default())
            );
        }
    }

    for content_type in ContentType::all() {
        let mut section = ctx
            .knowledge
            .iter()
            .filter(|k| k.content_type == content_type)
            .peekable();
        if section.peek().is_none() {
            continue;
        }
        let _ = writeln!(out, "\n{}:", content_type.display_name());
        for snippet in section {
            let _ = writeln!(out, "### {}\n{}", snippet.title, snippet.content.trim());
        }
    }

    let _ = write!(
        out,
        "\nBe concise and polite. Offer to book an appointment when a caller asks about a service. \
         If you don't know an answer, take the caller's name and number so the team can call back."
    );

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_mentions_business_facts() {
        let hours = BusinessHours::default();
        let services = vec![Service {
            name: "Check-up".to_string(),
            duration: Some(30),
            price: Some(1234.5),
            description: None,
        }];
        let ctx = AssistantContext {
            business_name: "Smile Dental",
            industry: Some(Industry::Dental),
            location: Some("Camden, London"),
            phone: "02079460018",
            hours: &hours,
            services: &services,
            knowledge: vec![
                KnowledgeSnippet {
                    content_type: ContentType::Policy,
                    title: "Cancellations",
                    content: "Give 24 hours notice.",
                },
                KnowledgeSnippet {
                    content_type: ContentType::Faq,
                    title: "Parking",
                    content: "Free parking behind the surgery.",
                },
            ],
        };

        let prompt = build_assistant_instructions(&ctx);
        assert!(prompt.contains("Smile Dental, a dental practice business"));
        assert!(prompt.contains("Camden, London"));
        assert!(prompt.contains("Monday - Friday: 09:00 - 17:00"));
        assert!(prompt.contains("- Check-up (30 minutes, £1,234.50)"));

        let faq = prompt.find("Frequently Asked Questions").unwrap();
        let policies = prompt.find("Policies").unwrap();
        assert!(faq < policies);
    }

    #[test]
    fn test_prompt_without_optional_parts() {
        let hours = BusinessHours::default();
        let ctx = AssistantContext {
            business_name: "Acme",
            industry: None,
            location: None,
            phone: "07911123456",
            hours: &hours,
            services: &[],
            knowledge: Vec::new(),
        };

        let prompt = build_assistant_instructions(&ctx);
        assert!(prompt.contains("a local business"));
        assert!(!prompt.contains("located in"));
        assert!(!prompt.contains("Services offered"));
    }
}
