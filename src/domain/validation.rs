use std::borrow::Cow;

use serde::Serialize;
use validator::{Validate, ValidationError, ValidationErrors, ValidationErrorsKind};

use super::phone::validate_uk_phone_number;
use super::text::validate_website_url;

pub const MAX_SERVICE_PRICE: f64 = 1_000_000.0;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Field-scoped validation failures as callers see them. `field` is a dotted
/// camelCase path such as `configuration.services[0].price`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldErrors {
    errors: Vec<FieldError>,
}

impl FieldErrors {
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        FieldErrors {
            errors: vec![FieldError {
                field: field.into(),
                message: message.into(),
            }],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.errors.iter()
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }
}

impl From<ValidationErrors> for FieldErrors {
    fn from(errors: ValidationErrors) -> Self {
        let mut flat = Vec::new();
        flatten("", &errors, &mut flat);
        // validator keeps fields in a hash map
        flat.sort_by(|a, b| a.field.cmp(&b.field).then_with(|| a.message.cmp(&b.message)));
        FieldErrors { errors: flat }
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Validation failed:")?;
        for error in &self.errors {
            writeln!(f, "  - {}: {}", error.field, error.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for FieldErrors {}

/// Runs the derived rules of `value` and flattens whatever fails.
pub fn check<T: Validate>(value: &T) -> Result<(), FieldErrors> {
    value.validate().map_err(FieldErrors::from)
}

fn flatten(prefix: &str, errors: &ValidationErrors, out: &mut Vec<FieldError>) {
    for (name, kind) in errors.errors() {
        let name: &str = name.as_ref();
        let path = if name == "__all__" {
            prefix.to_string()
        } else {
            join_path(prefix, &camel_case(name))
        };

        match kind {
            ValidationErrorsKind::Field(list) => {
                for error in list {
                    // Struct-level rules name the field they are about.
                    let field = match error.params.get("field").and_then(|f| f.as_str()) {
                        Some(field) => join_path(prefix, field),
                        None => path.clone(),
                    };
                    out.push(FieldError {
                        field: if field.is_empty() { "body".to_string() } else { field },
                        message: message_of(error),
                    });
                }
            }
            ValidationErrorsKind::Struct(inner) => flatten(&path, inner, out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    flatten(&format!("{}[{}]", path, index), inner, out);
                }
            }
        }
    }
}

fn join_path(prefix: &str, name: &str) -> String {
    match (prefix.is_empty(), name.is_empty()) {
        (true, _) => name.to_string(),
        (false, true) => prefix.to_string(),
        (false, false) => format!("{}.{}", prefix, name),
    }
}

fn camel_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper_next = false;
    for c in name.chars() {
        if c == '_' {
            upper_next = !out.is_empty();
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

fn message_of(error: &ValidationError) -> String {
    match &error.message {
        Some(message) => message.to_string(),
        None => format!("Invalid value ({})", error.code),
    }
}

/// A custom rule failure carrying its own message.
pub fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));
    error
}

/// A struct-level failure attributed to one of the struct's fields.
pub fn invalid_field(field: &'static str, code: &'static str, message: &'static str) -> ValidationError {
    let mut error = invalid(code, message);
    error.add_param(Cow::Borrowed("field"), &field);
    error
}

pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("required"));
    }
    Ok(())
}

pub fn uk_phone(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(invalid("required", "Phone number is required"));
    }
    optional_uk_phone(value)
}

/// Blank means "no number".
pub fn optional_uk_phone(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() || validate_uk_phone_number(value) {
        return Ok(());
    }
    Err(invalid("uk_phone", "Please enter a valid UK phone number"))
}

pub fn website_url(value: &str) -> Result<(), ValidationError> {
    if validate_website_url(value) {
        return Ok(());
    }
    Err(invalid("url", "Please enter a valid URL"))
}

pub fn optional_website_url(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Ok(());
    }
    website_url(value)
}

pub fn service_price(value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() || value < 0.0 {
        return Err(invalid("price", "Price cannot be negative"));
    }
    if value > MAX_SERVICE_PRICE {
        return Err(invalid("price", "Price cannot exceed £1,000,000"));
    }
    Ok(())
}

pub fn json_object(value: &serde_json::Value) -> Result<(), ValidationError> {
    if value.is_object() {
        return Ok(());
    }
    Err(invalid("json_object", "Config must be a JSON object"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Validate)]
    struct Line {
        #[validate(custom(function = "service_price"))]
        unit_price: f64,
    }

    #[derive(Validate)]
    #[validate(schema(function = "check_window", skip_on_field_errors = false))]
    struct Order {
        #[validate(custom(function = "not_blank", message = "Customer name is required"))]
        customer_name: String,
        #[validate(nested)]
        lines: Vec<Line>,
        opens: u32,
        closes: u32,
    }

    fn check_window(order: &Order) -> Result<(), ValidationError> {
        if order.opens >= order.closes {
            return Err(invalid_field("closes", "window", "Must close after it opens"));
        }
        Ok(())
    }

    fn order() -> Order {
        Order {
            customer_name: "Jane".to_string(),
            lines: vec![Line { unit_price: 10.0 }, Line { unit_price: 5.0 }],
            opens: 9,
            closes: 17,
        }
    }

    #[test]
    fn test_valid_value_passes() {
        assert!(check(&order()).is_ok());
    }

    #[test]
    fn test_paths_are_dotted_and_camel_cased() {
        let mut order = order();
        order.customer_name = "  ".to_string();
        order.lines[1].unit_price = -1.0;
        order.closes = 9;

        let errors = check(&order).unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["closes", "customerName", "lines[1].unitPrice"]);
        assert_eq!(
            errors.iter().map(|e| e.message.as_str()).collect::<Vec<_>>(),
            vec![
                "Must close after it opens",
                "Customer name is required",
                "Price cannot be negative"
            ]
        );
    }

    #[test]
    fn test_serialized_shape() {
        let errors = FieldErrors::single("website", "Please enter a valid URL");
        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"errors": [{"field": "website", "message": "Please enter a valid URL"}]})
        );
    }

    #[test]
    fn test_camel_case() {
        assert_eq!(camel_case("business_name"), "businessName");
        assert_eq!(camel_case("vapi_assistant_id"), "vapiAssistantId");
        assert_eq!(camel_case("services"), "services");
    }

    #[test]
    fn test_price_bounds() {
        assert!(service_price(0.0).is_ok());
        assert!(service_price(MAX_SERVICE_PRICE).is_ok());
        assert!(service_price(-0.01).is_err());
        assert!(service_price(1e17).is_err());
        assert!(service_price(f64::NAN).is_err());
    }

    #[test]
    fn test_optional_rules_accept_blank() {
        assert!(optional_uk_phone("").is_ok());
        assert!(optional_uk_phone("07911 123456").is_ok());
        assert!(optional_uk_phone("12345").is_err());
        assert!(uk_phone(" ").is_err());
        assert!(optional_website_url("").is_ok());
        assert!(optional_website_url("ftp://example.com").is_err());
    }
}
