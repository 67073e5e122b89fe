use std::future::Future;
use std::pin::Pin;

use actix_web::dev::Payload;
use actix_web::{web, FromRequest, HttpRequest};
use serde::de::DeserializeOwned;

use super::ApiError;
use crate::domain::FieldErrors;
use crate::http_server::count_rejection;

/// JSON body extractor that reports where in the document decoding failed.
///
/// Type errors and missing fields come back as 422 with the dotted path of
/// the offending value. Only bodies that are not JSON at all get a 400.
pub struct JsonBody<T>(pub T);

impl<T> JsonBody<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> std::ops::Deref for JsonBody<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T: DeserializeOwned + 'static> FromRequest for JsonBody<T> {
    type Error = actix_web::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let req = req.clone();
        let body = web::Bytes::from_request(&req, payload);

        Box::pin(async move {
            let bytes = body.await?;
            parse_json_body(&bytes).map(JsonBody).map_err(|err| {
                count_rejection(&req);
                tracing::debug!("Rejected body: {}", err);
                err.into()
            })
        })
    }
}

pub fn parse_json_body<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ApiError> {
    let mut deserializer = serde_json::Deserializer::from_slice(bytes);
    let value = serde_path_to_error::deserialize(&mut deserializer).map_err(|err| {
        let path = err.path().to_string();
        let inner = err.into_inner();
        if inner.is_data() {
            decode_error(&path, &inner)
        } else {
            ApiError::BadRequest {
                field: "body".to_string(),
                message: without_location(&inner),
            }
        }
    })?;

    deserializer.end().map_err(|err| ApiError::BadRequest {
        field: "body".to_string(),
        message: without_location(&err),
    })?;

    Ok(value)
}

fn decode_error(path: &str, err: &serde_json::Error) -> ApiError {
    let message = without_location(err);
    let mut field = match path {
        "" | "." => String::new(),
        path => path.to_string(),
    };

    // The path stops at the struct that lacks the field.
    if let Some(missing) = missing_field(&message) {
        if !field.is_empty() {
            field.push('.');
        }
        field.push_str(missing);
    }

    if field.is_empty() {
        field.push_str("body");
    }
    ApiError::Validation(FieldErrors::single(field, message))
}

fn missing_field(message: &str) -> Option<&str> {
    let rest = message.strip_prefix("missing field `")?;
    rest.split('`').next()
}

fn without_location(err: &serde_json::Error) -> String {
    let message = err.to_string();
    match message.rfind(" at line ") {
        Some(at) => message[..at].to_string(),
        None => message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Customer {
        full_name: String,
    }

    #[derive(Debug, Deserialize)]
    struct Booking {
        customer: Customer,
        slots: Vec<u32>,
    }

    fn field_errors(result: Result<Booking, ApiError>) -> FieldErrors {
        match result {
            Err(ApiError::Validation(errors)) => errors,
            other => panic!("expected a validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_accepts_well_formed_body() {
        let booking: Booking =
            parse_json_body(br#"{"customer": {"fullName": "Jane"}, "slots": [1, 2]}"#).unwrap();
        assert_eq!(booking.customer.full_name, "Jane");
        assert_eq!(booking.slots, vec![1, 2]);
    }

    #[test]
    fn test_missing_field_reports_full_path() {
        let errors = field_errors(parse_json_body(br#"{"customer": {}, "slots": []}"#));
        let error = errors.iter().next().unwrap();
        assert_eq!(error.field, "customer.fullName");
        assert_eq!(error.message, "missing field `fullName`");
    }

    #[test]
    fn test_missing_top_level_field() {
        let errors = field_errors(parse_json_body(br#"{"customer": {"fullName": "Jane"}}"#));
        assert!(errors.has_field("slots"));
    }

    #[test]
    fn test_wrong_type_reports_index() {
        let errors = field_errors(parse_json_body(
            br#"{"customer": {"fullName": "Jane"}, "slots": [1, "two"]}"#,
        ));
        let error = errors.iter().next().unwrap();
        assert_eq!(error.field, "slots[1]");
        assert!(error.message.starts_with("invalid type: string \"two\""));
        assert!(!error.message.contains("line"));
    }

    #[test]
    fn test_wrong_root_type_blames_body() {
        let errors = field_errors(parse_json_body(b"[1, 2, 3]"));
        assert!(errors.has_field("body"));
    }

    #[test]
    fn test_malformed_json_is_bad_request() {
        match parse_json_body::<Booking>(br#"{"customer": "#) {
            Err(ApiError::BadRequest { field, .. }) => assert_eq!(field, "body"),
            other => panic!("expected bad request, got {:?}", other),
        }
        match parse_json_body::<Booking>(br#"{"customer": {"fullName": "J"}, "slots": []} extra"#) {
            Err(ApiError::BadRequest { field, .. }) => assert_eq!(field, "body"),
            other => panic!("expected bad request, got {:?}", other),
        }
    }
}
