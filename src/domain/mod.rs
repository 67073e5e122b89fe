pub mod enums;
pub mod hours;
pub mod instructions;
pub mod onboarding;
pub mod phone;
pub mod requests;
pub mod text;
pub mod validation;

pub use validation::{FieldError, FieldErrors};
