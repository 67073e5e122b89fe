use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref UK_PHONE: Regex = Regex::new(r"^(?:\+44|0)\d{10}$").expect("valid UK phone pattern");
    static ref NOT_DIAL_CHARS: Regex = Regex::new(r"[^\d+]").expect("valid strip pattern");
}

/// True when `phone` is a UK number in national (`07911 123456`) or
/// international (`+44 7911 123456`) form. Whitespace is ignored.
pub fn validate_uk_phone_number(phone: &str) -> bool {
    let compact: String = phone.chars().filter(|c| !c.is_whitespace()).collect();
    UK_PHONE.is_match(&compact)
}

/// Best-effort normalisation to national format. Does not validate: garbage
/// in gives cleaned garbage out.
pub fn format_uk_phone_number(phone: &str) -> String {
    let cleaned = NOT_DIAL_CHARS.replace_all(phone, "");
    match cleaned.strip_prefix("+44") {
        Some(rest) => format!("0{}", rest),
        None => cleaned.into_owned(),
    }
}
