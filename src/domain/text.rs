use lazy_static::lazy_static;
use num_format::Locale;
use regex::Regex;
use url::Url;

lazy_static! {
    static ref NON_SLUG_CHARS: Regex = Regex::new(r"[^a-z0-9_\s-]").expect("valid slug pattern");
    static ref SEPARATOR_RUNS: Regex = Regex::new(r"[\s_-]+").expect("valid separator pattern");
}

pub fn slugify(text: &str) -> String {
    let lowered = text.to_lowercase();
    let stripped = NON_SLUG_CHARS.replace_all(&lowered, "");
    let dashed = SEPARATOR_RUNS.replace_all(&stripped, "-");
    dashed.trim_matches('-').to_string()
}

pub fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// GBP with en-GB grouping, e.g. `£1,234.50`. Works on the decimal
/// rendering so large amounts keep every digit.
pub fn format_currency(amount: f64) -> String {
    if !amount.is_finite() {
        return "£0.00".to_string();
    }

    let fixed = format!("{:.2}", amount.abs());
    let (pounds, pence) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let negative = amount < 0.0 && fixed.bytes().any(|b| matches!(b, b'1'..=b'9'));

    format!(
        "{}£{}.{}",
        if negative { "-" } else { "" },
        group_thousands(pounds),
        pence
    )
}

fn group_thousands(digits: &str) -> String {
    let separator = Locale::en_GB.separator();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, digit) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push_str(separator);
        }
        grouped.push(digit);
    }
    grouped
}

/// Only absolute `http`/`https` URLs are accepted.
pub fn validate_website_url(url: &str) -> bool {
    match Url::parse(url) {
        Ok(parsed) => matches!(parsed.scheme(), "http" | "https"),
        Err(_) => false,
    }
}
