use crate::schema::ProductCategory;
use chrono::Month;

/// Title-cases a string the way spreadsheet exports expect: the first letter
/// after every non-alphabetic boundary is uppercased, the rest lowercased.
pub fn title_case(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut at_boundary = true;
    for ch in input.chars() {
        if ch.is_alphabetic() {
            if at_boundary {
                out.extend(ch.to_uppercase());
            } else {
                out.extend(ch.to_lowercase());
            }
            at_boundary = false;
        } else {
            out.push(ch);
            at_boundary = true;
        }
    }
    out
}

/// Known synonyms and misspellings for the states the operator covers.
/// Lookup is case-insensitive; the canonical form is on the right.
fn state_synonym(lowered: &str) -> Option<&'static str> {
    let canonical = match lowered {
        "ap" | "andhra pradesh" | "andhra pardesh" => "Andhra Pradesh",
        "tg" | "telangana" | "telengana" => "Telangana",
        "ka" | "karnataka" => "Karnataka",
        "tn" | "tamil nadu" => "Tamil Nadu",
        "kl" | "kerala" => "Kerala",
        "py" | "pondicherry" | "puducherry" => "Puducherry",
        _ => return None,
    };
    Some(canonical)
}

/// Canonicalizes a state name. Unrecognized values pass through title-cased
/// rather than failing.
pub fn normalize_state(raw: &str) -> String {
    let titled = title_case(raw.trim());
    match state_synonym(&titled.to_lowercase()) {
        Some(canonical) => canonical.to_string(),
        None => titled,
    }
}

/// Maps a month given as a number (1-12, including numeric and float
/// strings) or a name (abbreviated or full, any case) to the full English
/// month name. Anything unparseable passes through title-cased.
pub fn normalize_month(raw: &str) -> String {
    let trimmed = raw.trim();

    if let Ok(num) = trimmed.parse::<f64>() {
        if num.is_finite() {
            let month = num.trunc() as i64;
            if (1..=12).contains(&month) {
                return Month::try_from(month as u8)
                    .map(|m| m.name().to_string())
                    .unwrap_or_else(|_| title_case(trimmed));
            }
        }
        return title_case(trimmed);
    }

    match trimmed.parse::<Month>() {
        Ok(month) => month.name().to_string(),
        Err(_) => title_case(trimmed),
    }
}

/// Classifies a free-text product-type string into the fixed taxonomy by
/// substring containment, first matching rule wins.
pub fn categorize_product_type(product_type: Option<&str>) -> ProductCategory {
    let Some(raw) = product_type else {
        return ProductCategory::Other;
    };
    let lowered = raw.trim().to_lowercase();

    if lowered.contains("mobile") || lowered.contains("phone") {
        ProductCategory::MobilePhone
    } else if lowered.contains("laptop") {
        ProductCategory::Laptop
    } else if lowered.contains("tablet") {
        ProductCategory::Tablet
    } else if lowered.contains("watch") {
        if lowered.contains("apple") {
            ProductCategory::SmartWatchApple
        } else {
            ProductCategory::SmartWatchAndroid
        }
    } else {
        ProductCategory::Other
    }
}
