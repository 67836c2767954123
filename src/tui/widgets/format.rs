//! Number and currency formatting shared by views and the CLI

/// Format number with thousands separators
pub fn format_number(n: u64) -> String {
    group_digits(&n.to_string())
}

/// `$1,234.57`
pub fn format_currency(value: f64) -> String {
    let sign = if value < 0.0 { "-" } else { "" };
    let cents = (value.abs() * 100.0).round() as u64;
    format!("{}${}.{:02}", sign, format_number(cents / 100), cents % 100)
}

/// `$1,235` (rounded to whole dollars)
pub fn format_currency_whole(value: f64) -> String {
    let sign = if value < 0.0 { "-" } else { "" };
    format!("{}${}", sign, format_number(value.abs().round() as u64))
}

/// Short form for narrow slots: `$950`, `$12.3k`, `$1.2M`
pub fn format_currency_compact(value: f64) -> String {
    let abs = value.abs();
    let sign = if value < 0.0 { "-" } else { "" };
    if abs >= 1_000_000.0 {
        format!("{}${:.1}M", sign, abs / 1_000_000.0)
    } else if abs >= 1_000.0 {
        format!("{}${:.1}k", sign, abs / 1_000.0)
    } else {
        format!("{}${}", sign, abs.round() as u64)
    }
}

fn group_digits(digits: &str) -> String {
    let len = digits.len();
    let mut result = String::with_capacity(len + len / 3);

    // Digits are ASCII, so byte indexing is safe
    for (i, ch) in digits.bytes().enumerate() {
        if i > 0 && (len - i).is_multiple_of(3) {
            result.push(',');
        }
        result.push(ch as char);
    }

    result
}

/// Truncate to `max` display chars, ending in `…` when cut (UTF-8 safe)
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    if max == 0 {
        return String::new();
    }
    format!("{}…", s.chars().take(max - 1).collect::<String>())
}
