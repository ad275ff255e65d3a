//! pt-BR display formatting: decimal comma, `.` thousands separator.

use chrono::{DateTime, Utc};

const VOLUME_SUFFIX: &str = "m³";

/// Fixed-decimals number with pt-BR separators, e.g. `1.234,567`.
pub fn format_decimal(value: f64, decimals: usize) -> String {
    let value = if value.is_finite() { value } else { 0.0 };
    let text = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match text.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (text.as_str(), None),
    };

    let mut out = String::with_capacity(text.len() + int_part.len() / 3 + 1);
    let negative = value < 0.0 && text.chars().any(|c| c.is_ascii_digit() && c != '0');
    if negative {
        out.push('-');
    }
    out.push_str(&group_thousands(int_part));
    if let Some(frac) = frac_part {
        out.push(',');
        out.push_str(frac);
    }
    out
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push('.');
        }
        out.push(c);
    }
    out
}

pub fn format_volume(volume: f64) -> String {
    format!("{}{VOLUME_SUFFIX}", format_decimal(volume, 3))
}

/// Formats raw input as a volume; already formatted text passes through unchanged.
pub fn normalize_volume(text: &str) -> String {
    if text.contains(VOLUME_SUFFIX) {
        return text.to_string();
    }
    format_volume(parse_number(text))
}

pub fn parse_volume(text: &str) -> f64 {
    parse_number(&text.replace(VOLUME_SUFFIX, ""))
}

pub fn format_currency(amount: f64) -> String {
    let body = format_decimal(amount, 2);
    match body.strip_prefix('-') {
        Some(positive) => format!("-R$ {positive}"),
        None => format!("R$ {body}"),
    }
}

/// Reads "R$ 1.234,56" style text. Garbage reads as zero.
pub fn parse_price(text: &str) -> f64 {
    let cleaned: String = text
        .chars()
        .filter(|c| !matches!(c, 'R' | '$' | '.') && !c.is_whitespace())
        .collect();
    cleaned.replacen(',', ".", 1).parse().unwrap_or(0.0)
}

/// Price input mask: every typed digit is a cent.
pub fn format_price_input(text: &str) -> String {
    let digits = only_digits(text);
    let cents: u64 = digits.parse().unwrap_or(0);
    format_currency(cents as f64 / 100.0)
}

/// Lenient decimal read accepting a comma; thousands dots are dropped only
/// when a comma is present.
pub fn parse_number(text: &str) -> f64 {
    let text = text.trim();
    let normalized = if text.contains(',') {
        text.replace('.', "").replacen(',', ".", 1)
    } else {
        text.to_string()
    };
    normalized.parse::<f64>().ok().filter(|v| v.is_finite()).unwrap_or(0.0)
}

pub fn only_digits(text: &str) -> String {
    text.chars().filter(char::is_ascii_digit).collect()
}

pub fn remove_formatting(text: &str) -> String {
    only_digits(text)
}

pub fn format_phone(phone: &str) -> String {
    let d = only_digits(phone);
    match d.len() {
        11 => format!("({}) {}-{}", &d[..2], &d[2..7], &d[7..]),
        10 => format!("({}) {}-{}", &d[..2], &d[2..6], &d[6..]),
        n if n >= 8 => format!("{}-{}{}", &d[..4], &d[4..8], &d[8..]),
        _ => d,
    }
}

pub fn format_cep(cep: &str) -> String {
    let d = only_digits(cep);
    if d.len() == 8 {
        format!("{}-{}", &d[..5], &d[5..])
    } else {
        d
    }
}

pub fn format_cpf(cpf: &str) -> String {
    let d = only_digits(cpf);
    if d.len() == 11 {
        format!("{}.{}.{}-{}", &d[..3], &d[3..6], &d[6..9], &d[9..])
    } else {
        d
    }
}

pub fn format_cnpj(cnpj: &str) -> String {
    let d = only_digits(cnpj);
    if d.len() == 14 {
        format!(
            "{}.{}.{}/{}-{}",
            &d[..2],
            &d[2..5],
            &d[5..8],
            &d[8..12],
            &d[12..]
        )
    } else {
        d
    }
}

pub fn is_valid_phone(phone: &str) -> bool {
    matches!(only_digits(phone).len(), 10 | 11)
}

pub fn is_valid_cep(cep: &str) -> bool {
    only_digits(cep).len() == 8
}

pub fn is_valid_cpf(cpf: &str) -> bool {
    only_digits(cpf).len() == 11
}

pub fn is_valid_cnpj(cnpj: &str) -> bool {
    only_digits(cnpj).len() == 14
}

pub fn format_date(date: DateTime<Utc>) -> String {
    date.format("%d/%m/%Y").to_string()
}

pub fn format_datetime(date: DateTime<Utc>) -> String {
    date.format("%d/%m/%Y %H:%M:%S").to_string()
}

pub fn format_quantity(quantity: u64) -> String {
    group_thousands(&quantity.to_string())
}

pub fn format_measurement(value: f64, unit: &str) -> String {
    format!("{} {unit}", format_decimal(value, 1))
}

pub fn format_percentage(value: f64) -> String {
    format!("{}%", format_decimal(value, 1))
}

pub fn format_weight(kg: f64) -> String {
    format!("{} kg", format_decimal(kg, 2))
}

pub fn format_compact_number(value: f64) -> String {
    if value >= 1_000_000.0 {
        format!("{}M", format_decimal(value / 1_000_000.0, 1))
    } else if value >= 1_000.0 {
        format!("{}K", format_decimal(value / 1_000.0, 1))
    } else {
        let text = format_decimal(value, 3);
        text.trim_end_matches('0').trim_end_matches(',').to_string()
    }
}

pub fn title_case(text: &str) -> String {
    text.to_lowercase()
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn truncate_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let head: String = text.chars().take(max_chars).collect();
    format!("{}...", head.trim())
}
