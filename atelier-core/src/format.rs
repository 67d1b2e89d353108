//! Formatting helpers shared by report renderers.

use chrono::{DateTime, Utc};

/// Format an amount with two decimals and thousands separators (e.g., "1,234.50").
pub fn format_amount(amount: f64) -> String {
    let negative = amount < 0.0;
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let fraction = cents % 100;

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if negative && cents > 0 { "-" } else { "" };
    format!("{sign}{grouped}.{fraction:02}")
}

/// Format a currency amount (e.g., "$1,234.50").
pub fn format_currency(amount: f64) -> String {
    match format_amount(amount).strip_prefix('-') {
        Some(rest) => format!("-${rest}"),
        None => format!("${}", format_amount(amount)),
    }
}

/// Format a 0-100 percentage (e.g., "50%", "33.3%").
pub fn format_percent(pct: f64) -> String {
    if (pct - pct.round()).abs() < 0.05 {
        format!("{:.0}%", pct)
    } else {
        format!("{:.1}%", pct)
    }
}

/// Format a fraction as a percentage (e.g., 0.25 -> "25%").
pub fn format_ratio(ratio: f64) -> String {
    format_percent(ratio * 100.0)
}

/// Format a completion figure (e.g., "1/2 (50%)").
pub fn format_progress(done: u32, total: u32, pct: f64) -> String {
    format!("{}/{} ({})", done, total, format_percent(pct))
}

/// Format an optional timestamp as a date, or "-" if missing.
pub fn format_date_opt(ts: Option<DateTime<Utc>>) -> String {
    match ts {
        Some(ts) => ts.format("%Y-%m-%d").to_string(),
        None => "-".to_string(),
    }
}
