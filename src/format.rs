// Display formatting for metric cards, tooltips and the text report.
use num_format::{Locale, ToFormattedString};

/// Format a value with a fixed number of decimals and `,` thousands
/// separators, e.g. `1,234,567.89`.
///
/// Non-finite values come back as `NaN`, `inf` or `-inf`.
pub fn number(n: f64, decimals: usize) -> String {
    if !n.is_finite() {
        return n.to_string();
    }
    let s = format!("{:.*}", decimals, n.abs());
    let (int_part, frac_part) = match s.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (s.as_str(), None),
    };
    let mut res = match int_part.parse::<u128>() {
        Ok(v) => v.to_formatted_string(&Locale::en),
        // beyond u128 (~3.4e38)
        Err(_) => group_thousands(int_part),
    };
    if let Some(frac) = frac_part {
        res.push('.');
        res.push_str(frac);
    }
    // "-0.00" reads badly on an empty dashboard
    if n.is_sign_negative() && res.chars().any(|c| ('1'..='9').contains(&c)) {
        format!("-{res}")
    } else {
        res
    }
}

/// Insert `,` every three digits of a plain digit string.
fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// `$1,234.56`
pub fn currency(n: f64) -> String {
    let body = number(n, 2);
    match body.strip_prefix('-') {
        Some(abs) => format!("-${abs}"),
        None => format!("${body}"),
    }
}

/// `1,234`
pub fn count(n: u64) -> String {
    n.to_formatted_string(&Locale::en)
}

/// Compact axis label: `12.3k`, `4.5M`.
pub fn compact(n: f64) -> String {
    let abs = n.abs();
    if abs >= 1e9 {
        format!("{:.1}B", n / 1e9)
    } else if abs >= 1e6 {
        format!("{:.1}M", n / 1e6)
    } else if abs >= 1e3 {
        format!("{:.1}k", n / 1e3)
    } else {
        format!("{n:.0}")
    }
}
