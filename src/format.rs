// src/format.rs
//! Compact display strings for market figures.

/// `1.2T`, `850.0B`, `27.5M`, `4.3K`, else two decimals.
pub fn format_number(n: f64) -> String {
    if n >= 1e12 {
        format!("{:.1}T", n / 1e12)
    } else if n >= 1e9 {
        format!("{:.1}B", n / 1e9)
    } else if n >= 1e6 {
        format!("{:.1}M", n / 1e6)
    } else if n >= 1e3 {
        format!("{:.1}K", n / 1e3)
    } else {
        format!("{n:.2}")
    }
}

/// `$43,251`, `$2.45`, `$0.5200`.
pub fn format_price(p: f64) -> String {
    if p >= 1000.0 {
        format!("${}", group_thousands(p.round() as u64))
    } else if p >= 1.0 {
        format!("${p:.2}")
    } else {
        format!("${p:.4}")
    }
}

fn group_thousands(v: u64) -> String {
    let digits = v.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// `+2.50%` / `-1.20%`.
pub fn format_change(pct: f64) -> String {
    if pct >= 0.0 {
        format!("+{pct:.2}%")
    } else {
        format!("{pct:.2}%")
    }
}
