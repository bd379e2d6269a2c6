//! Numeric display contract for currency amounts.

const SUFFIXES: [(f64, &str); 4] = [
    (1e12, "T"),
    (1e9, "B"),
    (1e6, "M"),
    (1e3, "K"),
];

/// Format an amount for display: `1234` → `1.23K`, `2.5e9` → `2.50B`.
/// Amounts below one thousand are shown as whole numbers (floored).
pub fn format_number(n: f64) -> String {
    if !n.is_finite() {
        return "∞".to_string();
    }
    if n < 0.0 {
        return format!("-{}", format_number(-n));
    }
    for (threshold, suffix) in SUFFIXES {
        if n >= threshold {
            return format!("{:.2}{}", n / threshold, suffix);
        }
    }
    format!("{}", n.floor() as u64)
}

/// Format a per-second rate. Unlike balances, small rates keep one decimal
/// so a single cursor (0.1/s) is visible.
pub fn format_rate(n: f64) -> String {
    if n >= 1e3 || n <= 0.0 {
        format_number(n)
    } else if (n - n.round()).abs() < 0.05 {
        format!("{}", n.round() as u64)
    } else {
        format!("{:.1}", n)
    }
}
