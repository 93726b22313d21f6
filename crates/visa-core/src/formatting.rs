//! Number formatting for the dashboard, in the Brazilian convention
//! (`1.234,5`).

/// Format a number with `.` thousands separators and a `,` decimal mark.
///
/// # Examples
///
/// ```
/// use visa_core::formatting::format_number;
///
/// assert_eq!(format_number(1234.5, 1), "1.234,5");
/// assert_eq!(format_number(1234567.0, 0), "1.234.567");
/// assert_eq!(format_number(0.0, 2), "0,00");
/// assert_eq!(format_number(-9876.5, 1), "-9.876,5");
/// ```
pub fn format_number(value: f64, decimals: u32) -> String {
    let negative = value < 0.0;
    let abs_value = value.abs();

    // Nudge exact midpoints up before rounding (1.005 → 1.01).
    let factor = 10_f64.powi(decimals as i32);
    let epsilon = f64::EPSILON * abs_value * factor;
    let rounded = ((abs_value * factor) + epsilon).round() / factor;

    let integer_part = rounded.trunc() as u64;
    let frac_part = rounded - rounded.trunc();

    let grouped = group_thousands(&integer_part.to_string());

    let result = if decimals == 0 {
        grouped
    } else {
        let frac_str = format!("{:.prec$}", frac_part, prec = decimals as usize);
        // "0.50" → "50"
        let digits = frac_str.split_once('.').map(|(_, d)| d).unwrap_or("");
        format!("{},{}", grouped, digits)
    };

    if negative {
        format!("-{}", result)
    } else {
        result
    }
}

/// Format an integer count with thousands separators.
pub fn format_count(value: u64) -> String {
    group_thousands(&value.to_string())
}

/// Format a percentage with one decimal place, e.g. `"50,0%"`.
pub fn format_percent(value: f64) -> String {
    format!("{}%", format_number(value, 1))
}

/// `part / whole × 100`, or `0.0` when `whole` is zero.
///
/// ```
/// use visa_core::formatting::ratio_percent;
///
/// assert_eq!(ratio_percent(1.0, 2.0), 50.0);
/// assert_eq!(ratio_percent(3.0, 0.0), 0.0);
/// ```
pub fn ratio_percent(part: f64, whole: f64) -> f64 {
    if whole == 0.0 {
        return 0.0;
    }
    (part / whole) * 100.0
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Insert dots every three digits from the right of an integer string.
fn group_thousands(s: &str) -> String {
    if s.len() <= 3 {
        return s.to_string();
    }
    let chars: Vec<char> = s.chars().collect();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    let remainder = chars.len() % 3;
    for (i, &c) in chars.iter().enumerate() {
        if i != 0 && (i % 3 == remainder) {
            result.push('.');
        }
        result.push(c);
    }
    result
}

// ── Tests ──────────────────────────────────────────────────────────────────────
