//! Number formatting shared by the terminal and CSV renderers.

use rust_decimal::Decimal;

/// Format with `decimals` places and `,` thousands separators.
///
/// # Examples
/// ```
/// use briefing::utils::format_grouped;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(format_grouped(dec!(1234567.891), 2), "1,234,567.89");
/// assert_eq!(format_grouped(dec!(-1234), 0), "-1,234");
/// assert_eq!(format_grouped(dec!(999.5), 0), "1,000");
/// ```
pub fn format_grouped(value: Decimal, decimals: u32) -> String {
    let rounded = value.round_dp(decimals);
    let is_negative = rounded < Decimal::ZERO;
    let formatted = format!("{:.*}", decimals as usize, rounded.abs());

    let (integer_part, decimal_part) = match formatted.split_once('.') {
        Some((int, frac)) => (int, Some(frac)),
        None => (formatted.as_str(), None),
    };

    let digits: Vec<char> = integer_part.chars().collect();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(*c);
    }

    let sign = if is_negative { "-" } else { "" };
    match decimal_part {
        Some(frac) => format!("{}{}.{}", sign, grouped, frac),
        None => format!("{}{}", sign, grouped),
    }
}

/// "12.34%"
pub fn format_percent(value: Decimal) -> String {
    format!("{:.2}%", value.round_dp(2))
}

/// Amount with two decimals: "1,234.56"
pub fn format_amount(value: Decimal) -> String {
    format_grouped(value, 2)
}

/// Whole units: "1,234"
pub fn format_count(value: Decimal) -> String {
    format_grouped(value, 0)
}

/// File-system safe name: "D&R Aktien" -> "D_R_Aktien"
pub fn file_stem(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '.' { c } else { '_' })
        .collect()
}
