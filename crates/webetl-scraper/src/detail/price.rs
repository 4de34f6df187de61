/// Parses a displayed price by keeping only its digits.
///
/// Target sites format prices like `123.000 ₫`, so `.` and `,` are treated
/// as thousands separators. Decimal prices are therefore misread
/// (`"19.99"` becomes `1999`). Text without digits, or too many digits to
/// fit an `i64`, yields `0`.
#[must_use]
pub fn parse_price(text: &str) -> i64 {
    let digits: String = text.chars().filter(char::is_ascii_digit).collect();
    digits.parse().unwrap_or(0)
}

/// Parses a machine-readable amount such as `og:price:amount`, where a `.`
/// is a decimal point. Falls back to [`parse_price`].
#[must_use]
pub fn parse_amount(text: &str) -> i64 {
    match text.trim().parse::<f64>() {
        #[allow(clippy::cast_possible_truncation)]
        Ok(amount) if amount.is_finite() && amount >= 0.0 => amount.trunc() as i64,
        _ => parse_price(text),
    }
}
