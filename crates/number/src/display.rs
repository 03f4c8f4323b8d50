use {rust_decimal::Decimal, std::str::FromStr};

/// Shortens a decimal amount for display: at most `precision` fractional
/// digits (rounded half away from zero) and comma separated thousands.
///
/// Inputs that don't fit a `Decimal` are returned unchanged.
pub fn format_short_amount(amount: &str, precision: u32) -> String {
    let Ok(value) = Decimal::from_str(amount) else {
        return amount.to_string();
    };
    let rounded = value
        .round_dp_with_strategy(precision, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
        .normalize();

    let text = rounded.abs().to_string();
    let (integer, fraction) = match text.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (text.as_str(), None),
    };

    let mut out = String::with_capacity(text.len() + integer.len() / 3 + 1);
    if rounded.is_sign_negative() && !rounded.is_zero() {
        out.push('-');
    }
    out.push_str(&group_thousands(integer));
    if let Some(fraction) = fraction {
        out.push('.');
        out.push_str(fraction);
    }
    out
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, digit) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}
