use alloy::primitives::U256;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseAmountError {
    #[error("negative amounts are not supported")]
    Negative,
    #[error("invalid character {0:?} in amount")]
    InvalidCharacter(char),
    #[error("amount has more than one decimal point")]
    MultipleDecimalPoints,
    #[error("amount does not fit into 256 bits")]
    Overflow,
}

/// Parses a decimal string like `"0.01"` into an integer amount scaled by
/// `10^decimals`.
///
/// An empty string or a lone `"."` parse to zero. Fractional digits beyond
/// `decimals` are rounded half-up into the last representable unit.
pub fn parse_units(amount: &str, decimals: u8) -> Result<U256, ParseAmountError> {
    let amount = amount.trim();
    if amount.starts_with('-') {
        return Err(ParseAmountError::Negative);
    }
    if let Some(invalid) = amount.chars().find(|c| !c.is_ascii_digit() && *c != '.') {
        return Err(ParseAmountError::InvalidCharacter(invalid));
    }

    let (integer, fraction) = match amount.split_once('.') {
        Some((_, fraction)) if fraction.contains('.') => {
            return Err(ParseAmountError::MultipleDecimalPoints);
        }
        Some((integer, fraction)) => (integer, fraction),
        None => (amount, ""),
    };

    let decimals = usize::from(decimals);
    let (kept, round_up) = if fraction.len() > decimals {
        let (kept, dropped) = fraction.split_at(decimals);
        (kept, dropped.bytes().next().is_some_and(|digit| digit >= b'5'))
    } else {
        (fraction, false)
    };

    let digits = format!("{integer}{kept:0<decimals$}");
    if digits.is_empty() {
        return Ok(U256::ZERO);
    }
    let value = U256::from_str_radix(&digits, 10).map_err(|_| ParseAmountError::Overflow)?;
    if round_up {
        value
            .checked_add(U256::from(1))
            .ok_or(ParseAmountError::Overflow)
    } else {
        Ok(value)
    }
}

/// Formats an integer amount as a decimal string with `decimals` fractional
/// digits, dropping trailing zeros (`1500000` at 6 decimals is `"1.5"`).
pub fn format_units(value: U256, decimals: u8) -> String {
    let digits = value.to_string();
    let decimals = usize::from(decimals);
    if decimals == 0 {
        return digits;
    }

    let padded = format!("{digits:0>width$}", width = decimals + 1);
    let (integer, fraction) = padded.split_at(padded.len() - decimals);
    let fraction = fraction.trim_end_matches('0');
    if fraction.is_empty() {
        integer.to_string()
    } else {
        format!("{integer}.{fraction}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_decimal_amounts() {
        assert_eq!(
            parse_units("0.01", 18).unwrap(),
            U256::from(10_000_000_000_000_000u64)
        );
        assert_eq!(parse_units("1", 6).unwrap(), U256::from(1_000_000u64));
        assert_eq!(parse_units("1.", 6).unwrap(), U256::from(1_000_000u64));
        assert_eq!(parse_units(".5", 6).unwrap(), U256::from(500_000u64));
        assert_eq!(parse_units(" 2.25 ", 2).unwrap(), U256::from(225u64));
        assert_eq!(parse_units("42", 0).unwrap(), U256::from(42u64));
    }

    #[test]
    fn empty_amounts_are_zero() {
        assert_eq!(parse_units("", 18).unwrap(), U256::ZERO);
        assert_eq!(parse_units(".", 18).unwrap(), U256::ZERO);
        assert_eq!(parse_units("0", 18).unwrap(), U256::ZERO);
    }

    #[test]
    fn rounds_excess_precision_half_up() {
        assert_eq!(parse_units("1.234", 2).unwrap(), U256::from(123u64));
        assert_eq!(parse_units("1.235", 2).unwrap(), U256::from(124u64));
        assert_eq!(parse_units("0.0000001", 6).unwrap(), U256::ZERO);
        assert_eq!(parse_units("0.0000005", 6).unwrap(), U256::from(1u64));
    }

    #[test]
    fn rejects_malformed_amounts() {
        assert_eq!(
            parse_units("abc", 18),
            Err(ParseAmountError::InvalidCharacter('a'))
        );
        assert_eq!(parse_units("1.2.3", 18), Err(ParseAmountError::MultipleDecimalPoints));
        assert_eq!(parse_units("-1", 18), Err(ParseAmountError::Negative));
        assert_eq!(parse_units("1e18", 18), Err(ParseAmountError::InvalidCharacter('e')));
        let huge = "9".repeat(80);
        assert_eq!(parse_units(&huge, 18), Err(ParseAmountError::Overflow));
    }

    #[test]
    fn formats_without_trailing_zeros() {
        assert_eq!(format_units(U256::from(1_500_000u64), 6), "1.5");
        assert_eq!(format_units(U256::from(1_000_000u64), 6), "1");
        assert_eq!(format_units(U256::from(1u64), 6), "0.000001");
        assert_eq!(format_units(U256::ZERO, 18), "0");
        assert_eq!(format_units(U256::from(1234u64), 0), "1234");
        assert_eq!(
            format_units(U256::from(10_000_000_000_000_000u64), 18),
            "0.01"
        );
    }
}
