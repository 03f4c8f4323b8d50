use {alloy::primitives::U256, number::parse_units};

/// A user entered amount, classified for gating and messaging.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AmountInput {
    /// Nothing (or just a decimal point) was entered.
    Empty,
    /// Something was entered, but it doesn't amount to a positive quantity.
    Invalid,
    Valid(U256),
}

impl AmountInput {
    pub fn parse(text: &str, decimals: u8) -> Self {
        let trimmed = text.trim();
        if trimmed.is_empty() || trimmed == "." {
            return Self::Empty;
        }
        match parse_units(trimmed, decimals) {
            Ok(value) if !value.is_zero() => Self::Valid(value),
            _ => Self::Invalid,
        }
    }

    /// The parsed amount, zero unless valid.
    pub fn value(&self) -> U256 {
        match self {
            Self::Valid(value) => *value,
            Self::Empty | Self::Invalid => U256::ZERO,
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_with_decimals() {
        assert_eq!(
            AmountInput::parse("0.01", 18),
            AmountInput::Valid(U256::from(10_000_000_000_000_000u64))
        );
        assert_eq!(
            AmountInput::parse("2.5", 6),
            AmountInput::Valid(U256::from(2_500_000u64))
        );
    }

    #[test]
    fn classifies_missing_amounts() {
        for text in ["", ".", "   "] {
            let amount = AmountInput::parse(text, 18);
            assert_eq!(amount, AmountInput::Empty, "{text:?}");
            assert_eq!(amount.value(), U256::ZERO);
        }
    }

    #[test]
    fn classifies_invalid_amounts() {
        for text in ["abc", "0", "0.000", "1.2.3", "-1", "0.0000000000000000001"] {
            let amount = AmountInput::parse(text, 18);
            assert_eq!(amount, AmountInput::Invalid, "{text:?}");
            assert_eq!(amount.value(), U256::ZERO);
        }
    }
}
