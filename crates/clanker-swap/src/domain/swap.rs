use {
    super::pool::PoolKey,
    alloy::primitives::U256,
    derive_more::Display,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum SwapDirection {
    /// Spend the paired asset (WETH/ETH) to buy the token.
    #[default]
    PairedToToken,
    /// Sell the token for the paired asset.
    TokenToPaired,
}

impl SwapDirection {
    pub fn flipped(self) -> Self {
        match self {
            Self::PairedToToken => Self::TokenToPaired,
            Self::TokenToPaired => Self::PairedToToken,
        }
    }
}

/// Everything the swap SDK needs to quote and execute a single-pool exact
/// input swap.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SwapParams {
    pub pool_key: PoolKey,
    pub amount_in: U256,
    pub zero_for_one: bool,
    pub slippage_bps: u16,
    pub use_native_eth: bool,
    pub use_native_input: bool,
    pub use_native_output: bool,
}

/// A quote for [`SwapParams`], in the output token's smallest unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Quote {
    pub amount_out: U256,
    pub min_amount_out: U256,
}

impl Quote {
    /// Applies a slippage tolerance to a quoted output amount.
    pub fn with_slippage(amount_out: U256, slippage_bps: u16) -> Self {
        let bps = U256::from(10_000u64);
        let tolerance = U256::from(slippage_bps).min(bps);
        Self {
            amount_out,
            min_amount_out: amount_out.saturating_mul(bps - tolerance) / bps,
        }
    }
}

/// Lifecycle of the swap transaction as reported by the swap SDK.
#[derive(Clone, Copy, Debug, Default, Display, PartialEq, Eq)]
pub enum TxStatus {
    #[default]
    #[display("idle")]
    Idle,
    #[display("pending")]
    Pending,
    #[display("confirming")]
    Confirming,
    #[display("confirmed")]
    Confirmed,
    #[display("failed")]
    Failed,
}

impl TxStatus {
    pub fn is_in_flight(&self) -> bool {
        matches!(self, Self::Pending | Self::Confirming)
    }
}

/// The step of a swap execution the SDK is currently working on.
#[derive(Clone, Copy, Debug, Default, Display, PartialEq, Eq)]
pub enum SwapStep {
    #[default]
    #[display("quote")]
    Quote,
    #[display("approval")]
    Approval,
    #[display("permit2")]
    Permit,
    #[display("swap")]
    Swap,
    #[display("completed")]
    Completed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn applies_slippage() {
        let quote = Quote::with_slippage(U256::from(1_000_000u64), 50);
        assert_eq!(quote.amount_out, U256::from(1_000_000u64));
        assert_eq!(quote.min_amount_out, U256::from(995_000u64));
    }

    #[test]
    fn slippage_is_capped_at_100_percent() {
        let quote = Quote::with_slippage(U256::from(1_000u64), 20_000);
        assert_eq!(quote.min_amount_out, U256::ZERO);
    }

    #[test]
    fn statuses_display_lowercase() {
        assert_eq!(TxStatus::Confirming.to_string(), "confirming");
        assert_eq!(SwapStep::Permit.to_string(), "permit2");
        assert!(TxStatus::Pending.is_in_flight());
        assert!(!TxStatus::Confirmed.is_in_flight());
    }
}
