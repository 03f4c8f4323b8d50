use {
    super::swap::SwapDirection,
    alloy::primitives::{Address, B256, FixedBytes},
};

/// The on-chain pool id type of the position manager's registry. It is
/// narrower than a full v4 pool id, so ids are truncated to their first 25
/// bytes before the lookup.
pub type PoolId25 = FixedBytes<25>;

pub fn truncate_pool_id(pool_id: B256) -> PoolId25 {
    PoolId25::from_slice(&pool_id[..25])
}

/// Identifies a Uniswap v4 pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PoolKey {
    pub currency0: Address,
    pub currency1: Address,
    pub fee: u32,
    pub tick_spacing: i32,
    pub hooks: Address,
}

impl PoolKey {
    /// Builds the key of the pool between `token` and `paired`, ordering the
    /// currencies the way the pool manager does.
    pub fn for_pair(
        token: Address,
        paired: Address,
        hooks: Address,
        fee: u32,
        tick_spacing: i32,
    ) -> Self {
        let (currency0, currency1) = if token < paired {
            (token, paired)
        } else {
            (paired, token)
        };
        Self {
            currency0,
            currency1,
            fee,
            tick_spacing,
            hooks,
        }
    }

    /// The other currency of the pool, or `None` if `token` isn't part of it.
    pub fn counterpart(&self, token: Address) -> Option<Address> {
        if self.currency0 == token {
            Some(self.currency1)
        } else if self.currency1 == token {
            Some(self.currency0)
        } else {
            None
        }
    }

    /// Whether swapping `token` against `paired` in `direction` sells
    /// currency0.
    pub fn zero_for_one(&self, token: Address, paired: Address, direction: SwapDirection) -> bool {
        let input = match direction {
            SwapDirection::PairedToToken => paired,
            SwapDirection::TokenToPaired => token,
        };
        input == self.currency0
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        alloy::primitives::{address, b256},
    };

    const WETH: Address = address!("0x4200000000000000000000000000000000000006");
    const TOKEN: Address = address!("0xf48bC234855aB08ab2EC0cfaaEb2A80D065a3b07");
    const HOOK: Address = address!("0xb429d62f8f3bFFb98CdB9569533eA23bF0Ba28CC");

    #[test]
    fn truncates_pool_ids_to_25_bytes() {
        let pool_id =
            b256!("0x6c8fd04c19e3c6c3efc21f6f5ae79c1453a19d971b7b7d4969df1928c380aaad");
        let truncated = truncate_pool_id(pool_id);
        assert_eq!(
            truncated.to_string(),
            "0x6c8fd04c19e3c6c3efc21f6f5ae79c1453a19d971b7b7d4969"
        );
    }

    #[test]
    fn orders_currencies() {
        let key = PoolKey::for_pair(TOKEN, WETH, HOOK, 10_000, 60);
        assert_eq!(key.currency0, WETH);
        assert_eq!(key.currency1, TOKEN);
        assert_eq!(key, PoolKey::for_pair(WETH, TOKEN, HOOK, 10_000, 60));
    }

    #[test]
    fn direction_decides_zero_for_one() {
        let key = PoolKey::for_pair(TOKEN, WETH, HOOK, 10_000, 60);
        // WETH sorts before the token, so spending WETH sells currency0.
        assert!(key.zero_for_one(TOKEN, WETH, SwapDirection::PairedToToken));
        assert!(!key.zero_for_one(TOKEN, WETH, SwapDirection::TokenToPaired));
    }

    #[test]
    fn finds_counterpart() {
        let key = PoolKey::for_pair(TOKEN, WETH, HOOK, 10_000, 60);
        assert_eq!(key.counterpart(TOKEN), Some(WETH));
        assert_eq!(key.counterpart(WETH), Some(TOKEN));
        assert_eq!(key.counterpart(HOOK), None);
    }
}
