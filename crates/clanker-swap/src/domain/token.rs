use alloy::primitives::U256;

/// ERC-20 metadata. Each field is fetched separately, and tokens are not
/// required to implement all of them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TokenInfo {
    pub name: Option<String>,
    pub symbol: Option<String>,
    pub decimals: Option<u8>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Balance {
    pub value: U256,
    pub decimals: u8,
}
