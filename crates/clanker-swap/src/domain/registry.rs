//! Compiled-in configuration: the tokens the client can trade and the
//! Clanker contracts on Base.

use alloy::primitives::{Address, B256, address, b256};

/// Role → address mapping of the Clanker deployment on Base.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ContractAddresses {
    pub factory: Address,
    pub position_manager: Address,
    pub hook_static_fee: Address,
    pub lp_locker_fee_conversion: Address,
    pub mev_block_delay: Address,
    pub weth: Address,
}

pub const CLANKER: ContractAddresses = ContractAddresses {
    factory: address!("0xE85A59c628F7d27878ACeB4bf3b35733630083a9"),
    position_manager: address!("0x7c5f5a4bbd8fd63184577525326123b519429bdc"),
    hook_static_fee: address!("0xb429d62f8f3bFFb98CdB9569533eA23bF0Ba28CC"),
    lp_locker_fee_conversion: address!("0x63D2DfEA64b3433F4071A98665bcD7Ca14d93496"),
    mev_block_delay: address!("0xE143f9872A33c955F23cF442BB4B1EFB3A7402A2"),
    weth: address!("0x4200000000000000000000000000000000000006"),
};

/// Fee tier of every Clanker pool (1%).
pub const POOL_FEE: u32 = 10_000;
pub const POOL_TICK_SPACING: i32 = 60;

/// Where a token's liquidity lives.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pool {
    /// Uniswap v4 pool, identified by its 32 byte pool id.
    V4(B256),
    /// Uniswap v3 pool, identified by the pool contract.
    V3(Address),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Protocol {
    V4,
    V3,
}

impl Protocol {
    pub fn label(&self) -> &'static str {
        match self {
            Protocol::V4 => "V4",
            Protocol::V3 => "V3.1",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TokenOption {
    pub address: Address,
    pub pool: Pool,
}

impl TokenOption {
    pub fn protocol(&self) -> Protocol {
        match self.pool {
            Pool::V4(_) => Protocol::V4,
            Pool::V3(_) => Protocol::V3,
        }
    }
}

pub const TOKEN_OPTIONS: [TokenOption; 4] = [
    TokenOption {
        address: address!("0xf48bC234855aB08ab2EC0cfaaEb2A80D065a3b07"),
        pool: Pool::V4(b256!(
            "0x6c8fd04c19e3c6c3efc21f6f5ae79c1453a19d971b7b7d4969df1928c380aaad"
        )),
    },
    TokenOption {
        address: address!("0x9f86dB9fc6f7c9408e8Fda3Ff8ce4e78ac7a6b07"),
        pool: Pool::V4(b256!(
            "0x9fd58e73d8047cb14ac540acd141d3fc1a41fb6252d674b730faf62fe24aa8ce"
        )),
    },
    TokenOption {
        address: address!("0xB6830e61aEBa58E07884983451D26880b4078b07"),
        pool: Pool::V4(b256!(
            "0x28e472ff6d2240d2b944af3cd823727c717281acf7d17e7a0c8ab000fa8d1589"
        )),
    },
    TokenOption {
        address: address!("0x7D928816CC9c462DD7adef911De41535E444CB07"),
        pool: Pool::V3(address!("0xFC01837343cfC2A9dDCA9e8a0a19825f6b2f0460")),
    },
];

/// Looks up a token option by address, falling back to the first option for
/// unknown tokens.
pub fn token_option(token: Address) -> &'static TokenOption {
    TOKEN_OPTIONS
        .iter()
        .find(|option| option.address == token)
        .unwrap_or(&TOKEN_OPTIONS[0])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_tokens_fall_back_to_first_option() {
        let unknown = address!("0x0000000000000000000000000000000000000001");
        assert_eq!(token_option(unknown), &TOKEN_OPTIONS[0]);
        assert_eq!(token_option(TOKEN_OPTIONS[2].address), &TOKEN_OPTIONS[2]);
    }

    #[test]
    fn lookup_ignores_checksum_casing() {
        let lowercase: Address = "0x9f86db9fc6f7c9408e8fda3ff8ce4e78ac7a6b07".parse().unwrap();
        assert_eq!(token_option(lowercase), &TOKEN_OPTIONS[1]);
    }

    #[test]
    fn only_last_option_is_v3() {
        let protocols = TOKEN_OPTIONS.map(|option| option.protocol());
        assert_eq!(
            protocols,
            [Protocol::V4, Protocol::V4, Protocol::V4, Protocol::V3]
        );
        assert_eq!(Protocol::V3.label(), "V3.1");
    }
}
