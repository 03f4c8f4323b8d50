use {
    derive_more::Display,
    serde::{Deserialize, Serialize},
};

/// Chains the swap client knows how to talk to.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub enum Chain {
    #[display("Base")]
    Base,
    /// A local fork of Base (anvil/hardhat) running under the dev chain id
    /// 31337.
    #[display("Local")]
    Local,
}

impl Chain {
    pub const fn id(&self) -> u64 {
        match self {
            Self::Base => 8453,
            Self::Local => 31337,
        }
    }

    /// Block explorer used to link transactions. Local chains have none.
    pub fn explorer(&self) -> Option<&'static str> {
        match self {
            Self::Base => Some("https://basescan.org"),
            Self::Local => None,
        }
    }

    pub fn transaction_url(&self, hash: alloy::primitives::B256) -> Option<String> {
        self.explorer().map(|explorer| format!("{explorer}/tx/{hash}"))
    }
}

impl TryFrom<u64> for Chain {
    type Error = ChainIdNotSupported;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        match value {
            x if x == Self::Base.id() => Ok(Self::Base),
            x if x == Self::Local.id() => Ok(Self::Local),
            _ => Err(ChainIdNotSupported(value)),
        }
    }
}

impl From<Chain> for u64 {
    fn from(value: Chain) -> Self {
        value.id()
    }
}

#[derive(Debug, thiserror::Error)]
#[error("chain id {0} is not supported")]
pub struct ChainIdNotSupported(pub u64);

#[cfg(test)]
mod tests {
    use {super::*, alloy::primitives::b256};

    #[test]
    fn round_trips_chain_ids() {
        assert_eq!(Chain::try_from(8453).unwrap(), Chain::Base);
        assert_eq!(Chain::try_from(31337).unwrap(), Chain::Local);
        assert_eq!(Chain::Local.id(), 31337);
        assert!(Chain::try_from(1).is_err());
    }

    #[test]
    fn deserializes_from_number() {
        let chain: Chain = serde_json::from_str("8453").unwrap();
        assert_eq!(chain, Chain::Base);
        assert!(serde_json::from_str::<Chain>("10").is_err());
    }

    #[test]
    fn links_transactions_only_on_public_chains() {
        let hash = b256!("0x1111111111111111111111111111111111111111111111111111111111111111");
        assert_eq!(
            Chain::Base.transaction_url(hash).unwrap(),
            format!("https://basescan.org/tx/{hash}")
        );
        assert_eq!(Chain::Local.transaction_url(hash), None);
    }
}
