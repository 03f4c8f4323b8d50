use {
    crate::domain::{Balance, PoolId25, PoolKey, TokenInfo},
    alloy::{
        primitives::Address,
        providers::{DynProvider, Provider, ProviderBuilder},
    },
    anyhow::{Context, Result},
    std::future::IntoFuture,
    contracts::{IERC20, IPositionManager},
    url::Url,
};

/// Native ETH has 18 decimals on every chain we support.
pub const NATIVE_DECIMALS: u8 = 18;

#[cfg_attr(any(test, feature = "test-util"), mockall::automock)]
#[async_trait::async_trait]
pub trait PoolKeyReading: Send + Sync {
    /// Looks up the full pool key registered under a truncated pool id.
    async fn pool_key(&self, registry: Address, pool_id: PoolId25) -> Result<PoolKey>;
}

#[cfg_attr(any(test, feature = "test-util"), mockall::automock)]
#[async_trait::async_trait]
pub trait TokenInfoFetching: Send + Sync {
    async fn token_info(&self, token: Address) -> Result<TokenInfo>;
}

#[cfg_attr(any(test, feature = "test-util"), mockall::automock)]
#[async_trait::async_trait]
pub trait BalanceFetching: Send + Sync {
    async fn native_balance(&self, owner: Address) -> Result<Balance>;
    async fn token_balance(&self, owner: Address, token: Address) -> Result<Balance>;
}

/// Read-only access to the chain over JSON-RPC.
#[derive(Clone)]
pub struct Blockchain {
    provider: DynProvider,
}

impl Blockchain {
    pub fn new(rpc_url: Url) -> Self {
        Self {
            provider: ProviderBuilder::new().connect_http(rpc_url).erased(),
        }
    }

    pub fn with_provider(provider: DynProvider) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &DynProvider {
        &self.provider
    }

    pub async fn chain_id(&self) -> Result<u64> {
        self.provider
            .get_chain_id()
            .await
            .context("failed to fetch chain id")
    }
}

#[async_trait::async_trait]
impl PoolKeyReading for Blockchain {
    async fn pool_key(&self, registry: Address, pool_id: PoolId25) -> Result<PoolKey> {
        let position_manager = IPositionManager::new(registry, self.provider.clone());
        let key = position_manager
            .poolKeys(pool_id)
            .call()
            .await
            .with_context(|| format!("poolKeys({pool_id}) reverted or failed"))?;

        tracing::trace!(
            %pool_id,
            currency0 = %key.currency0,
            currency1 = %key.currency1,
            "read pool key"
        );

        Ok(PoolKey {
            currency0: key.currency0,
            currency1: key.currency1,
            fee: key.fee.to::<u32>(),
            tick_spacing: key.tickSpacing.as_i32(),
            hooks: key.hooks,
        })
    }
}

#[async_trait::async_trait]
impl TokenInfoFetching for Blockchain {
    async fn token_info(&self, token: Address) -> Result<TokenInfo> {
        let erc20 = IERC20::new(token, self.provider.clone());
        let name = erc20.name();
        let symbol = erc20.symbol();
        let decimals = erc20.decimals();
        let (name, symbol, decimals) =
            futures::join!(name.call().into_future(), symbol.call().into_future(), decimals.call().into_future());

        // Decimals are the one field a swap can't do without.
        let decimals = decimals
            .with_context(|| format!("failed to read decimals of {token}"))?;
        Ok(TokenInfo {
            name: name.ok(),
            symbol: symbol.ok(),
            decimals: Some(decimals),
        })
    }
}

#[async_trait::async_trait]
impl BalanceFetching for Blockchain {
    async fn native_balance(&self, owner: Address) -> Result<Balance> {
        let value = self
            .provider
            .get_balance(owner)
            .await
            .with_context(|| format!("failed to fetch native balance of {owner}"))?;
        Ok(Balance {
            value,
            decimals: NATIVE_DECIMALS,
        })
    }

    async fn token_balance(&self, owner: Address, token: Address) -> Result<Balance> {
        let erc20 = IERC20::new(token, self.provider.clone());
        let balance = erc20.balanceOf(owner);
        let decimals = erc20.decimals();
        let (value, decimals) = futures::join!(balance.call().into_future(), decimals.call().into_future());
        Ok(Balance {
            value: value.with_context(|| format!("failed to fetch {token} balance of {owner}"))?,
            decimals: decimals.with_context(|| format!("failed to read decimals of {token}"))?,
        })
    }
}
