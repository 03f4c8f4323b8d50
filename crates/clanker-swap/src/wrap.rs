//! Wrapping native ETH into WETH ahead of a swap that spends WETH.

use {
    crate::{
        domain::Balance,
        infra::{BalanceFetching, Transaction, Wallet, WalletError},
    },
    alloy::{
        primitives::{Address, Bytes, U256},
        sol_types::SolCall,
    },
    contracts::IWETH9,
    std::sync::Arc,
};

#[derive(Debug, thiserror::Error)]
pub enum WrapError {
    #[error(transparent)]
    Wallet(#[from] WalletError),
    #[error("failed to refetch the WETH balance: {0:#}")]
    Balance(anyhow::Error),
    #[error("wrapped balance not yet updated: have {balance}, need {required}")]
    BalanceNotUpdated { balance: U256, required: U256 },
}

/// Whether a wallet error message means the user declined to sign.
pub fn is_user_rejection(message: &str) -> bool {
    let message = message.to_lowercase();
    message.contains("user rejected") || message.contains("user denied")
}

/// How much WETH is missing to spend `amount_in`, if any.
pub fn shortfall(balance: U256, amount_in: U256) -> Option<U256> {
    (amount_in > balance).then(|| amount_in - balance)
}

/// A `deposit()` call on WETH minting `value` wrapped tokens.
pub fn deposit(weth: Address, value: U256) -> Transaction {
    Transaction {
        to: weth,
        data: Bytes::from(IWETH9::depositCall {}.abi_encode()),
        value,
    }
}

#[derive(Clone)]
pub struct Wrapper {
    wallet: Arc<dyn Wallet>,
    balances: Arc<dyn BalanceFetching>,
    weth: Address,
}

impl Wrapper {
    pub fn new(wallet: Arc<dyn Wallet>, balances: Arc<dyn BalanceFetching>, weth: Address) -> Self {
        Self {
            wallet,
            balances,
            weth,
        }
    }

    /// Makes sure `owner` holds at least `amount_in` WETH, wrapping the
    /// difference to `balance` (the last known WETH balance) if needed.
    ///
    /// Returns the refetched WETH balance when a wrap happened.
    pub async fn ensure(
        &self,
        owner: Address,
        amount_in: U256,
        balance: U256,
    ) -> Result<Option<Balance>, WrapError> {
        let Some(value) = shortfall(balance, amount_in) else {
            return Ok(None);
        };

        tracing::info!(%owner, %value, "wrapping ETH before swap");
        let tx_hash = self
            .wallet
            .send_transaction(deposit(self.weth, value))
            .await?;
        self.wallet.wait_for_receipt(tx_hash).await?;
        tracing::debug!(%tx_hash, "wrap confirmed");

        let refreshed = self
            .balances
            .token_balance(owner, self.weth)
            .await
            .map_err(WrapError::Balance)?;
        if refreshed.value < amount_in {
            return Err(WrapError::BalanceNotUpdated {
                balance: refreshed.value,
                required: amount_in,
            });
        }
        Ok(Some(refreshed))
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::infra::{blockchain::MockBalanceFetching, wallet::MockWallet},
        alloy::primitives::{B256, address, b256},
        hex_literal::hex,
        mockall::Sequence,
    };

    const WETH: Address = address!("0x4200000000000000000000000000000000000006");
    const OWNER: Address = address!("0x1111111111111111111111111111111111111111");
    const WRAP_HASH: B256 =
        b256!("0x5555555555555555555555555555555555555555555555555555555555555555");

    fn weth(value: u64) -> Balance {
        Balance {
            value: U256::from(value),
            decimals: 18,
        }
    }

    #[test]
    fn deposit_calldata() {
        let tx = deposit(WETH, U256::from(7));
        assert_eq!(tx.data.as_ref(), hex!("d0e30db0"));
        assert_eq!(tx.to, WETH);
        assert_eq!(tx.value, U256::from(7));
    }

    #[test]
    fn detects_user_rejections() {
        assert!(is_user_rejection("User rejected the request."));
        assert!(is_user_rejection("MetaMask Tx Signature: User denied transaction signature."));
        assert!(!is_user_rejection("insufficient funds for gas"));
    }

    #[test]
    fn computes_shortfall() {
        assert_eq!(shortfall(U256::from(3), U256::from(10)), Some(U256::from(7)));
        assert_eq!(shortfall(U256::from(10), U256::from(10)), None);
        assert_eq!(shortfall(U256::from(11), U256::from(10)), None);
    }

    #[tokio::test]
    async fn wraps_the_shortfall_and_waits_for_the_receipt() {
        let mut seq = Sequence::new();
        let mut wallet = MockWallet::new();
        let mut balances = MockBalanceFetching::new();
        wallet
            .expect_send_transaction()
            .withf(|tx| *tx == deposit(WETH, U256::from(40)))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(WRAP_HASH));
        wallet
            .expect_wait_for_receipt()
            .withf(|hash| *hash == WRAP_HASH)
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        balances
            .expect_token_balance()
            .withf(|owner, token| *owner == OWNER && *token == WETH)
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(weth(100)));

        let wrapper = Wrapper::new(Arc::new(wallet), Arc::new(balances), WETH);
        let refreshed = wrapper
            .ensure(OWNER, U256::from(100), U256::from(60))
            .await
            .unwrap();
        assert_eq!(refreshed, Some(weth(100)));
    }

    #[tokio::test]
    async fn skips_wrapping_when_covered() {
        let mut wallet = MockWallet::new();
        wallet.expect_send_transaction().never();
        let mut balances = MockBalanceFetching::new();
        balances.expect_token_balance().never();

        let wrapper = Wrapper::new(Arc::new(wallet), Arc::new(balances), WETH);
        let refreshed = wrapper
            .ensure(OWNER, U256::from(100), U256::from(100))
            .await
            .unwrap();
        assert_eq!(refreshed, None);
    }

    #[tokio::test]
    async fn unchanged_balance_aborts() {
        let mut wallet = MockWallet::new();
        wallet
            .expect_send_transaction()
            .returning(|_| Ok(WRAP_HASH));
        wallet.expect_wait_for_receipt().returning(|_| Ok(()));
        let mut balances = MockBalanceFetching::new();
        balances
            .expect_token_balance()
            .returning(|_, _| Ok(weth(60)));

        let wrapper = Wrapper::new(Arc::new(wallet), Arc::new(balances), WETH);
        let err = wrapper
            .ensure(OWNER, U256::from(100), U256::from(60))
            .await
            .unwrap_err();
        assert!(matches!(err, WrapError::BalanceNotUpdated { .. }));
        assert!(err.to_string().starts_with("wrapped balance not yet updated"));
    }

    #[tokio::test]
    async fn reverted_wrap_aborts_before_refetch() {
        let mut wallet = MockWallet::new();
        wallet
            .expect_send_transaction()
            .returning(|_| Ok(WRAP_HASH));
        wallet
            .expect_wait_for_receipt()
            .returning(|hash| Err(WalletError::Reverted(hash)));
        let mut balances = MockBalanceFetching::new();
        balances.expect_token_balance().never();

        let wrapper = Wrapper::new(Arc::new(wallet), Arc::new(balances), WETH);
        let err = wrapper
            .ensure(OWNER, U256::from(100), U256::from(0))
            .await
            .unwrap_err();
        assert!(matches!(err, WrapError::Wallet(WalletError::Reverted(_))));
        assert!(!is_user_rejection(&err.to_string()));
    }
}
