use {
    alloy::{
        network::{EthereumWallet, TransactionBuilder},
        primitives::{Address, B256, Bytes, U256},
        providers::{DynProvider, Provider, ProviderBuilder},
        rpc::types::TransactionRequest,
        signers::local::PrivateKeySigner,
    },
    anyhow::Context,
    std::{sync::Mutex, time::Duration},
    url::Url,
};

/// A plain value transfer or contract call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transaction {
    pub to: Address,
    pub data: Bytes,
    pub value: U256,
}

#[derive(Debug, thiserror::Error)]
pub enum WalletError {
    #[error("wallet is not connected")]
    NotConnected,
    #[error("wallet is watch-only and cannot sign transactions")]
    WatchOnly,
    #[error("wallet cannot switch from chain {from} to chain {to}")]
    SwitchUnsupported { from: u64, to: u64 },
    #[error("transaction {0} reverted")]
    Reverted(B256),
    #[error("timed out waiting for the receipt of transaction {0}")]
    ReceiptTimeout(B256),
    #[error(transparent)]
    Rpc(#[from] anyhow::Error),
}

/// The connected account.
#[cfg_attr(any(test, feature = "test-util"), mockall::automock)]
#[async_trait::async_trait]
pub trait Wallet: Send + Sync {
    /// The connected address, `None` while disconnected.
    fn address(&self) -> Option<Address>;

    /// The chain the wallet is connected to.
    fn chain_id(&self) -> Option<u64>;

    async fn switch_chain(&self, chain_id: u64) -> Result<(), WalletError>;

    async fn send_transaction(&self, transaction: Transaction) -> Result<B256, WalletError>;

    async fn wait_for_receipt(&self, tx_hash: B256) -> Result<(), WalletError>;
}

/// A wallet backed by an RPC node and, optionally, a local private key.
/// Without a key the wallet watches an address and can only read.
pub struct ChainWallet {
    provider: DynProvider,
    address: Option<Address>,
    can_sign: bool,
    chain_id: Mutex<Option<u64>>,
    receipt_poll_interval: Duration,
    receipt_timeout: Duration,
}

impl ChainWallet {
    pub async fn connect(
        rpc_url: Url,
        signer: Option<PrivateKeySigner>,
        watch: Option<Address>,
    ) -> anyhow::Result<Self> {
        let (provider, address, can_sign) = match signer {
            Some(signer) => {
                let address = signer.address();
                let provider = ProviderBuilder::new()
                    .wallet(EthereumWallet::from(signer))
                    .connect_http(rpc_url)
                    .erased();
                (provider, Some(address), true)
            }
            None => (
                ProviderBuilder::new().connect_http(rpc_url).erased(),
                watch,
                false,
            ),
        };

        let chain_id = provider
            .get_chain_id()
            .await
            .context("failed to fetch chain id of the wallet provider")?;
        tracing::info!(?address, chain_id, can_sign, "connected wallet");

        Ok(Self {
            provider,
            address,
            can_sign,
            chain_id: Mutex::new(Some(chain_id)),
            receipt_poll_interval: Duration::from_secs(1),
            receipt_timeout: Duration::from_secs(120),
        })
    }

    pub fn provider(&self) -> &DynProvider {
        &self.provider
    }

    async fn poll_receipt(&self, tx_hash: B256) -> Result<(), WalletError> {
        loop {
            let receipt = self
                .provider
                .get_transaction_receipt(tx_hash)
                .await
                .context("failed to fetch transaction receipt")?;
            if let Some(receipt) = receipt {
                return if receipt.status() {
                    Ok(())
                } else {
                    Err(WalletError::Reverted(tx_hash))
                };
            }
            tokio::time::sleep(self.receipt_poll_interval).await;
        }
    }

    fn current_chain_id(&self) -> Option<u64> {
        self.chain_id.lock().ok().and_then(|chain_id| *chain_id)
    }
}

#[async_trait::async_trait]
impl Wallet for ChainWallet {
    fn address(&self) -> Option<Address> {
        self.address
    }

    fn chain_id(&self) -> Option<u64> {
        self.current_chain_id()
    }

    /// An RPC backed wallet can't change the node's chain, so this only
    /// re-reads the chain id and succeeds if it already matches.
    async fn switch_chain(&self, chain_id: u64) -> Result<(), WalletError> {
        let actual = self
            .provider
            .get_chain_id()
            .await
            .context("failed to fetch chain id")?;
        if let Ok(mut current) = self.chain_id.lock() {
            *current = Some(actual);
        }
        if actual == chain_id {
            Ok(())
        } else {
            Err(WalletError::SwitchUnsupported {
                from: actual,
                to: chain_id,
            })
        }
    }

    async fn send_transaction(&self, transaction: Transaction) -> Result<B256, WalletError> {
        let from = self.address.ok_or(WalletError::NotConnected)?;
        if !self.can_sign {
            return Err(WalletError::WatchOnly);
        }

        let request = TransactionRequest::default()
            .with_from(from)
            .with_to(transaction.to)
            .with_input(transaction.data)
            .with_value(transaction.value);
        let pending = self
            .provider
            .send_transaction(request)
            .await
            .context("failed to send transaction")?;
        let tx_hash = *pending.tx_hash();
        tracing::debug!(%tx_hash, to = %transaction.to, value = %transaction.value, "sent transaction");
        Ok(tx_hash)
    }

    async fn wait_for_receipt(&self, tx_hash: B256) -> Result<(), WalletError> {
        tokio::time::timeout(self.receipt_timeout, self.poll_receipt(tx_hash))
            .await
            .map_err(|_| WalletError::ReceiptTimeout(tx_hash))?
    }
}
