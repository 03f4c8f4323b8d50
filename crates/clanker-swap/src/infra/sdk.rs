//! The swap SDK seam. Quoting and executing are separate capabilities: the
//! client always needs quotes, but only a signing deployment can execute.

use {
    crate::domain::{Quote, SwapParams, SwapStep, TxStatus},
    alloy::{
        primitives::{Address, B256, Bytes, aliases::{I24, U24}},
        providers::DynProvider,
    },
    anyhow::{Context, Result},
    contracts::{IV4Quoter, PoolKey as SolPoolKey, QuoteExactSingleParams},
    tokio::sync::watch,
};

#[cfg_attr(any(test, feature = "test-util"), mockall::automock)]
#[async_trait::async_trait]
pub trait SwapQuoting: Send + Sync {
    async fn quote(&self, params: &SwapParams) -> Result<Quote>;
}

#[cfg_attr(any(test, feature = "test-util"), mockall::automock)]
#[async_trait::async_trait]
pub trait SwapExecuting: Send + Sync {
    /// Performs every transaction needed for the swap (approvals included)
    /// and returns the hash of the swap transaction. Implementations report
    /// what they are doing through `progress`.
    async fn execute(&self, params: &SwapParams, quote: &Quote, progress: &Progress)
    -> Result<B256>;
}

/// What the execution sub-operation is doing right now.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExecutionState {
    pub step: SwapStep,
    pub status: TxStatus,
    pub tx_hash: Option<B256>,
    pub error: Option<String>,
}

/// Write side of the execution state, handed to [`SwapExecuting`].
#[derive(Clone, Debug)]
pub struct Progress {
    sender: watch::Sender<ExecutionState>,
}

impl Progress {
    pub fn new() -> Self {
        Self {
            sender: watch::Sender::new(ExecutionState::default()),
        }
    }

    pub fn step(&self, step: SwapStep) {
        self.sender.send_modify(|state| state.step = step);
    }

    pub fn submitted(&self, tx_hash: B256) {
        self.sender.send_modify(|state| {
            state.status = TxStatus::Pending;
            state.tx_hash = Some(tx_hash);
            state.error = None;
        });
    }

    pub fn confirming(&self) {
        self.sender
            .send_modify(|state| state.status = TxStatus::Confirming);
    }

    pub fn confirmed(&self) {
        self.sender.send_modify(|state| {
            state.status = TxStatus::Confirmed;
            state.step = SwapStep::Completed;
        });
    }

    pub fn failed(&self, error: impl ToString) {
        self.sender.send_modify(|state| {
            state.status = TxStatus::Failed;
            state.error = Some(error.to_string());
        });
    }

    pub fn reset(&self) {
        self.sender.send_replace(ExecutionState::default());
    }

    pub fn state(&self) -> ExecutionState {
        self.sender.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ExecutionState> {
        self.sender.subscribe()
    }
}

impl Default for Progress {
    fn default() -> Self {
        Self::new()
    }
}

/// Quotes exact input single-pool swaps with the Uniswap v4 quoter.
#[derive(Clone)]
pub struct QuoterSdk {
    quoter: Address,
    provider: DynProvider,
}

impl QuoterSdk {
    pub fn new(quoter: Address, provider: DynProvider) -> Self {
        Self { quoter, provider }
    }
}

#[async_trait::async_trait]
impl SwapQuoting for QuoterSdk {
    async fn quote(&self, params: &SwapParams) -> Result<Quote> {
        let key = &params.pool_key;
        let request = QuoteExactSingleParams {
            poolKey: SolPoolKey {
                currency0: key.currency0,
                currency1: key.currency1,
                fee: U24::try_from(key.fee).context("fee does not fit uint24")?,
                tickSpacing: I24::try_from(key.tick_spacing)
                    .context("tick spacing does not fit int24")?,
                hooks: key.hooks,
            },
            zeroForOne: params.zero_for_one,
            exactAmount: u128::try_from(params.amount_in)
                .context("input amount does not fit uint128")?,
            hookData: Bytes::new(),
        };

        let quoter = IV4Quoter::new(self.quoter, self.provider.clone());
        let result = quoter
            .quoteExactInputSingle(request)
            .call()
            .await
            .context("quoteExactInputSingle failed")?;

        tracing::debug!(
            amount_in = %params.amount_in,
            amount_out = %result.amountOut,
            gas_estimate = %result.gasEstimate,
            zero_for_one = params.zero_for_one,
            "quoted swap"
        );
        Ok(Quote::with_slippage(result.amountOut, params.slippage_bps))
    }
}
