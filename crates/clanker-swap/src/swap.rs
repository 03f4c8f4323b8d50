//! Staged quote → execution lifecycle around the swap SDK.
//!
//! The facade is gated: while disabled (no pool key, no paired token, or no
//! positive amount) quotes are never requested and executions are refused
//! with an error instead of reaching the SDK.

use {
    crate::{
        domain::{Quote, SwapParams, TxStatus},
        infra::{ExecutionState, Progress, SwapExecuting, SwapQuoting},
        observer::{Query, Ticket},
    },
    alloy::primitives::B256,
    futures::{FutureExt, future::BoxFuture},
    std::{sync::Arc, time::Duration},
    tokio::time::Instant,
};

#[derive(Debug, thiserror::Error)]
pub enum ExecutionError {
    #[error("swap is not ready: missing pool, paired token or amount")]
    Disabled,
    #[error("no quote available for the current swap")]
    MissingQuote,
    #[error("no swap executor is configured, only quotes are available")]
    Unavailable,
    #[error("{0:#}")]
    Sdk(anyhow::Error),
}

/// The outcome of a quote request, tagged with the parameters it was made
/// for.
pub struct QuoteResponse {
    pub ticket: Ticket<SwapParams>,
    pub result: anyhow::Result<Quote>,
}

/// Everything needed to run an execution away from the facade. Only built
/// once an executor and a quote are known to exist.
pub struct Execution {
    executor: Arc<dyn SwapExecuting>,
    params: SwapParams,
    quote: Quote,
    progress: Progress,
}

impl Execution {
    pub fn params(&self) -> &SwapParams {
        &self.params
    }

    pub async fn run(self) -> Result<B256, ExecutionError> {
        tracing::info!(
            amount_in = %self.params.amount_in,
            min_amount_out = %self.quote.min_amount_out,
            zero_for_one = self.params.zero_for_one,
            "executing swap"
        );
        match self
            .executor
            .execute(&self.params, &self.quote, &self.progress)
            .await
        {
            Ok(tx_hash) => Ok(tx_hash),
            Err(err) => {
                self.progress.failed(format!("{err:#}"));
                Err(ExecutionError::Sdk(err))
            }
        }
    }
}

pub struct SwapFacade {
    quoter: Arc<dyn SwapQuoting>,
    executor: Option<Arc<dyn SwapExecuting>>,
    params: Option<SwapParams>,
    enabled: bool,
    quote: Query<SwapParams, Quote>,
    progress: Progress,
}

impl SwapFacade {
    pub fn new(
        quoter: Arc<dyn SwapQuoting>,
        executor: Option<Arc<dyn SwapExecuting>>,
        refetch_interval: Duration,
    ) -> Self {
        Self {
            quoter,
            executor,
            params: None,
            enabled: false,
            quote: Query::polling(refetch_interval),
            progress: Progress::new(),
        }
    }

    /// Updates the swap parameters. Changing them invalidates the quote.
    pub fn update(&mut self, params: SwapParams, enabled: bool) {
        self.quote.set_key(enabled.then(|| params.clone()));
        self.params = Some(params);
        self.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn params(&self) -> Option<&SwapParams> {
        self.params.as_ref()
    }

    pub fn next_due(&self) -> Option<Instant> {
        self.quote.next_due()
    }

    pub fn is_due(&self, now: Instant) -> bool {
        self.quote.is_due(now)
    }

    /// Starts a quote request. Returns `None` while disabled.
    pub fn refetch(&mut self, now: Instant) -> Option<BoxFuture<'static, QuoteResponse>> {
        let ticket = self.quote.begin(now)?;
        let quoter = self.quoter.clone();
        Some(
            async move {
                let result = quoter.quote(&ticket.key).await;
                QuoteResponse { ticket, result }
            }
            .boxed(),
        )
    }

    /// Applies a finished quote request. Returns whether a new quote was
    /// stored.
    pub fn complete(&mut self, response: QuoteResponse) -> bool {
        let success = response.result.is_ok();
        if let Err(err) = &response.result {
            tracing::warn!(?err, "quote failed");
        }
        self.quote.complete(&response.ticket, response.result) && success
    }

    /// Prepares the execution of the current swap. Fails without side
    /// effects unless the swap can actually be submitted.
    pub fn execution(&self) -> Result<Execution, ExecutionError> {
        let params = match &self.params {
            Some(params) if self.enabled => params.clone(),
            _ => return Err(ExecutionError::Disabled),
        };
        let executor = self.executor.clone().ok_or(ExecutionError::Unavailable)?;
        let quote = self.quote.data().copied().ok_or(ExecutionError::MissingQuote)?;
        Ok(Execution {
            executor,
            params,
            quote,
            progress: self.progress.clone(),
        })
    }

    pub fn reset(&mut self) {
        self.progress.reset();
    }

    pub fn quote(&self) -> Option<&Quote> {
        self.quote.data()
    }

    pub fn quote_error(&self) -> Option<&str> {
        self.quote.error()
    }

    pub fn is_quote_loading(&self) -> bool {
        self.quote.is_loading()
    }

    pub fn is_quote_fetching(&self) -> bool {
        self.quote.is_fetching()
    }

    pub fn state(&self) -> ExecutionState {
        self.progress.state()
    }

    pub fn status(&self) -> TxStatus {
        self.progress.state().status
    }

    pub fn progress(&self) -> &Progress {
        &self.progress
    }
}
