//! The swap client's state and the operations driving it.
//!
//! [`Session`] is the single owner of all state. Reads and transactions run
//! as spawned tasks that report back through an [`Event`] channel; the owner
//! feeds those events to [`Session::handle`] and calls [`Session::poll`]
//! whenever a deadline from [`Session::next_deadline`] passes. Results are
//! tagged with the request they answer and dropped if that request is no
//! longer current.

pub mod refresh;
pub mod view;

#[cfg(test)]
pub(crate) mod testing;

pub use view::{TokenChoice, View};

use {
    self::refresh::{ConfirmationTracker, DelayedRefresh},
    crate::{
        countdown::RefreshCountdown,
        domain::{
            AmountInput,
            Balance,
            PoolKey,
            SwapDirection,
            SwapParams,
            TokenInfo,
            TokenOption,
            TxStatus,
            registry::{self, CLANKER, ContractAddresses, POOL_FEE, POOL_TICK_SPACING},
        },
        infra::{
            BalanceFetching,
            ExecutionState,
            PoolKeyReading,
            SwapExecuting,
            SwapQuoting,
            TokenInfoFetching,
            Wallet,
            WalletError,
            blockchain::NATIVE_DECIMALS,
        },
        observer::{Query, Ticket},
        resolver::{PoolKeyResolver, Resolution},
        swap::{Execution, QuoteResponse, SwapFacade},
        util::{Generation, Generations},
        wrap::{Wrapper, is_user_rejection},
    },
    alloy::primitives::{Address, B256, U256},
    chain::Chain,
    futures::FutureExt,
    std::{future::Future, sync::Arc, time::Duration},
    tokio::{
        sync::{mpsc, watch},
        task::JoinSet,
        time::Instant,
    },
};

/// Amount pre-filled whenever a token is selected.
pub const DEFAULT_AMOUNT: &str = "0.01";

/// The services a session talks to.
#[derive(Clone)]
pub struct Dependencies {
    pub wallet: Arc<dyn Wallet>,
    pub pool_keys: Arc<dyn PoolKeyReading>,
    pub tokens: Arc<dyn TokenInfoFetching>,
    pub balances: Arc<dyn BalanceFetching>,
    pub quoter: Arc<dyn SwapQuoting>,
    /// Without an executor the session only quotes.
    pub executor: Option<Arc<dyn SwapExecuting>>,
}

#[derive(Clone, Debug)]
pub struct Settings {
    /// The chain the wallet must be connected to.
    pub chain: Chain,
    pub contracts: ContractAddresses,
    pub slippage_bps: u16,
    pub quote_refresh: Duration,
    pub balance_refresh: Duration,
    /// Whether transaction hashes link to the block explorer. Off for local
    /// nodes, whose transactions the explorer doesn't know.
    pub explorer_links: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            chain: Chain::Base,
            contracts: CLANKER,
            slippage_bps: 50,
            quote_refresh: Duration::from_secs(30),
            balance_refresh: Duration::from_secs(15),
            explorer_links: true,
        }
    }
}

/// Which token's metadata a fetch was for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenSlot {
    /// One of the selectable tokens, by index.
    Option(usize),
    Selected,
    Paired,
}

/// The outcome of a swap attempt.
pub struct SwapFinished {
    generation: Generation,
    /// The input balance query key and its value refetched after a wrap.
    wrapped: Option<((Address, Address), Balance)>,
    result: Result<B256, String>,
}

/// A finished background task.
pub enum Event {
    PoolKey(Resolution),
    TokenInfo {
        slot: TokenSlot,
        ticket: Ticket<Address>,
        result: anyhow::Result<TokenInfo>,
    },
    NativeBalance {
        ticket: Ticket<Address>,
        result: anyhow::Result<Balance>,
    },
    InputBalance {
        ticket: Ticket<(Address, Address)>,
        result: anyhow::Result<Balance>,
    },
    Quote(QuoteResponse),
    Swap(SwapFinished),
    NetworkSwitch(Result<(), WalletError>),
}

pub struct Session {
    wallet: Arc<dyn Wallet>,
    tokens: Arc<dyn TokenInfoFetching>,
    balances: Arc<dyn BalanceFetching>,
    settings: Settings,
    events: mpsc::UnboundedSender<Event>,
    tasks: JoinSet<()>,

    selected: &'static TokenOption,
    direction: SwapDirection,
    amount: String,
    swap_error: Option<String>,
    executing: bool,
    swaps: Generations,

    resolver: PoolKeyResolver,
    options: Vec<Query<Address, TokenInfo>>,
    target: Query<Address, TokenInfo>,
    paired: Query<Address, TokenInfo>,
    native_balance: Query<Address, Balance>,
    input_balance: Query<(Address, Address), Balance>,
    facade: SwapFacade,
    wrapper: Wrapper,

    countdown: RefreshCountdown,
    confirmations: ConfirmationTracker,
    delayed_refresh: DelayedRefresh,
}

impl Session {
    /// Creates a session with the first token selected. The returned
    /// receiver yields the events to feed back into [`Session::handle`].
    pub fn new(
        dependencies: Dependencies,
        settings: Settings,
        now: Instant,
    ) -> (Self, mpsc::UnboundedReceiver<Event>) {
        let (events, receiver) = mpsc::unbounded_channel();
        let options = registry::TOKEN_OPTIONS
            .iter()
            .map(|option| {
                let mut query = Query::new();
                query.set_key(Some(option.address));
                query
            })
            .collect();

        let mut session = Self {
            wallet: dependencies.wallet.clone(),
            tokens: dependencies.tokens,
            balances: dependencies.balances.clone(),
            events,
            tasks: JoinSet::new(),
            selected: &registry::TOKEN_OPTIONS[0],
            direction: SwapDirection::default(),
            amount: DEFAULT_AMOUNT.to_string(),
            swap_error: None,
            executing: false,
            swaps: Generations::default(),
            resolver: PoolKeyResolver::new(
                dependencies.pool_keys,
                settings.contracts.position_manager,
            ),
            options,
            target: Query::new(),
            paired: Query::polling(settings.balance_refresh),
            native_balance: Query::polling(settings.balance_refresh),
            input_balance: Query::polling(settings.balance_refresh),
            facade: SwapFacade::new(
                dependencies.quoter,
                dependencies.executor,
                settings.quote_refresh,
            ),
            wrapper: Wrapper::new(
                dependencies.wallet,
                dependencies.balances,
                settings.contracts.weth,
            ),
            countdown: RefreshCountdown::new(settings.quote_refresh, now),
            confirmations: ConfirmationTracker::default(),
            delayed_refresh: DelayedRefresh::default(),
            settings,
        };
        session.resolve_pool_key();
        session.sync();
        (session, receiver)
    }

    /// Selects the token to trade. Unknown addresses select the first token.
    ///
    /// Resets the direction and amount. Refused while a swap is in progress.
    pub fn select_token(&mut self, token: Address) -> bool {
        if self.is_locked() {
            return false;
        }
        let option = registry::token_option(token);
        tracing::info!(token = %option.address, protocol = option.protocol().label(), "selected token");

        self.direction = SwapDirection::PairedToToken;
        self.amount = DEFAULT_AMOUNT.to_string();
        self.swap_error = None;
        self.executing = false;
        self.swaps.invalidate();
        self.delayed_refresh.cancel();
        if self.selected.address != option.address || self.resolver.has_failed() {
            self.selected = option;
            self.resolve_pool_key();
        }
        self.sync();
        true
    }

    pub fn set_direction(&mut self, direction: SwapDirection) -> bool {
        if self.is_locked() {
            return false;
        }
        self.direction = direction;
        self.swap_error = None;
        self.sync();
        true
    }

    /// Sets the input amount as typed, in whole units of the input token.
    pub fn set_amount(&mut self, amount: &str) -> bool {
        if self.is_locked() || self.facade.status() == TxStatus::Confirmed {
            return false;
        }
        self.amount = amount.to_string();
        self.swap_error = None;
        self.sync();
        true
    }

    /// Refetches the quote, balances and token metadata right away.
    pub fn refresh_all(&mut self, now: Instant) -> bool {
        if self.is_locked() {
            return false;
        }
        self.refresh(now);
        true
    }

    /// Starts the swap, wrapping ETH first if the input is WETH and the
    /// wallet doesn't hold enough of it.
    pub fn swap(&mut self) -> bool {
        if !self.can_swap() || self.facade.status() == TxStatus::Confirmed {
            tracing::debug!("swap is not possible right now");
            return false;
        }
        self.swap_error = None;
        let execution = match self.facade.execution() {
            Ok(execution) => execution,
            Err(err) => {
                self.swap_error = Some(err.to_string());
                return false;
            }
        };

        let wrap = match (self.wallet.address(), self.wraps_before_swap()) {
            (Some(owner), true) => Some(WrapRequest {
                owner,
                balance: self
                    .input_balance
                    .data()
                    .map(|balance| balance.value)
                    .unwrap_or_default(),
                key: self.input_balance.key().copied(),
            }),
            _ => None,
        };

        self.executing = true;
        let generation = self.swaps.next();
        let wrapper = self.wrapper.clone();
        self.spawn(async move {
            let (wrapped, result) = execute_swap(wrapper, wrap, execution).await;
            Event::Swap(SwapFinished {
                generation,
                wrapped,
                result,
            })
        });
        true
    }

    /// Clears the finished swap so a new one can be made.
    pub fn reset(&mut self, now: Instant) {
        self.facade.reset();
        self.swap_error = None;
        self.executing = false;
        self.refresh(now);
    }

    /// Asks the wallet to switch to the configured chain.
    pub fn switch_network(&mut self) {
        let wallet = self.wallet.clone();
        let chain_id = self.settings.chain.id();
        self.spawn(async move { Event::NetworkSwitch(wallet.switch_chain(chain_id).await) });
    }

    /// Applies the result of a background task.
    pub fn handle(&mut self, event: Event, now: Instant) {
        match event {
            Event::PoolKey(resolution) => {
                self.resolver.apply(resolution);
            }
            Event::TokenInfo {
                slot,
                ticket,
                result,
            } => {
                let query = match slot {
                    TokenSlot::Option(index) => match self.options.get_mut(index) {
                        Some(query) => query,
                        None => return,
                    },
                    TokenSlot::Selected => &mut self.target,
                    TokenSlot::Paired => &mut self.paired,
                };
                if let Err(err) = &result {
                    tracing::debug!(?slot, token = %ticket.key, ?err, "failed to fetch token metadata");
                }
                query.complete(&ticket, result);
            }
            Event::NativeBalance { ticket, result } => {
                self.native_balance.complete(&ticket, result);
            }
            Event::InputBalance { ticket, result } => {
                self.input_balance.complete(&ticket, result);
            }
            Event::Quote(response) => {
                if self.facade.complete(response) {
                    self.countdown
                        .quote_received(now, self.facade.status() == TxStatus::Confirmed);
                }
            }
            Event::Swap(finished) => self.swap_finished(finished, now),
            Event::NetworkSwitch(result) => {
                if let Err(err) = result {
                    let message = err.to_string();
                    tracing::warn!(%message, "failed to switch network");
                    if !is_user_rejection(&message) {
                        self.swap_error = Some(message);
                    }
                }
            }
        }
        self.sync();
        self.observe_quote(now);
    }

    /// Starts whatever fetches are due and runs timers that have expired.
    pub fn poll(&mut self, now: Instant) {
        while self.tasks.try_join_next().is_some() {}
        self.sync();

        for index in 0..self.options.len() {
            if self.options[index].is_due(now) {
                if let Some(ticket) = self.options[index].begin(now) {
                    self.fetch_token_info(TokenSlot::Option(index), ticket);
                }
            }
        }
        if self.target.is_due(now) {
            self.fetch_target(now);
        }
        if self.paired.is_due(now) {
            self.fetch_paired(now);
        }
        if self.native_balance.is_due(now) {
            self.fetch_native_balance(now);
        }
        if self.input_balance.is_due(now) {
            self.fetch_input_balance(now);
        }
        if self.facade.is_due(now) {
            self.fetch_quote(now);
        }

        self.observe_confirmation(now);
        if self.delayed_refresh.take_due(now) {
            tracing::debug!("delayed post-swap refresh");
            self.refresh(now);
        }
        self.observe_quote(now);
    }

    /// The next time [`Session::poll`] has work to do.
    pub fn next_deadline(&self, now: Instant) -> Option<Instant> {
        let (has_quote, confirmed) = self.countdown_state();
        self.options
            .iter()
            .map(Query::next_due)
            .chain([
                self.target.next_due(),
                self.paired.next_due(),
                self.native_balance.next_due(),
                self.input_balance.next_due(),
                self.facade.next_due(),
                self.countdown.next_tick(now, has_quote, confirmed),
                self.delayed_refresh.deadline(),
            ])
            .flatten()
            .min()
    }

    /// Watches the swap's progress, which changes outside of events.
    pub fn progress(&self) -> watch::Receiver<ExecutionState> {
        self.facade.progress().subscribe()
    }

    /// Drops pending timers and aborts running tasks.
    pub fn shutdown(&mut self) {
        self.resolver.cancel();
        self.delayed_refresh.cancel();
        self.tasks.abort_all();
    }

    fn is_locked(&self) -> bool {
        self.executing || self.facade.status().is_in_flight()
    }

    fn resolve_pool_key(&mut self) {
        if let Some(read) = self.resolver.resolve(self.selected) {
            self.spawn(read.map(Event::PoolKey));
        }
    }

    /// Re-keys every query on the current selection and wallet.
    fn sync(&mut self) {
        let owner = self.wallet.address();
        self.target.set_key(Some(self.selected.address));
        self.paired.set_key(self.paired_token());
        self.native_balance.set_key(owner);
        self.input_balance.set_key(owner.zip(self.input_token()));

        let enabled = self.resolver.pool_key().is_some()
            && self.paired_token().is_some()
            && self.amount_input().is_valid();
        self.facade.update(self.swap_params(), enabled);
    }

    fn refresh(&mut self, now: Instant) {
        if self.resolver.has_failed() {
            self.resolve_pool_key();
        }
        self.sync();
        self.fetch_quote(now);
        self.fetch_native_balance(now);
        self.fetch_input_balance(now);
        self.fetch_target(now);
        self.fetch_paired(now);
        self.countdown.reset(now);
    }

    fn swap_finished(&mut self, finished: SwapFinished, now: Instant) {
        if !self.swaps.is_current(finished.generation) {
            tracing::debug!("discarding outcome of an abandoned swap");
            return;
        }
        self.executing = false;
        if let Some((key, balance)) = finished.wrapped {
            self.input_balance.set_data(&key, balance, now);
        }
        match finished.result {
            Ok(tx_hash) => tracing::info!(%tx_hash, "swap submitted"),
            Err(message) if is_user_rejection(&message) => {
                tracing::info!("swap cancelled by the user");
            }
            Err(message) => {
                tracing::warn!(%message, "swap failed");
                self.swap_error = Some(message);
            }
        }
    }

    fn observe_confirmation(&mut self, now: Instant) {
        let state = self.facade.state();
        let Some(tx_hash) = state.tx_hash else {
            return;
        };
        if state.status == TxStatus::Confirmed && self.confirmations.observe(tx_hash) {
            tracing::info!(%tx_hash, "swap confirmed, refreshing");
            self.refresh(now);
            self.delayed_refresh.schedule(now);
        }
    }

    fn countdown_state(&self) -> (bool, bool) {
        (
            self.facade.quote().is_some(),
            self.facade.status() == TxStatus::Confirmed,
        )
    }

    fn observe_quote(&mut self, now: Instant) {
        let (has_quote, confirmed) = self.countdown_state();
        self.countdown
            .observe_fetching(self.facade.is_quote_fetching(), has_quote, confirmed, now);
        self.countdown.tick(now, has_quote, confirmed);
    }

    fn spawn(&mut self, task: impl Future<Output = Event> + Send + 'static) {
        let events = self.events.clone();
        self.tasks.spawn(async move {
            // The receiver is only gone once the session shuts down.
            let _ = events.send(task.await);
        });
    }

    fn fetch_token_info(&mut self, slot: TokenSlot, ticket: Ticket<Address>) {
        let tokens = self.tokens.clone();
        self.spawn(async move {
            let result = tokens.token_info(ticket.key).await;
            Event::TokenInfo {
                slot,
                ticket,
                result,
            }
        });
    }

    fn fetch_target(&mut self, now: Instant) {
        if let Some(ticket) = self.target.begin(now) {
            self.fetch_token_info(TokenSlot::Selected, ticket);
        }
    }

    fn fetch_paired(&mut self, now: Instant) {
        if let Some(ticket) = self.paired.begin(now) {
            self.fetch_token_info(TokenSlot::Paired, ticket);
        }
    }

    fn fetch_native_balance(&mut self, now: Instant) {
        let Some(ticket) = self.native_balance.begin(now) else {
            return;
        };
        let balances = self.balances.clone();
        self.spawn(async move {
            let result = balances.native_balance(ticket.key).await;
            Event::NativeBalance { ticket, result }
        });
    }

    fn fetch_input_balance(&mut self, now: Instant) {
        let Some(ticket) = self.input_balance.begin(now) else {
            return;
        };
        let balances = self.balances.clone();
        self.spawn(async move {
            let (owner, token) = ticket.key;
            let result = balances.token_balance(owner, token).await;
            Event::InputBalance { ticket, result }
        });
    }

    fn fetch_quote(&mut self, now: Instant) {
        if let Some(request) = self.facade.refetch(now) {
            self.spawn(request.map(Event::Quote));
        }
    }

    pub fn selected(&self) -> &'static TokenOption {
        self.selected
    }

    pub fn direction(&self) -> SwapDirection {
        self.direction
    }

    pub fn amount(&self) -> &str {
        &self.amount
    }

    pub fn pool_key(&self) -> Option<&PoolKey> {
        self.resolver.pool_key()
    }

    /// The pool's other currency, once the pool key is known.
    pub fn paired_token(&self) -> Option<Address> {
        self.resolver.pool_key()?.counterpart(self.selected.address)
    }

    pub fn is_paired_weth(&self) -> bool {
        self.paired_token() == Some(self.settings.contracts.weth)
    }

    fn input_token(&self) -> Option<Address> {
        match self.direction {
            SwapDirection::PairedToToken => self.paired_token(),
            SwapDirection::TokenToPaired => Some(self.selected.address),
        }
    }

    fn wraps_before_swap(&self) -> bool {
        self.is_paired_weth() && self.direction == SwapDirection::PairedToToken
    }

    fn use_native_eth(&self) -> bool {
        self.is_paired_weth() && self.direction == SwapDirection::TokenToPaired
    }

    fn target_decimals(&self) -> u8 {
        self.target
            .data()
            .and_then(|info| info.decimals)
            .unwrap_or(NATIVE_DECIMALS)
    }

    fn paired_decimals(&self) -> u8 {
        if self.is_paired_weth() {
            return NATIVE_DECIMALS;
        }
        self.paired
            .data()
            .and_then(|info| info.decimals)
            .unwrap_or(NATIVE_DECIMALS)
    }

    /// Decimals the amount is entered in. The input balance reports the
    /// token's actual decimals, which win over metadata.
    fn input_decimals(&self) -> u8 {
        if let Some(balance) = self.input_balance.data() {
            return balance.decimals;
        }
        match self.direction {
            SwapDirection::PairedToToken => self.paired_decimals(),
            SwapDirection::TokenToPaired => self.target_decimals(),
        }
    }

    fn output_decimals(&self) -> u8 {
        match self.direction {
            SwapDirection::PairedToToken => self.target_decimals(),
            SwapDirection::TokenToPaired => self.paired_decimals(),
        }
    }

    fn amount_input(&self) -> AmountInput {
        AmountInput::parse(&self.amount, self.input_decimals())
    }

    /// The swap as it would be made right now. Until the pool key is known
    /// the parameters use a placeholder WETH pool, but the facade stays
    /// disabled.
    pub fn swap_params(&self) -> SwapParams {
        let token = self.selected.address;
        let (pool_key, zero_for_one) = match (self.resolver.pool_key(), self.paired_token()) {
            (Some(pool_key), Some(paired)) => {
                (*pool_key, pool_key.zero_for_one(token, paired, self.direction))
            }
            (pool_key, _) => (
                pool_key.copied().unwrap_or_else(|| self.fallback_pool_key()),
                true,
            ),
        };
        let use_native_eth = self.use_native_eth();
        SwapParams {
            pool_key,
            amount_in: self.amount_input().value(),
            zero_for_one,
            slippage_bps: self.settings.slippage_bps,
            use_native_eth,
            use_native_input: false,
            use_native_output: use_native_eth,
        }
    }

    fn fallback_pool_key(&self) -> PoolKey {
        PoolKey {
            currency0: self.settings.contracts.weth,
            currency1: self.selected.address,
            fee: POOL_FEE,
            tick_spacing: POOL_TICK_SPACING,
            hooks: self.settings.contracts.hook_static_fee,
        }
    }
}

struct WrapRequest {
    owner: Address,
    /// Last known WETH balance of `owner`.
    balance: U256,
    key: Option<(Address, Address)>,
}

async fn execute_swap(
    wrapper: Wrapper,
    wrap: Option<WrapRequest>,
    execution: Execution,
) -> (Option<((Address, Address), Balance)>, Result<B256, String>) {
    let mut wrapped = None;
    if let Some(request) = wrap {
        match wrapper
            .ensure(request.owner, execution.params().amount_in, request.balance)
            .await
        {
            Ok(balance) => wrapped = balance.zip(request.key).map(|(balance, key)| (key, balance)),
            Err(err) => return (None, Err(format!("{err:#}"))),
        }
    }
    let result = execution.run().await.map_err(|err| format!("{err:#}"));
    (wrapped, result)
}
