//! What the client shows, derived from the session's current state.
//!
//! Nothing in here is stored; every [`View`] is computed from scratch.

use {
    super::Session,
    crate::domain::{AmountInput, PoolKey, SwapDirection, SwapStep, TxStatus, registry},
    alloy::primitives::{Address, B256, U256},
    number::{format_short_amount, format_units},
    std::fmt,
};

/// Fraction digits shown for amounts.
const SHORT_AMOUNT_PRECISION: u32 = 6;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenChoice {
    pub address: Address,
    pub label: String,
    pub sublabel: String,
    pub selected: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct View {
    pub status: &'static str,
    pub error: Option<String>,
    /// Label of the primary action button.
    pub action: String,
    pub can_swap: bool,
    pub tokens: Vec<TokenChoice>,
    pub selected_label: String,
    pub target_symbol: String,
    pub target_decimals: Option<u8>,
    pub pool_key: Option<PoolKey>,
    pub direction: SwapDirection,
    pub input_symbol: String,
    pub output_symbol: String,
    pub amount: String,
    pub input_balance: Option<String>,
    pub native_balance: Option<String>,
    pub quote_loading: bool,
    pub quote_fetching: bool,
    pub amount_out: Option<String>,
    pub min_amount_out: Option<String>,
    pub slippage: String,
    /// Seconds until the quote refreshes, while a quote is shown.
    pub refresh_in: Option<u64>,
    pub step: SwapStep,
    pub tx_status: TxStatus,
    pub tx_hash: Option<B256>,
    pub tx_link: Option<String>,
}

impl Session {
    pub fn view(&self) -> View {
        let state = self.facade.state();
        let confirmed = state.status == TxStatus::Confirmed;
        let output_decimals = self.output_decimals();
        let format_output = |value: U256| {
            format_short_amount(&format_units(value, output_decimals), SHORT_AMOUNT_PRECISION)
        };

        View {
            status: self.status(),
            error: self.error(),
            action: self.action(),
            can_swap: self.can_swap(),
            tokens: self.token_choices(),
            selected_label: self.selected_label(),
            target_symbol: self.target_symbol(),
            target_decimals: self.target.data().and_then(|info| info.decimals),
            pool_key: self.resolver.pool_key().copied(),
            direction: self.direction,
            input_symbol: self.input_symbol(),
            output_symbol: self.output_symbol(),
            amount: self.amount.clone(),
            input_balance: self.input_balance.data().map(|balance| {
                format_short_amount(
                    &format_units(balance.value, self.input_decimals()),
                    SHORT_AMOUNT_PRECISION,
                )
            }),
            native_balance: self.native_balance.data().map(|balance| {
                format_short_amount(
                    &format_units(balance.value, balance.decimals),
                    SHORT_AMOUNT_PRECISION,
                )
            }),
            quote_loading: self.facade.is_quote_loading(),
            quote_fetching: self.facade.is_quote_fetching(),
            amount_out: self.facade.quote().map(|quote| format_output(quote.amount_out)),
            min_amount_out: self
                .facade
                .quote()
                .map(|quote| format_output(quote.min_amount_out)),
            slippage: format!(
                "{}%",
                format_units(U256::from(self.settings.slippage_bps), 2)
            ),
            refresh_in: (self.facade.quote().is_some() && !confirmed)
                .then(|| self.countdown.seconds()),
            step: state.step,
            tx_status: state.status,
            tx_hash: state.tx_hash,
            tx_link: state
                .tx_hash
                .filter(|_| self.settings.explorer_links)
                .and_then(|hash| self.settings.chain.transaction_url(hash)),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.wallet.address().is_some()
    }

    pub fn wrong_network(&self) -> bool {
        self.is_connected() && self.wallet.chain_id() != Some(self.settings.chain.id())
    }

    /// Whether a swap can be started right now.
    pub fn can_swap(&self) -> bool {
        self.is_connected()
            && !self.wrong_network()
            && self.resolver.pool_key().is_some()
            && self.paired_token().is_some()
            && self.amount_input().is_valid()
            && !self.facade.is_quote_loading()
            && !self.facade.status().is_in_flight()
            && !self.executing
    }

    fn status(&self) -> &'static str {
        if !self.is_connected() {
            return "Connect wallet to begin";
        }
        if self.wrong_network() {
            return "Switch network to Base to continue";
        }
        if self.resolver.error().is_some() {
            return "Pool configuration unavailable";
        }
        if self.resolver.pool_key().is_none() || self.paired_token().is_none() {
            return "Loading pool configuration";
        }
        match self.amount_input() {
            AmountInput::Empty => return "Enter an amount to get a quote",
            AmountInput::Invalid => return "Enter a valid amount",
            AmountInput::Valid(_) => {}
        }
        if self.facade.is_quote_loading() {
            return "Fetching quote";
        }
        if self.facade.quote_error().is_some() {
            return "Quote failed";
        }
        if self.facade.status() == TxStatus::Confirmed {
            return "Swap confirmed";
        }
        "Ready to swap"
    }

    fn error(&self) -> Option<String> {
        self.resolver
            .error()
            .or(self.facade.quote_error())
            .map(str::to_string)
            .or(self.facade.state().error)
            .or_else(|| self.swap_error.clone())
    }

    fn action(&self) -> String {
        let state = self.facade.state();
        if !self.is_connected() {
            return "Connect Wallet".to_string();
        }
        if self.wrong_network() {
            return format!("Switch to {}", self.settings.chain);
        }
        if state.status == TxStatus::Confirmed {
            return "Swap another".to_string();
        }
        if self.executing || state.status.is_in_flight() {
            return format!("Processing {}...", state.step);
        }
        match self.amount_input() {
            AmountInput::Empty => "Enter amount".to_string(),
            AmountInput::Invalid => "Enter valid amount".to_string(),
            AmountInput::Valid(_) => "Swap".to_string(),
        }
    }

    fn token_choices(&self) -> Vec<TokenChoice> {
        registry::TOKEN_OPTIONS
            .iter()
            .zip(&self.options)
            .enumerate()
            .map(|(index, (option, query))| {
                let info = query.data();
                let symbol = info.and_then(|info| info.symbol.as_deref());
                let label = info
                    .and_then(|info| info.name.as_deref())
                    .or(symbol)
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("Token {}", index + 1));
                let sublabel = match symbol {
                    Some(symbol) => format!("{symbol} token"),
                    None => "Loading token metadata".to_string(),
                };
                TokenChoice {
                    address: option.address,
                    label,
                    sublabel: format!("{sublabel} ({})", option.protocol().label()),
                    selected: option.address == self.selected.address,
                }
            })
            .collect()
    }

    fn selected_label(&self) -> String {
        let info = self.target.data();
        info.and_then(|info| info.name.clone())
            .or_else(|| info.and_then(|info| info.symbol.clone()))
            .unwrap_or_else(|| shorten(self.selected.address))
    }

    fn target_symbol(&self) -> String {
        self.target
            .data()
            .and_then(|info| info.symbol.clone())
            .filter(|symbol| !symbol.is_empty())
            .unwrap_or_else(|| "TOKEN".to_string())
    }

    /// WETH is spent as WETH but received as ETH.
    fn paired_symbol(&self) -> String {
        if self.is_paired_weth() {
            return match self.direction {
                SwapDirection::PairedToToken => "WETH",
                SwapDirection::TokenToPaired => "ETH",
            }
            .to_string();
        }
        self.paired
            .data()
            .and_then(|info| info.symbol.clone())
            .unwrap_or_else(|| "Paired Token".to_string())
    }

    fn input_symbol(&self) -> String {
        match self.direction {
            SwapDirection::PairedToToken => self.paired_symbol(),
            SwapDirection::TokenToPaired => self.target_symbol(),
        }
    }

    fn output_symbol(&self) -> String {
        match self.direction {
            SwapDirection::PairedToToken => self.target_symbol(),
            SwapDirection::TokenToPaired => self.paired_symbol(),
        }
    }
}

/// `0x1234...abcd`
fn shorten(address: Address) -> String {
    let hex = address.to_string();
    format!("{}...{}", &hex[..6], &hex[hex.len() - 4..])
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Status: {}", self.status)?;
        writeln!(f, "Tokens:")?;
        for (index, token) in self.tokens.iter().enumerate() {
            let marker = if token.selected { '>' } else { ' ' };
            writeln!(
                f,
                "  {marker} {}. {} - {}",
                index + 1,
                token.label,
                token.sublabel
            )?;
        }

        writeln!(f, "Selected token: {}", self.selected_label)?;
        match self.target_decimals {
            Some(decimals) => writeln!(f, "Symbol: {} ({decimals} decimals)", self.target_symbol)?,
            None => writeln!(f, "Symbol: {} (? decimals)", self.target_symbol)?,
        }
        match &self.pool_key {
            Some(key) => {
                writeln!(f, "fee: {} | tickSpacing: {}", key.fee, key.tick_spacing)?;
                writeln!(f, "currency0: {}", key.currency0)?;
                writeln!(f, "currency1: {}", key.currency1)?;
            }
            None => writeln!(f, "Loading pool configuration...")?,
        }

        writeln!(
            f,
            "Direction: {} to {}",
            self.input_symbol, self.output_symbol
        )?;
        writeln!(
            f,
            "You pay: {} {} (balance: {} {})",
            self.amount,
            self.input_symbol,
            self.input_balance.as_deref().unwrap_or("-"),
            self.input_symbol
        )?;
        if let Some(native) = &self.native_balance {
            writeln!(f, "ETH balance: {native}")?;
        }
        let amount_out = match &self.amount_out {
            _ if self.quote_loading => "...",
            Some(amount_out) => amount_out.as_str(),
            None => "-",
        };
        writeln!(f, "You receive: {amount_out} {}", self.output_symbol)?;
        match &self.min_amount_out {
            Some(min) => writeln!(
                f,
                "Min received ({} slippage): {min} {}",
                self.slippage, self.output_symbol
            )?,
            None => writeln!(f, "Min received ({} slippage): -", self.slippage)?,
        }
        if let Some(seconds) = self.refresh_in {
            writeln!(f, "Quote refreshes in {seconds}s")?;
        }
        if self.quote_fetching {
            writeln!(f, "Refreshing...")?;
        }

        writeln!(f, "Current step: {} | Tx status: {}", self.step, self.tx_status)?;
        if let Some(hash) = &self.tx_hash {
            match &self.tx_link {
                Some(link) => writeln!(f, "Tx hash: {hash} ({link})")?,
                None => writeln!(f, "Tx hash: {hash}")?,
            }
        }
        if let Some(error) = &self.error {
            writeln!(f, "Error: {error}")?;
        }
        let enabled = if self.can_swap || !self.action.starts_with("Swap") {
            ""
        } else {
            " (disabled)"
        };
        write!(f, "[{}]{enabled}", self.action)
    }
}
