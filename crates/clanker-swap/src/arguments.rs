use {
    crate::domain::{SwapDirection, registry::TOKEN_OPTIONS},
    alloy::{primitives::Address, signers::local::PrivateKeySigner},
    chain::Chain,
    std::{
        fmt::{self, Display, Formatter},
        time::Duration,
    },
    url::Url,
};

#[derive(clap::Parser)]
#[clap(
    name = "clanker-swap",
    about = "Quote and swap Clanker tokens through their Uniswap v4 pools on Base"
)]
pub struct Arguments {
    /// JSON-RPC endpoint of a Base node.
    #[clap(long, env = "BASE_RPC_URL", default_value = "https://mainnet.base.org")]
    pub rpc_url: Url,

    /// WalletConnect project id, forwarded to the wallet configuration.
    #[clap(long, env = "WC_PROJECT_ID", default_value = "demo")]
    pub wc_project_id: String,

    /// Private key signing wrap and swap transactions.
    #[clap(long, env = "PRIVATE_KEY", hide_env_values = true)]
    pub private_key: Option<PrivateKeySigner>,

    /// Account to watch instead of signing. Without a key or an account the
    /// client runs disconnected.
    #[clap(long, env = "ACCOUNT", conflicts_with = "private_key")]
    pub account: Option<Address>,

    /// Chain id the wallet has to be connected to.
    #[clap(long, env = "CHAIN_ID", default_value = "8453", value_parser = parse_chain)]
    pub chain: Chain,

    /// Token selected at startup, either its address or its 1-based position
    /// in the token list.
    #[clap(long, value_parser = parse_token)]
    pub token: Option<Address>,

    #[clap(long, value_enum, default_value_t = SwapDirection::PairedToToken)]
    pub direction: SwapDirection,

    /// Input amount in whole units of the input token.
    #[clap(long, default_value = "0.01")]
    pub amount: String,

    #[clap(long, env, default_value = "50")]
    pub slippage_bps: u16,

    /// How often the quote is refreshed.
    #[clap(long, env, default_value = "30s", value_parser = humantime::parse_duration)]
    pub quote_refresh_interval: Duration,

    /// How often balances and the paired token are refreshed.
    #[clap(long, env, default_value = "15s", value_parser = humantime::parse_duration)]
    pub balance_refresh_interval: Duration,

    #[clap(long, env, default_value = "warn,clanker_swap=debug")]
    pub log_filter: String,

    #[clap(long, env)]
    pub use_json_logs: bool,
}

/// Parses a token by address or by its 1-based position in the token list.
pub fn parse_token(value: &str) -> Result<Address, String> {
    if let Ok(position) = value.parse::<usize>() {
        return position
            .checked_sub(1)
            .and_then(|index| TOKEN_OPTIONS.get(index))
            .map(|option| option.address)
            .ok_or_else(|| format!("there are only {} tokens", TOKEN_OPTIONS.len()));
    }
    value.parse().map_err(|err| format!("invalid token: {err}"))
}

fn parse_chain(value: &str) -> Result<Chain, String> {
    let id = value.parse::<u64>().map_err(|err| err.to_string())?;
    Chain::try_from(id).map_err(|err| err.to_string())
}

impl Display for Arguments {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let Self {
            rpc_url,
            wc_project_id,
            private_key,
            account,
            chain,
            token,
            direction,
            amount,
            slippage_bps,
            quote_refresh_interval,
            balance_refresh_interval,
            log_filter,
            use_json_logs,
        } = self;

        writeln!(f, "rpc_url: {rpc_url}")?;
        writeln!(f, "wc_project_id: {wc_project_id}")?;
        writeln!(
            f,
            "private_key: {}",
            private_key.as_ref().map_or("None", |_| "SECRET")
        )?;
        writeln!(f, "account: {account:?}")?;
        writeln!(f, "chain: {chain} ({})", chain.id())?;
        writeln!(f, "token: {token:?}")?;
        writeln!(f, "direction: {direction:?}")?;
        writeln!(f, "amount: {amount}")?;
        writeln!(f, "slippage_bps: {slippage_bps}")?;
        writeln!(f, "quote_refresh_interval: {quote_refresh_interval:?}")?;
        writeln!(f, "balance_refresh_interval: {balance_refresh_interval:?}")?;
        writeln!(f, "log_filter: {log_filter}")?;
        writeln!(f, "use_json_logs: {use_json_logs}")?;
        Ok(())
    }
}
