//! Process wide wallet configuration, built once from the arguments.

use {crate::arguments::Arguments, chain::Chain, std::sync::OnceLock, url::Url};

pub const APP_NAME: &str = "Clanker Swap Example";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WalletConfig {
    pub app_name: &'static str,
    pub project_id: String,
    pub chain: Chain,
    pub rpc_url: Url,
}

impl WalletConfig {
    fn new(args: &Arguments) -> Self {
        Self {
            app_name: APP_NAME,
            project_id: args.wc_project_id.clone(),
            chain: args.chain,
            rpc_url: args.rpc_url.clone(),
        }
    }

    /// Whether the RPC node runs on this machine. Transactions on a local
    /// node can't be looked up on the block explorer.
    pub fn is_local(&self) -> bool {
        is_local_rpc(&self.rpc_url)
    }
}

static WALLET_CONFIG: OnceLock<WalletConfig> = OnceLock::new();

/// The wallet configuration. The first call builds it from `args`; later
/// calls return the same configuration.
pub fn wallet(args: &Arguments) -> &'static WalletConfig {
    WALLET_CONFIG.get_or_init(|| WalletConfig::new(args))
}

pub fn is_local_rpc(url: &Url) -> bool {
    let url = url.as_str();
    url.contains("localhost") || url.contains("127.0.0.1")
}
