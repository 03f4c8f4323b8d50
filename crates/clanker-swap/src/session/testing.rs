//! Shared fixtures for session tests.

use {
    super::{Dependencies, Event, Session, Settings},
    crate::{
        domain::{
            Balance,
            PoolId25,
            PoolKey,
            Quote,
            TokenInfo,
            pool::truncate_pool_id,
            registry::{CLANKER, POOL_FEE, POOL_TICK_SPACING, Pool, TOKEN_OPTIONS},
        },
        infra::{
            blockchain::{MockBalanceFetching, MockPoolKeyReading, MockTokenInfoFetching},
            SwapExecuting,
            sdk::{MockSwapExecuting, MockSwapQuoting},
            wallet::MockWallet,
        },
    },
    alloy::primitives::{Address, U256, address},
    std::{sync::Arc, time::Duration},
    tokio::{sync::mpsc, time::Instant},
};

pub const OWNER: Address = address!("0x1111111111111111111111111111111111111111");
pub const WETH: Address = CLANKER.weth;
pub const TOKEN: Address = TOKEN_OPTIONS[0].address;
pub const ONE_ETH: u64 = 1_000_000_000_000_000_000;

pub fn pool_key_of(token: Address) -> PoolKey {
    PoolKey::for_pair(
        token,
        WETH,
        CLANKER.hook_static_fee,
        POOL_FEE,
        POOL_TICK_SPACING,
    )
}

/// The token whose v4 pool id truncates to `pool_id`.
pub fn token_of(pool_id: PoolId25) -> Address {
    TOKEN_OPTIONS
        .iter()
        .find(|option| matches!(option.pool, Pool::V4(id) if truncate_pool_id(id) == pool_id))
        .map(|option| option.address)
        .unwrap()
}

pub fn info_of(token: Address) -> TokenInfo {
    if token == WETH {
        TokenInfo {
            name: Some("Wrapped Ether".to_string()),
            symbol: Some("WETH".to_string()),
            decimals: Some(18),
        }
    } else {
        TokenInfo {
            name: Some("Clanker Token".to_string()),
            symbol: Some("CLNK".to_string()),
            decimals: Some(18),
        }
    }
}

pub fn wallet(chain_id: u64) -> MockWallet {
    let mut wallet = MockWallet::new();
    wallet.expect_address().return_const(Some(OWNER));
    wallet.expect_chain_id().return_const(Some(chain_id));
    wallet
}

pub fn disconnected_wallet() -> MockWallet {
    let mut wallet = MockWallet::new();
    wallet.expect_address().return_const(None::<Address>);
    wallet.expect_chain_id().return_const(None::<u64>);
    wallet
}

pub fn pool_keys() -> MockPoolKeyReading {
    let mut reader = MockPoolKeyReading::new();
    reader
        .expect_pool_key()
        .returning(|_, pool_id| Ok(pool_key_of(token_of(pool_id))));
    reader
}

pub fn tokens() -> MockTokenInfoFetching {
    let mut tokens = MockTokenInfoFetching::new();
    tokens
        .expect_token_info()
        .returning(|token| Ok(info_of(token)));
    tokens
}

/// One ETH and `weth` wei of WETH.
pub fn balances(weth: U256) -> MockBalanceFetching {
    let mut balances = MockBalanceFetching::new();
    balances.expect_native_balance().returning(|_| {
        Ok(Balance {
            value: U256::from(ONE_ETH),
            decimals: 18,
        })
    });
    balances
        .expect_token_balance()
        .returning(move |_, token| {
            Ok(Balance {
                value: if token == WETH { weth } else { U256::ZERO },
                decimals: 18,
            })
        });
    balances
}

/// Quotes 1000 output units per input unit.
pub fn quoter() -> MockSwapQuoting {
    let mut quoter = MockSwapQuoting::new();
    quoter.expect_quote().returning(|params| {
        Ok(Quote::with_slippage(
            params.amount_in * U256::from(1_000u64),
            params.slippage_bps,
        ))
    });
    quoter
}

pub struct Mocks {
    pub wallet: MockWallet,
    pub pool_keys: MockPoolKeyReading,
    pub tokens: MockTokenInfoFetching,
    pub balances: MockBalanceFetching,
    pub quoter: MockSwapQuoting,
    pub executor: Option<MockSwapExecuting>,
}

impl Default for Mocks {
    fn default() -> Self {
        Self {
            wallet: wallet(8453),
            pool_keys: pool_keys(),
            tokens: tokens(),
            balances: balances(U256::from(ONE_ETH)),
            quoter: quoter(),
            executor: None,
        }
    }
}

impl Mocks {
    pub fn dependencies(self) -> Dependencies {
        Dependencies {
            wallet: Arc::new(self.wallet),
            pool_keys: Arc::new(self.pool_keys),
            tokens: Arc::new(self.tokens),
            balances: Arc::new(self.balances),
            quoter: Arc::new(self.quoter),
            executor: self
                .executor
                .map(|executor| Arc::new(executor) as Arc<dyn SwapExecuting>),
        }
    }

    pub fn start(self) -> Harness {
        Harness::new(self.dependencies())
    }
}

pub struct Harness {
    pub session: Session,
    events: mpsc::UnboundedReceiver<Event>,
}

impl Harness {
    pub fn new(dependencies: Dependencies) -> Self {
        let (session, events) = Session::new(dependencies, Settings::default(), Instant::now());
        Self { session, events }
    }

    /// Runs the session until no task has anything left to report.
    pub async fn settle(&mut self) {
        loop {
            self.session.poll(Instant::now());
            match tokio::time::timeout(Duration::from_millis(1), self.events.recv()).await {
                Ok(Some(event)) => self.session.handle(event, Instant::now()),
                _ => break,
            }
        }
    }

    /// Advances the paused clock, then settles.
    pub async fn advance(&mut self, duration: Duration) {
        tokio::time::advance(duration).await;
        self.settle().await;
    }
}
