//! Adapters to the chain: RPC reads, the wallet and the swap SDK.

pub mod blockchain;
pub mod sdk;
pub mod wallet;

pub use {
    blockchain::{BalanceFetching, Blockchain, PoolKeyReading, TokenInfoFetching},
    sdk::{ExecutionState, Progress, QuoterSdk, SwapExecuting, SwapQuoting},
    wallet::{ChainWallet, Transaction, Wallet, WalletError},
};
