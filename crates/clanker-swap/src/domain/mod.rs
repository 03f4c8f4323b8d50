pub mod amount;
pub mod pool;
pub mod registry;
pub mod swap;
pub mod token;

pub use {
    amount::AmountInput,
    pool::{PoolId25, PoolKey},
    registry::{ContractAddresses, Pool, Protocol, TokenOption},
    swap::{Quote, SwapDirection, SwapParams, SwapStep, TxStatus},
    token::{Balance, TokenInfo},
};
