//! Chain adapter for the storage contract.
//!
//! The contract exposes a single `uint256` slot through `get()` and `set(uint256)`.
//! [`ChainClient`] is the seam the reconciliation logic consumes; the live
//! implementation is [`EthersChainClient`], which talks JSON-RPC to the node and
//! signs writes locally.
//!
//! Writes are broadcast and their hash returned immediately. Nothing here waits
//! for a receipt or block inclusion.

pub mod client;
pub mod contract;

pub use client::EthersChainClient;
pub use contract::StorageContract;

use async_trait::async_trait;
use ethers::types::TxHash;
use num_bigint::{BigInt, BigUint};
use thiserror::Error;

/// Errors raised while talking to the node or preparing contract calls.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ChainError {
    /// Chain settings could not be turned into a client (bad URL, key or address).
    #[error("Invalid chain configuration: {0}")]
    InvalidConfig(String),

    /// The node could not be reached.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// The node answered with a JSON-RPC error or an unusable payload.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// A value could not be ABI-encoded for the contract call.
    #[error("Failed to encode contract call: {0}")]
    Encoding(String),

    /// The contract's return data could not be decoded.
    #[error("Failed to decode contract output: {0}")]
    Decoding(String),

    /// The transaction could not be signed.
    #[error("Failed to sign transaction: {0}")]
    Signing(String),
}

/// Read/write access to the contract value.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Calls `get()` without creating a transaction.
    async fn read_value(&self) -> Result<BigUint, ChainError>;

    /// Signs and broadcasts `set(value)`, returning the transaction hash.
    ///
    /// Values outside the `uint256` range are rejected with [`ChainError::Encoding`].
    async fn write_value(&self, value: &BigInt) -> Result<TxHash, ChainError>;

    /// Returns the chain id reported by the node.
    async fn chain_id(&self) -> Result<u64, ChainError>;
}
