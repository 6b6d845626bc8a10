//! # Bridge Core
//!
//! Core library for the Besu value bridge: a service that mirrors one `uint256`
//! contract slot into a single-row relational table.
//!
//! - **[`chain`]**: `ethers` JSON-RPC adapter for the storage contract's
//!   `get()`/`set(uint256)` pair, with local EIP-155 signing.
//!
//! - **[`store`]**: `sqlx` adapter for the `contract_values` singleton record,
//!   with `PostgreSQL` and `SQLite` backends.
//!
//! - **[`reconcile`]**: check/sync/get/set orchestration over the two adapters.
//!
//! - **[`config`]**: layered configuration (defaults, TOML, environment).
//!
//! - **[`types`]**: JSON request/response models of the HTTP API.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                 Reconciler                   │
//! │  ┌──────────────────┐  ┌──────────────────┐  │
//! │  │ dyn ChainClient  │  │ dyn ValueStore   │  │
//! │  └────────┬─────────┘  └────────┬─────────┘  │
//! └───────────┼─────────────────────┼────────────┘
//!             ▼                     ▼
//!    EthersChainClient      PostgresValueStore
//!    (Provider<Http> +      SqliteValueStore
//!     LocalWallet)
//! ```

pub mod chain;
pub mod config;
pub mod reconcile;
pub mod store;
pub mod types;
