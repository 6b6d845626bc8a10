use super::{
    contract::{to_biguint, to_u256, StorageContract},
    ChainClient, ChainError,
};
use crate::config::ChainConfig;
use async_trait::async_trait;
use ethers::{
    providers::{Http, Middleware, Provider, ProviderError},
    signers::{LocalWallet, Signer},
    types::{
        transaction::eip2718::TypedTransaction, Address, BlockNumber, TransactionRequest, TxHash,
        U256,
    },
};
use num_bigint::{BigInt, BigUint};
use std::str::FromStr;
use url::Url;

/// Live chain adapter backed by an `ethers` HTTP provider and a local signing key.
///
/// Transactions are legacy (EIP-155) transactions with a fixed gas limit and gas
/// price taken from [`ChainConfig`], which suits zero-gas permissioned networks
/// such as Besu/QBFT deployments.
pub struct EthersChainClient {
    provider: Provider<Http>,
    contract: StorageContract,
    contract_address: Address,
    wallet: LocalWallet,
    gas_limit: U256,
    gas_price: U256,
}

fn rpc_error(context: &str, error: &ProviderError) -> ChainError {
    ChainError::Rpc(format!("{context}: {error}"))
}

impl EthersChainClient {
    /// Builds the client and binds the signer to the node's chain id.
    ///
    /// This performs one `eth_chainId` round trip, so an unreachable node fails here
    /// rather than on the first request.
    ///
    /// # Errors
    ///
    /// - [`ChainError::InvalidConfig`] for a malformed URL, contract address or key
    /// - [`ChainError::Connection`] if the node cannot report its chain id
    pub async fn connect(config: &ChainConfig) -> Result<Self, ChainError> {
        let url = Url::parse(&config.rpc_url)
            .map_err(|e| ChainError::InvalidConfig(format!("rpc url {}: {e}", config.rpc_url)))?;

        let http_client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| ChainError::InvalidConfig(format!("http client: {e}")))?;

        let provider = Provider::new(Http::new_with_client(url, http_client));

        let contract_address = Address::from_str(config.contract_address.trim())
            .map_err(|e| ChainError::InvalidConfig(format!("contract address: {e}")))?;

        let wallet = LocalWallet::from_str(config.private_key_hex())
            .map_err(|e| ChainError::InvalidConfig(format!("private key: {e}")))?;

        let chain_id = fetch_chain_id(&provider)
            .await
            .map_err(|e| ChainError::Connection(format!("node at {}: {e}", config.rpc_url)))?;

        let wallet = wallet.with_chain_id(chain_id);

        tracing::debug!(
            chain_id,
            sender = ?wallet.address(),
            contract = ?contract_address,
            "chain client connected"
        );

        Ok(Self {
            provider,
            contract: StorageContract::new()?,
            contract_address,
            wallet,
            gas_limit: U256::from(config.gas_limit),
            gas_price: U256::from(config.gas_price_wei),
        })
    }

    /// Address that signs `set` transactions.
    #[must_use]
    pub fn sender(&self) -> Address {
        self.wallet.address()
    }

    #[must_use]
    pub fn contract_address(&self) -> Address {
        self.contract_address
    }
}

async fn fetch_chain_id(provider: &Provider<Http>) -> Result<u64, ChainError> {
    let chain_id = provider.get_chainid().await.map_err(|e| rpc_error("eth_chainId", &e))?;

    if chain_id > U256::from(u64::MAX) {
        return Err(ChainError::Rpc(format!("chain id {chain_id} does not fit in u64")));
    }

    Ok(chain_id.low_u64())
}

#[async_trait]
impl ChainClient for EthersChainClient {
    async fn read_value(&self) -> Result<BigUint, ChainError> {
        let calldata = self.contract.encode_get()?;
        let call: TypedTransaction =
            TransactionRequest::new().to(self.contract_address).data(calldata).into();

        let output = self
            .provider
            .call(&call, None)
            .await
            .map_err(|e| rpc_error("eth_call get()", &e))?;

        let value = self.contract.decode_get(output.as_ref())?;

        tracing::trace!(%value, "contract value read");
        Ok(to_biguint(value))
    }

    async fn write_value(&self, value: &BigInt) -> Result<TxHash, ChainError> {
        let word = to_u256(value)?;
        let calldata = self.contract.encode_set(word)?;
        let sender = self.wallet.address();

        let nonce = self
            .provider
            .get_transaction_count(sender, Some(BlockNumber::Pending.into()))
            .await
            .map_err(|e| rpc_error("eth_getTransactionCount", &e))?;

        let tx: TypedTransaction = TransactionRequest::new()
            .from(sender)
            .to(self.contract_address)
            .value(U256::zero())
            .gas(self.gas_limit)
            .gas_price(self.gas_price)
            .nonce(nonce)
            .data(calldata)
            .chain_id(self.wallet.chain_id())
            .into();

        let signature = self
            .wallet
            .sign_transaction(&tx)
            .await
            .map_err(|e| ChainError::Signing(e.to_string()))?;

        let pending = self
            .provider
            .send_raw_transaction(tx.rlp_signed(&signature))
            .await
            .map_err(|e| rpc_error("eth_sendRawTransaction", &e))?;

        let tx_hash = pending.tx_hash();
        tracing::debug!(?tx_hash, %nonce, "set transaction broadcast");

        Ok(tx_hash)
    }

    async fn chain_id(&self) -> Result<u64, ChainError> {
        fetch_chain_id(&self.provider).await
    }
}
