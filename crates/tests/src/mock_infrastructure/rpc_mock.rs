//! RPC Mock Builder for the storage contract's JSON-RPC traffic.
//!
//! Wraps mockito to answer the handful of methods the chain adapter issues:
//! `eth_chainId`, `eth_call`, `eth_getTransactionCount` and
//! `eth_sendRawTransaction`.

use mockito::{Matcher, Mock, Server, ServerGuard};
use serde_json::{json, Value};

/// Builder for creating mock node responses.
///
/// Every mock accepts any number of hits, so a method the adapter calls more
/// than once (such as `eth_chainId`) still counts as called.
pub struct RpcMockBuilder {
    server: ServerGuard,
    mocks: Vec<Mock>,
}

fn method_matcher(method: &str) -> Matcher {
    Matcher::Regex(format!(r#""method"\s*:\s*"{method}""#))
}

/// ABI-encodes `value` as a single `uint256` return word.
#[must_use]
pub fn uint256_word(value: u128) -> String {
    format!("0x{value:064x}")
}

impl RpcMockBuilder {
    /// Creates a new RPC mock builder with a fresh mockito server.
    pub async fn new() -> Self {
        Self { server: Server::new_async().await, mocks: Vec::new() }
    }

    /// Returns the URL of the mock server.
    #[must_use]
    pub fn url(&self) -> String {
        self.server.url()
    }

    /// Mocks a method with a successful `result`.
    pub fn mock_method(&mut self, method: &str, result: &Value) -> &mut Self {
        let mock = self
            .server
            .mock("POST", "/")
            .match_body(method_matcher(method))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({ "jsonrpc": "2.0", "id": 1, "result": result }).to_string())
            .expect_at_least(1)
            .create();

        self.mocks.push(mock);
        self
    }

    /// Mocks `eth_chainId`.
    pub fn mock_chain_id(&mut self, chain_id: u64) -> &mut Self {
        self.mock_method("eth_chainId", &json!(format!("0x{chain_id:x}")))
    }

    /// Mocks `eth_call` returning `value` as the output of `get()`.
    pub fn mock_get_value(&mut self, value: u128) -> &mut Self {
        self.mock_method("eth_call", &json!(uint256_word(value)))
    }

    /// Mocks `eth_call` returning raw hex output.
    pub fn mock_call_output(&mut self, output: &str) -> &mut Self {
        self.mock_method("eth_call", &json!(output))
    }

    /// Mocks `eth_getTransactionCount`.
    pub fn mock_transaction_count(&mut self, nonce: u64) -> &mut Self {
        self.mock_method("eth_getTransactionCount", &json!(format!("0x{nonce:x}")))
    }

    /// Mocks `eth_sendRawTransaction`, answering with `tx_hash`.
    ///
    /// Only legacy (RLP list) payloads are matched, so a typed transaction
    /// would fall through to mockito's 501.
    pub fn mock_send_raw_transaction(&mut self, tx_hash: &str) -> &mut Self {
        let mock = self
            .server
            .mock("POST", "/")
            .match_body(Matcher::AllOf(vec![
                method_matcher("eth_sendRawTransaction"),
                Matcher::Regex(r#""params"\s*:\s*\["0xf[89a-f]"#.to_string()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({ "jsonrpc": "2.0", "id": 1, "result": tx_hash }).to_string())
            .expect_at_least(1)
            .create();

        self.mocks.push(mock);
        self
    }

    /// Mocks an RPC error response.
    pub fn mock_rpc_error(&mut self, method: &str, code: i32, message: &str) -> &mut Self {
        let mock = self
            .server
            .mock("POST", "/")
            .match_body(method_matcher(method))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "jsonrpc": "2.0",
                    "id": 1,
                    "error": { "code": code, "message": message }
                })
                .to_string(),
            )
            .expect_at_least(1)
            .create();

        self.mocks.push(mock);
        self
    }

    /// Mocks a server error (500) for every request.
    pub fn mock_server_error(&mut self) -> &mut Self {
        let mock = self
            .server
            .mock("POST", "/")
            .with_status(500)
            .with_body("Internal Server Error")
            .expect_at_least(1)
            .create();

        self.mocks.push(mock);
        self
    }

    /// Returns a reference to the underlying mockito server for advanced mocking.
    pub fn get_server(&mut self) -> &mut ServerGuard {
        &mut self.server
    }

    /// Verifies every mock was hit at least once.
    #[must_use]
    pub fn verify_all_called(&self) -> bool {
        self.mocks.iter().all(Mock::matched)
    }

    /// Gets the number of mocks that were called at least once.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.mocks.iter().filter(|m| m.matched()).count()
    }
}
