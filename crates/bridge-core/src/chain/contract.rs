//! ABI surface of the storage contract and value conversions.

use super::ChainError;
use ethers::{
    abi::Abi,
    contract::BaseContract,
    types::{Bytes, U256},
};
use num_bigint::{BigInt, BigUint, Sign};

/// ABI of the deployed storage contract.
pub const STORAGE_ABI: &str = r#"[
    {
        "inputs": [],
        "name": "get",
        "outputs": [{ "internalType": "uint256", "name": "", "type": "uint256" }],
        "stateMutability": "view",
        "type": "function"
    },
    {
        "inputs": [{ "internalType": "uint256", "name": "_value", "type": "uint256" }],
        "name": "set",
        "outputs": [],
        "stateMutability": "nonpayable",
        "type": "function"
    }
]"#;

/// Encoder/decoder for the `get`/`set` method pair.
#[derive(Debug, Clone)]
pub struct StorageContract {
    abi: BaseContract,
}

impl StorageContract {
    /// Parses [`STORAGE_ABI`].
    ///
    /// # Errors
    ///
    /// Returns [`ChainError::InvalidConfig`] if the ABI JSON is malformed.
    pub fn new() -> Result<Self, ChainError> {
        let abi: Abi = serde_json::from_str(STORAGE_ABI)
            .map_err(|e| ChainError::InvalidConfig(format!("storage contract ABI: {e}")))?;

        Ok(Self { abi: BaseContract::from(abi) })
    }

    /// Calldata for `get()`.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError::Encoding`] if the method is missing from the ABI.
    pub fn encode_get(&self) -> Result<Bytes, ChainError> {
        self.abi.encode("get", ()).map_err(|e| ChainError::Encoding(e.to_string()))
    }

    /// Calldata for `set(value)`.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError::Encoding`] if the method is missing from the ABI.
    pub fn encode_set(&self, value: U256) -> Result<Bytes, ChainError> {
        self.abi.encode("set", value).map_err(|e| ChainError::Encoding(e.to_string()))
    }

    /// Decodes the return data of `get()`.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError::Decoding`] for empty or malformed output, which is what
    /// a call against an address without code produces.
    pub fn decode_get(&self, output: &[u8]) -> Result<U256, ChainError> {
        self.abi
            .decode_output::<U256, _>("get", output)
            .map_err(|e| ChainError::Decoding(e.to_string()))
    }
}

/// Converts an arbitrary-precision integer into a `uint256` word.
///
/// # Errors
///
/// Returns [`ChainError::Encoding`] for negative values and values wider than 256 bits.
pub fn to_u256(value: &BigInt) -> Result<U256, ChainError> {
    let (sign, bytes) = value.to_bytes_be();

    if sign == Sign::Minus {
        return Err(ChainError::Encoding(format!(
            "negative value {value} cannot be encoded as uint256"
        )));
    }
    if bytes.len() > 32 {
        return Err(ChainError::Encoding(format!("value {value} overflows uint256")));
    }

    Ok(U256::from_big_endian(&bytes))
}

#[must_use]
pub fn to_biguint(value: U256) -> BigUint {
    let mut buf = [0u8; 32];
    value.to_big_endian(&mut buf);
    BigUint::from_bytes_be(&buf)
}
