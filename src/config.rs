//!
//! Backend configuration, read from the same JSON document that
//! configures the indexing service for this coin.
//!
use crate::parser::amount::DEFAULT_DECIMAL_POINT;
use crate::parser::errors::OpResult;
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ChainConfig {
    pub coin_name: String,
    pub rpc_url: String,
    pub rpc_user: String,
    pub rpc_pass: String,
    /// seconds
    pub rpc_timeout: u64,
    pub supports_estimate_fee: bool,
    pub supports_estimate_smart_fee: bool,
    pub amount_decimal_point: usize,
}

impl Default for ChainConfig {
    fn default() -> Self {
        ChainConfig {
            coin_name: String::from("Crown"),
            rpc_url: String::from("http://127.0.0.1:9341"),
            rpc_user: String::new(),
            rpc_pass: String::new(),
            rpc_timeout: 25,
            supports_estimate_fee: true,
            supports_estimate_smart_fee: true,
            amount_decimal_point: DEFAULT_DECIMAL_POINT,
        }
    }
}

impl ChainConfig {
    pub fn from_json(data: &[u8]) -> OpResult<ChainConfig> {
        Ok(serde_json::from_slice(data)?)
    }
}
