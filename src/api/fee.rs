use crate::api::CrownRpc;
use crate::parser::amount::JsonNumber;
use crate::parser::errors::OpResult;
use crate::parser::proto::json::SmartFeeEstimate;
use crate::rpc::Transport;
use log::{debug, warn};
use num_bigint::BigInt;
use serde_json::Value;

impl<T: Transport> CrownRpc<T> {
    ///
    /// Fee per kilobyte, in minimal units, for confirmation within `blocks`.
    ///
    /// When the node lacks `estimatefee` but has `estimatesmartfee`, the
    /// smart variant is used in conservative mode. The capability flags
    /// come from the configuration, the node is not probed.
    ///
    pub fn estimate_fee(&self, blocks: u16) -> OpResult<BigInt> {
        if !self.config.supports_estimate_fee && self.config.supports_estimate_smart_fee {
            return self.estimate_smart_fee(blocks, true);
        }

        debug!("rpc: estimatefee {}", blocks);
        let res: JsonNumber = self
            .call("estimatefee", vec![Value::from(blocks)])
            .map_err(|e| e.join_msg(&format!("blocks {}", blocks)))?;
        self.parser.amount_to_big_int(res.as_str())
    }

    /// `estimatesmartfee`, `CONSERVATIVE` or `ECONOMICAL` mode
    pub fn estimate_smart_fee(&self, blocks: u16, conservative: bool) -> OpResult<BigInt> {
        debug!("rpc: estimatesmartfee {}", blocks);
        let mode = if conservative {
            "CONSERVATIVE"
        } else {
            "ECONOMICAL"
        };
        let res: SmartFeeEstimate = self
            .call(
                "estimatesmartfee",
                vec![Value::from(blocks), Value::from(mode)],
            )
            .map_err(|e| e.join_msg(&format!("blocks {}", blocks)))?;
        match res.fee_rate {
            Some(rate) => self.parser.amount_to_big_int(rate.as_str()),
            None => {
                warn!(
                    "rpc: estimatesmartfee {}: no fee rate ({})",
                    blocks,
                    res.errors.join(", ")
                );
                Ok(BigInt::from(0))
            }
        }
    }
}
