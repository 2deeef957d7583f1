use crate::parser::errors::{ErrorClass, OpError, OpErrorKind};
use crate::rpc::RpcError;

/// `RPC_INVALID_ADDRESS_OR_KEY`, also "No such mempool or blockchain transaction"
pub const RPC_INVALID_ADDRESS_OR_KEY: i64 = -5;
pub const RPC_METHOD_DEPRECATED: i64 = -32;
pub const RPC_PARSE_ERROR: i64 = -32700;
pub const RPC_INVALID_REQUEST: i64 = -32600;
pub const RPC_METHOD_NOT_FOUND: i64 = -32601;
pub const RPC_INVALID_PARAMS: i64 = -32602;

const BLOCK_METHODS: &[&str] = &["getblock", "getblockhash", "getblockheader"];

pub fn is_err_block_not_found(err: &RpcError) -> bool {
    err.message == "Block not found" || err.message == "Block height out of range"
}

pub fn is_missing_tx(err: &RpcError) -> bool {
    err.code == RPC_INVALID_ADDRESS_OR_KEY
}

///
/// Classify a node error for the method that produced it.
///
/// The same code means different things per method: `-5` is a missing
/// transaction for `getrawtransaction` but not for fee estimation.
///
pub fn classify(method: &str, err: &RpcError) -> ErrorClass {
    if BLOCK_METHODS.contains(&method) && is_err_block_not_found(err) {
        return ErrorClass::NotFound;
    }
    if method == "getrawtransaction" && is_missing_tx(err) {
        return ErrorClass::NotFound;
    }
    match err.code {
        RPC_PARSE_ERROR | RPC_INVALID_REQUEST | RPC_METHOD_NOT_FOUND | RPC_INVALID_PARAMS
        | RPC_METHOD_DEPRECATED => ErrorClass::Fatal,
        _ => ErrorClass::Transient,
    }
}

///
/// Turn a node error into an `OpError`. Not-found becomes the
/// dedicated sentinel kind of the method (block or transaction).
///
pub fn to_op_error(method: &str, err: &RpcError) -> OpError {
    let kind = match classify(method, err) {
        ErrorClass::NotFound if method == "getrawtransaction" => OpErrorKind::TxNotFound,
        ErrorClass::NotFound => OpErrorKind::BlockNotFound,
        ErrorClass::Transient => OpErrorKind::RpcTransient { code: err.code },
        ErrorClass::Fatal => OpErrorKind::RpcFatal { code: err.code },
    };
    OpError::new(kind).join_msg(&format!("{}: {}", method, err))
}
