use std::fmt;
use std::io;
use thiserror::Error;

pub type OpResult<T> = Result<T, OpError>;

///
/// Outcome of inspecting a failure, used by callers to decide
/// whether retrying makes sense.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    /// block or transaction absent (pruned, not yet synced, beyond tip)
    NotFound,
    /// retrying later may succeed
    Transient,
    /// retrying is futile
    Fatal,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OpErrorKind {
    #[error("block not found")]
    BlockNotFound,
    #[error("transaction not found")]
    TxNotFound,
    #[error("rpc error {code}")]
    RpcTransient { code: i64 },
    #[error("rpc error {code}")]
    RpcFatal { code: i64 },
    #[error("decode error")]
    DecodeError,
    #[error("format error")]
    FormatError,
    #[error("not implemented")]
    CapabilityUnsupported,
    #[error("transport error")]
    TransportError,
    #[error("json error")]
    JsonError,
    #[error("chain params conflict")]
    ParamsConflict,
    #[error("runtime error")]
    RuntimeError,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpError {
    kind: OpErrorKind,
    message: String,
}

impl OpError {
    pub fn new(kind: OpErrorKind) -> Self {
        OpError {
            kind,
            message: String::new(),
        }
    }

    /// Append context (hash, height, txid) without touching the kind.
    pub fn join_msg(mut self, msg: &str) -> Self {
        if self.message.is_empty() {
            self.message.push_str(msg);
        } else {
            self.message = format!("{}: {}", msg, self.message);
        }
        self
    }

    pub fn kind(&self) -> &OpErrorKind {
        &self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_not_found(&self) -> bool {
        self.class() == ErrorClass::NotFound
    }

    pub fn class(&self) -> ErrorClass {
        match self.kind {
            OpErrorKind::BlockNotFound | OpErrorKind::TxNotFound => ErrorClass::NotFound,
            OpErrorKind::RpcTransient { .. } | OpErrorKind::TransportError => {
                ErrorClass::Transient
            }
            _ => ErrorClass::Fatal,
        }
    }
}

impl fmt::Display for OpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "{}: {}", self.kind, self.message)
        }
    }
}

impl std::error::Error for OpError {}

impl From<&str> for OpError {
    fn from(s: &str) -> Self {
        OpError::new(OpErrorKind::RuntimeError).join_msg(s)
    }
}

impl From<String> for OpError {
    fn from(s: String) -> Self {
        OpError::new(OpErrorKind::RuntimeError).join_msg(&s)
    }
}

impl From<io::Error> for OpError {
    fn from(err: io::Error) -> Self {
        OpError::new(OpErrorKind::DecodeError).join_msg(&err.to_string())
    }
}

impl From<bitcoin::consensus::encode::Error> for OpError {
    fn from(err: bitcoin::consensus::encode::Error) -> Self {
        OpError::new(OpErrorKind::DecodeError).join_msg(&err.to_string())
    }
}

impl From<hex::FromHexError> for OpError {
    fn from(err: hex::FromHexError) -> Self {
        OpError::new(OpErrorKind::DecodeError).join_msg(&err.to_string())
    }
}

impl From<serde_json::Error> for OpError {
    fn from(err: serde_json::Error) -> Self {
        OpError::new(OpErrorKind::JsonError).join_msg(&err.to_string())
    }
}

impl From<reqwest::Error> for OpError {
    fn from(err: reqwest::Error) -> Self {
        OpError::new(OpErrorKind::TransportError).join_msg(&err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_msg_keeps_kind() {
        let err = OpError::new(OpErrorKind::TxNotFound)
            .join_msg("txid abc")
            .join_msg("block 00ff");
        assert_eq!(err.kind(), &OpErrorKind::TxNotFound);
        assert_eq!(err.message(), "block 00ff: txid abc");
        assert_eq!(err.to_string(), "transaction not found: block 00ff: txid abc");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_class() {
        assert_eq!(
            OpError::new(OpErrorKind::RpcTransient { code: -28 }).class(),
            ErrorClass::Transient
        );
        assert_eq!(
            OpError::new(OpErrorKind::TransportError).class(),
            ErrorClass::Transient
        );
        assert_eq!(
            OpError::new(OpErrorKind::CapabilityUnsupported).class(),
            ErrorClass::Fatal
        );
        assert_eq!(OpError::from("boom").class(), ErrorClass::Fatal);
    }
}
