//! 错误类型
//!
//! 派生引擎只向调用方暴露一个错误枚举；二进制与配置层使用 anyhow

use thiserror::Error;

#[derive(Debug, Error)]
pub enum KeygenError {
    /// 助记词未通过 BIP39 词表/校验和验证，整批中止
    #[error("Invalid mnemonic: {0}")]
    InvalidMnemonic(String),

    /// 派生路径格式错误或子索引越界（固定模板下不应出现）
    #[error("Derivation failed: {0}")]
    Derivation(String),

    /// 地址/私钥编码器拒绝了密钥（不应出现）
    #[error("Encoding failed: {0}")]
    Encoding(String),

    #[error("Invalid batch size: {0}")]
    InvalidBatchSize(String),

    #[error("Unsupported chain: {0}")]
    UnsupportedChain(String),

    /// 结果落盘失败，不影响内存中的 BatchResult
    #[error("Persistence failed: {0}")]
    Persistence(String),
}

impl KeygenError {
    /// 稳定的错误码字符串
    pub fn code(&self) -> &'static str {
        match self {
            KeygenError::InvalidMnemonic(_) => "invalid_mnemonic",
            KeygenError::Derivation(_) => "derivation_error",
            KeygenError::Encoding(_) => "encoding_error",
            KeygenError::InvalidBatchSize(_) => "invalid_batch_size",
            KeygenError::UnsupportedChain(_) => "chain_not_supported",
            KeygenError::Persistence(_) => "persistence_error",
        }
    }

    /// 是否属于调用方可以纠正后重试的错误（例如重新输入助记词）
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            KeygenError::InvalidMnemonic(_)
                | KeygenError::InvalidBatchSize(_)
                | KeygenError::UnsupportedChain(_)
        )
    }
}

impl From<std::io::Error> for KeygenError {
    fn from(e: std::io::Error) -> Self {
        KeygenError::Persistence(e.to_string())
    }
}

impl From<serde_json::Error> for KeygenError {
    fn from(e: serde_json::Error) -> Self {
        KeygenError::Persistence(e.to_string())
    }
}

pub type KeygenResult<T> = Result<T, KeygenError>;
