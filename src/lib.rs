//! IronCore Keygen - 多链批量密钥/地址生成
//!
//! 支持 Bitcoin (P2PKH / P2SH-P2WPKH / P2WPKH / P2TR)、Ethereum、Solana，
//! 随机、生成助记词、导入助记词三种模式

pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod service;

// 重新导出常用类型
pub use error::{KeygenError, KeygenResult};

pub mod prelude {
    pub use crate::{
        domain::{
            derive_batch, AddressFormat, BatchResult, BatchSize, Chain, DerivationEngine,
            DeriveRequest, FormatBatch, GenerationMode,
        },
        error::{KeygenError, KeygenResult},
        service::{JsonFileSink, ResultSink},
    };
}
