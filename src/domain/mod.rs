//! Domain 模块
//!
//! 链目录、助记词、密钥树、地址编码、批量聚合与派生引擎

pub mod address;
pub mod batch;
pub mod chain_config;
pub mod derivation_path;
pub mod engine;
pub mod key_tree;
pub mod mnemonic;

// 重新导出常用类型
pub use address::{AddressEncoder, AddressRecord};
pub use batch::{BatchAggregator, BatchResult, FormatBatch};
pub use chain_config::{AddressFormat, Chain, ChainConfig, CurveType};
pub use derivation_path::{ChildIndex, DerivationPath};
pub use engine::{derive_batch, BatchSize, DerivationEngine, DeriveRequest, GenerationMode};
pub use key_tree::{HdKeyTree, KeyPair, KeyTreeFactory};
pub use mnemonic::{MnemonicSource, SeedMaterial, WordCount};
