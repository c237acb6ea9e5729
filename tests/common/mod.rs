//! 测试辅助模块

#![allow(dead_code)]

use ironcore_keygen::domain::{derive_batch, BatchResult, BatchSize, Chain, GenerationMode};

/// BIP39 标准测试助记词
pub const TEST_MNEMONIC: &str =
    "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

pub fn batch_size(n: u32) -> BatchSize {
    BatchSize::new(n).expect("positive batch size")
}

/// 用测试助记词导入派生
pub fn import_batch(chain: Chain, n: u32) -> BatchResult {
    derive_batch(
        chain,
        GenerationMode::ImportMnemonic(TEST_MNEMONIC.to_string()),
        batch_size(n),
    )
    .expect("import with test mnemonic")
}

pub fn random_batch(chain: Chain, n: u32) -> BatchResult {
    derive_batch(chain, GenerationMode::Random, batch_size(n)).expect("random batch")
}
